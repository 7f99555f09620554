//! Push notifier — producers write into an unbounded queue at commit time;
//! one waiter drains it.
//!
//! The queue has a single logical reader position and draining is
//! destructive, so only one `wait_for` should be outstanding at a time;
//! concurrent waiters race for the same records. When concurrent waits are
//! needed, use [`PollNotifier`](crate::poll::PollNotifier) instead.

use std::any::Any;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::debug;

use commitwatch_events::{EventRecord, Record, UpdateRecord};

use crate::error::{RecordError, RecordResult, WaitError, WaitResult};
use crate::notifier::{match_record, CommitSink, WaitOptions};

/// Queue-draining notifier. Producers never block; the unbounded channel
/// absorbs any commit rate.
pub struct PushNotifier {
    tx: RwLock<Option<UnboundedSender<Record>>>,
    rx: Mutex<UnboundedReceiver<Record>>,
}

impl PushNotifier {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: RwLock::new(Some(tx)),
            rx: Mutex::new(rx),
        }
    }

    /// Close the queue. Later `record_commit` calls fail with
    /// [`RecordError::Shutdown`]; records already queued stay drainable.
    pub fn shutdown(&self) {
        self.tx.write().unwrap().take();
    }

    /// Drain the queue in FIFO order until a record of type `T` satisfies
    /// the predicate, the deadline elapses, or the wait is cancelled.
    ///
    /// Every drained record is consumed, matched or not; it will not be
    /// seen by a later wait.
    pub async fn wait_for<T, P>(&self, predicate: P, opts: WaitOptions) -> WaitResult<Arc<T>>
    where
        T: Any + Send + Sync,
        P: Fn(&T) -> bool,
    {
        let started = Instant::now();
        let cancel = opts.cancellation();
        let deadline = tokio::time::sleep(opts.deadline_or_default());
        tokio::pin!(deadline);

        let timed_out = |started: Instant| WaitError::TimedOut {
            waited: started.elapsed(),
        };

        // The receiver lock is the single drain cursor; acquiring it also
        // honors the deadline and cancellation.
        let mut rx = tokio::select! {
            guard = self.rx.lock() => guard,
            () = &mut deadline => return Err(timed_out(started)),
            () = cancel.cancelled() => return Err(WaitError::Cancelled),
        };

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(record) => {
                        if let Some(matched) = match_record(&record, &predicate) {
                            debug!(tag = %record.tag(), "record matched");
                            return Ok(matched);
                        }
                    }
                    // Queue shut down and fully drained; nothing further
                    // can arrive, so only the deadline or cancellation can
                    // resolve this wait.
                    None => {
                        tokio::select! {
                            () = &mut deadline => return Err(timed_out(started)),
                            () = cancel.cancelled() => return Err(WaitError::Cancelled),
                        }
                    }
                },
                () = &mut deadline => return Err(timed_out(started)),
                () = cancel.cancelled() => return Err(WaitError::Cancelled),
            }
        }
    }

    fn send(&self, record: Record) -> RecordResult<()> {
        let guard = self.tx.read().unwrap();
        let tx = guard.as_ref().ok_or(RecordError::Shutdown)?;
        debug!(tag = %record.tag(), "record queued");
        tx.send(record).map_err(|_| RecordError::Shutdown)
    }
}

impl Default for PushNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitSink for PushNotifier {
    fn record_commit(
        &self,
        events: Vec<EventRecord>,
        updates: Vec<UpdateRecord>,
    ) -> RecordResult<()> {
        for event in events {
            self.send(Record::Event(event))?;
        }
        for update in updates {
            self.send(Record::Update(update))?;
        }
        Ok(())
    }
}
