//! Poll notifier — producers append to a shared append-only log; each
//! waiter re-scans the log from its own cursor on a fixed interval.
//!
//! Because the log is immutable once written and every waiter owns an
//! independent cursor, any number of waits may run concurrently and a
//! single commit can satisfy all of them.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use commitwatch_events::{CommitLog, EventRecord, Record, UpdateRecord};

use crate::error::{RecordError, RecordResult, WaitError, WaitResult};
use crate::notifier::{match_record, CommitSink, WaitOptions, DEFAULT_POLL_INTERVAL};

/// Log-scanning notifier. The variant of choice when concurrent waiters
/// are in play.
pub struct PollNotifier {
    log: CommitLog,
    poll_interval: Duration,
    closed: AtomicBool,
}

impl PollNotifier {
    pub fn new() -> Self {
        Self {
            log: CommitLog::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            closed: AtomicBool::new(false),
        }
    }

    /// Override the re-scan interval. Mostly for tests that want tight
    /// timing without waiting out the 200ms default.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Mark the notifier closed. Later `record_commit` calls fail with
    /// [`RecordError::Shutdown`]; the log stays readable by in-flight and
    /// future waits.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Scan the log until a record of type `T` satisfies the predicate,
    /// the deadline elapses, or the wait is cancelled.
    ///
    /// The cursor starts at the head of the log, so records committed
    /// before the wait began are visible, and the same satisfied predicate
    /// matches again on a fresh wait. Each record is scanned at most once
    /// per waiter; the cursor advances past everything scanned, match or
    /// not.
    pub async fn wait_for<T, P>(&self, predicate: P, opts: WaitOptions) -> WaitResult<Arc<T>>
    where
        T: Any + Send + Sync,
        P: Fn(&T) -> bool,
    {
        let started = Instant::now();
        let cancel = opts.cancellation();
        let deadline = tokio::time::sleep(opts.deadline_or_default());
        tokio::pin!(deadline);

        let mut cursor = 0usize;
        loop {
            let unscanned = self.log.read_from(cursor);
            cursor += unscanned.len();

            for record in &unscanned {
                if let Some(matched) = match_record(record, &predicate) {
                    debug!(tag = %record.tag(), "record matched");
                    return Ok(matched);
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                () = &mut deadline => {
                    return Err(WaitError::TimedOut {
                        waited: started.elapsed(),
                    });
                }
                () = cancel.cancelled() => return Err(WaitError::Cancelled),
            }
        }
    }
}

impl Default for PollNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitSink for PollNotifier {
    fn record_commit(
        &self,
        events: Vec<EventRecord>,
        updates: Vec<UpdateRecord>,
    ) -> RecordResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RecordError::Shutdown);
        }

        // One commit's records land contiguously, events first, under a
        // single guard.
        self.log.extend(
            events
                .into_iter()
                .map(Record::Event)
                .chain(updates.into_iter().map(Record::Update)),
        );
        Ok(())
    }
}
