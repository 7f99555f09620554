//! The producer-side contract and per-wait options shared by both
//! notifier variants.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use commitwatch_events::{EventRecord, Record, UpdateRecord};

use crate::error::RecordResult;

/// Ceiling applied when a wait is issued without an explicit deadline, so
/// a log that never grows cannot hang a caller indefinitely.
pub const DEFAULT_WAIT_CEILING: Duration = Duration::from_secs(10);

/// Interval between re-scans of the log in the poll variant.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Producer-side surface of a notifier. Object-safe so the commit-hook
/// adapter can hold either variant.
pub trait CommitSink: Send + Sync {
    /// Record one commit's newly appended events and changed read-model
    /// objects, every event before every update, preserving the events'
    /// relative order within the commit.
    ///
    /// Never suspends and never blocks on a consumer. Fails only with
    /// [`RecordError::Shutdown`](crate::error::RecordError::Shutdown).
    fn record_commit(
        &self,
        events: Vec<EventRecord>,
        updates: Vec<UpdateRecord>,
    ) -> RecordResult<()>;
}

/// Per-wait knobs: an optional deadline and an optional cancellation token.
///
/// Absent a deadline, [`DEFAULT_WAIT_CEILING`] is enforced. Absent a token,
/// the wait is cancellable only by its deadline.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    deadline: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn deadline_or_default(&self) -> Duration {
        self.deadline.unwrap_or(DEFAULT_WAIT_CEILING)
    }

    pub(crate) fn cancellation(&self) -> CancellationToken {
        self.cancel.clone().unwrap_or_default()
    }
}

/// Test a record against the requested type and predicate. A record of
/// another type is skipped, not an error.
pub(crate) fn match_record<T, P>(record: &Record, predicate: &P) -> Option<Arc<T>>
where
    T: Any + Send + Sync,
    P: Fn(&T) -> bool,
{
    if !record.tag().matches::<T>() {
        trace!(tag = %record.tag(), "record skipped, type mismatch");
        return None;
    }
    let payload = record.payload_as::<T>()?;
    predicate(&payload).then_some(payload)
}
