//! Commit-hook adapter — the single integration seam with the external
//! persistence layer.
//!
//! The store invokes [`CommitListener::after_commit`] once per successful
//! commit, synchronously, with everything that commit changed. The adapter
//! translates and forwards; it never filters, buffers, or retries. By the
//! time it runs the commit has already succeeded, so a recording failure is
//! surfaced to the caller's error path and never rolled back into the
//! write.

use std::any::Any;
use std::sync::Arc;

use tracing::error;

use commitwatch_events::{EventRecord, StreamId, UpdateRecord};

use crate::error::RecordResult;
use crate::notifier::CommitSink;

/// One commit's worth of changes, translated into records as it is built.
///
/// The typed builder methods capture each payload's tag at the boundary;
/// past this point everything is a plain record.
#[derive(Debug, Default)]
pub struct ChangeSet {
    events: Vec<EventRecord>,
    updates: Vec<UpdateRecord>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A domain event appended to `stream_id` by this commit.
    pub fn event<T: Any + Send + Sync>(mut self, stream_id: StreamId, payload: T) -> Self {
        self.events.push(EventRecord::new(stream_id, payload));
        self
    }

    /// A read-model object this commit changed.
    pub fn updated<T: Any + Send + Sync>(mut self, object: T) -> Self {
        self.updates.push(UpdateRecord::new(object));
        self
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn updates(&self) -> &[UpdateRecord] {
        &self.updates
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.updates.is_empty()
    }
}

/// Seam the persistence layer calls into, once per successful commit.
pub trait CommitListener: Send + Sync {
    fn after_commit(&self, changes: ChangeSet) -> RecordResult<()>;
}

/// Forwards each commit's changes to a notifier.
pub struct CommitHook {
    sink: Arc<dyn CommitSink>,
}

impl CommitHook {
    pub fn new(sink: Arc<dyn CommitSink>) -> Self {
        Self { sink }
    }
}

impl CommitListener for CommitHook {
    fn after_commit(&self, changes: ChangeSet) -> RecordResult<()> {
        let ChangeSet { events, updates } = changes;
        if let Err(err) = self.sink.record_commit(events, updates) {
            error!(%err, "failed to record committed changes; the commit itself stands");
            return Err(err);
        }
        Ok(())
    }
}
