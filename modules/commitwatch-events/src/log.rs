//! CommitLog — append-only, insertion-ordered record log.
//!
//! The single shared mutable resource of a notifier. Producers only append;
//! readers only snapshot. Once appended, a record's position never changes
//! and it is never removed.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::types::Record;

/// Append-only ordered log, safe under concurrent producers and readers.
///
/// Ordering among concurrently appending producers follows whatever order
/// their writes take the lock in; within one `extend` batch the input order
/// is preserved.
#[derive(Default)]
pub struct CommitLog {
    entries: RwLock<Vec<Arc<Record>>>,
}

impl CommitLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: Record) {
        debug!(tag = %record.tag(), "record appended");
        self.entries.write().unwrap().push(Arc::new(record));
    }

    /// Append one commit's records under a single guard, preserving their
    /// relative order and keeping the batch contiguous.
    pub fn extend(&self, records: impl IntoIterator<Item = Record>) {
        let mut entries = self.entries.write().unwrap();
        for record in records {
            debug!(tag = %record.tag(), "record appended");
            entries.push(Arc::new(record));
        }
    }

    /// Number of records appended so far. A later call never returns less.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record at position `offset` and beyond, in log
    /// order. An offset at or past the tail yields an empty snapshot.
    pub fn read_from(&self, offset: usize) -> Vec<Arc<Record>> {
        let entries = self.entries.read().unwrap();
        entries.get(offset..).unwrap_or(&[]).to_vec()
    }
}
