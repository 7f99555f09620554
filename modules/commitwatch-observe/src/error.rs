//! Typed errors for the observation core.
//!
//! "Nothing matched yet" is an ordinary wait outcome, never a panic, so
//! callers can tell a quiet system from a broken primitive. A payload that
//! is not the requested type is not an error at all; heterogeneous streams
//! are expected and mismatches are skipped.

use std::time::Duration;

use thiserror::Error;

/// Terminal outcomes of a wait that found no match.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The deadline elapsed before any record satisfied the predicate.
    #[error("no matching record within {waited:?}")]
    TimedOut {
        /// Time spent waiting, measured from the call.
        waited: Duration,
    },

    /// The caller's cancellation token fired mid-wait.
    #[error("wait cancelled")]
    Cancelled,
}

/// Producer-side failures.
#[derive(Debug, Error)]
pub enum RecordError {
    /// `record_commit` was called after the notifier shut down. Fatal for
    /// the producer: the records would otherwise be silently dropped.
    #[error("notifier has shut down")]
    Shutdown,
}

/// Result type alias for wait operations.
pub type WaitResult<T> = std::result::Result<T, WaitError>;

/// Result type alias for producer-side operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;
