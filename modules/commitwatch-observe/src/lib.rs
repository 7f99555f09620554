//! Observation core for event-sourced systems under test.
//!
//! Lets any caller block until an asynchronously committed domain event or
//! read-model update satisfying a typed predicate appears, with bounded
//! waiting and cancellation. Producers report commits through the
//! [`CommitSink`] trait; the persistence layer plugs in via [`CommitHook`].
//!
//! Two interchangeable variants:
//!
//! - [`PushNotifier`] — unbounded queue, destructively drained by a single
//!   waiter. Lowest latency, one outstanding wait at a time.
//! - [`PollNotifier`] — append-only log re-scanned on an interval. Any
//!   number of concurrent waiters, idempotent re-waits.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use commitwatch_events::StreamId;
//! use commitwatch_observe::{ChangeSet, CommitHook, CommitListener, PollNotifier, WaitOptions};
//!
//! struct Registered {
//!     username: String,
//! }
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let notifier = Arc::new(PollNotifier::new());
//! let hook = CommitHook::new(notifier.clone());
//!
//! // The persistence layer calls this once per successful commit.
//! hook.after_commit(
//!     ChangeSet::new().event(StreamId::new(), Registered { username: "jane".into() }),
//! )?;
//!
//! let matched = notifier
//!     .wait_for(|e: &Registered| e.username == "jane", WaitOptions::new())
//!     .await?;
//! assert_eq!(matched.username, "jane");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hook;
pub mod notifier;
pub mod poll;
pub mod push;

pub use error::{RecordError, RecordResult, WaitError, WaitResult};
pub use hook::{ChangeSet, CommitHook, CommitListener};
pub use notifier::{CommitSink, WaitOptions, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_CEILING};
pub use poll::PollNotifier;
pub use push::PushNotifier;
