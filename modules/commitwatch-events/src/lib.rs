//! Record types and the append-only commit log.
//!
//! Domain-agnostic: payloads are opaque typed values behind `dyn Any`.
//! Consumers bring their own event and projection types and narrow with
//! [`Record::payload_as`] before inspecting a payload.

pub mod log;
pub mod types;

pub use log::CommitLog;
pub use types::{EventRecord, Record, StreamId, TypeTag, UpdateRecord};
