//! Core record types. Domain-agnostic.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Runtime descriptor of a payload's Rust type.
///
/// Equality is on the `TypeId`; the name is carried for log lines only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Whether a payload carrying this tag is a `T`.
    pub fn matches<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identifier of the event stream a domain event was appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(Uuid);

impl StreamId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for StreamId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Payload = Arc<dyn Any + Send + Sync>;

/// An immutable fact appended to a stream by one commit.
#[derive(Clone)]
pub struct EventRecord {
    stream_id: StreamId,
    tag: TypeTag,
    recorded_at: DateTime<Utc>,
    payload: Payload,
}

impl EventRecord {
    /// Wrap a domain event, capturing its type tag.
    pub fn new<T: Any + Send + Sync>(stream_id: StreamId, payload: T) -> Self {
        Self {
            stream_id,
            tag: TypeTag::of::<T>(),
            recorded_at: Utc::now(),
            payload: Arc::new(payload),
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Narrow the payload to `T`. `None` on a type mismatch.
    pub fn payload_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.payload.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRecord")
            .field("stream_id", &self.stream_id)
            .field("tag", &self.tag.name)
            .field("recorded_at", &self.recorded_at)
            .finish_non_exhaustive()
    }
}

/// A read-model object that changed as a side effect of a commit.
#[derive(Clone)]
pub struct UpdateRecord {
    tag: TypeTag,
    recorded_at: DateTime<Utc>,
    payload: Payload,
}

impl UpdateRecord {
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            recorded_at: Utc::now(),
            payload: Arc::new(payload),
        }
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn payload_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.payload.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for UpdateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRecord")
            .field("tag", &self.tag.name)
            .field("recorded_at", &self.recorded_at)
            .finish_non_exhaustive()
    }
}

/// Everything a commit can put in front of an observer.
///
/// The tag is the discriminant for matching; consumers narrow with
/// [`Record::payload_as`] before running a predicate.
#[derive(Debug, Clone)]
pub enum Record {
    Event(EventRecord),
    Update(UpdateRecord),
}

impl Record {
    pub fn tag(&self) -> TypeTag {
        match self {
            Record::Event(e) => e.tag(),
            Record::Update(u) => u.tag(),
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Record::Event(_))
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Record::Update(_))
    }

    pub fn payload_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Record::Event(e) => e.payload_as::<T>(),
            Record::Update(u) => u.payload_as::<T>(),
        }
    }
}
