//! Domain events: named, timestamped facts with a JSON payload.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use stratix_core::ValueObject;

use crate::naming::qualified_event_name;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to serialize payload of `{event}`: {source}")]
    Serialize {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read payload of `{event}`: {source}")]
    Deserialize {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A value object that describes something that happened in the domain.
///
/// The payload type names the event. `CONTEXT` is the bounded context it
/// belongs to and is rendered in PascalCase in front of the name:
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Serialize)]
/// struct VideoHasFinishedProcessing { video_id: String }
///
/// impl ValueObject for VideoHasFinishedProcessing {}
///
/// impl EventPayload for VideoHasFinishedProcessing {
///     const EVENT: &'static str = "VideoHasFinishedProcessing";
///     const CONTEXT: Option<&'static str> = Some("video_processor");
/// }
///
/// // "[VideoProcessor] VideoHasFinishedProcessing"
/// let event = DomainEvent::new(&VideoHasFinishedProcessing { video_id: "123".into() })?;
/// ```
pub trait EventPayload: ValueObject + Serialize {
    const EVENT: &'static str;
    const CONTEXT: Option<&'static str> = None;

    fn event_name() -> String {
        qualified_event_name(Self::CONTEXT, Self::EVENT)
    }
}

/// A recorded domain event.
///
/// Events are immutable facts. Two events are equal when they carry the same
/// name, so an event also compares equal to its name as a string. Use
/// [`DomainEvent::id`] to tell individual occurrences apart and
/// [`DomainEvent::occurred_before`] to order them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    id: Uuid,
    created_at: DateTime<Utc>,
    name: String,
    payload: Value,
}

impl DomainEvent {
    pub fn new<P: EventPayload>(payload: &P) -> Result<Self, EventError> {
        let name = P::event_name();
        let payload = serde_json::to_value(payload).map_err(|source| EventError::Serialize {
            event: name.clone(),
            source,
        })?;
        Ok(Self::from_parts(Uuid::new_v4(), Utc::now(), name, payload))
    }

    /// Rebuild an event from stored parts.
    pub fn from_parts(
        id: Uuid,
        created_at: DateTime<Utc>,
        name: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            id,
            created_at,
            name: name.into(),
            payload,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Decode the payload back into a typed value.
    pub fn payload_as<P: DeserializeOwned>(&self) -> Result<P, EventError> {
        P::deserialize(&self.payload).map_err(|source| EventError::Deserialize {
            event: self.name.clone(),
            source,
        })
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn occurred_before(&self, other: &DomainEvent) -> bool {
        self.created_at < other.created_at
    }

    pub fn occurred_after(&self, other: &DomainEvent) -> bool {
        self.created_at > other.created_at
    }
}

impl PartialEq for DomainEvent {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DomainEvent {}

impl PartialEq<str> for DomainEvent {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for DomainEvent {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Picks registered events out of a bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventSelector {
    /// One specific occurrence.
    Id(Uuid),
    /// The first event registered under this name.
    Name(String),
}

impl EventSelector {
    pub fn matches(&self, event: &DomainEvent) -> bool {
        match self {
            EventSelector::Id(id) => event.id == *id,
            EventSelector::Name(name) => event.name == *name,
        }
    }
}

impl From<Uuid> for EventSelector {
    fn from(value: Uuid) -> Self {
        EventSelector::Id(value)
    }
}

impl From<&str> for EventSelector {
    fn from(value: &str) -> Self {
        EventSelector::Name(value.to_string())
    }
}

impl From<String> for EventSelector {
    fn from(value: String) -> Self {
        EventSelector::Name(value)
    }
}

impl From<&DomainEvent> for EventSelector {
    fn from(value: &DomainEvent) -> Self {
        EventSelector::Id(value.id)
    }
}

impl fmt::Display for EventSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSelector::Id(id) => write!(f, "event id {id}"),
            EventSelector::Name(name) => write!(f, "event name `{name}`"),
        }
    }
}
