//! Domain events and the in-process event bus entities register them on.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod naming;
pub mod publisher;

pub use bus::{EventBus, EventBusError, SharedEventBus, Subscription};
pub use event::{DomainEvent, EventError, EventPayload, EventSelector};
pub use in_memory_bus::InMemoryEventBus;
pub use naming::{qualified_event_name, to_pascal_case};
pub use publisher::{BroadcastPublisher, PublishAlgorithm, PublishError, TracingPublisher};
