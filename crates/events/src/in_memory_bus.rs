//! In-memory event bus: the default bus of entity classes.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::bus::{EventBus, EventBusError};
use crate::event::{DomainEvent, EventSelector};
use crate::publisher::{PublishAlgorithm, TracingPublisher};

/// In-memory event registry.
///
/// - No IO / no async
/// - Events are kept in registration order
/// - Publishing does not drain; call [`EventBus::clear`] to forget events
#[derive(Debug)]
pub struct InMemoryEventBus<P = TracingPublisher> {
    events: Mutex<Vec<DomainEvent>>,
    publisher: P,
}

impl InMemoryEventBus {
    /// A bus that publishes by logging.
    pub fn new() -> Self {
        Self::with_publisher(TracingPublisher)
    }
}

impl<P> InMemoryEventBus<P> {
    pub fn with_publisher(publisher: P) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            publisher,
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Snapshot of the registered events.
    pub fn events(&self) -> Result<Vec<DomainEvent>, EventBusError> {
        let events = self.events.lock().map_err(|_| EventBusError::Poisoned)?;
        Ok(events.clone())
    }
}

impl<P: Default> Default for InMemoryEventBus<P> {
    fn default() -> Self {
        Self::with_publisher(P::default())
    }
}

impl<P: PublishAlgorithm> EventBus for InMemoryEventBus<P> {
    fn register(&self, event: DomainEvent) -> Result<(), EventBusError> {
        let mut events = self.events.lock().map_err(|_| EventBusError::Poisoned)?;
        debug!(event_id = %event.id(), event_name = event.name(), "domain event registered");
        events.push(event);
        Ok(())
    }

    fn publish(&self) -> Result<usize, EventBusError> {
        // Publish from a snapshot so a publisher may register follow-up events.
        let snapshot = self.events()?;
        for event in &snapshot {
            self.publisher.publish(event)?;
        }
        Ok(snapshot.len())
    }

    fn publish_only(&self, selector: &EventSelector) -> Result<(), EventBusError> {
        let found = {
            let events = self.events.lock().map_err(|_| EventBusError::Poisoned)?;
            events.iter().find(|event| selector.matches(event)).cloned()
        };
        let event = found.ok_or_else(|| EventBusError::EventNotFound(selector.clone()))?;
        self.publisher.publish(&event)?;
        Ok(())
    }

    // Queries see through a poisoned lock; registration is append-only.
    fn has_event(&self, name: &str) -> bool {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events.iter().any(|event| event.is_named(name))
    }

    fn count(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn clear(&self) -> Result<(), EventBusError> {
        let mut events = self.events.lock().map_err(|_| EventBusError::Poisoned)?;
        events.clear();
        Ok(())
    }
}
