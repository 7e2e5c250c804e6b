//! Event bus capability (mechanics only).
//!
//! Entities **register** domain events on the bus of their class. The bus
//! keeps them and later hands them to a [`PublishAlgorithm`] either all at once
//! (`publish`) or one by one (`publish_only`).
//!
//! ## Design Philosophy
//!
//! - **Append-only registration**: events are facts, a bus never rewrites them
//! - **Pluggable publishing**: the strategy that delivers an event is a separate trait
//! - **No persistence**: a bus is for distribution, not storage
//!
//! [`PublishAlgorithm`]: crate::publisher::PublishAlgorithm

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use thiserror::Error;

use crate::event::{DomainEvent, EventSelector};
use crate::publisher::PublishError;

/// A bus shared by every instance of one entity class.
pub type SharedEventBus = Arc<dyn EventBus>;

#[derive(Debug, Error)]
pub enum EventBusError {
    /// Internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,

    #[error("no registered event matches {0}")]
    EventNotFound(EventSelector),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// A subscription to a stream of published events.
///
/// Each subscription gets a copy of every event published after it was
/// created (broadcast semantics).
///
/// ## Usage Pattern
///
/// ```ignore
/// let publisher = BroadcastPublisher::new();
/// let subscription = publisher.subscribe();
/// let bus = InMemoryEventBus::with_publisher(publisher);
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(event) => process(event)?,
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
///
/// Subscriptions are designed for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every message that is already waiting.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// In-process domain event registry with a pluggable publishing strategy.
///
/// ## Thread Safety
///
/// The trait requires `Send + Sync` so one bus can be shared by every instance
/// of an entity class. Implementations decide how registrations from several
/// threads interleave; the relative order of concurrent registrations is not
/// specified.
pub trait EventBus: Send + Sync + core::fmt::Debug {
    /// Record an event. Registration never publishes by itself.
    fn register(&self, event: DomainEvent) -> Result<(), EventBusError>;

    /// Publish every registered event in registration order.
    ///
    /// Returns the number of events handed to the publisher.
    fn publish(&self) -> Result<usize, EventBusError>;

    /// Publish the first registered event matching `selector`.
    fn publish_only(&self, selector: &EventSelector) -> Result<(), EventBusError>;

    fn has_event(&self, name: &str) -> bool;

    fn count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Forget every registered event.
    fn clear(&self) -> Result<(), EventBusError>;
}

impl<B> EventBus for Arc<B>
where
    B: EventBus + ?Sized,
{
    fn register(&self, event: DomainEvent) -> Result<(), EventBusError> {
        (**self).register(event)
    }

    fn publish(&self) -> Result<usize, EventBusError> {
        (**self).publish()
    }

    fn publish_only(&self, selector: &EventSelector) -> Result<(), EventBusError> {
        (**self).publish_only(selector)
    }

    fn has_event(&self, name: &str) -> bool {
        (**self).has_event(name)
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn clear(&self) -> Result<(), EventBusError> {
        (**self).clear()
    }
}
