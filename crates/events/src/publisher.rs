//! Publishing strategies used by event buses.

use std::sync::{Mutex, mpsc};

use thiserror::Error;
use tracing::info;

use crate::bus::Subscription;
use crate::event::DomainEvent;

#[derive(Debug, Error)]
pub enum PublishError {
    /// Internal lock poisoning.
    #[error("publisher lock poisoned")]
    Poisoned,

    #[error("event `{event}` rejected: {reason}")]
    Rejected { event: String, reason: String },
}

impl PublishError {
    pub fn rejected(event: &DomainEvent, reason: impl Into<String>) -> Self {
        Self::Rejected {
            event: event.name().to_string(),
            reason: reason.into(),
        }
    }
}

/// Delivers one event somewhere.
pub trait PublishAlgorithm: Send + Sync + core::fmt::Debug {
    fn publish(&self, event: &DomainEvent) -> Result<(), PublishError>;
}

/// Emits every published event as a structured log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl PublishAlgorithm for TracingPublisher {
    fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        info!(
            event_id = %event.id(),
            event_name = event.name(),
            created_at = %event.created_at(),
            payload = %event.payload(),
            "domain event published"
        );
        Ok(())
    }
}

/// Fans published events out to every live [`Subscription`].
///
/// - No IO / no async
/// - Best-effort fan-out: dropped subscriptions are pruned on the next publish
#[derive(Debug, Default)]
pub struct BroadcastPublisher {
    subscribers: Mutex<Vec<mpsc::Sender<DomainEvent>>>,
}

impl BroadcastPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription<DomainEvent> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}

impl PublishAlgorithm for BroadcastPublisher {
    fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        let mut subs = self.subscribers.lock().map_err(|_| PublishError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(event.clone()).is_ok());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;
    use uuid::Uuid;

    fn event(name: &str) -> DomainEvent {
        DomainEvent::from_parts(Uuid::new_v4(), Utc::now(), name, Value::Null)
    }

    #[test]
    fn broadcast_delivers_to_every_subscriber() {
        let publisher = BroadcastPublisher::new();
        let a = publisher.subscribe();
        let b = publisher.subscribe();

        publisher.publish(&event("CaseOpened")).unwrap();

        assert_eq!(a.try_recv().unwrap(), "CaseOpened");
        assert_eq!(b.try_recv().unwrap(), "CaseOpened");
    }

    #[test]
    fn broadcast_prunes_dropped_subscribers() {
        let publisher = BroadcastPublisher::new();
        let kept = publisher.subscribe();
        drop(publisher.subscribe());
        assert_eq!(publisher.subscriber_count(), 2);

        publisher.publish(&event("CaseOpened")).unwrap();

        assert_eq!(publisher.subscriber_count(), 1);
        assert_eq!(kept.drain().len(), 1);
    }

    #[test]
    fn tracing_publisher_accepts_every_event() {
        assert!(TracingPublisher.publish(&event("CaseOpened")).is_ok());
    }
}
