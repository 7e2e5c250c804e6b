//! Entity instances.
//!
//! An [`Entity`] pairs an immutable identifier with mutable attributes. The
//! identifier is assigned by the class descriptor at construction and can be
//! read but never replaced: the fields are private and the entity only derefs
//! to its attributes.
//!
//! Equality and hashing go through the identifier alone, so an entity compares
//! equal to (and hashes like) its raw identity value:
//!
//! ```ignore
//! let mut clients = HashSet::new();
//! let client = descriptor.instantiate(ClientData::default());
//! let id = *client.identity();
//! clients.insert(client);
//! assert!(clients.contains(&id));
//! ```

use core::fmt;
use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use stratix_core::{AnyIdentifier, BytesId, IdentifierKind, IntId, StringId, UuidId};
use stratix_events::{DomainEvent, EventPayload, EventSelector, SharedEventBus};

use crate::descriptor::{ClassConfig, EntityDescriptor};
use crate::error::{EntityError, IdentityMutation};

/// A domain object with a stable identity of kind `K` and attributes `T`.
#[derive(Clone)]
pub struct Entity<K: IdentifierKind, T> {
    identifier: K,
    class: Arc<ClassConfig>,
    attributes: T,
}

impl<K: IdentifierKind, T> Entity<K, T> {
    pub(crate) fn new(identifier: K, class: Arc<ClassConfig>, attributes: T) -> Self {
        Self {
            identifier,
            class,
            attributes,
        }
    }

    /// The raw identity value.
    pub fn identity(&self) -> &K::Raw {
        self.identifier.raw()
    }

    pub fn identifier(&self) -> &K {
        &self.identifier
    }

    pub fn any_identifier(&self) -> AnyIdentifier {
        self.identifier.to_any()
    }

    /// Name of the class this entity was instantiated from.
    pub fn class_name(&self) -> &str {
        &self.class.name
    }

    pub fn attributes(&self) -> &T {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut T {
        &mut self.attributes
    }

    pub fn into_attributes(self) -> T {
        self.attributes
    }

    pub fn into_parts(self) -> (K, T) {
        (self.identifier, self.attributes)
    }

    /// The event bus shared by every instance of this entity's class.
    pub fn event_bus(&self) -> Option<&SharedEventBus> {
        self.class.event_bus.as_ref()
    }

    pub fn propagates_events(&self) -> bool {
        self.class.propagate_events
    }

    pub fn is_pure(&self) -> bool {
        self.class.pure
    }

    pub fn same_identity_as<U>(&self, other: &Entity<K, U>) -> bool {
        self.identifier == other.identifier
    }

    /// Register `event` on the class bus.
    ///
    /// When the class propagates events, the event is published right away.
    pub fn record_event(&self, event: DomainEvent) -> Result<(), EntityError> {
        let bus = self
            .class
            .event_bus
            .as_ref()
            .ok_or_else(|| EntityError::EventingDisabled {
                entity: self.class.name.clone(),
            })?;

        let event_id: Uuid = event.id();
        debug!(
            entity = %self.class.name,
            identity = %self.identifier,
            event_id = %event_id,
            event_name = event.name(),
            "entity recorded event"
        );
        bus.register(event)?;

        if self.class.propagate_events {
            bus.publish_only(&EventSelector::Id(event_id))?;
        }
        Ok(())
    }

    /// Build a [`DomainEvent`] from `payload` and record it.
    pub fn record<P: EventPayload>(&self, payload: &P) -> Result<DomainEvent, EntityError> {
        let event = DomainEvent::new(payload)?;
        self.record_event(event.clone())?;
        Ok(event)
    }

    /// Identity cannot be reassigned; this always fails.
    pub fn replace_identity(&mut self, identity: K::Raw) -> Result<(), EntityError> {
        warn!(
            entity = %self.class.name,
            identity = %self.identifier,
            attempted = ?identity,
            "rejected identity change"
        );
        Err(self.immutable(IdentityMutation::Replace))
    }

    /// Identity cannot be removed; this always fails.
    pub fn remove_identity(&mut self) -> Result<(), EntityError> {
        warn!(
            entity = %self.class.name,
            identity = %self.identifier,
            "rejected identity removal"
        );
        Err(self.immutable(IdentityMutation::Remove))
    }

    fn immutable(&self, attempt: IdentityMutation) -> EntityError {
        EntityError::IdentityImmutable {
            entity: self.class.name.clone(),
            attempt,
        }
    }
}

impl<K: IdentifierKind, T> Deref for Entity<K, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.attributes
    }
}

impl<K: IdentifierKind, T> DerefMut for Entity<K, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.attributes
    }
}

impl<K: IdentifierKind, T: fmt::Debug> fmt::Debug for Entity<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("class", &self.class.name)
            .field("identifier", &self.identifier)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl<K: IdentifierKind, T> fmt::Display for Entity<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.class.name, self.identifier)
    }
}

/// Entities are equal when their identities are, whatever their class or attributes.
impl<K: IdentifierKind, T, U> PartialEq<Entity<K, U>> for Entity<K, T> {
    fn eq(&self, other: &Entity<K, U>) -> bool {
        self.identifier == other.identifier
    }
}

impl<K: IdentifierKind, T> Eq for Entity<K, T> {}

impl<K: IdentifierKind, T> Hash for Entity<K, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

macro_rules! impl_raw_identity {
    ($kind:ty, $raw:ty, $variant:ident) => {
        impl<T> PartialEq<AnyIdentifier> for Entity<$kind, T> {
            fn eq(&self, other: &AnyIdentifier) -> bool {
                match other {
                    AnyIdentifier::$variant(id) => self.identifier == *id,
                    _ => false,
                }
            }
        }

        impl<T> PartialEq<Entity<$kind, T>> for AnyIdentifier {
            fn eq(&self, other: &Entity<$kind, T>) -> bool {
                other == self
            }
        }

        impl<T> PartialEq<$kind> for Entity<$kind, T> {
            fn eq(&self, other: &$kind) -> bool {
                self.identifier == *other
            }
        }

        impl<T> PartialEq<Entity<$kind, T>> for $kind {
            fn eq(&self, other: &Entity<$kind, T>) -> bool {
                *self == other.identifier
            }
        }

        impl<T> PartialEq<$raw> for Entity<$kind, T> {
            fn eq(&self, other: &$raw) -> bool {
                self.identifier.raw() == other
            }
        }

        impl<T> PartialEq<Entity<$kind, T>> for $raw {
            fn eq(&self, other: &Entity<$kind, T>) -> bool {
                self == other.identifier.raw()
            }
        }

        impl<T> Borrow<$kind> for Entity<$kind, T> {
            fn borrow(&self) -> &$kind {
                &self.identifier
            }
        }

        impl<T> Borrow<$raw> for Entity<$kind, T> {
            fn borrow(&self) -> &$raw {
                self.identifier.raw()
            }
        }
    };
}

impl_raw_identity!(UuidId, Uuid, Uuid);
impl_raw_identity!(StringId, String, String);
impl_raw_identity!(IntId, i64, Int);
impl_raw_identity!(BytesId, Vec<u8>, Bytes);

impl<T> Borrow<str> for Entity<StringId, T> {
    fn borrow(&self) -> &str {
        self.identifier.raw()
    }
}

impl<T> PartialEq<str> for Entity<StringId, T> {
    fn eq(&self, other: &str) -> bool {
        self.identifier.raw() == other
    }
}

impl<T> PartialEq<&str> for Entity<StringId, T> {
    fn eq(&self, other: &&str) -> bool {
        self.identifier.raw() == *other
    }
}

impl<T> PartialEq<Entity<StringId, T>> for str {
    fn eq(&self, other: &Entity<StringId, T>) -> bool {
        self == other.identifier.raw()
    }
}

impl<T> PartialEq<Entity<StringId, T>> for &str {
    fn eq(&self, other: &Entity<StringId, T>) -> bool {
        *self == other.identifier.raw()
    }
}

impl<T> Borrow<[u8]> for Entity<BytesId, T> {
    fn borrow(&self) -> &[u8] {
        self.identifier.raw()
    }
}

impl<T> PartialEq<[u8]> for Entity<BytesId, T> {
    fn eq(&self, other: &[u8]) -> bool {
        self.identifier.raw().as_slice() == other
    }
}

impl<T> PartialEq<&[u8]> for Entity<BytesId, T> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.identifier.raw().as_slice() == *other
    }
}

impl<T> PartialEq<Entity<BytesId, T>> for [u8] {
    fn eq(&self, other: &Entity<BytesId, T>) -> bool {
        self == other.identifier.raw().as_slice()
    }
}

/// An attribute type bound to one declared entity class.
///
/// ```ignore
/// static CLIENTS: LazyLock<EntityDescriptor<UuidId>> = LazyLock::new(|| {
///     EntityDescriptor::declare("Client").build().expect("valid declaration")
/// });
///
/// impl EntityClass for Client {
///     type Kind = UuidId;
///
///     fn descriptor() -> &'static EntityDescriptor<UuidId> {
///         &CLIENTS
///     }
/// }
///
/// let client = Client { name: "Ada".into() }.into_entity();
/// ```
pub trait EntityClass: Sized {
    type Kind: IdentifierKind;

    fn descriptor() -> &'static EntityDescriptor<Self::Kind>;

    fn into_entity(self) -> Entity<Self::Kind, Self> {
        Self::descriptor().instantiate(self)
    }
}
