//! Entity class declaration.
//!
//! Declaring a class validates its configuration once and yields an
//! [`EntityDescriptor`]. The descriptor is the class: it is the only way to
//! create [`Entity`] instances, and every instance shares its configuration
//! (fixed identity, event bus, propagation policy).
//!
//! Validation order:
//!
//! 1. identifier kind (loosely typed declarations only)
//! 2. fixed identifier value type (loosely typed declarations only)
//! 3. event bus kind (loosely typed declarations only)
//! 4. `propagate_events` requires a bound event bus
//! 5. `pure_entity` forbids any event bus or propagation
//! 6. a non-pure class without a bus gets a default [`InMemoryEventBus`]

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use stratix_core::{BytesId, IdentifierKind, IdentifierKindTag, IntId, StringId, UuidId};
use stratix_events::{EventBus, InMemoryEventBus, SharedEventBus};

use crate::entity::Entity;
use crate::error::DeclarationError;
use crate::options::DeclarationOptions;
use crate::registry::EventBusRegistry;

/// Class-level configuration shared by every instance of a class.
#[derive(Debug)]
pub(crate) struct ClassConfig {
    pub(crate) name: String,
    pub(crate) event_bus: Option<SharedEventBus>,
    pub(crate) propagate_events: bool,
    pub(crate) pure: bool,
}

/// A validated entity class over identifier kind `K`.
///
/// Cloning a descriptor is cheap and keeps sharing the same event bus.
#[derive(Debug, Clone)]
pub struct EntityDescriptor<K: IdentifierKind> {
    fixed_id: Option<K>,
    class: Arc<ClassConfig>,
}

impl<K: IdentifierKind> EntityDescriptor<K> {
    /// Start declaring a class named `name`.
    pub fn declare(name: impl Into<String>) -> EntityDeclaration<K> {
        EntityDeclaration {
            name: name.into(),
            fixed_id: None,
            event_bus: None,
            propagate_events: false,
            pure_entity: false,
        }
    }

    /// Declare a class from a loosely typed option bag.
    ///
    /// Bus kinds named by the `event_bus` option are looked up in `registry`.
    pub fn from_options(
        name: impl Into<String>,
        options: &DeclarationOptions,
        registry: &EventBusRegistry,
    ) -> Result<Self, DeclarationError> {
        let name = name.into();

        if let Some(value) = &options.identifier_kind {
            let tag = parse_kind(&name, value)?;
            if tag != K::TAG {
                return Err(DeclarationError::UnsupportedIdentifierKind {
                    entity: name,
                    found: format!("`{tag}` (class is declared over `{}`)", K::TAG),
                });
            }
        }

        let mut declaration = Self::declare(name.clone());

        if let Some(value) = &options.with_fixed_id {
            let raw = K::parse_json(value).ok_or_else(|| {
                DeclarationError::UnsupportedIdentifierValue {
                    entity: name.clone(),
                    kind: K::TAG,
                    found: value.to_string(),
                }
            })?;
            declaration = declaration.with_fixed_id(raw);
        }

        if let Some(value) = &options.event_bus {
            let bus = value
                .as_str()
                .and_then(|kind| registry.create(kind))
                .ok_or_else(|| DeclarationError::UnsupportedEventBusKind {
                    entity: name.clone(),
                    found: value.to_string(),
                })?;
            declaration = declaration.with_shared_event_bus(bus);
        }

        if let Some(value) = &options.propagate_events {
            declaration = declaration.propagate_events(parse_flag(&name, "propagate_events", value)?);
        }

        if let Some(value) = &options.pure_entity {
            declaration = declaration.pure_entity(parse_flag(&name, "pure_entity", value)?);
        }

        declaration.build()
    }

    pub fn name(&self) -> &str {
        &self.class.name
    }

    pub fn kind(&self) -> IdentifierKindTag {
        K::TAG
    }

    /// The identity every instance receives, if the class pins one.
    pub fn fixed_id(&self) -> Option<&K::Raw> {
        self.fixed_id.as_ref().map(|id| id.raw())
    }

    pub fn event_bus(&self) -> Option<&SharedEventBus> {
        self.class.event_bus.as_ref()
    }

    pub fn propagates_events(&self) -> bool {
        self.class.propagate_events
    }

    pub fn is_pure(&self) -> bool {
        self.class.pure
    }

    /// Create an instance with the given attributes.
    ///
    /// The identity is the class's fixed identifier, or a freshly generated one.
    pub fn instantiate<T>(&self, attributes: T) -> Entity<K, T> {
        Entity::new(self.new_identifier(), Arc::clone(&self.class), attributes)
    }

    /// Create an instance whose attributes may fail to build.
    ///
    /// The identity is assigned before `build` runs and is handed to it.
    pub fn try_instantiate<T, E, F>(&self, build: F) -> Result<Entity<K, T>, E>
    where
        F: FnOnce(&K::Raw) -> Result<T, E>,
    {
        let identifier = self.new_identifier();
        let attributes = build(identifier.raw())?;
        Ok(Entity::new(identifier, Arc::clone(&self.class), attributes))
    }

    fn new_identifier(&self) -> K {
        match &self.fixed_id {
            Some(id) => id.clone(),
            None => K::generate(),
        }
    }
}

/// Builder for a statically typed class declaration.
#[derive(Debug)]
pub struct EntityDeclaration<K: IdentifierKind> {
    name: String,
    fixed_id: Option<K::Raw>,
    event_bus: Option<SharedEventBus>,
    propagate_events: bool,
    pure_entity: bool,
}

impl<K: IdentifierKind> EntityDeclaration<K> {
    /// Pin every instance to this identity.
    pub fn with_fixed_id(mut self, raw: impl Into<K::Raw>) -> Self {
        self.fixed_id = Some(raw.into());
        self
    }

    /// Bind a bus type; one instance is created for the whole class.
    pub fn with_event_bus<B>(mut self) -> Self
    where
        B: EventBus + Default + 'static,
    {
        self.event_bus = Some(Arc::new(B::default()));
        self
    }

    /// Bind an existing bus, possibly shared with other classes.
    pub fn with_shared_event_bus(mut self, bus: SharedEventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn propagate_events(mut self, propagate: bool) -> Self {
        self.propagate_events = propagate;
        self
    }

    pub fn pure_entity(mut self, pure: bool) -> Self {
        self.pure_entity = pure;
        self
    }

    pub fn build(self) -> Result<EntityDescriptor<K>, DeclarationError> {
        let EntityDeclaration {
            name,
            fixed_id,
            mut event_bus,
            propagate_events,
            pure_entity,
        } = self;

        if propagate_events && event_bus.is_none() {
            return Err(DeclarationError::EventBusRequired { entity: name });
        }
        if pure_entity && (event_bus.is_some() || propagate_events) {
            return Err(DeclarationError::EventBusConflict { entity: name });
        }
        if !pure_entity && event_bus.is_none() {
            event_bus = Some(Arc::new(InMemoryEventBus::new()));
        }

        debug!(
            entity = %name,
            kind = %K::TAG,
            fixed_id = ?fixed_id,
            propagate_events,
            pure_entity,
            "entity class declared"
        );

        Ok(EntityDescriptor {
            fixed_id: fixed_id.map(K::from_raw),
            class: Arc::new(ClassConfig {
                name,
                event_bus,
                propagate_events,
                pure: pure_entity,
            }),
        })
    }
}

/// A declared class whose identifier kind is only known at runtime.
#[derive(Debug, Clone)]
pub enum AnyEntityDescriptor {
    Uuid(EntityDescriptor<UuidId>),
    String(EntityDescriptor<StringId>),
    Int(EntityDescriptor<IntId>),
    Bytes(EntityDescriptor<BytesId>),
}

macro_rules! dispatch {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            AnyEntityDescriptor::Uuid($d) => $body,
            AnyEntityDescriptor::String($d) => $body,
            AnyEntityDescriptor::Int($d) => $body,
            AnyEntityDescriptor::Bytes($d) => $body,
        }
    };
}

impl AnyEntityDescriptor {
    /// Declare a class whose kind comes from the `identifier_kind` option.
    pub fn declare(
        name: impl Into<String>,
        options: &DeclarationOptions,
        registry: &EventBusRegistry,
    ) -> Result<Self, DeclarationError> {
        let name = name.into();
        let value = options.identifier_kind.as_ref().ok_or_else(|| {
            DeclarationError::UnsupportedIdentifierKind {
                entity: name.clone(),
                found: "(missing)".to_string(),
            }
        })?;
        Ok(match parse_kind(&name, value)? {
            IdentifierKindTag::Uuid => Self::Uuid(EntityDescriptor::from_options(name, options, registry)?),
            IdentifierKindTag::String => Self::String(EntityDescriptor::from_options(name, options, registry)?),
            IdentifierKindTag::Int => Self::Int(EntityDescriptor::from_options(name, options, registry)?),
            IdentifierKindTag::Bytes => Self::Bytes(EntityDescriptor::from_options(name, options, registry)?),
        })
    }

    pub fn name(&self) -> &str {
        dispatch!(self, d => d.name())
    }

    pub fn kind(&self) -> IdentifierKindTag {
        dispatch!(self, d => d.kind())
    }

    pub fn event_bus(&self) -> Option<&SharedEventBus> {
        dispatch!(self, d => d.event_bus())
    }

    pub fn propagates_events(&self) -> bool {
        dispatch!(self, d => d.propagates_events())
    }

    pub fn is_pure(&self) -> bool {
        dispatch!(self, d => d.is_pure())
    }

    /// Recover the statically typed descriptor, if `K` is this class's kind.
    pub fn downcast<K: IdentifierKind>(self) -> Option<EntityDescriptor<K>> {
        let boxed: Box<dyn Any> = dispatch!(self, d => Box::new(d));
        boxed.downcast::<EntityDescriptor<K>>().ok().map(|d| *d)
    }
}

fn parse_kind(entity: &str, value: &Value) -> Result<IdentifierKindTag, DeclarationError> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DeclarationError::UnsupportedIdentifierKind {
            entity: entity.to_string(),
            found: value.to_string(),
        })
}

fn parse_flag(entity: &str, flag: &'static str, value: &Value) -> Result<bool, DeclarationError> {
    value.as_bool().ok_or_else(|| DeclarationError::InvalidFlagType {
        entity: entity.to_string(),
        flag,
        found: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratix_events::{BroadcastPublisher, EventBus};
    use uuid::Uuid;

    fn options(value: Value) -> DeclarationOptions {
        serde_json::from_value(value).unwrap()
    }

    fn registry() -> EventBusRegistry {
        EventBusRegistry::default()
    }

    #[test]
    fn plain_declaration_gets_a_default_bus() {
        let client = EntityDescriptor::<UuidId>::declare("Client").build().unwrap();
        assert_eq!(client.name(), "Client");
        assert_eq!(client.kind(), IdentifierKindTag::Uuid);
        assert!(client.event_bus().is_some());
        assert!(client.fixed_id().is_none());
        assert!(!client.propagates_events());
        assert!(!client.is_pure());
    }

    #[test]
    fn explicit_non_pure_declaration_also_gets_a_default_bus() {
        let client = EntityDescriptor::<IntId>::declare("Client")
            .pure_entity(false)
            .build()
            .unwrap();
        assert!(client.event_bus().is_some());
    }

    #[test]
    fn pure_declaration_has_no_bus() {
        let settings = EntityDescriptor::<IntId>::declare("Settings")
            .pure_entity(true)
            .build()
            .unwrap();
        assert!(settings.is_pure());
        assert!(settings.event_bus().is_none());
    }

    #[test]
    fn propagation_without_a_bus_is_rejected() {
        let err = EntityDescriptor::<UuidId>::declare("Case")
            .propagate_events(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::EventBusRequired { ref entity } if entity == "Case"));
    }

    #[test]
    fn pure_with_bus_is_rejected() {
        let err = EntityDescriptor::<UuidId>::declare("Case")
            .with_event_bus::<InMemoryEventBus>()
            .pure_entity(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::EventBusConflict { .. }));
    }

    #[test]
    fn pure_with_bus_and_propagation_is_rejected() {
        let err = EntityDescriptor::<UuidId>::declare("Case")
            .with_event_bus::<InMemoryEventBus>()
            .propagate_events(true)
            .pure_entity(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::EventBusConflict { .. }));
    }

    #[test]
    fn pure_with_propagation_alone_fails_on_the_missing_bus_first() {
        let err = EntityDescriptor::<UuidId>::declare("Case")
            .propagate_events(true)
            .pure_entity(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::EventBusRequired { .. }));
    }

    #[test]
    fn bound_bus_is_shared_by_every_instance() {
        let case = EntityDescriptor::<UuidId>::declare("Case")
            .with_event_bus::<InMemoryEventBus<BroadcastPublisher>>()
            .propagate_events(true)
            .build()
            .unwrap();
        let a = case.instantiate(());
        let b = case.instantiate(());
        let bus_a = a.event_bus().unwrap();
        let bus_b = b.event_bus().unwrap();
        assert!(Arc::ptr_eq(bus_a, bus_b));
        assert!(Arc::ptr_eq(bus_a, case.event_bus().unwrap()));
    }

    #[test]
    fn fixed_identity_applies_to_every_instance() {
        let id = Uuid::new_v4();
        let singleton = EntityDescriptor::<UuidId>::declare("Singleton")
            .with_fixed_id(id)
            .build()
            .unwrap();
        assert_eq!(singleton.fixed_id(), Some(&id));
        assert_eq!(singleton.instantiate(()).identity(), &id);
        assert_eq!(singleton.instantiate(()).identity(), &id);
    }

    #[test]
    fn try_instantiate_assigns_identity_before_attributes() {
        let client = EntityDescriptor::<StringId>::declare("Client").build().unwrap();
        let entity = client
            .try_instantiate(|identity| Ok::<_, String>(format!("built for {identity}")))
            .unwrap();
        assert_eq!(*entity, format!("built for {}", entity.identity()));

        let mut seen = None;
        let err = client
            .try_instantiate::<(), _, _>(|identity| {
                seen = Some(identity.clone());
                Err("attributes rejected")
            })
            .unwrap_err();
        assert_eq!(err, "attributes rejected");
        assert!(seen.is_some());
    }

    #[test]
    fn options_reject_unknown_identifier_kind() {
        for kind in [json!("float"), json!(5), json!(["uuid"])] {
            let err = EntityDescriptor::<UuidId>::from_options(
                "Client",
                &options(json!({ "identifier_kind": kind })),
                &registry(),
            )
            .unwrap_err();
            assert!(matches!(err, DeclarationError::UnsupportedIdentifierKind { .. }));
        }
    }

    #[test]
    fn options_reject_kind_that_differs_from_the_class() {
        let err = EntityDescriptor::<UuidId>::from_options(
            "Client",
            &options(json!({ "identifier_kind": "int" })),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::UnsupportedIdentifierKind { .. }));
    }

    #[test]
    fn options_type_check_fixed_id() {
        let err = EntityDescriptor::<IntId>::from_options(
            "Settings",
            &options(json!({ "with_fixed_id": "123" })),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::UnsupportedIdentifierValue { kind: IdentifierKindTag::Int, .. }
        ));

        let err = EntityDescriptor::<UuidId>::from_options(
            "Settings",
            &options(json!({ "with_fixed_id": "not-a-uuid" })),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::UnsupportedIdentifierValue { .. }));

        let ok = EntityDescriptor::<BytesId>::from_options(
            "Settings",
            &options(json!({ "with_fixed_id": [1, 2, 3] })),
            &registry(),
        )
        .unwrap();
        assert_eq!(ok.fixed_id(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn options_reject_unknown_event_bus_kinds() {
        for bus in [json!("kafka"), json!(true), json!({ "kind": "in_memory" })] {
            let err = EntityDescriptor::<UuidId>::from_options(
                "Case",
                &options(json!({ "event_bus": bus })),
                &registry(),
            )
            .unwrap_err();
            assert!(matches!(err, DeclarationError::UnsupportedEventBusKind { .. }));
        }
    }

    #[test]
    fn options_reject_non_boolean_flags() {
        let err = EntityDescriptor::<UuidId>::from_options(
            "Case",
            &options(json!({ "event_bus": "in_memory", "propagate_events": "yes" })),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::InvalidFlagType { flag: "propagate_events", .. }
        ));

        let err = EntityDescriptor::<UuidId>::from_options(
            "Case",
            &options(json!({ "pure_entity": 1 })),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::InvalidFlagType { flag: "pure_entity", .. }));
    }

    #[test]
    fn options_apply_the_same_interaction_rules() {
        let err = EntityDescriptor::<UuidId>::from_options(
            "Case",
            &options(json!({ "propagate_events": true })),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::EventBusRequired { .. }));

        let err = EntityDescriptor::<UuidId>::from_options(
            "Case",
            &options(json!({ "event_bus": "in_memory", "pure_entity": true })),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::EventBusConflict { .. }));

        let case = EntityDescriptor::<UuidId>::from_options(
            "Case",
            &options(json!({ "event_bus": "in_memory", "propagate_events": true })),
            &registry(),
        )
        .unwrap();
        assert!(case.propagates_events());
        assert!(case.event_bus().unwrap().is_empty());
    }

    #[test]
    fn any_descriptor_dispatches_on_declared_kind() {
        let any = AnyEntityDescriptor::declare(
            "Order",
            &options(json!({ "identifier_kind": "bytes" })),
            &registry(),
        )
        .unwrap();
        assert_eq!(any.kind(), IdentifierKindTag::Bytes);
        assert_eq!(any.name(), "Order");
        assert!(any.clone().downcast::<UuidId>().is_none());
        let typed = any.downcast::<BytesId>().unwrap();
        assert_eq!(typed.instantiate(()).identity().len(), 16);
    }

    #[test]
    fn any_descriptor_requires_a_kind() {
        let err = AnyEntityDescriptor::declare("Order", &DeclarationOptions::default(), &registry())
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnsupportedIdentifierKind { .. }));
    }
}
