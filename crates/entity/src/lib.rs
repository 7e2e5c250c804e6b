//! `stratix-entity` — entities with immutable identity.
//!
//! An entity class is declared once through [`EntityDescriptor::declare`] (or
//! from a loosely typed [`DeclarationOptions`] bag) and validated eagerly. The
//! resulting descriptor creates [`Entity`] instances, which all share the
//! class configuration: fixed identity, event bus and propagation policy.
//!
//! ```ignore
//! let cases = EntityDescriptor::<UuidId>::declare("Case")
//!     .with_event_bus::<InMemoryEventBus>()
//!     .propagate_events(true)
//!     .build()?;
//!
//! let case = cases.instantiate(CaseFile::default());
//! case.record(&CaseOpened { number: "0001".into() })?;
//! ```

pub mod descriptor;
pub mod entity;
pub mod error;
pub mod options;
pub mod registry;

pub use descriptor::{AnyEntityDescriptor, EntityDeclaration, EntityDescriptor};
pub use entity::{Entity, EntityClass};
pub use error::{DeclarationError, EntityError, IdentityMutation};
pub use options::{DeclarationOptions, EntityManifest};
pub use registry::{EventBusFactory, EventBusRegistry, IN_MEMORY_EVENT_BUS};

pub use stratix_core::{AnyIdentifier, BytesId, IdentifierKind, IdentifierKindTag, IntId, StringId, UuidId};
