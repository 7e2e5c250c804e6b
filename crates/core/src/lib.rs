//! `stratix-core` — domain modeling building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifier kinds, value objects and specifications.

pub mod error;
pub mod id;
pub mod specification;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{AnyIdentifier, BytesId, IdentifierKind, IdentifierKindTag, IntId, StringId, UuidId};
pub use specification::Specification;
pub use value_object::ValueObject;
