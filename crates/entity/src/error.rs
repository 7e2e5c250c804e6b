//! Entity declaration and instance errors.

use core::fmt;

use thiserror::Error;

use stratix_core::IdentifierKindTag;
use stratix_events::{EventBusError, EventError};

/// A class declaration was rejected. The class never becomes instantiable.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("entity `{entity}`: unsupported identifier kind {found}")]
    UnsupportedIdentifierKind { entity: String, found: String },

    #[error("entity `{entity}`: fixed identifier {found} is not a valid `{kind}` value")]
    UnsupportedIdentifierValue {
        entity: String,
        kind: IdentifierKindTag,
        found: String,
    },

    #[error("entity `{entity}`: unsupported event bus kind {found}")]
    UnsupportedEventBusKind { entity: String, found: String },

    #[error("entity `{entity}`: option `{flag}` must be a boolean, got {found}")]
    InvalidFlagType {
        entity: String,
        flag: &'static str,
        found: String,
    },

    #[error("entity `{entity}`: propagate_events requires an event bus")]
    EventBusRequired { entity: String },

    #[error("entity `{entity}`: a pure entity cannot have an event bus or propagate events")]
    EventBusConflict { entity: String },

    #[error("entity `{0}` is not declared")]
    UndeclaredEntity(String),

    #[error("invalid JSON declaration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML declaration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Which identity mutation was attempted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IdentityMutation {
    Replace,
    Remove,
}

impl fmt::Display for IdentityMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityMutation::Replace => f.write_str("change"),
            IdentityMutation::Remove => f.write_str("delete"),
        }
    }
}

/// Failure of an operation on an entity instance.
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("cannot {attempt} the identity of entity `{entity}`")]
    IdentityImmutable {
        entity: String,
        attempt: IdentityMutation,
    },

    #[error("entity `{entity}` is pure and cannot record events")]
    EventingDisabled { entity: String },

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    EventBus(#[from] EventBusError),
}
