//! Loosely typed entity declarations (configuration files, JSON payloads).
//!
//! Options are kept as raw JSON values so that a wrongly typed option is
//! reported as a declaration error naming the option, instead of a generic
//! parse failure.
//!
//! ```toml
//! [entities.Client]
//! identifier_kind = "uuid"
//!
//! [entities.Settings]
//! identifier_kind = "int"
//! with_fixed_id = 1
//! pure_entity = true
//!
//! [entities.Case]
//! identifier_kind = "uuid"
//! event_bus = "in_memory"
//! propagate_events = true
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use stratix_core::IdentifierKind;

use crate::descriptor::{AnyEntityDescriptor, EntityDescriptor};
use crate::error::DeclarationError;
use crate::registry::EventBusRegistry;

/// The option bag of one entity class declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_kind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_fixed_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_bus: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagate_events: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pure_entity: Option<Value>,
}

impl DeclarationOptions {
    pub fn from_json_str(s: &str) -> Result<Self, DeclarationError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, DeclarationError> {
        Ok(toml::from_str(s)?)
    }
}

/// A set of named entity declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityManifest {
    #[serde(default)]
    pub entities: BTreeMap<String, DeclarationOptions>,
}

impl EntityManifest {
    pub fn from_json_str(s: &str) -> Result<Self, DeclarationError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, DeclarationError> {
        Ok(toml::from_str(s)?)
    }

    pub fn get(&self, name: &str) -> Option<&DeclarationOptions> {
        self.entities.get(name)
    }

    /// Declare one entity class of a statically known identifier kind.
    pub fn declare<K: IdentifierKind>(
        &self,
        name: &str,
        registry: &EventBusRegistry,
    ) -> Result<EntityDescriptor<K>, DeclarationError> {
        let options = self
            .get(name)
            .ok_or_else(|| DeclarationError::UndeclaredEntity(name.to_string()))?;
        EntityDescriptor::from_options(name, options, registry)
    }

    /// Declare every entity class in the manifest; the first failure aborts.
    pub fn declare_all(
        &self,
        registry: &EventBusRegistry,
    ) -> Result<BTreeMap<String, AnyEntityDescriptor>, DeclarationError> {
        self.entities
            .iter()
            .map(|(name, options)| {
                AnyEntityDescriptor::declare(name.as_str(), options, registry)
                    .map(|descriptor| (name.clone(), descriptor))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratix_core::{IdentifierKindTag, IntId, UuidId};

    const MANIFEST: &str = r#"
        [entities.Client]
        identifier_kind = "uuid"

        [entities.Settings]
        identifier_kind = "int"
        with_fixed_id = 1
        pure_entity = true

        [entities.Case]
        identifier_kind = "uuid"
        event_bus = "in_memory"
        propagate_events = true
    "#;

    #[test]
    fn json_options_keep_raw_values() {
        let options = DeclarationOptions::from_json_str(
            r#"{"identifier_kind": "int", "with_fixed_id": 123, "propagate_events": "yes", "event_bus": null}"#,
        )
        .unwrap();
        assert_eq!(options.identifier_kind, Some(json!("int")));
        assert_eq!(options.with_fixed_id, Some(json!(123)));
        assert_eq!(options.propagate_events, Some(json!("yes")));
        assert_eq!(options.event_bus, None);
        assert_eq!(options.pure_entity, None);
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = DeclarationOptions::from_json_str(r#"{"fixed": 1}"#).unwrap_err();
        assert!(matches!(err, DeclarationError::Json(_)));

        let err = DeclarationOptions::from_toml_str("fixed = 1").unwrap_err();
        assert!(matches!(err, DeclarationError::Toml(_)));
    }

    #[test]
    fn toml_manifest_declares_every_entity() {
        let manifest = EntityManifest::from_toml_str(MANIFEST).unwrap();
        let registry = EventBusRegistry::default();
        let declared = manifest.declare_all(&registry).unwrap();

        assert_eq!(declared.len(), 3);
        assert_eq!(declared["Client"].kind(), IdentifierKindTag::Uuid);
        assert!(declared["Client"].event_bus().is_some());
        assert!(declared["Settings"].is_pure());
        assert!(declared["Settings"].event_bus().is_none());
        assert!(declared["Case"].propagates_events());
    }

    #[test]
    fn typed_declaration_from_manifest() {
        let manifest = EntityManifest::from_toml_str(MANIFEST).unwrap();
        let registry = EventBusRegistry::default();

        let settings = manifest.declare::<IntId>("Settings", &registry).unwrap();
        assert_eq!(settings.fixed_id(), Some(&1));
        assert_eq!(settings.instantiate(()), 1_i64);

        let err = manifest.declare::<UuidId>("Settings", &registry).unwrap_err();
        assert!(matches!(err, DeclarationError::UnsupportedIdentifierKind { .. }));

        let err = manifest.declare::<UuidId>("Invoice", &registry).unwrap_err();
        assert!(matches!(err, DeclarationError::UndeclaredEntity(ref name) if name == "Invoice"));
    }

    #[test]
    fn json_manifest_round_trips_through_serde() {
        let manifest = EntityManifest::from_toml_str(MANIFEST).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        assert_eq!(EntityManifest::from_json_str(&json).unwrap(), manifest);
    }

    #[test]
    fn declare_all_stops_at_the_first_invalid_entity() {
        let manifest = EntityManifest::from_json_str(
            r#"{"entities": {"Broken": {"identifier_kind": "float"}, "Client": {"identifier_kind": "uuid"}}}"#,
        )
        .unwrap();
        let err = manifest.declare_all(&EventBusRegistry::default()).unwrap_err();
        assert!(matches!(err, DeclarationError::UnsupportedIdentifierKind { ref entity, .. } if entity == "Broken"));
    }
}
