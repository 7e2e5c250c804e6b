//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

use crate::error::DomainResult;

/// Marker trait for value objects.
///
/// Value objects are domain objects that are **immutable** and **compared by value**.
/// They represent concepts where identity doesn't matter - only the values matter.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: No identity (two value objects with same values are equal)
/// - **Entity**: Has identity (two entities with same identifier are the same entity)
///
/// ## Immutability
///
/// Expose fields read-only (private fields + accessors, or a type that is only
/// ever handed out by shared reference). To "modify" a value object, build a
/// new one, e.g. with struct update syntax.
///
/// ## Validation
///
/// Override [`ValueObject::validate`] to enforce attribute rules and construct
/// through [`ValueObject::validated`] so invalid values never escape.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct PostalCode(String);
///
/// impl ValueObject for PostalCode {
///     fn validate(&self) -> DomainResult<()> {
///         if self.0.trim().is_empty() {
///             return Err(DomainError::validation("postal code cannot be empty"));
///         }
///         Ok(())
///     }
/// }
///
/// let code = PostalCode("62701".into()).validated()?;
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {
    /// Check attribute rules. Accepts everything by default.
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }

    /// Return `self` if it passes [`ValueObject::validate`].
    fn validated(self) -> DomainResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Address {
        street: String,
        city: String,
        postal_code: String,
    }

    impl ValueObject for Address {
        fn validate(&self) -> DomainResult<()> {
            if self.postal_code.trim().is_empty() {
                return Err(DomainError::validation("postal code cannot be empty"));
            }
            Ok(())
        }
    }

    fn springfield() -> Address {
        Address {
            street: "123 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "62701".to_string(),
        }
    }

    #[test]
    fn equal_attributes_mean_equal_values() {
        assert_eq!(springfield(), springfield().clone());
    }

    #[test]
    fn changed_copy_is_a_different_value() {
        let original = springfield();
        let moved = Address {
            street: "456 Elm St".to_string(),
            ..original.clone()
        };
        assert_ne!(original, moved);
        assert_eq!(moved.city, "Springfield");
    }

    #[test]
    fn validated_rejects_invalid_values() {
        assert!(springfield().validated().is_ok());
        let err = Address {
            postal_code: " ".to_string(),
            ..springfield()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
