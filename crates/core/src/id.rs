//! Identifier kinds that back entity identity.
//!
//! Every kind is a transparent wrapper around one raw value. Equality and
//! hashing are delegated to that raw value, so an identifier and its raw value
//! are interchangeable as keys in hash-based collections.

use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DomainError;

/// Smallest digit count of a generated [`IntId`].
pub const INT_ID_MIN_DIGITS: u32 = 5;
/// Largest digit count of a generated [`IntId`].
pub const INT_ID_MAX_DIGITS: u32 = 10;

mod sealed {
    pub trait Sealed {}
}

/// Names the four supported identifier kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKindTag {
    Uuid,
    String,
    Int,
    Bytes,
}

impl IdentifierKindTag {
    pub const ALL: [IdentifierKindTag; 4] = [
        IdentifierKindTag::Uuid,
        IdentifierKindTag::String,
        IdentifierKindTag::Int,
        IdentifierKindTag::Bytes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierKindTag::Uuid => "uuid",
            IdentifierKindTag::String => "string",
            IdentifierKindTag::Int => "int",
            IdentifierKindTag::Bytes => "bytes",
        }
    }
}

impl fmt::Display for IdentifierKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierKindTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(IdentifierKindTag::Uuid),
            "string" | "str" => Ok(IdentifierKindTag::String),
            "int" | "integer" => Ok(IdentifierKindTag::Int),
            "bytes" => Ok(IdentifierKindTag::Bytes),
            other => Err(DomainError::invalid_id(format!(
                "unsupported identifier kind `{other}`"
            ))),
        }
    }
}

/// An identifier kind: a value wrapper around exactly one raw value.
///
/// Sealed: implemented by [`UuidId`], [`StringId`], [`IntId`] and [`BytesId`] only.
///
/// Implementations guarantee that `Hash` writes exactly what `Self::Raw`'s
/// `Hash` writes and that each kind implements `Borrow<Self::Raw>`, so lookups
/// by raw value in hashed collections are sound.
pub trait IdentifierKind:
    Clone
    + Eq
    + Hash
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + sealed::Sealed
{
    /// The wrapped primitive.
    type Raw: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    const TAG: IdentifierKindTag;

    /// Generate a fresh random identifier.
    fn generate() -> Self;

    /// Wrap an externally chosen raw value verbatim.
    fn from_raw(raw: Self::Raw) -> Self;

    fn raw(&self) -> &Self::Raw;

    fn into_raw(self) -> Self::Raw;

    /// Read a raw value out of a loosely typed configuration value.
    ///
    /// Returns `None` when the JSON value does not have this kind's raw type.
    fn parse_json(value: &Value) -> Option<Self::Raw>;

    fn to_any(&self) -> AnyIdentifier;
}

macro_rules! impl_identifier_common {
    ($t:ident, $raw:ty, $variant:ident) => {
        impl $t {
            /// Generate a fresh identifier.
            pub fn new() -> Self {
                <Self as IdentifierKind>::generate()
            }
        }

        impl sealed::Sealed for $t {}

        impl From<$raw> for $t {
            fn from(value: $raw) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $raw {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl From<$t> for AnyIdentifier {
            fn from(value: $t) -> Self {
                AnyIdentifier::$variant(value)
            }
        }

        impl Borrow<$raw> for $t {
            fn borrow(&self) -> &$raw {
                &self.0
            }
        }

        impl PartialEq<$raw> for $t {
            fn eq(&self, other: &$raw) -> bool {
                &self.0 == other
            }
        }

        impl PartialEq<$t> for $raw {
            fn eq(&self, other: &$t) -> bool {
                self == &other.0
            }
        }
    };
}

/// UUID-backed identifier (random v4 when generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UuidId(Uuid);

/// String-backed identifier (a rendered random UUID when generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringId(String);

/// Integer-backed identifier.
///
/// Generated values have a uniformly chosen digit count between
/// [`INT_ID_MIN_DIGITS`] and [`INT_ID_MAX_DIGITS`], then a uniformly chosen
/// value with exactly that many digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntId(i64);

/// Byte-sequence-backed identifier (the 16 bytes of a random UUID when generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BytesId(Vec<u8>);

impl_identifier_common!(UuidId, Uuid, Uuid);
impl_identifier_common!(StringId, String, String);
impl_identifier_common!(IntId, i64, Int);
impl_identifier_common!(BytesId, Vec<u8>, Bytes);

impl IdentifierKind for UuidId {
    type Raw = Uuid;

    const TAG: IdentifierKindTag = IdentifierKindTag::Uuid;

    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    fn from_raw(raw: Uuid) -> Self {
        Self(raw)
    }

    fn raw(&self) -> &Uuid {
        &self.0
    }

    fn into_raw(self) -> Uuid {
        self.0
    }

    fn parse_json(value: &Value) -> Option<Uuid> {
        value.as_str().and_then(|s| Uuid::parse_str(s).ok())
    }

    fn to_any(&self) -> AnyIdentifier {
        AnyIdentifier::Uuid(self.clone())
    }
}

impl IdentifierKind for StringId {
    type Raw = String;

    const TAG: IdentifierKindTag = IdentifierKindTag::String;

    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    fn raw(&self) -> &String {
        &self.0
    }

    fn into_raw(self) -> String {
        self.0
    }

    fn parse_json(value: &Value) -> Option<String> {
        value.as_str().map(str::to_owned)
    }

    fn to_any(&self) -> AnyIdentifier {
        AnyIdentifier::String(self.clone())
    }
}

impl IdentifierKind for IntId {
    type Raw = i64;

    const TAG: IdentifierKindTag = IdentifierKindTag::Int;

    fn generate() -> Self {
        let digits: u32 = rand::random_range(INT_ID_MIN_DIGITS..=INT_ID_MAX_DIGITS);
        let low = 10_i64.pow(digits - 1);
        let high = 10_i64.pow(digits) - 1;
        Self(rand::random_range(low..=high))
    }

    fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    fn raw(&self) -> &i64 {
        &self.0
    }

    fn into_raw(self) -> i64 {
        self.0
    }

    fn parse_json(value: &Value) -> Option<i64> {
        value.as_i64()
    }

    fn to_any(&self) -> AnyIdentifier {
        AnyIdentifier::Int(self.clone())
    }
}

impl IdentifierKind for BytesId {
    type Raw = Vec<u8>;

    const TAG: IdentifierKindTag = IdentifierKindTag::Bytes;

    fn generate() -> Self {
        Self(Uuid::new_v4().as_bytes().to_vec())
    }

    fn from_raw(raw: Vec<u8>) -> Self {
        Self(raw)
    }

    fn raw(&self) -> &Vec<u8> {
        &self.0
    }

    fn into_raw(self) -> Vec<u8> {
        self.0
    }

    fn parse_json(value: &Value) -> Option<Vec<u8>> {
        value
            .as_array()?
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect()
    }

    fn to_any(&self) -> AnyIdentifier {
        AnyIdentifier::Bytes(self.clone())
    }
}

// `str` / `[u8]` views: their `Hash` matches `String` / `Vec<u8>`.

impl Borrow<str> for StringId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StringId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StringId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for StringId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Borrow<[u8]> for BytesId {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8]> for BytesId {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl PartialEq<&[u8]> for BytesId {
    fn eq(&self, other: &&[u8]) -> bool {
        self.0 == *other
    }
}

impl From<&[u8]> for BytesId {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl fmt::Display for UuidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for IntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for BytesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for UuidId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("UuidId: {e}")))?;
        Ok(Self(uuid))
    }
}

impl FromStr for IntId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("IntId: {e}")))?;
        Ok(Self(n))
    }
}

impl FromStr for BytesId {
    type Err = DomainError;

    /// Parses the lowercase/uppercase hex rendering produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| DomainError::invalid_id(format!("BytesId: {e}")))?;
        Ok(Self(bytes))
    }
}

/// Closed sum over the four identifier kinds.
///
/// Useful when identifiers of different kinds share one collection. Two
/// `AnyIdentifier`s of different kinds are never equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AnyIdentifier {
    Uuid(UuidId),
    String(StringId),
    Int(IntId),
    Bytes(BytesId),
}

impl AnyIdentifier {
    pub fn kind(&self) -> IdentifierKindTag {
        match self {
            AnyIdentifier::Uuid(_) => IdentifierKindTag::Uuid,
            AnyIdentifier::String(_) => IdentifierKindTag::String,
            AnyIdentifier::Int(_) => IdentifierKindTag::Int,
            AnyIdentifier::Bytes(_) => IdentifierKindTag::Bytes,
        }
    }
}

impl fmt::Display for AnyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyIdentifier::Uuid(id) => fmt::Display::fmt(id, f),
            AnyIdentifier::String(id) => fmt::Display::fmt(id, f),
            AnyIdentifier::Int(id) => fmt::Display::fmt(id, f),
            AnyIdentifier::Bytes(id) => fmt::Display::fmt(id, f),
        }
    }
}
