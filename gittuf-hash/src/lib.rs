//! Typed Git object identifiers.
//!
//! [`ObjectId`] wraps the hex encoding Git uses for content addresses and is
//! agnostic over the two hash algorithms Git object databases are built
//! with: SHA-1 (40 hex chars) and SHA-256 (64 hex chars). Construction
//! validates both the character set and the length; nothing downstream needs
//! to re-validate an `ObjectId` once it exists.

use std::{
    cmp::Ordering,
    fmt::{self, Display},
    str::FromStr,
};

use thiserror::Error;

/// The canonical all-zero SHA-1 id, used by Git to denote "no object" (e.g.
/// the old side of a ref creation, or the absent parent of a root commit).
pub const ZERO_SHA1: &str = "0000000000000000000000000000000000000000";

const SHA1_LEN: usize = 40;
const SHA256_LEN: usize = 64;

#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("object id is not valid hex: {0}")]
    InvalidEncoding(String),

    #[error("object id has invalid length {0} (expected 40 or 64 hex characters)")]
    InvalidLength(usize),
}

/// A validated, content-addressed Git object identifier.
///
/// `ObjectId` is immutable and freely `Copy`-able in spirit (it is cheap to
/// `Clone`); equality is plain string equality of the lower-cased hex form.
/// It is totally ordered by that hex representation, which downstream
/// callers rely on for deterministic sorting (see `getCommitsBetweenRange`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse a hex string into a validated `ObjectId`.
    pub fn from_hex(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidEncoding(s.to_string()));
        }
        match s.len() {
            SHA1_LEN | SHA256_LEN => Ok(Self(s.to_ascii_lowercase())),
            other => Err(Error::InvalidLength(other)),
        }
    }

    /// The canonical SHA-1 zero value (`0000...0000`, 40 chars).
    pub fn zero() -> Self {
        Self(ZERO_SHA1.to_string())
    }

    /// Whether this id is the all-zero value for its length.
    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// `true` if this id was constructed from a 64-character (SHA-256) hex
    /// string.
    pub fn is_sha256(&self) -> bool {
        self.0.len() == SHA256_LEN
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::ObjectId;
    use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for ObjectId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> Deserialize<'de> for ObjectId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct ObjectIdVisitor;

            impl Visitor<'_> for ObjectIdVisitor {
                type Value = ObjectId;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "a hexadecimal git object id")
                }

                fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    s.parse().map_err(serde::de::Error::custom)
                }
            }

            deserializer.deserialize_str(ObjectIdVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_zero() {
        assert!(ObjectId::zero().is_zero());
        assert_eq!(ObjectId::zero().as_str(), ZERO_SHA1);
    }

    #[test]
    fn rejects_bad_length() {
        assert_eq!(
            ObjectId::from_hex("abcd").unwrap_err(),
            Error::InvalidLength(4)
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(matches!(
            ObjectId::from_hex("z".repeat(40)),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn accepts_sha256_length() {
        let id = ObjectId::from_hex("a".repeat(64)).unwrap();
        assert!(id.is_sha256());
    }

    #[test]
    fn lowercases_and_orders_by_hex() {
        let a = ObjectId::from_hex("A".repeat(40)).unwrap();
        let b = ObjectId::from_hex("b".repeat(40)).unwrap();
        assert!(a < b);
        assert_eq!(a.as_str(), "a".repeat(40));
    }
}
