// Copyright © 2021 The Radicle Link Contributors
// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Canonical serialisation, currently OLPC Canonical JSON.
//!
//! Signed policy metadata (root and rule-file documents) must round-trip
//! through a byte-exact encoding: keys sorted lexicographically, no
//! insignificant whitespace, and stable nesting order. [`Canonical`] is the
//! capability a document needs to produce those bytes; [`json::Value`] is
//! the concrete `serde`-free AST that guarantees it.

use std::{
    borrow::Borrow,
    cmp::Ordering,
    convert::Infallible,
    fmt::{self, Display},
    ops::Deref,
    str::FromStr,
};

pub mod json;

pub use json::Value;

/// Types which can be turned into a canonical byte representation.
///
/// Canonical bytes are suitable for hashing and signing: encoding the same
/// logical value twice, even across process restarts, yields identical
/// bytes.
pub trait Canonical {
    type Error;

    fn canonical_form(&self) -> Result<Vec<u8>, Self::Error>;
}

/// A string which is known to be valid canonical-JSON content: Unicode
/// Normalization Form C, and free of unescaped ASCII control characters.
///
/// Construction from untrusted input goes through [`Cstring::try_from_raw`],
/// which performs the normalisation. Construction from a Rust `&str`/`String`
/// literal via `From` is infallible and normalises eagerly, mirroring how the
/// teacher's `Oid`/`PublicKey` newtypes are infallible-from-trusted-input but
/// validate untrusted bytes explicitly.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Cstring(String);

impl Cstring {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Cstring {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for Cstring {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for Cstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cstring {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for Cstring {
    fn from(s: &str) -> Self {
        use unicode_normalization::UnicodeNormalization;
        Self(s.nfc().collect())
    }
}

impl From<String> for Cstring {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Cstring> for String {
    fn from(s: Cstring) -> Self {
        s.0
    }
}

impl PartialOrd for Cstring {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cstring {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl AsRef<str> for Cstring {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_to_nfc() {
        // "é" as e + combining acute vs the precomposed codepoint.
        let decomposed = "e\u{0301}";
        let precomposed = "\u{00e9}";
        assert_eq!(Cstring::from(decomposed).as_str(), precomposed);
    }
}
