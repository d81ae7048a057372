// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Keys and persons both implement the principal interface. JSON
//! deserialization is tag-dispatched not by an explicit `type` field but by
//! the *presence* of a discriminator key: `keyid` selects [`Key`], `personID`
//! selects [`Person`]; anything else is rejected.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single cryptographic key, as referenced by a [`Key`] principal or held
/// by a [`Person`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KeyMaterial {
    pub public: String,
}

/// A principal that is a bare key: its id is the key's own id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub keyid: String,
    pub keytype: String,
    pub scheme: String,
    pub keyval: KeyMaterial,
}

/// A principal representing a person, who may hold several keys and is
/// known to other systems (providers) under possibly different identities.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "personID")]
    pub person_id: String,
    pub keys: BTreeSet<String>,
    #[serde(default, rename = "associatedIdentities")]
    pub associated_identities: BTreeMap<String, String>,
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Principal {
    Key(Key),
    Person(Person),
}

impl Principal {
    pub fn id(&self) -> &str {
        match self {
            Principal::Key(k) => &k.keyid,
            Principal::Person(p) => &p.person_id,
        }
    }

    /// The set of key ids this principal can sign with: just itself for a
    /// [`Key`], the declared key set for a [`Person`].
    pub fn key_ids(&self) -> Vec<&str> {
        match self {
            Principal::Key(k) => vec![k.keyid.as_str()],
            Principal::Person(p) => p.keys.iter().map(String::as_str).collect(),
        }
    }

    /// A key carries no custom metadata; a person's is the free-form
    /// `custom` map with `associatedIdentities` folded in, re-keyed as
    /// `"(associated identity) <provider>"`.
    pub fn custom_metadata(&self) -> BTreeMap<String, String> {
        match self {
            Principal::Key(_) => BTreeMap::new(),
            Principal::Person(p) => merge_custom_metadata(&p.associated_identities, &p.custom),
        }
    }
}

fn merge_custom_metadata(
    associated_identities: &BTreeMap<String, String>,
    custom: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = custom.clone();
    for (provider, identity) in associated_identities {
        merged.insert(format!("(associated identity) {provider}"), identity.clone());
    }
    merged
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("keyid").is_some() {
            serde_json::from_value(value)
                .map(Principal::Key)
                .map_err(serde::de::Error::custom)
        } else if value.get("personID").is_some() {
            serde_json::from_value(value)
                .map(Principal::Person)
                .map_err(serde::de::Error::custom)
        } else {
            Err(serde::de::Error::custom(Error::InvalidPrincipalType(
                value.to_string(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_keyid() {
        let json = serde_json::json!({
            "keyid": "abc",
            "keytype": "ed25519",
            "scheme": "ed25519",
            "keyval": { "public": "deadbeef" },
        });
        let principal: Principal = serde_json::from_value(json).unwrap();
        assert!(matches!(principal, Principal::Key(_)));
        assert_eq!(principal.id(), "abc");
    }

    #[test]
    fn dispatches_on_person_id() {
        let json = serde_json::json!({
            "personID": "alice",
            "keys": ["k1", "k2"],
            "associatedIdentities": { "github": "alice-gh" },
            "custom": { "team": "core" },
        });
        let principal: Principal = serde_json::from_value(json).unwrap();
        assert_eq!(principal.id(), "alice");
        let metadata = principal.custom_metadata();
        assert_eq!(metadata.get("team").map(String::as_str), Some("core"));
        assert_eq!(
            metadata.get("(associated identity) github").map(String::as_str),
            Some("alice-gh")
        );
    }

    #[test]
    fn rejects_unrecognized_discriminator() {
        let json = serde_json::json!({ "nope": true });
        let result: Result<Principal, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }
}
