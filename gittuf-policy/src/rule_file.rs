// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Rule-file ("targets") metadata: the primary document carrying ordered
//! delegation rules. Same shape as root's delegation portion, with the
//! added invariant that `targets` is always empty — this document only
//! delegates trust, it never names target files directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    delegation::{Delegation, Delegations},
    error::{Error, Result},
    principal::Principal,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFile {
    #[serde(rename = "type")]
    pub metadata_type: String,
    pub schema_version: String,
    pub expires_at: String,
    #[serde(deserialize_with = "deserialize_empty_targets", default)]
    pub targets: BTreeMap<String, serde_json::Value>,
    pub delegations: Delegations,
}

/// `targets` is a structural invariant rather than useful data: it must be
/// empty on every document that ever passes through here, so decoding one
/// with entries is rejected at the edge rather than silently accepted and
/// failing a later check.
fn deserialize_empty_targets<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let targets: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
    if !targets.is_empty() {
        return Err(serde::de::Error::custom(Error::RuleFileTargetsMustBeEmpty));
    }
    Ok(targets)
}

impl RuleFile {
    pub fn new(
        schema_version: impl Into<String>,
        expires_at: impl Into<String>,
        principals: BTreeMap<String, Principal>,
    ) -> Self {
        Self {
            metadata_type: "targets".to_string(),
            schema_version: schema_version.into(),
            expires_at: expires_at.into(),
            targets: BTreeMap::new(),
            delegations: Delegations::new(principals),
        }
    }

    pub fn add_rule(&mut self, delegation: Delegation) -> Result<()> {
        self.delegations.add_rule(delegation)
    }

    pub fn update_rule(&mut self, delegation: Delegation) -> Result<()> {
        self.delegations.update_rule(delegation)
    }

    pub fn remove_rule(&mut self, name: &str) -> Result<()> {
        self.delegations.remove_rule(name)
    }

    pub fn reorder_rules(&mut self, names: Vec<String>) -> Result<()> {
        self.delegations.reorder_rules(names)
    }

    /// The bytes that get hashed and signed for this document.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        crate::canonical::canonical_bytes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rule_file_has_empty_targets() {
        let rule_file = RuleFile::new(
            "https://gittuf.dev/policy/targets/v0.2",
            "2030-01-01T00:00:00Z",
            BTreeMap::new(),
        );
        assert!(rule_file.targets.is_empty());
    }

    #[test]
    fn decoding_rejects_non_empty_targets() {
        let json = serde_json::json!({
            "type": "targets",
            "schemaVersion": "https://gittuf.dev/policy/targets/v0.2",
            "expiresAt": "2030-01-01T00:00:00Z",
            "targets": { "file.txt": "deadbeef" },
            "delegations": { "principals": {}, "roles": [] },
        });
        let result: std::result::Result<RuleFile, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }
}
