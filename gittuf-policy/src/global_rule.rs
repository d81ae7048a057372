// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Root-level rules that apply across every rule file, tagged by a `type`
//! discriminator in their serialized form.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GlobalRule {
    #[serde(rename = "threshold")]
    Threshold {
        name: String,
        paths: Vec<String>,
        threshold: u32,
    },
    #[serde(rename = "block-force-pushes")]
    BlockForcePushes { name: String, paths: Vec<String> },
}

impl GlobalRule {
    pub fn name(&self) -> &str {
        match self {
            GlobalRule::Threshold { name, .. } => name,
            GlobalRule::BlockForcePushes { name, .. } => name,
        }
    }

    /// Whether `other` is the same variant as `self`, ignoring field values.
    /// Used to reject [`GlobalRule`] updates that would change the rule's
    /// kind out from under its name.
    pub fn same_variant(&self, other: &GlobalRule) -> bool {
        matches!(
            (self, other),
            (GlobalRule::Threshold { .. }, GlobalRule::Threshold { .. })
                | (GlobalRule::BlockForcePushes { .. }, GlobalRule::BlockForcePushes { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json_with_type_tag() {
        let rule = GlobalRule::Threshold {
            name: "two-reviewers".to_string(),
            paths: vec!["*".to_string()],
            threshold: 2,
        };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "threshold");
        let back: GlobalRule = serde_json::from_value(json).unwrap();
        assert_eq!(rule, back);
    }

    #[test]
    fn same_variant_detects_type_change() {
        let threshold = GlobalRule::Threshold {
            name: "r".to_string(),
            paths: vec![],
            threshold: 1,
        };
        let block = GlobalRule::BlockForcePushes {
            name: "r".to_string(),
            paths: vec![],
        };
        assert!(!threshold.same_variant(&block));
        assert!(threshold.same_variant(&threshold.clone()));
    }
}
