// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Instructions for pulling content from an upstream repository into a
//! downstream path, consumed by the propagation operation on the Git
//! interface core.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationDirective {
    pub name: String,
    pub upstream_repository: String,
    pub upstream_reference: String,
    pub downstream_reference: String,
    pub downstream_path: String,
}

/// A repository participating in multi-repository topology, either as a
/// controller this repository trusts or a network member it controls.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherRepo {
    pub name: String,
    pub location: String,
    pub initial_root_principals: Vec<String>,
}

impl OtherRepo {
    /// The equivalence key used to detect duplicate entries: `(name,
    /// location, initial principal set)`.
    fn key(&self) -> (&str, &str, std::collections::BTreeSet<&str>) {
        (
            self.name.as_str(),
            self.location.as_str(),
            self.initial_root_principals.iter().map(String::as_str).collect(),
        )
    }

    pub fn duplicates(&self, other: &OtherRepo) -> bool {
        self.key() == other.key()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiRepository {
    #[serde(default)]
    pub controller: bool,
    #[serde(default)]
    pub controller_repositories: Vec<OtherRepo>,
    #[serde(default)]
    pub network_repositories: Vec<OtherRepo>,
}

/// The two propagation directives automatically emitted alongside a
/// controller repository entry: one for its policy reference, one for its
/// staging reference.
pub fn controller_policy_directives(controller_name: &str) -> [PropagationDirective; 2] {
    let downstream_path = format!("gittuf/controllers/{controller_name}");
    [
        PropagationDirective {
            name: format!("gittuf-controller-{controller_name}-policy"),
            upstream_repository: controller_name.to_string(),
            upstream_reference: "refs/gittuf/policy".to_string(),
            downstream_reference: "refs/gittuf/policy".to_string(),
            downstream_path: downstream_path.clone(),
        },
        PropagationDirective {
            name: format!("gittuf-controller-{controller_name}-policy-staging"),
            upstream_repository: controller_name.to_string(),
            upstream_reference: "refs/gittuf/policy-staging".to_string(),
            downstream_reference: "refs/gittuf/policy-staging".to_string(),
            downstream_path,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_directives_carry_matching_policy_and_staging_refs() {
        let directives = controller_policy_directives("upstream-org");
        assert_eq!(directives[0].name, "gittuf-controller-upstream-org-policy");
        assert_eq!(directives[0].upstream_reference, "refs/gittuf/policy");
        assert_eq!(
            directives[1].name,
            "gittuf-controller-upstream-org-policy-staging"
        );
        assert_eq!(directives[1].upstream_reference, "refs/gittuf/policy-staging");
        assert_eq!(directives[0].downstream_path, directives[1].downstream_path);
    }

    #[test]
    fn duplicate_detection_uses_name_location_and_key_set() {
        let a = OtherRepo {
            name: "n".to_string(),
            location: "l".to_string(),
            initial_root_principals: vec!["k1".to_string()],
        };
        let b = a.clone();
        let c = OtherRepo {
            initial_root_principals: vec!["k2".to_string()],
            ..a.clone()
        };
        assert!(a.duplicates(&b));
        assert!(!a.duplicates(&c));
    }
}
