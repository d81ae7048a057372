// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Root metadata: the repository's top-level trust anchor. Names the
//! principals and roles that govern the root document itself, the primary
//! rule file (`targets`), and optionally a GitHub-app approval role, plus
//! global rules, propagation directives, multi-repository topology, and
//! lifecycle hooks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    global_rule::GlobalRule,
    hook::{Hooks, Stage},
    principal::Principal,
    propagation_directive::{controller_policy_directives, MultiRepository, OtherRepo, PropagationDirective},
    role::Role,
};

pub const ROOT_ROLE: &str = "root";
pub const TARGETS_ROLE: &str = "targets";
pub const GITHUB_APP_ROLE: &str = "github-app";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootMetadata {
    #[serde(rename = "type")]
    pub metadata_type: String,
    pub schema_version: String,
    pub expires_at: String,
    #[serde(default)]
    pub repository_location: Option<String>,
    pub principals: BTreeMap<String, Principal>,
    pub roles: BTreeMap<String, Role>,
    #[serde(default)]
    pub github_approvals_trusted: bool,
    #[serde(default)]
    pub global_rules: Vec<GlobalRule>,
    #[serde(default)]
    pub propagations: Vec<PropagationDirective>,
    #[serde(default)]
    pub multi_repository: Option<MultiRepository>,
    #[serde(default)]
    pub hooks: Hooks,
}

impl RootMetadata {
    pub fn new(schema_version: impl Into<String>, expires_at: impl Into<String>) -> Self {
        Self {
            metadata_type: "root".to_string(),
            schema_version: schema_version.into(),
            expires_at: expires_at.into(),
            repository_location: None,
            principals: BTreeMap::new(),
            roles: BTreeMap::new(),
            github_approvals_trusted: false,
            global_rules: Vec::new(),
            propagations: Vec::new(),
            multi_repository: None,
            hooks: Hooks::new(),
        }
    }

    fn role(&self, name: &str) -> Result<&Role> {
        self.roles.get(name).ok_or_else(|| match name {
            TARGETS_ROLE => Error::PrimaryRuleFileInformationNotFoundInRoot,
            GITHUB_APP_ROLE => Error::GitHubAppInformationNotFoundInRoot,
            other => Error::InvalidRootMetadata(format!("role '{other}' not found")),
        })
    }

    fn role_mut(&mut self, name: &str) -> Result<&mut Role> {
        self.roles.get_mut(name).ok_or_else(|| match name {
            TARGETS_ROLE => Error::PrimaryRuleFileInformationNotFoundInRoot,
            GITHUB_APP_ROLE => Error::GitHubAppInformationNotFoundInRoot,
            other => Error::InvalidRootMetadata(format!("role '{other}' not found")),
        })
    }

    fn validate_principal_exists(&self, id: &str) -> Result<()> {
        if !self.principals.contains_key(id) {
            return Err(Error::PrincipalNotFound(id.to_string()));
        }
        Ok(())
    }

    fn add_role_principal(&mut self, role_name: &str, principal_id: &str) -> Result<()> {
        self.validate_principal_exists(principal_id)?;
        let role = self
            .roles
            .entry(role_name.to_string())
            .or_insert_with(|| Role {
                principal_ids: Default::default(),
                threshold: 1,
            });
        role.principal_ids.insert(principal_id.to_string());
        Ok(())
    }

    fn remove_role_principal(&mut self, role_name: &str, principal_id: &str) -> Result<()> {
        let role = self.role_mut(role_name)?;
        role.principal_ids.remove(principal_id);
        role.check_threshold()
    }

    pub fn add_root_principal(&mut self, principal_id: &str) -> Result<()> {
        self.add_role_principal(ROOT_ROLE, principal_id)
    }

    pub fn remove_root_principal(&mut self, principal_id: &str) -> Result<()> {
        self.remove_role_principal(ROOT_ROLE, principal_id)
    }

    pub fn add_primary_rule_file_principal(&mut self, principal_id: &str) -> Result<()> {
        self.add_role_principal(TARGETS_ROLE, principal_id)
    }

    pub fn remove_primary_rule_file_principal(&mut self, principal_id: &str) -> Result<()> {
        self.remove_role_principal(TARGETS_ROLE, principal_id)
    }

    fn update_threshold(&mut self, role_name: &str, threshold: u32) -> Result<()> {
        let role = self.role_mut(role_name)?;
        if threshold > role.principal_ids.len() as u32 {
            return Err(Error::CannotMeetThreshold {
                have: role.principal_ids.len(),
                threshold,
            });
        }
        role.threshold = threshold;
        Ok(())
    }

    pub fn update_root_threshold(&mut self, threshold: u32) -> Result<()> {
        self.update_threshold(ROOT_ROLE, threshold)
    }

    pub fn update_primary_rule_file_threshold(&mut self, threshold: u32) -> Result<()> {
        self.update_threshold(TARGETS_ROLE, threshold)
    }

    pub fn enable_github_app_approvals(&mut self) {
        self.github_approvals_trusted = true;
    }

    pub fn disable_github_app_approvals(&mut self) {
        self.github_approvals_trusted = false;
    }

    /// A single id family keyed by role name: adding a GitHub-app principal
    /// replaces whatever principal set previously occupied the role rather
    /// than accumulating.
    pub fn add_github_app_principal(&mut self, principal_id: &str) -> Result<()> {
        self.validate_principal_exists(principal_id)?;
        self.roles.insert(
            GITHUB_APP_ROLE.to_string(),
            Role {
                principal_ids: [principal_id.to_string()].into_iter().collect(),
                threshold: 1,
            },
        );
        Ok(())
    }

    pub fn add_global_rule(&mut self, rule: GlobalRule) -> Result<()> {
        if self.global_rules.iter().any(|r| r.name() == rule.name()) {
            return Err(Error::GlobalRuleAlreadyExists(rule.name().to_string()));
        }
        self.global_rules.push(rule);
        Ok(())
    }

    pub fn update_global_rule(&mut self, rule: GlobalRule) -> Result<()> {
        let position = self
            .global_rules
            .iter()
            .position(|r| r.name() == rule.name())
            .ok_or_else(|| Error::GlobalRuleNotFound(rule.name().to_string()))?;
        if !self.global_rules[position].same_variant(&rule) {
            return Err(Error::CannotUpdateGlobalRuleType(rule.name().to_string()));
        }
        self.global_rules[position] = rule;
        Ok(())
    }

    pub fn remove_global_rule(&mut self, name: &str) -> Result<()> {
        let position = self
            .global_rules
            .iter()
            .position(|r| r.name() == name)
            .ok_or_else(|| Error::GlobalRuleNotFound(name.to_string()))?;
        self.global_rules.remove(position);
        Ok(())
    }

    pub fn add_propagation_directive(&mut self, directive: PropagationDirective) {
        self.propagations.push(directive);
    }

    pub fn remove_propagation_directive(&mut self, name: &str) -> Result<()> {
        let position = self
            .propagations
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| Error::PropagationDirectiveNotFound(name.to_string()))?;
        self.propagations.remove(position);
        Ok(())
    }

    fn multi_repository_mut(&mut self) -> &mut MultiRepository {
        self.multi_repository.get_or_insert_with(MultiRepository::default)
    }

    pub fn enable_controller(&mut self) {
        self.multi_repository_mut().controller = true;
    }

    pub fn disable_controller(&mut self) {
        self.multi_repository_mut().controller = false;
    }

    /// Inserts a controller repository entry and additionally emits two
    /// propagation directives (policy and policy-staging) pulling that
    /// controller's policy references into `gittuf/controllers/<name>`.
    pub fn add_controller_repository(
        &mut self,
        name: &str,
        location: &str,
        initial_root_principals: Vec<String>,
    ) -> Result<()> {
        let entry = OtherRepo {
            name: name.to_string(),
            location: location.to_string(),
            initial_root_principals,
        };

        {
            let multi = self.multi_repository_mut();
            if multi.controller_repositories.iter().any(|r| r.duplicates(&entry)) {
                return Err(Error::DuplicateControllerRepository(name.to_string()));
            }
            multi.controller_repositories.push(entry);
        }

        for directive in controller_policy_directives(name) {
            self.add_propagation_directive(directive);
        }
        Ok(())
    }

    pub fn add_network_repository(
        &mut self,
        name: &str,
        location: &str,
        initial_root_principals: Vec<String>,
    ) -> Result<()> {
        let is_controller = self
            .multi_repository
            .as_ref()
            .map(|m| m.controller)
            .unwrap_or(false);
        if !is_controller {
            return Err(Error::NotAControllerRepository);
        }

        let entry = OtherRepo {
            name: name.to_string(),
            location: location.to_string(),
            initial_root_principals,
        };
        let multi = self.multi_repository_mut();
        if multi.network_repositories.iter().any(|r| r.duplicates(&entry)) {
            return Err(Error::DuplicateNetworkRepository(name.to_string()));
        }
        multi.network_repositories.push(entry);
        Ok(())
    }

    pub fn add_hook(
        &mut self,
        stage: Stage,
        name: String,
        principal_ids: Vec<String>,
        hashes: BTreeMap<String, String>,
        environment: String,
        modules: Vec<String>,
    ) -> Result<()> {
        self.hooks
            .add_hook(stage, name, principal_ids, hashes, environment, modules)
    }

    /// The bytes that get hashed and signed for this document.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        crate::canonical::canonical_bytes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::{Key, KeyMaterial};

    fn add_principal(root: &mut RootMetadata, id: &str) {
        root.principals.insert(
            id.to_string(),
            Principal::Key(Key {
                keyid: id.to_string(),
                keytype: "ed25519".to_string(),
                scheme: "ed25519".to_string(),
                keyval: KeyMaterial {
                    public: "deadbeef".to_string(),
                },
            }),
        );
    }

    #[test]
    fn root_threshold_scenario() {
        let mut root = RootMetadata::new("https://gittuf.dev/policy/root/v0.2", "2030-01-01T00:00:00Z");
        add_principal(&mut root, "alice");
        add_principal(&mut root, "bob");
        root.add_root_principal("alice").unwrap();
        root.add_root_principal("bob").unwrap();

        root.update_root_threshold(2).unwrap();
        assert_eq!(root.roles[ROOT_ROLE].threshold, 2);

        assert!(matches!(
            root.update_root_threshold(3),
            Err(Error::CannotMeetThreshold { have: 2, threshold: 3 })
        ));
    }

    #[test]
    fn adding_controller_repository_emits_two_propagation_directives() {
        let mut root = RootMetadata::new("https://gittuf.dev/policy/root/v0.2", "2030-01-01T00:00:00Z");
        root.enable_controller();
        root.add_controller_repository("upstream", "https://example.com/upstream", vec![])
            .unwrap();
        assert_eq!(root.propagations.len(), 2);
        assert!(root
            .propagations
            .iter()
            .any(|p| p.name == "gittuf-controller-upstream-policy"));
        assert!(root
            .propagations
            .iter()
            .any(|p| p.name == "gittuf-controller-upstream-policy-staging"));
    }

    #[test]
    fn network_repository_requires_controller_mode() {
        let mut root = RootMetadata::new("https://gittuf.dev/policy/root/v0.2", "2030-01-01T00:00:00Z");
        assert!(matches!(
            root.add_network_repository("n", "l", vec![]),
            Err(Error::NotAControllerRepository)
        ));
    }

    #[test]
    fn github_app_principal_replaces_rather_than_accumulates() {
        let mut root = RootMetadata::new("https://gittuf.dev/policy/root/v0.2", "2030-01-01T00:00:00Z");
        add_principal(&mut root, "app-1");
        add_principal(&mut root, "app-2");
        root.add_github_app_principal("app-1").unwrap();
        root.add_github_app_principal("app-2").unwrap();
        assert_eq!(root.roles[GITHUB_APP_ROLE].principal_ids.len(), 1);
        assert!(root.roles[GITHUB_APP_ROLE].principal_ids.contains("app-2"));
    }

    #[test]
    fn update_global_rule_rejects_variant_change() {
        let mut root = RootMetadata::new("https://gittuf.dev/policy/root/v0.2", "2030-01-01T00:00:00Z");
        root.add_global_rule(GlobalRule::Threshold {
            name: "r".to_string(),
            paths: vec!["*".to_string()],
            threshold: 1,
        })
        .unwrap();
        assert!(matches!(
            root.update_global_rule(GlobalRule::BlockForcePushes {
                name: "r".to_string(),
                paths: vec!["*".to_string()],
            }),
            Err(Error::CannotUpdateGlobalRuleType(_))
        ));
    }

    #[test]
    fn canonical_bytes_are_stable_across_calls() {
        let mut root = RootMetadata::new("https://gittuf.dev/policy/root/v0.2", "2030-01-01T00:00:00Z");
        add_principal(&mut root, "alice");
        root.add_root_principal("alice").unwrap();
        assert_eq!(root.canonical_bytes().unwrap(), root.canonical_bytes().unwrap());
    }
}
