// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Ordered delegation rules, matched in sequence against a target
//! namespace, terminating either at the first matching `terminating` rule
//! or at the implicit trailing allow-rule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    pattern,
    principal::Principal,
    role::Role,
};

pub const ALLOW_RULE_NAME: &str = "gittuf-allow-rule";
const RESERVED_PREFIX: &str = "gittuf-";

/// A single named delegation: the path patterns it applies to, whether it
/// halts further traversal of the enclosing rule list once matched, and the
/// role (principals + threshold) it contributes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    pub name: String,
    pub paths: Vec<String>,
    pub terminating: bool,
    pub role: Role,
}

impl Delegation {
    fn matches(&self, target: &str) -> bool {
        self.paths.iter().any(|p| pattern::matches(p, target))
    }
}

fn allow_rule() -> Delegation {
    Delegation {
        name: ALLOW_RULE_NAME.to_string(),
        paths: vec!["*".to_string()],
        terminating: true,
        role: Role {
            principal_ids: Default::default(),
            threshold: 1,
        },
    }
}

fn reject_reserved_name(name: &str) -> Result<()> {
    if name.starts_with(RESERVED_PREFIX) {
        return Err(Error::CannotManipulateRulesWithGittufPrefix(name.to_string()));
    }
    Ok(())
}

/// An ordered list of [`Delegation`]s plus the principal map they reference,
/// always terminated by the implicit [`ALLOW_RULE_NAME`] rule.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Delegations {
    pub principals: BTreeMap<String, Principal>,
    pub roles: Vec<Delegation>,
}

impl Delegations {
    pub fn new(principals: BTreeMap<String, Principal>) -> Self {
        Self {
            principals,
            roles: vec![allow_rule()],
        }
    }

    fn validate_principals(&self, role: &Role) -> Result<()> {
        for id in &role.principal_ids {
            if !self.principals.contains_key(id) {
                return Err(Error::PrincipalNotFound(id.clone()));
            }
        }
        Ok(())
    }

    fn non_allow_rules(&self) -> impl Iterator<Item = &Delegation> {
        self.roles.iter().filter(|r| r.name != ALLOW_RULE_NAME)
    }

    /// Inserts `delegation` immediately before the trailing allow-rule.
    pub fn add_rule(&mut self, delegation: Delegation) -> Result<()> {
        reject_reserved_name(&delegation.name)?;
        delegation.role.check_threshold()?;
        self.validate_principals(&delegation.role)?;
        if self.non_allow_rules().any(|r| r.name == delegation.name) {
            return Err(Error::DuplicatedRuleName(delegation.name));
        }
        let insert_at = self.roles.len() - 1;
        tracing::debug!(rule = %delegation.name, "adding delegation rule");
        self.roles.insert(insert_at, delegation);
        Ok(())
    }

    pub fn update_rule(&mut self, delegation: Delegation) -> Result<()> {
        reject_reserved_name(&delegation.name)?;
        delegation.role.check_threshold()?;
        self.validate_principals(&delegation.role)?;
        let position = self
            .roles
            .iter()
            .position(|r| r.name == delegation.name)
            .ok_or_else(|| Error::RuleNotFound(delegation.name.clone()))?;
        tracing::debug!(rule = %delegation.name, "updating delegation rule");
        self.roles[position] = delegation;
        Ok(())
    }

    pub fn remove_rule(&mut self, name: &str) -> Result<()> {
        reject_reserved_name(name)?;
        let position = self
            .roles
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| Error::RuleNotFound(name.to_string()))?;
        tracing::debug!(rule = %name, "removing delegation rule");
        self.roles.remove(position);
        Ok(())
    }

    /// Reorders the non-allow rules to exactly `names`. The allow rule must
    /// not be named, the name set must match the current non-allow rules
    /// one-to-one (no duplicates, nothing missing).
    pub fn reorder_rules(&mut self, names: Vec<String>) -> Result<()> {
        if names.iter().any(|n| n == ALLOW_RULE_NAME) {
            return Err(Error::CannotManipulateRulesWithGittufPrefix(
                ALLOW_RULE_NAME.to_string(),
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for name in &names {
            if !seen.insert(name) {
                return Err(Error::DuplicatedRuleName(name.clone()));
            }
        }

        let current: BTreeMap<&str, &Delegation> = self
            .non_allow_rules()
            .map(|r| (r.name.as_str(), r))
            .collect();

        let missing: Vec<String> = current
            .keys()
            .filter(|name| !names.iter().any(|n| n == *name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingRules(missing));
        }

        let mut reordered = Vec::with_capacity(self.roles.len());
        for name in &names {
            let delegation = current
                .get(name.as_str())
                .ok_or_else(|| Error::RuleNotFound(name.clone()))?;
            reordered.push((*delegation).clone());
        }
        reordered.push(allow_rule());
        tracing::debug!(rules = ?names, "reordering delegation rules");
        self.roles = reordered;
        Ok(())
    }

    /// Walks the rule list in order for `target_namespace`, collecting the
    /// roles of every matching rule until a matching *terminating* rule is
    /// hit (inclusive) or the list is exhausted. The trailing allow-rule
    /// always matches and is always terminating, so this never runs off the
    /// end.
    pub fn matching_roles(&self, target_namespace: &str) -> Vec<&Role> {
        let mut matched = Vec::new();
        for delegation in &self.roles {
            if !delegation.matches(target_namespace) {
                continue;
            }
            matched.push(&delegation.role);
            if delegation.terminating {
                break;
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: &str) -> (String, Principal) {
        (
            id.to_string(),
            Principal::Key(crate::principal::Key {
                keyid: id.to_string(),
                keytype: "ed25519".to_string(),
                scheme: "ed25519".to_string(),
                keyval: crate::principal::KeyMaterial {
                    public: "deadbeef".to_string(),
                },
            }),
        )
    }

    fn delegation(name: &str, paths: &[&str], terminating: bool, principal_ids: &[&str]) -> Delegation {
        Delegation {
            name: name.to_string(),
            paths: paths.iter().map(|s| s.to_string()).collect(),
            terminating,
            role: Role {
                principal_ids: principal_ids.iter().map(|s| s.to_string()).collect(),
                threshold: 1,
            },
        }
    }

    fn fixture() -> Delegations {
        let mut principals = BTreeMap::new();
        let (id, p) = principal("alice");
        principals.insert(id, p);
        Delegations::new(principals)
    }

    #[test]
    fn new_starts_with_only_the_allow_rule() {
        let d = fixture();
        assert_eq!(d.roles.len(), 1);
        assert_eq!(d.roles[0].name, ALLOW_RULE_NAME);
    }

    #[test]
    fn add_rule_inserts_before_allow_rule() {
        let mut d = fixture();
        d.add_rule(delegation("rule-1", &["*"], false, &["alice"])).unwrap();
        assert_eq!(d.roles.len(), 2);
        assert_eq!(d.roles[0].name, "rule-1");
        assert_eq!(d.roles[1].name, ALLOW_RULE_NAME);
    }

    #[test]
    fn add_rule_rejects_gittuf_prefix() {
        let mut d = fixture();
        assert!(matches!(
            d.add_rule(delegation("gittuf-foo", &["*"], false, &["alice"])),
            Err(Error::CannotManipulateRulesWithGittufPrefix(_))
        ));
    }

    #[test]
    fn add_rule_rejects_unknown_principal() {
        let mut d = fixture();
        assert!(matches!(
            d.add_rule(delegation("rule-1", &["*"], false, &["bob"])),
            Err(Error::PrincipalNotFound(_))
        ));
    }

    #[test]
    fn reorder_rules_matches_scenario() {
        let mut d = fixture();
        d.add_rule(delegation("rule-1", &["*"], false, &["alice"])).unwrap();
        d.add_rule(delegation("rule-2", &["*"], false, &["alice"])).unwrap();
        d.add_rule(delegation("rule-3", &["*"], false, &["alice"])).unwrap();

        d.reorder_rules(vec!["rule-3".into(), "rule-2".into(), "rule-1".into()])
            .unwrap();
        let names: Vec<&str> = d.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["rule-3", "rule-2", "rule-1", ALLOW_RULE_NAME]);
    }

    #[test]
    fn reorder_rules_rejects_allow_rule_in_input() {
        let mut d = fixture();
        d.add_rule(delegation("rule-1", &["*"], false, &["alice"])).unwrap();
        assert!(matches!(
            d.reorder_rules(vec!["rule-1".into(), ALLOW_RULE_NAME.into()]),
            Err(Error::CannotManipulateRulesWithGittufPrefix(_))
        ));
    }

    #[test]
    fn terminating_rule_stops_traversal() {
        let mut d = fixture();
        d.add_rule(delegation("rule-1", &["refs/heads/*"], true, &["alice"]))
            .unwrap();
        d.add_rule(delegation("rule-2", &["refs/heads/*"], false, &["alice"]))
            .unwrap();

        let matched = d.matching_roles("refs/heads/main");
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn non_matching_target_falls_through_to_allow_rule() {
        let d = fixture();
        let matched = d.matching_roles("refs/heads/main");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].threshold, 1);
    }
}
