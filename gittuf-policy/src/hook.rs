// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Lifecycle hooks run at defined points (`pre-commit`, `pre-push`, …),
//! keyed by stage with unique names within each stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "pre-commit")]
    PreCommit,
    #[serde(rename = "pre-push")]
    PrePush,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::PreCommit => "pre-commit",
            Stage::PrePush => "pre-push",
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pre-commit" => Ok(Stage::PreCommit),
            "pre-push" => Ok(Stage::PrePush),
            other => Err(Error::InvalidHookStage(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub name: String,
    pub principal_ids: Vec<String>,
    pub hashes: BTreeMap<String, String>,
    pub environment: String,
    pub modules: Vec<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Hooks(BTreeMap<Stage, Vec<Hook>>);

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, stage: Stage) -> &[Hook] {
        self.0.get(&stage).map(Vec::as_slice).unwrap_or_default()
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
        let stage_hooks = self.0.entry(stage).or_default();
        if stage_hooks.iter().any(|h| h.name == name) {
            return Err(Error::DuplicatedHookName(name, stage.as_str().to_string()));
        }
        stage_hooks.push(Hook {
            name,
            principal_ids,
            hashes,
            environment,
            modules,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_hook_rejects_duplicate_name_within_stage() {
        let mut hooks = Hooks::new();
        hooks
            .add_hook(
                Stage::PreCommit,
                "lint".to_string(),
                vec!["alice".to_string()],
                BTreeMap::new(),
                "wasm".to_string(),
                vec![],
            )
            .unwrap();
        assert!(matches!(
            hooks.add_hook(
                Stage::PreCommit,
                "lint".to_string(),
                vec![],
                BTreeMap::new(),
                "wasm".to_string(),
                vec![],
            ),
            Err(Error::DuplicatedHookName(_, _))
        ));
    }

    #[test]
    fn same_name_allowed_in_different_stages() {
        let mut hooks = Hooks::new();
        hooks
            .add_hook(
                Stage::PreCommit,
                "lint".to_string(),
                vec![],
                BTreeMap::new(),
                "wasm".to_string(),
                vec![],
            )
            .unwrap();
        assert!(hooks
            .add_hook(
                Stage::PrePush,
                "lint".to_string(),
                vec![],
                BTreeMap::new(),
                "wasm".to_string(),
                vec![],
            )
            .is_ok());
    }

    #[test]
    fn stage_parses_from_str() {
        assert_eq!("pre-commit".parse::<Stage>().unwrap(), Stage::PreCommit);
        assert!("nope".parse::<Stage>().is_err());
    }
}
