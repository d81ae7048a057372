// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("principal '{0}' has a type that is neither a key nor a person")]
    InvalidPrincipalType(String),

    #[error("'{0}' is not a valid principal id")]
    InvalidPrincipalId(String),

    #[error("principal '{0}' not found")]
    PrincipalNotFound(String),

    #[error("principal '{0}' is still referenced by one or more rules")]
    PrincipalStillInUse(String),

    #[error("root metadata is invalid: {0}")]
    InvalidRootMetadata(String),

    #[error("root metadata does not contain primary rule file information")]
    PrimaryRuleFileInformationNotFoundInRoot,

    #[error("root metadata does not contain github app information")]
    GitHubAppInformationNotFoundInRoot,

    #[error("{have} principals cannot meet a threshold of {threshold}")]
    CannotMeetThreshold { have: usize, threshold: u32 },

    #[error("'{0}' cannot be added, updated, or removed: the 'gittuf-' prefix is reserved")]
    CannotManipulateRulesWithGittufPrefix(String),

    #[error("rule '{0}' not found")]
    RuleNotFound(String),

    #[error("a rule named '{0}' already exists")]
    DuplicatedRuleName(String),

    #[error("reorder is missing rule(s): {0:?}")]
    MissingRules(Vec<String>),

    #[error("a global rule named '{0}' already exists")]
    GlobalRuleAlreadyExists(String),

    #[error("global rule '{0}' not found")]
    GlobalRuleNotFound(String),

    #[error("global rule '{0}' cannot change variant on update")]
    CannotUpdateGlobalRuleType(String),

    #[error("'{0}' is not a known global rule type")]
    UnknownGlobalRuleType(String),

    #[error("propagation directive '{0}' not found")]
    PropagationDirectiveNotFound(String),

    #[error("controller repository '{0}' already exists")]
    DuplicateControllerRepository(String),

    #[error("network repository '{0}' already exists")]
    DuplicateNetworkRepository(String),

    #[error("this repository is not configured as a controller")]
    NotAControllerRepository,

    #[error("'{0}' is not a valid hook stage")]
    InvalidHookStage(String),

    #[error("a hook named '{0}' already exists for stage '{1}'")]
    DuplicatedHookName(String, String),

    #[error("no hooks are defined for stage '{0}'")]
    NoHooksDefined(String),

    #[error("rule-file targets must be empty")]
    RuleFileTargetsMustBeEmpty,

    #[error("failed to decode policy metadata: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
