// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

//! TUF-style policy metadata: principals, roles, ordered delegation rules,
//! global rules, multi-repository propagation and lifecycle hooks.
//!
//! [`RootMetadata`] is the root of trust: principals, named roles and the
//! global and propagation rules that apply across the whole repository.
//! [`RuleFile`] carries the ordered, pattern-matched delegation rules that
//! actually decide who may change what, terminating in an implicit
//! [`delegation::ALLOW_RULE_NAME`] rule.

pub mod canonical;
pub mod delegation;
pub mod error;
pub mod global_rule;
pub mod hook;
pub mod pattern;
pub mod principal;
pub mod propagation_directive;
pub mod role;
pub mod root;
pub mod rule_file;

pub use canonical::canonical_bytes;
pub use delegation::{Delegation, Delegations, ALLOW_RULE_NAME};
pub use error::{Error, Result};
pub use global_rule::GlobalRule;
pub use hook::{Hook, Hooks, Stage};
pub use principal::{Key, Person, Principal};
pub use propagation_directive::{MultiRepository, OtherRepo, PropagationDirective};
pub use role::Role;
pub use root::RootMetadata;
pub use rule_file::RuleFile;
