// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! A typed facade over a Git object database, driven entirely by shelling
//! out to the `git` binary rather than linking against `libgit2`.
//!
//! The module layout mirrors the shape of the interface: [`executor`] is
//! the process-invocation primitive everything else is built on,
//! [`repo::Repository`] is the resolved handle those invocations are scoped
//! to, and [`object`], [`tree`], [`refs`], [`diff`], [`propagation`] and
//! [`hash_agility`] are the operations layered on top of it.

pub mod diff;
pub mod error;
pub mod executor;
pub mod hash_agility;
pub mod object;
pub mod propagation;
pub mod reference;
pub mod refs;
pub mod repo;
pub mod tree;

pub use error::{Error, Result};
pub use reference::{OneLevel, Qualified, RefLike, RefspecPattern};
pub use repo::Repository;
pub use tree::TreeBuilder;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
#[macro_use]
extern crate lazy_static;
