// Copyright © 2021 The Radicle Link Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

#![allow(rustdoc::private_intra_doc_links)]
#![warn(clippy::extra_unused_lifetimes)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Signing and verification dispatch for commits and tags.
//!
//! [`sign`] and [`signer`] carry the minimal signing vocabulary and the
//! dyn-clone dispatch pattern used to pass a boxed signer around without
//! callers caring which concrete key type backs it. [`backend`] defines the
//! three pluggable verification backends (GPG, SSH, Sigstore); [`verify`] is
//! the dispatch entry that inspects an object's type and routes to the
//! right one. [`config`] inspects repository config to decide whether
//! signing is possible at all.

pub mod backend;
pub mod config;
pub mod error;
pub mod key;
pub mod sign;
mod signer;
pub mod verify;

pub use error::{Error, Result};
pub use key::VerificationKey;
pub use signer::{BoxedSignError, BoxedSigner, Signer, SomeSigner};
pub use verify::{verify_signature, Verifiers};
