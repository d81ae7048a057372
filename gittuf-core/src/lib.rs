// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

#![deny(rustdoc::broken_intra_doc_links)]

//! Wires the Git interface core ([`gittuf_git`]) to the policy metadata core
//! ([`gittuf_policy`]): loading and storing root/rule-file documents as
//! blobs under `refs/gittuf/`, and resolving a policy [`Principal`][p]'s key
//! material into something the signature engine ([`gittuf_signature`]) can
//! verify an object against.
//!
//! [p]: gittuf_policy::Principal
//!
//! Everything downstream of this crate — the command-line frontend, the
//! attestation store, the reference state log — is an external collaborator
//! that consumes these operations rather than something this crate builds.

pub mod error;
pub mod policy;
pub mod principal_key;
pub mod verify;

pub use error::{Error, Result};
pub use policy::{
    load_root_metadata, load_rule_file, store_root_metadata, store_rule_file,
    update_root_metadata, update_rule_file, POLICY_REFERENCE, POLICY_STAGING_REFERENCE,
};
pub use principal_key::verification_key;
pub use verify::verify_principal_signature;
