// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Loading and storing root and rule-file metadata as blobs under the
//! reserved `refs/gittuf/` namespace.
//!
//! A policy reference points directly at the blob holding the document's
//! current canonical JSON, not at a commit; advancing it is a plain
//! compare-and-swap on the Git interface core's reference ops.

use gittuf_git::{object, refs, repo::Repository};
use gittuf_hash::ObjectId;
use gittuf_policy::{RootMetadata, RuleFile};

use crate::error::{Error, Result};

/// The root's live policy reference.
pub const POLICY_REFERENCE: &str = "refs/gittuf/policy";
/// The staging area a policy change is prepared on before it accumulates
/// enough threshold signatures to be promoted to [`POLICY_REFERENCE`].
pub const POLICY_STAGING_REFERENCE: &str = "refs/gittuf/policy-staging";

pub fn load_root_metadata(repo: &Repository, reference: &str) -> Result<RootMetadata> {
    let id = refs::get_reference(repo, reference)?;
    let bytes = object::read_blob(repo, &id)?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
        reference: reference.to_string(),
        source,
    })
}

/// Writes `root`'s canonical bytes as a new blob and points `reference` at
/// it unconditionally; use [`update_root_metadata`] once the reference
/// already exists and must only advance from a known value.
pub fn store_root_metadata(
    repo: &Repository,
    reference: &str,
    root: &RootMetadata,
) -> Result<ObjectId> {
    let id = object::write_blob(repo, &root.canonical_bytes()?)?;
    tracing::debug!(%reference, %id, "storing root metadata");
    refs::set_reference(repo, reference, &id)?;
    Ok(id)
}

pub fn update_root_metadata(
    repo: &Repository,
    reference: &str,
    root: &RootMetadata,
    expected_old: &ObjectId,
) -> Result<ObjectId> {
    let id = object::write_blob(repo, &root.canonical_bytes()?)?;
    tracing::debug!(%reference, %id, %expected_old, "advancing root metadata");
    refs::check_and_set_reference(repo, reference, &id, expected_old)?;
    Ok(id)
}

pub fn load_rule_file(repo: &Repository, reference: &str) -> Result<RuleFile> {
    let id = refs::get_reference(repo, reference)?;
    let bytes = object::read_blob(repo, &id)?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
        reference: reference.to_string(),
        source,
    })
}

pub fn store_rule_file(
    repo: &Repository,
    reference: &str,
    rule_file: &RuleFile,
) -> Result<ObjectId> {
    let id = object::write_blob(repo, &rule_file.canonical_bytes()?)?;
    refs::set_reference(repo, reference, &id)?;
    Ok(id)
}

pub fn update_rule_file(
    repo: &Repository,
    reference: &str,
    rule_file: &RuleFile,
    expected_old: &ObjectId,
) -> Result<ObjectId> {
    let id = object::write_blob(repo, &rule_file.canonical_bytes()?)?;
    refs::check_and_set_reference(repo, reference, &id, expected_old)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_references_use_the_reserved_prefix() {
        assert!(POLICY_REFERENCE.starts_with("refs/gittuf/"));
        assert!(POLICY_STAGING_REFERENCE.starts_with("refs/gittuf/"));
    }
}
