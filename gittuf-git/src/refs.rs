// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Reference resolution, atomic updates and naming helpers.

use gittuf_hash::ObjectId;

use crate::{repo::Repository, Error, Result};

/// `rev-parse <name>`, mapping Git's "not a valid revision" error onto
/// [`Error::ReferenceNotFound`] rather than a raw exec failure.
pub fn get_reference(repo: &Repository, name: &str) -> Result<ObjectId> {
    let out = repo
        .executor()
        .with_args(["rev-parse", name])
        .execute()?;
    if out.status != 0 {
        let stderr = String::from_utf8_lossy(&out.stderr);
        if stderr.contains("unknown revision") || stderr.contains("not in the working tree") {
            return Err(Error::ReferenceNotFound(name.to_string()));
        }
        return Err(crate::executor::Error::NonZeroExit {
            args: format!("rev-parse {name}"),
            status: out.status,
            stderr: stderr.trim().to_string(),
        }
        .into());
    }
    let id = String::from_utf8_lossy(&out.stdout).trim().to_string();
    Ok(ObjectId::from_hex(id)?)
}

pub fn set_reference(repo: &Repository, name: &str, id: &ObjectId) -> Result<()> {
    repo.executor()
        .with_args(["update-ref", "--create-reflog", name, id.as_str()])
        .execute_string()?;
    Ok(())
}

/// The atomic compare-and-swap used whenever a policy reference is
/// advanced: fails if `name` does not currently point at `old`.
pub fn check_and_set_reference(
    repo: &Repository,
    name: &str,
    new_id: &ObjectId,
    old_id: &ObjectId,
) -> Result<()> {
    repo.executor()
        .with_args([
            "update-ref",
            "--create-reflog",
            name,
            new_id.as_str(),
            old_id.as_str(),
        ])
        .execute_string()?;
    Ok(())
}

pub fn get_symbolic_reference_target(repo: &Repository, name: &str) -> Result<String> {
    repo.executor()
        .with_args(["symbolic-ref", name])
        .execute_string()
        .map_err(|_| Error::ReferenceNotFound(name.to_string()))
}

/// Resolve a short name to a fully-qualified reference: `HEAD` resolves via
/// `symbolic-ref`, already-qualified refs (`refs/...`) pass through,
/// otherwise branch then tag are tried in that order.
pub fn absolute_reference(repo: &Repository, target: &str) -> Result<String> {
    if target == "HEAD" {
        return get_symbolic_reference_target(repo, "HEAD");
    }
    if target.starts_with("refs/") {
        return Ok(target.to_string());
    }

    let branch = BranchReferenceName(target);
    if get_reference(repo, &branch.to_string()).is_ok() {
        return Ok(branch.to_string());
    }
    let tag = TagReferenceName(target);
    if get_reference(repo, &tag.to_string()).is_ok() {
        return Ok(tag.to_string());
    }
    Err(Error::ReferenceNotFound(target.to_string()))
}

/// `refSpec(ref, remote, fastForwardOnly) -> string`.
///
/// Qualifies `reference`, computes the remote-side path (`refs/remotes/<remote>/...`
/// for branches; tag names pass through unchanged) and prefixes `+` unless
/// `fast_forward_only` is set. Tags are always treated as fast-forward-only,
/// regardless of what the caller passes.
pub fn ref_spec(reference: &str, remote: &str, fast_forward_only: bool) -> String {
    let qualified = if reference.starts_with("refs/") {
        reference.to_string()
    } else {
        BranchReferenceName(reference).to_string()
    };

    let is_tag = qualified.starts_with("refs/tags/");
    let remote_side = RemoteRef(&qualified, remote);

    if is_tag || fast_forward_only {
        format!("{qualified}:{remote_side}")
    } else {
        format!("+{qualified}:{remote_side}")
    }
}

/// Failsafe used by higher layers: reset `reference` back to `old_id` after
/// a failed operation, then propagate the original `cause`. If the reset
/// itself fails, both errors are reported together.
pub fn reset_due_to_error(
    repo: &Repository,
    cause: Error,
    reference: &str,
    old_id: &ObjectId,
) -> Error {
    match set_reference(repo, reference, old_id) {
        Ok(()) => Error::ResetAfterError {
            reference: reference.to_string(),
            old: old_id.clone(),
            cause: Box::new(cause),
        },
        Err(reset_error) => Error::ResetFailedAfterError {
            reference: reference.to_string(),
            old: old_id.clone(),
            reset_error: Box::new(reset_error),
            cause: Box::new(cause),
        },
    }
}

/// `refs/heads/<n>`, idempotent if `n` already carries the prefix.
pub struct BranchReferenceName<'a>(pub &'a str);

impl std::fmt::Display for BranchReferenceName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.starts_with("refs/heads/") {
            f.write_str(self.0)
        } else {
            write!(f, "refs/heads/{}", self.0)
        }
    }
}

/// `refs/tags/<n>`, idempotent if `n` already carries the prefix.
pub struct TagReferenceName<'a>(pub &'a str);

impl std::fmt::Display for TagReferenceName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.starts_with("refs/tags/") {
            f.write_str(self.0)
        } else {
            write!(f, "refs/tags/{}", self.0)
        }
    }
}

/// Translates a branch (or any non-tag ref) into its remote-tracking form
/// under `refs/remotes/<remote>/...`; tags pass through unchanged.
pub struct RemoteRef<'a>(pub &'a str, pub &'a str);

impl std::fmt::Display for RemoteRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let RemoteRef(reference, remote) = self;
        if let Some(tag) = reference.strip_prefix("refs/tags/") {
            write!(f, "refs/tags/{tag}")
        } else if let Some(branch) = reference.strip_prefix("refs/heads/") {
            write!(f, "refs/remotes/{remote}/{branch}")
        } else {
            write!(f, "refs/remotes/{remote}/{reference}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_reference_name_is_idempotent() {
        assert_eq!(BranchReferenceName("main").to_string(), "refs/heads/main");
        assert_eq!(
            BranchReferenceName("refs/heads/main").to_string(),
            "refs/heads/main"
        );
    }

    #[test]
    fn tag_reference_name_is_idempotent() {
        assert_eq!(TagReferenceName("v1").to_string(), "refs/tags/v1");
        assert_eq!(
            TagReferenceName("refs/tags/v1").to_string(),
            "refs/tags/v1"
        );
    }

    #[test]
    fn remote_ref_passes_tags_through() {
        assert_eq!(
            RemoteRef("refs/tags/v1", "origin").to_string(),
            "refs/tags/v1"
        );
        assert_eq!(
            RemoteRef("refs/heads/main", "origin").to_string(),
            "refs/remotes/origin/main"
        );
    }

    #[test]
    fn ref_spec_prefixes_non_fast_forward() {
        assert_eq!(
            ref_spec("main", "origin", false),
            "+refs/heads/main:refs/remotes/origin/main"
        );
        assert_eq!(
            ref_spec("main", "origin", true),
            "refs/heads/main:refs/remotes/origin/main"
        );
    }

    #[test]
    fn ref_spec_tags_are_always_fast_forward_only() {
        assert_eq!(
            ref_spec("refs/tags/v1", "origin", false),
            "refs/tags/v1:refs/tags/v1"
        );
    }
}
