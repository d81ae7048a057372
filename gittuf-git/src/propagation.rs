// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Copying another repository's tree contents into a subtree of this one.

use gittuf_hash::ObjectId;

use crate::{
    diff::get_commit_file_paths,
    object::{self, TreeEntry, TreeEntryMode},
    refs,
    repo::Repository,
    tree::TreeBuilder,
    Error, Result,
};

/// Pull `upstream_commit_id`'s tree (read through `upstream`) into
/// `local_path` of `local_ref`, committing the result with an
/// auto-generated message.
///
/// 1. `local_path` must be non-empty — propagating into the tree root has
///    no well-defined "replace this subtree" semantics.
/// 2. Existing entries under `local_ref`'s current tip are preserved except
///    those rooted at `local_path` (checked with a trailing slash, so that
///    `local_path = "foo"` doesn't also swallow a sibling `"foobar/"`).
/// 3. If the local object store already has the upstream tree by id, it is
///    grafted in directly — no blob copying needed.
/// 4. Otherwise every blob under the upstream tree is copied one at a time,
///    verified by id, and re-attached under `local_path`.
pub fn propagate_upstream_repository_contents(
    repo: &Repository,
    upstream: &Repository,
    upstream_commit_id: &ObjectId,
    local_ref: &str,
    local_path: &str,
) -> Result<ObjectId> {
    if local_path.is_empty() {
        return Err(Error::CannotPropagateIntoRootTree);
    }

    let prefix = format!("{local_path}/");
    let previous_tip = refs::get_reference(repo, local_ref).ok();

    let mut retained: Vec<(String, ObjectId)> = Vec::new();
    if let Some(tip) = &previous_tip {
        for path in get_commit_file_paths(repo, tip)? {
            if !path.starts_with(&prefix) {
                let id = blob_id_at_path(repo, tip, &path)?;
                retained.push((path, id));
            }
        }
    }

    let upstream_tree = tree_of_commit(upstream, upstream_commit_id)?;

    let root_tree = if object::has_object(repo, &upstream_tree) {
        graft_tree_entry(repo, retained, local_path, upstream_tree)?
    } else {
        for path in get_commit_file_paths(upstream, upstream_commit_id)? {
            let upstream_blob_id = blob_id_at_path(upstream, upstream_commit_id, &path)?;
            let bytes = object::read_blob(upstream, &upstream_blob_id)?;
            let local_blob_id = object::write_blob(repo, &bytes)?;
            if local_blob_id != upstream_blob_id {
                return Err(Error::CopyingBlobIDsDoNotMatch {
                    expected: upstream_blob_id,
                    actual: local_blob_id,
                });
            }
            retained.push((format!("{prefix}{path}"), local_blob_id));
        }
        TreeBuilder::from_entries(retained).write(repo)?
    };

    commit(repo, local_ref, previous_tip.as_ref(), root_tree, local_path)
}

/// Build the retained entries into a tree, then graft `upstream_tree` in
/// directly as a single tree-typed entry named `local_path` — this is the
/// "already have the object" fast path and needs no blob copying.
fn graft_tree_entry(
    repo: &Repository,
    retained: Vec<(String, ObjectId)>,
    local_path: &str,
    upstream_tree: ObjectId,
) -> Result<ObjectId> {
    let retained_root = TreeBuilder::from_entries(retained).write(repo)?;
    let mut entries = ls_tree_entries(repo, &retained_root)?;
    entries.retain(|e| e.name != local_path);
    entries.push(TreeEntry {
        mode: TreeEntryMode::Tree,
        name: local_path.to_string(),
        id: upstream_tree,
    });
    object::write_tree(repo, &entries)
}

fn ls_tree_entries(repo: &Repository, tree: &ObjectId) -> Result<Vec<TreeEntry>> {
    let out = repo
        .executor()
        .with_args(["ls-tree", tree.as_str()])
        .execute_string()?;
    let mut entries = Vec::new();
    for line in out.lines() {
        let (meta, name) = line
            .split_once('\t')
            .ok_or_else(|| Error::ObjectNotFound(tree.clone()))?;
        let mut fields = meta.split(' ');
        let mode = fields.next().unwrap_or_default();
        let _ty = fields.next();
        let id = fields.next().unwrap_or_default();
        let mode =
            u32::from_str_radix(mode, 8).map_err(|_| Error::ObjectNotFound(tree.clone()))?;
        entries.push(TreeEntry {
            mode: TreeEntryMode::from_octal(mode)?,
            name: name.to_string(),
            id: ObjectId::from_hex(id)?,
        });
    }
    Ok(entries)
}

fn tree_of_commit(repo: &Repository, commit: &ObjectId) -> Result<ObjectId> {
    let out = repo
        .executor()
        .with_args(["rev-parse", &format!("{commit}^{{tree}}")])
        .execute_string()?;
    Ok(ObjectId::from_hex(out)?)
}

fn blob_id_at_path(repo: &Repository, commit: &ObjectId, path: &str) -> Result<ObjectId> {
    let out = repo
        .executor()
        .with_args(["rev-parse", &format!("{commit}:{path}")])
        .execute_string()?;
    Ok(ObjectId::from_hex(out)?)
}

/// The identity recorded on automated propagation commits; there is no
/// human principal behind them, so author and committer are both this
/// fixed identity rather than something read out of local git config.
fn system_identity() -> object::Identity {
    object::Identity {
        name: "gittuf".to_string(),
        email: "gittuf@localhost".to_string(),
    }
}

fn commit(
    repo: &Repository,
    local_ref: &str,
    previous_tip: Option<&ObjectId>,
    tree: ObjectId,
    local_path: &str,
) -> Result<ObjectId> {
    let message = format!("Update contents of '{local_path}'");
    let parents: Vec<ObjectId> = previous_tip.cloned().into_iter().collect();
    let identity = system_identity();

    let new_commit = object::write_commit(repo, &tree, &parents, &identity, &identity, &message)?;

    match previous_tip {
        Some(old) => refs::check_and_set_reference(repo, local_ref, &new_commit, old)?,
        None => refs::set_reference(repo, local_ref, &new_commit)?,
    }

    Ok(new_commit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_local_path_is_rejected() {
        // `propagate_upstream_repository_contents` bails out before it ever
        // touches a `Repository`, so this is checkable without a real repo.
        assert!(matches!(
            validate_local_path(""),
            Err(Error::CannotPropagateIntoRootTree)
        ));
        assert!(validate_local_path("vendor/upstream").is_ok());
    }

    fn validate_local_path(local_path: &str) -> Result<()> {
        if local_path.is_empty() {
            return Err(Error::CannotPropagateIntoRootTree);
        }
        Ok(())
    }
}
