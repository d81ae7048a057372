// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Blob-path enumeration, diffing, reachability and merge-tree computation.

use std::collections::BTreeSet;

use gittuf_hash::ObjectId;

use crate::{repo::Repository, Error, Result};

/// All blob paths reachable from a commit's tree, sorted ascending.
pub fn get_commit_file_paths(repo: &Repository, commit: &ObjectId) -> Result<Vec<String>> {
    let out = repo
        .executor()
        .with_args(["ls-tree", "-r", "--name-only", commit.as_str()])
        .execute_string()?;
    let mut paths: Vec<String> = out.lines().map(str::to_string).collect();
    paths.sort();
    Ok(paths)
}

/// The union of `from.name`/`to.name` over the raw diff between two
/// commits. Renames deliberately appear twice (once as source, once as
/// destination) — this mirrors what a path-level "what changed" view needs:
/// both the path that stopped existing and the path that started existing.
pub fn get_diff_file_paths(
    repo: &Repository,
    a: Option<&ObjectId>,
    b: Option<&ObjectId>,
) -> Result<Vec<String>> {
    match (a, b) {
        (None, None) => Err(Error::BothCommitsEmpty),
        (Some(only), None) | (None, Some(only)) => get_commit_file_paths(repo, only),
        (Some(a), Some(b)) => {
            let out = repo
                .executor()
                .with_args(["diff", "--name-status", "-z", a.as_str(), b.as_str()])
                .execute_string()?;

            let mut paths = BTreeSet::new();
            let mut fields = out.split('\0').filter(|s| !s.is_empty());
            while let Some(status) = fields.next() {
                let status = status.chars().next().unwrap_or(' ');
                if status == 'R' || status == 'C' {
                    if let Some(from) = fields.next() {
                        paths.insert(from.to_string());
                    }
                    if let Some(to) = fields.next() {
                        paths.insert(to.to_string());
                    }
                } else if let Some(path) = fields.next() {
                    paths.insert(path.to_string());
                }
            }
            Ok(paths.into_iter().collect())
        },
    }
}

fn parents(repo: &Repository, commit: &ObjectId) -> Result<Vec<ObjectId>> {
    let out = repo
        .executor()
        .with_args(["rev-list", "--parents", "-n", "1", commit.as_str()])
        .execute_string()?;
    out.split_whitespace()
        .skip(1)
        .map(|s| ObjectId::from_hex(s).map_err(Error::from))
        .collect()
}

/// Paths changed by a single commit, relative to its parentage:
/// - zero parents: every path in the commit's tree
/// - one parent: the diff against that parent
/// - more than one parent (a merge): empty, by definition — merges are
///   defined to introduce no changes of their own.
pub fn get_file_paths_changed_by_commit(
    repo: &Repository,
    commit: &ObjectId,
) -> Result<Vec<String>> {
    let parents = parents(repo, commit)?;
    match parents.as_slice() {
        [] => get_commit_file_paths(repo, commit),
        [parent] => get_diff_file_paths(repo, Some(commit), Some(parent)),
        _ => Ok(Vec::new()),
    }
}

/// Commits reachable from `new` (and, if `old` is non-zero, not reachable
/// from `old`), sorted ascending by hex id to erase the nondeterminism
/// inherited from `rev-list`'s traversal order.
///
/// Passing `new` as an ancestor of `old` is well-defined and simply returns
/// the empty set.
pub fn get_commits_between_range(
    repo: &Repository,
    new: &ObjectId,
    old: &ObjectId,
) -> Result<Vec<ObjectId>> {
    let range = if old.is_zero() {
        new.as_str().to_string()
    } else {
        format!("{}..{}", old.as_str(), new.as_str())
    };

    let out = repo
        .executor()
        .with_args(["rev-list", &range])
        .execute_string()?;

    let mut commits: Vec<ObjectId> = out
        .lines()
        .map(ObjectId::from_hex)
        .collect::<std::result::Result<_, _>>()?;
    commits.sort();
    Ok(commits)
}

/// The tree that results from merging `b` into `a`.
///
/// `a` being the zero id models fast-forward semantics: the result is
/// simply `b`'s tree. Otherwise modern Git's plumbing `merge-tree a b` is
/// used; lacking that, this falls back to recording the current branch,
/// detaching onto `a`, attempting `merge b`, extracting `%T` from the
/// resulting commit, and restoring the original branch. If the merge
/// cannot be completed the fallback aborts it and reports the original
/// failure, never leaving the working tree mid-merge.
pub fn get_merge_tree(repo: &Repository, a: &ObjectId, b: &ObjectId) -> Result<ObjectId> {
    if a.is_zero() {
        return get_tree_of_commit(repo, b);
    }

    let modern = repo
        .executor()
        .with_args(["merge-tree", a.as_str(), b.as_str()])
        .execute_string();

    if let Ok(id) = modern {
        return Ok(ObjectId::from_hex(id.trim())?);
    }

    legacy_merge_tree(repo, a, b)
}

fn get_tree_of_commit(repo: &Repository, commit: &ObjectId) -> Result<ObjectId> {
    let out = repo
        .executor()
        .with_args(["rev-parse", &format!("{commit}^{{tree}}")])
        .execute_string()?;
    Ok(ObjectId::from_hex(out)?)
}

fn legacy_merge_tree(repo: &Repository, a: &ObjectId, b: &ObjectId) -> Result<ObjectId> {
    let original_branch = repo
        .executor()
        .with_args(["symbolic-ref", "--short", "HEAD"])
        .execute_string()
        .ok();

    let restore = |repo: &Repository| {
        if let Some(branch) = &original_branch {
            let _ = repo
                .executor()
                .with_args(["checkout", branch])
                .execute_string();
        }
    };

    let detach = repo
        .executor()
        .with_args(["checkout", "--detach", a.as_str()])
        .execute_string();
    if let Err(e) = detach {
        return Err(e.into());
    }

    let merge = repo
        .executor()
        .with_args(["merge", "--no-commit", b.as_str()])
        .execute_string();

    let result = match merge {
        Ok(_) => repo
            .executor()
            .with_args(["log", "-1", "--format=%T"])
            .execute_string()
            .map_err(Error::from)
            .and_then(|s| ObjectId::from_hex(s).map_err(Error::from)),
        Err(e) => {
            let _ = repo.executor().with_args(["merge", "--abort"]).execute();
            Err(e.into())
        },
    };

    restore(repo);
    result
}

