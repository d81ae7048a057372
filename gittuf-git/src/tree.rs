// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Building a Git tree object from a flat `path -> blob id` map.

use std::collections::BTreeMap;

use gittuf_hash::ObjectId;

use crate::{
    object::{self, TreeEntry, TreeEntryMode},
    repo::Repository,
    Result,
};

#[derive(Clone, Debug)]
enum PendingEntry {
    Blob(ObjectId),
    /// Index into `TreeBuilder::nodes` of the child directory.
    Tree(usize),
}

#[derive(Default)]
struct Node {
    /// Children in insertion order (matching Git's requirement that the
    /// written tree be sorted is handled by `object::write_tree`, not here).
    entries: Vec<(String, PendingEntry)>,
}

/// Accepts a `path -> blobId` map and builds the tree bottom-up, one
/// `Repository` instance's worth of state at a time.
///
/// A `TreeBuilder` is single-use: it owns its intermediate node table and is
/// not safe to reuse across parallel builds (mirrors [`super::executor`]'s
/// "don't share a mutating executor" rule).
pub struct TreeBuilder {
    /// Index 0 is always the root (empty-string path).
    nodes: Vec<Node>,
    paths: BTreeMap<String, usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        let mut paths = BTreeMap::new();
        paths.insert(String::new(), 0);
        Self {
            nodes: vec![Node::default()],
            paths,
        }
    }

    fn directory(&mut self, path: &str) -> usize {
        if let Some(&idx) = self.paths.get(path) {
            return idx;
        }

        let (parent, name) = match path.rfind('/') {
            Some(pos) => (&path[..pos], &path[pos + 1..]),
            None => ("", path),
        };
        let parent_idx = self.directory(parent);

        let idx = self.nodes.len();
        self.nodes.push(Node::default());
        self.nodes[parent_idx]
            .entries
            .push((name.to_string(), PendingEntry::Tree(idx)));
        self.paths.insert(path.to_string(), idx);
        idx
    }

    pub fn insert(&mut self, path: &str, blob: ObjectId) {
        let (parent, name) = match path.rfind('/') {
            Some(pos) => (&path[..pos], &path[pos + 1..]),
            None => ("", path),
        };
        let parent_idx = self.directory(parent);
        self.nodes[parent_idx]
            .entries
            .push((name.to_string(), PendingEntry::Blob(blob)));
    }

    /// Build from a whole map at once; paths are inserted in sorted order so
    /// that sibling directories are created deterministically (the final
    /// written tree is sorted regardless by `object::write_tree`).
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ObjectId)>) -> Self {
        let mut builder = Self::new();
        let mut sorted: Vec<_> = entries.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        for (path, blob) in sorted {
            builder.insert(&path, blob);
        }
        builder
    }

    /// Recursively materialize every intermediate node as a real tree
    /// object, returning the root tree id. An empty input short-circuits to
    /// the repository's empty-tree id without invoking `mktree`.
    pub fn write(mut self, repo: &Repository) -> Result<ObjectId> {
        if self.nodes[0].entries.is_empty() {
            return object::empty_tree(repo);
        }
        self.write_node(repo, 0)
    }

    fn write_node(&mut self, repo: &Repository, idx: usize) -> Result<ObjectId> {
        let entries = std::mem::take(&mut self.nodes[idx].entries);
        let mut written = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            let (mode, id) = match entry {
                PendingEntry::Blob(id) => (TreeEntryMode::Blob, id),
                PendingEntry::Tree(child_idx) => {
                    let id = self.write_node(repo, child_idx)?;
                    (TreeEntryMode::Tree, id)
                },
            };
            written.push(TreeEntry { mode, name, id });
        }
        object::write_tree(repo, &written)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_short_circuits() {
        let builder = TreeBuilder::new();
        assert!(builder.nodes[0].entries.is_empty());
    }

    #[test]
    fn nested_paths_create_intermediate_directories() {
        let blob = ObjectId::from_hex("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391").unwrap();
        let builder = TreeBuilder::from_entries([("src/main.rs".to_string(), blob.clone())]);
        assert_eq!(builder.nodes.len(), 2);
        assert_eq!(builder.nodes[0].entries.len(), 1);
        assert!(matches!(
            builder.nodes[0].entries[0].1,
            PendingEntry::Tree(1)
        ));
        assert_eq!(builder.nodes[1].entries.len(), 1);
    }
}
