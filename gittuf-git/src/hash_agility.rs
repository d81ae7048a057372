// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Bottom-up re-hashing of an object subgraph under a different hash
//! algorithm, with a persisted `{originalId -> newId}` mapping.

use std::collections::BTreeMap;

use gittuf_hash::ObjectId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::{
    object::{self, get_object_type, ObjectType},
    refs,
    repo::Repository,
    Error, Result,
};

pub const HASH_AGILITY_REF: &str = "refs/gittuf/hash-agility";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetAlgorithm {
    Sha256,
    Sha512,
}

impl TargetAlgorithm {
    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        match self {
            TargetAlgorithm::Sha256 => Sha256::digest(bytes).to_vec(),
            TargetAlgorithm::Sha512 => Sha512::digest(bytes).to_vec(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HashAgilityMapping(BTreeMap<String, String>);

impl HashAgilityMapping {
    pub fn get(&self, original: &ObjectId) -> Option<&String> {
        self.0.get(original.as_str())
    }

    /// Insert `(original, new)`, surfacing [`Error::HashCollisionDetected`]
    /// if `original` is already mapped to a *different* target.
    pub fn insert(&mut self, original: &ObjectId, new: &str) -> Result<()> {
        match self.0.get(original.as_str()) {
            Some(existing) if existing != new => {
                Err(Error::HashCollisionDetected(original.clone()))
            },
            _ => {
                self.0.insert(original.as_str().to_string(), new.to_string());
                Ok(())
            },
        }
    }
}

/// Load the current mapping blob referenced by [`HASH_AGILITY_REF`], or an
/// empty mapping if the reference does not yet exist.
pub fn load_mapping(repo: &Repository) -> Result<HashAgilityMapping> {
    match refs::get_reference(repo, HASH_AGILITY_REF) {
        Ok(commit) => {
            let tree = repo
                .executor()
                .with_args(["rev-parse", &format!("{commit}^{{tree}}")])
                .execute_string()?;
            let blob_id = repo
                .executor()
                .with_args(["rev-parse", &format!("{tree}:mapping.json")])
                .execute_string()?;
            let blob_id = ObjectId::from_hex(blob_id)?;
            let bytes = object::read_blob(repo, &blob_id)?;
            serde_json::from_slice(&bytes).map_err(|_| Error::ObjectNotFound(blob_id))
        },
        Err(Error::ReferenceNotFound(_)) => Ok(HashAgilityMapping::default()),
        Err(other) => Err(other),
    }
}

/// The identity recorded on hash-agility mapping commits; this is an
/// automated maintenance commit, not attributable to a human principal.
fn system_identity() -> object::Identity {
    object::Identity {
        name: "gittuf".to_string(),
        email: "gittuf@localhost".to_string(),
    }
}

/// Persist `mapping` as a blob under [`HASH_AGILITY_REF`], advancing the
/// reference via CAS against its previous tip (or creating it if absent).
pub fn store_mapping(repo: &Repository, mapping: &HashAgilityMapping) -> Result<()> {
    let bytes = serde_json::to_vec(mapping).expect("mapping serializes");
    let blob_id = object::write_blob(repo, &bytes)?;

    let mut builder = crate::tree::TreeBuilder::new();
    builder.insert("mapping.json", blob_id);
    let tree_id = builder.write(repo)?;

    let previous = refs::get_reference(repo, HASH_AGILITY_REF).ok();
    let parents: Vec<ObjectId> = previous.clone().into_iter().collect();
    let identity = system_identity();

    let new_commit = object::write_commit(
        repo,
        &tree_id,
        &parents,
        &identity,
        &identity,
        "Update hash-agility mapping",
    )?;

    match previous {
        Some(old) => refs::check_and_set_reference(repo, HASH_AGILITY_REF, &new_commit, &old)?,
        None => refs::set_reference(repo, HASH_AGILITY_REF, &new_commit)?,
    }
    Ok(())
}

/// Recursively re-hash the object graph rooted at `original`, memoizing
/// results in `mapping` and returning the new-algorithm digest for
/// `original`. Blobs, trees, commits and tags are each re-encoded per their
/// type-specific canonical form before hashing.
pub fn rehash(
    repo: &Repository,
    mapping: &mut HashAgilityMapping,
    original: &ObjectId,
    target: TargetAlgorithm,
) -> Result<String> {
    if let Some(existing) = mapping.get(original) {
        return Ok(existing.clone());
    }

    let ty = get_object_type(repo, original)?;
    let new_hash = match ty {
        ObjectType::Blob => {
            let content = object::read_blob(repo, original)?;
            let header = format!("blob {}\0", content.len());
            hex(target.digest(&[header.as_bytes(), &content].concat()))
        },
        ObjectType::Tree => rehash_tree(repo, mapping, original, target)?,
        ObjectType::Commit => rehash_commit(repo, mapping, original, target)?,
        ObjectType::Tag => rehash_tag(repo, mapping, original, target)?,
    };

    mapping.insert(original, &new_hash)?;
    Ok(new_hash)
}

fn rehash_tree(
    repo: &Repository,
    mapping: &mut HashAgilityMapping,
    original: &ObjectId,
    target: TargetAlgorithm,
) -> Result<String> {
    let out = repo
        .executor()
        .with_args(["ls-tree", original.as_str()])
        .execute_string()?;

    let mut body = Vec::new();
    for line in out.lines() {
        let (meta, name) = line
            .split_once('\t')
            .ok_or_else(|| Error::ObjectNotFound(original.clone()))?;
        let mut fields = meta.split(' ');
        let mode = fields.next().unwrap_or_default();
        let _ty = fields.next();
        let id = fields.next().unwrap_or_default();
        let id = ObjectId::from_hex(id)?;

        let child_hash = rehash(repo, mapping, &id, target)?;
        body.extend_from_slice(format!("{mode} {name}\0").as_bytes());
        body.extend_from_slice(&decode_hex(&child_hash)?);
    }

    let header = format!("tree {}\0", body.len());
    Ok(hex(target.digest(&[header.as_bytes(), body.as_slice()].concat())))
}

fn rehash_commit(
    repo: &Repository,
    mapping: &mut HashAgilityMapping,
    original: &ObjectId,
    target: TargetAlgorithm,
) -> Result<String> {
    let raw = repo
        .executor()
        .with_args(["cat-file", "-p", original.as_str()])
        .execute_string()?;

    let mut new_lines = Vec::new();
    let mut lines = raw.lines();
    let mut message_lines = Vec::new();
    let mut in_header = true;

    while let Some(line) = lines.next() {
        if !in_header {
            message_lines.push(line.to_string());
            continue;
        }
        if line.is_empty() {
            in_header = false;
            continue;
        }
        if let Some(tree_id) = line.strip_prefix("tree ") {
            let new_tree = rehash(repo, mapping, &ObjectId::from_hex(tree_id)?, target)?;
            new_lines.push(format!("tree {new_tree}"));
        } else if let Some(parent_id) = line.strip_prefix("parent ") {
            let new_parent = rehash(repo, mapping, &ObjectId::from_hex(parent_id)?, target)?;
            new_lines.push(format!("parent {new_parent}"));
        } else {
            new_lines.push(line.to_string());
        }
    }

    let mut text = new_lines.join("\n");
    text.push_str("\n\n");
    text.push_str(&message_lines.join("\n"));

    let header = format!("commit {}\0", text.as_bytes().len());
    Ok(hex(target.digest(&[header.as_bytes(), text.as_bytes()].concat())))
}

fn rehash_tag(
    repo: &Repository,
    mapping: &mut HashAgilityMapping,
    original: &ObjectId,
    target: TargetAlgorithm,
) -> Result<String> {
    let raw = repo
        .executor()
        .with_args(["cat-file", "-p", original.as_str()])
        .execute_string()?;

    let mut new_lines = Vec::new();
    for line in raw.lines() {
        if let Some(object_id) = line.strip_prefix("object ") {
            let new_object = rehash(repo, mapping, &ObjectId::from_hex(object_id)?, target)?;
            new_lines.push(format!("object {new_object}"));
        } else {
            new_lines.push(line.to_string());
        }
    }

    let text = new_lines.join("\n");
    let header = format!("tag {}\0", text.as_bytes().len());
    Ok(hex(target.digest(&[header.as_bytes(), text.as_bytes()].concat())))
}

fn hex(bytes: Vec<u8>) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a re-hashed digest's hex string back into raw bytes, for
/// embedding in a parent tree entry's encoding (§4.J: `<mode> <name>\0
/// <new-hash-bytes>`, not the ASCII hex form). Deliberately independent of
/// [`ObjectId::from_hex`]: a `Sha512` digest is 128 hex characters, longer
/// than the 40/64 lengths `ObjectId` accepts.
fn decode_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidHashAgilityDigest(s.to_string()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| Error::InvalidHashAgilityDigest(s.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_round_trips_through_hex() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(decode_hex(&hex(bytes.clone())).unwrap(), bytes);
    }

    #[test]
    fn decode_hex_handles_sha512_length_digests() {
        let sha512_digest_bytes = 64;
        let hex_digest = "ab".repeat(sha512_digest_bytes);
        let decoded = decode_hex(&hex_digest).unwrap();
        assert_eq!(decoded.len(), sha512_digest_bytes);
        assert!(decoded.iter().all(|&b| b == 0xab));
    }

    #[test]
    fn decode_hex_rejects_odd_length() {
        assert!(matches!(
            decode_hex("abc"),
            Err(Error::InvalidHashAgilityDigest(_))
        ));
    }

    #[test]
    fn decode_hex_rejects_non_hex() {
        assert!(matches!(
            decode_hex("zz"),
            Err(Error::InvalidHashAgilityDigest(_))
        ));
    }
}
