// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Reading and writing objects in a repository's content-addressed store.

use std::time::UNIX_EPOCH;

use gittuf_hash::ObjectId;

use crate::{repo::Repository, Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            other => Err(Error::InvalidObjectType(other.to_string())),
        }
    }
}

/// A single entry in a tree, as fed to `git mktree`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeEntry {
    pub mode: TreeEntryMode,
    pub name: String,
    pub id: ObjectId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TreeEntryMode {
    Blob,
    Tree,
}

impl TreeEntryMode {
    fn octal(&self) -> &'static str {
        match self {
            TreeEntryMode::Blob => "100644",
            TreeEntryMode::Tree => "040000",
        }
    }

    fn object_type(&self) -> ObjectType {
        match self {
            TreeEntryMode::Blob => ObjectType::Blob,
            TreeEntryMode::Tree => ObjectType::Tree,
        }
    }

    /// Accepts the two modes the tree builder is specified to support;
    /// rejects anything else (symlinks, gitlinks, executable bit).
    pub fn from_octal(mode: u32) -> Result<Self> {
        match mode {
            0o100644 => Ok(TreeEntryMode::Blob),
            0o040000 => Ok(TreeEntryMode::Tree),
            other => Err(Error::UnsupportedTreeEntryMode(other)),
        }
    }
}

/// Pipe `bytes` into the object database as a blob, verifying that Git
/// reports writing exactly as many bytes as were supplied.
pub fn write_blob(repo: &Repository, bytes: &[u8]) -> Result<ObjectId> {
    let output = repo
        .executor()
        .with_args(["hash-object", "-t", "blob", "-w", "--stdin"])
        .with_stdin(bytes.to_vec())
        .execute()?;

    if output.status != 0 {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(crate::executor::Error::NonZeroExit {
            args: "hash-object -t blob -w --stdin".to_string(),
            status: output.status,
            stderr,
        }
        .into());
    }

    let written = output.stdin_bytes_written;
    let input = bytes.len();
    if written != input {
        return Err(Error::WrittenBlobLengthMismatch { input, written });
    }

    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(ObjectId::from_hex(id)?)
}

pub fn read_blob(repo: &Repository, id: &ObjectId) -> Result<Vec<u8>> {
    let ty = get_object_type(repo, id)?;
    if ty != ObjectType::Blob {
        return Err(Error::NotABlob(id.clone()));
    }

    let output = repo
        .executor()
        .with_args(["cat-file", "-p", id.as_str()])
        .execute()?;
    if output.status != 0 {
        return Err(Error::ObjectNotFound(id.clone()));
    }
    Ok(output.stdout)
}

/// The empty blob's id, computed fresh each time (rather than hard-coded) so
/// that SHA-256 repositories get the SHA-256 empty blob id.
pub fn empty_blob(repo: &Repository) -> Result<ObjectId> {
    write_blob(repo, b"")
}

/// The empty tree's id, likewise computed on the fly.
pub fn empty_tree(repo: &Repository) -> Result<ObjectId> {
    write_tree(repo, &[])
}

/// Write a tree from already-sorted-or-not entries; entries are sorted by
/// name before being handed to `mktree`, matching Git's own canonical tree
/// ordering requirement.
pub fn write_tree(repo: &Repository, entries: &[TreeEntry]) -> Result<ObjectId> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut input = String::new();
    for entry in &sorted {
        input.push_str(entry.mode.octal());
        input.push(' ');
        input.push_str(entry.mode.object_type().as_str());
        input.push(' ');
        input.push_str(entry.id.as_str());
        input.push('\t');
        input.push_str(&entry.name);
        input.push('\n');
    }

    let id = repo
        .executor()
        .with_args(["mktree"])
        .with_stdin(input.into_bytes())
        .execute_string()?;

    Ok(ObjectId::from_hex(id)?)
}

/// An author/committer/tagger identity as supplied by a caller writing a
/// new object. Deliberately carries no timestamp: author and committer
/// dates are always sourced from the repository's [`crate::repo::Clock`],
/// so that a commit's id stays reproducible under a pinned clock rather
/// than drifting with wall-clock time (see [`write_commit`]).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// A name/email/timestamp triple as it appears on an `author`, `committer`
/// or `tagger` line of a raw object, as read back by [`read_commit`]/
/// [`read_tag`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stamp {
    pub name: String,
    pub email: String,
    /// Unix seconds.
    pub time: i64,
    /// Git's `+HHMM`/`-HHMM` offset syntax.
    pub offset: String,
}

/// `(treeId, parentIds (ordered, zero-filtered), author, committer,
/// message, optional armored signature)`. Signing modifies only the
/// signature field; the hash is computed over the encoding without it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Commit {
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Stamp,
    pub committer: Stamp,
    pub message: String,
    pub signature: Option<String>,
}

/// `(targetId, targetType, name, tagger, message, optional armored
/// signature)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tag {
    pub target_id: ObjectId,
    pub target_type: ObjectType,
    pub name: String,
    pub tagger: Stamp,
    pub message: String,
    pub signature: Option<String>,
}

fn unix_seconds(repo: &Repository) -> Result<i64> {
    let elapsed = repo
        .clock()
        .now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::ClockBeforeUnixEpoch)?;
    Ok(elapsed.as_secs() as i64)
}

/// Create a commit from `tree`/`parents`/`author`/`committer`/`message` via
/// `commit-tree`, with both the author and committer dates set from the
/// repository's logical clock (`GIT_AUTHOR_DATE`/`GIT_COMMITTER_DATE`) so
/// that identical inputs under a pinned clock yield identical commit ids.
/// Zero ids in `parents` are dropped, matching the "zero-filtered" parent
/// list invariant.
pub fn write_commit(
    repo: &Repository,
    tree: &ObjectId,
    parents: &[ObjectId],
    author: &Identity,
    committer: &Identity,
    message: &str,
) -> Result<ObjectId> {
    let time = unix_seconds(repo)?;
    let offset = "+0000";

    let mut args = vec!["commit-tree".to_string(), tree.as_str().to_string()];
    for parent in parents.iter().filter(|p| !p.is_zero()) {
        args.push("-p".to_string());
        args.push(parent.as_str().to_string());
    }
    args.push("-m".to_string());
    args.push(message.to_string());

    let id = repo
        .executor()
        .with_args(args)
        .with_env("GIT_AUTHOR_NAME", author.name.as_str())
        .with_env("GIT_AUTHOR_EMAIL", author.email.as_str())
        .with_env("GIT_AUTHOR_DATE", format!("{time} {offset}"))
        .with_env("GIT_COMMITTER_NAME", committer.name.as_str())
        .with_env("GIT_COMMITTER_EMAIL", committer.email.as_str())
        .with_env("GIT_COMMITTER_DATE", format!("{time} {offset}"))
        .execute_string()?;

    tracing::debug!(%tree, parents = parents.len(), "wrote commit");
    Ok(ObjectId::from_hex(id)?)
}

/// Parse a commit's raw `cat-file -p` text into a [`Commit`]. Fails with
/// [`Error::NotACommit`] if `id` names a different object type.
pub fn read_commit(repo: &Repository, id: &ObjectId) -> Result<Commit> {
    if get_object_type(repo, id)? != ObjectType::Commit {
        return Err(Error::NotACommit(id.clone()));
    }

    let raw = repo
        .executor()
        .with_args(["cat-file", "-p", id.as_str()])
        .execute_string()
        .map_err(|_| Error::ObjectNotFound(id.clone()))?;

    let mut tree_id = None;
    let mut parent_ids = Vec::new();
    let mut author = None;
    let mut committer = None;
    let mut signature_lines: Vec<String> = Vec::new();
    let mut in_signature = false;
    let mut message_lines: Vec<&str> = Vec::new();
    let mut in_header = true;

    for line in raw.lines() {
        if !in_header {
            message_lines.push(line);
            continue;
        }
        if in_signature {
            if let Some(rest) = line.strip_prefix(' ') {
                signature_lines.push(rest.to_string());
                continue;
            }
            in_signature = false;
        }
        if line.is_empty() {
            in_header = false;
            continue;
        }
        if let Some(rest) = line.strip_prefix("tree ") {
            tree_id = Some(ObjectId::from_hex(rest)?);
        } else if let Some(rest) = line.strip_prefix("parent ") {
            parent_ids.push(ObjectId::from_hex(rest)?);
        } else if let Some(rest) = line.strip_prefix("author ") {
            author = Some(parse_stamp(id, rest)?);
        } else if let Some(rest) = line.strip_prefix("committer ") {
            committer = Some(parse_stamp(id, rest)?);
        } else if let Some(rest) = line.strip_prefix("gpgsig ") {
            in_signature = true;
            signature_lines.push(rest.to_string());
        }
    }

    Ok(Commit {
        tree_id: tree_id.ok_or_else(|| Error::MalformedObjectText(id.clone()))?,
        parent_ids,
        author: author.ok_or_else(|| Error::MalformedObjectText(id.clone()))?,
        committer: committer.ok_or_else(|| Error::MalformedObjectText(id.clone()))?,
        message: message_lines.join("\n"),
        signature: (!signature_lines.is_empty()).then(|| signature_lines.join("\n")),
    })
}

/// Create an annotated tag object naming `target` (of `target_type`) as
/// `name`, with the tagger date set from the repository's logical clock.
/// Written directly via `hash-object -t tag -w --stdin` rather than
/// `tag -a`, so no working tree or current `HEAD` is required.
pub fn write_tag(
    repo: &Repository,
    target: &ObjectId,
    target_type: ObjectType,
    name: &str,
    tagger: &Identity,
    message: &str,
) -> Result<ObjectId> {
    let time = unix_seconds(repo)?;
    let offset = "+0000";

    let mut text = String::new();
    text.push_str(&format!("object {}\n", target.as_str()));
    text.push_str(&format!("type {}\n", target_type.as_str()));
    text.push_str(&format!("tag {name}\n"));
    text.push_str(&format!(
        "tagger {} <{}> {time} {offset}\n",
        tagger.name, tagger.email
    ));
    text.push('\n');
    text.push_str(message);
    if !message.ends_with('\n') {
        text.push('\n');
    }

    let id = repo
        .executor()
        .with_args(["hash-object", "-t", "tag", "-w", "--stdin"])
        .with_stdin(text.into_bytes())
        .execute_string()?;

    tracing::debug!(%target, %name, "wrote annotated tag");
    Ok(ObjectId::from_hex(id)?)
}

/// Parse an annotated tag's raw `cat-file -p` text into a [`Tag`]. Fails
/// with [`Error::NotATag`] if `id` names a different object type.
pub fn read_tag(repo: &Repository, id: &ObjectId) -> Result<Tag> {
    if get_object_type(repo, id)? != ObjectType::Tag {
        return Err(Error::NotATag(id.clone()));
    }

    let raw = repo
        .executor()
        .with_args(["cat-file", "-p", id.as_str()])
        .execute_string()
        .map_err(|_| Error::ObjectNotFound(id.clone()))?;

    let (header, rest) = raw
        .split_once("\n\n")
        .ok_or_else(|| Error::MalformedObjectText(id.clone()))?;

    let mut target_id = None;
    let mut target_type = None;
    let mut name = None;
    let mut tagger = None;
    for line in header.lines() {
        if let Some(rest) = line.strip_prefix("object ") {
            target_id = Some(ObjectId::from_hex(rest)?);
        } else if let Some(rest) = line.strip_prefix("type ") {
            target_type = Some(rest.parse()?);
        } else if let Some(rest) = line.strip_prefix("tag ") {
            name = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("tagger ") {
            tagger = Some(parse_stamp(id, rest)?);
        }
    }

    // Tags append the signature straight after the free-form message,
    // delimited by the PEM `BEGIN` marker rather than a header field.
    let (message, signature) = match rest.find("-----BEGIN ") {
        Some(idx) => (rest[..idx].to_string(), Some(rest[idx..].to_string())),
        None => (rest.to_string(), None),
    };

    Ok(Tag {
        target_id: target_id.ok_or_else(|| Error::MalformedObjectText(id.clone()))?,
        target_type: target_type.ok_or_else(|| Error::MalformedObjectText(id.clone()))?,
        name: name.ok_or_else(|| Error::MalformedObjectText(id.clone()))?,
        tagger: tagger.ok_or_else(|| Error::MalformedObjectText(id.clone()))?,
        message,
        signature,
    })
}

/// Parse a `name <email> <unix-seconds> <+/-HHMM>` identity line (the text
/// following the `author `/`committer `/`tagger ` prefix).
fn parse_stamp(id: &ObjectId, rest: &str) -> Result<Stamp> {
    let lt = rest.rfind('<').ok_or_else(|| Error::MalformedObjectText(id.clone()))?;
    let gt = rest.rfind('>').ok_or_else(|| Error::MalformedObjectText(id.clone()))?;
    let name = rest[..lt].trim().to_string();
    let email = rest[lt + 1..gt].to_string();

    let mut fields = rest[gt + 1..].split_whitespace();
    let time = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::MalformedObjectText(id.clone()))?;
    let offset = fields.next().unwrap_or("+0000").to_string();

    Ok(Stamp { name, email, time, offset })
}

pub fn get_object_type(repo: &Repository, id: &ObjectId) -> Result<ObjectType> {
    let out = repo
        .executor()
        .with_args(["cat-file", "-t", id.as_str()])
        .execute_string()
        .map_err(|_| Error::ObjectNotFound(id.clone()))?;
    out.parse()
}

pub fn get_object_size(repo: &Repository, id: &ObjectId) -> Result<u64> {
    let out = repo
        .executor()
        .with_args(["cat-file", "-s", id.as_str()])
        .execute_string()
        .map_err(|_| Error::ObjectNotFound(id.clone()))?;
    out.parse()
        .map_err(|_| Error::ObjectNotFound(id.clone()))
}

pub fn has_object(repo: &Repository, id: &ObjectId) -> bool {
    repo.executor()
        .with_args(["cat-file", "-e", id.as_str()])
        .execute()
        .map(|o| o.status == 0)
        .unwrap_or(false)
}

/// Whether the blob's content is binary.
///
/// On modern Git, `merge-file --object-id` is probed first: merging a blob
/// against itself is always content-trivial, so a non-zero exit with a
/// "Cannot merge binary files" stderr can only mean Git's own binary sniff
/// fired, not a real conflict. Git versions lacking that flag (or any other
/// failure reaching it) fall back to diffing against the empty blob and
/// inspecting whether `diff --numstat` reports a `-` byte count.
pub fn is_blob_binary(repo: &Repository, id: &ObjectId) -> Result<bool> {
    if let Some(is_binary) = probe_binary_via_merge_file(repo, id) {
        return Ok(is_binary);
    }
    is_blob_binary_via_numstat(repo, id)
}

fn probe_binary_via_merge_file(repo: &Repository, id: &ObjectId) -> Option<bool> {
    let output = repo
        .executor()
        .with_args(["merge-file", "--object-id", "-p", id.as_str(), id.as_str(), id.as_str()])
        .execute()
        .ok()?;

    if output.status == 0 {
        return Some(false);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("Cannot merge binary files") {
        return Some(true);
    }
    // Unrecognized flag, git too old, or some other failure reaching the
    // probe at all: let the caller fall back to the numstat heuristic.
    None
}

fn is_blob_binary_via_numstat(repo: &Repository, id: &ObjectId) -> Result<bool> {
    let empty = empty_blob(repo)?;
    let out = repo
        .executor()
        .with_args(["diff", "--numstat", empty.as_str(), id.as_str()])
        .execute_string()
        .unwrap_or_default();

    // Format: "<added>\t<removed>\t<path>"; binary blobs report "-\t-\t...".
    Ok(out
        .split_whitespace()
        .next()
        .map(|first| first == "-")
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_entry_mode_rejects_unsupported_modes() {
        assert!(TreeEntryMode::from_octal(0o100644).is_ok());
        assert!(TreeEntryMode::from_octal(0o040000).is_ok());
        assert!(matches!(
            TreeEntryMode::from_octal(0o120000),
            Err(Error::UnsupportedTreeEntryMode(0o120000))
        ));
    }

    #[test]
    fn object_type_round_trips_through_str() {
        for ty in [
            ObjectType::Blob,
            ObjectType::Tree,
            ObjectType::Commit,
            ObjectType::Tag,
        ] {
            let parsed: ObjectType = ty.as_str().parse().unwrap();
            assert_eq!(parsed, ty);
        }
        assert!("garbage".parse::<ObjectType>().is_err());
    }

    fn dummy_id() -> ObjectId {
        ObjectId::from_hex("e".repeat(40)).unwrap()
    }

    #[test]
    fn parse_stamp_splits_name_email_time_offset() {
        let stamp = parse_stamp(&dummy_id(), "Jane Doe <jane@example.com> 1700000000 -0700").unwrap();
        assert_eq!(stamp.name, "Jane Doe");
        assert_eq!(stamp.email, "jane@example.com");
        assert_eq!(stamp.time, 1700000000);
        assert_eq!(stamp.offset, "-0700");
    }

    #[test]
    fn parse_stamp_rejects_missing_email_brackets() {
        assert!(matches!(
            parse_stamp(&dummy_id(), "Jane Doe jane@example.com 1700000000 -0700"),
            Err(Error::MalformedObjectText(_))
        ));
    }
}
