// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Dispatch entry for verifying a commit or tag's signature against a
//! principal's declared key.

use gittuf_git::{object::ObjectType, repo::Repository};
use gittuf_hash::ObjectId;

use crate::{
    backend::{verify_gpg, verify_sigstore, verify_ssh, GpgVerifier, SigstoreConfig, SigstoreVerifier, SshVerifier},
    error::{Error, Result},
    key::VerificationKey,
};

/// Every concrete verifier a caller wires in; `verify_signature` looks at
/// the `key` it's asked to check against and routes into exactly one of
/// these.
pub struct Verifiers<'a> {
    pub gpg: &'a dyn GpgVerifier,
    pub ssh: &'a dyn SshVerifier,
    pub sigstore: &'a dyn SigstoreVerifier,
    pub sigstore_config: SigstoreConfig<'a>,
}

/// Probes `object_id`'s type and routes to commit or tag verification;
/// anything that is not a commit or a tag fails with
/// [`Error::NotCommitOrTag`].
pub fn verify_signature(
    repo: &Repository,
    object_id: &ObjectId,
    key: &VerificationKey,
    verifiers: &Verifiers<'_>,
) -> Result<()> {
    let ty = gittuf_git::object::get_object_type(repo, object_id)?;
    match ty {
        ObjectType::Commit => verify_commit_signature(repo, object_id, key, verifiers),
        ObjectType::Tag => verify_tag_signature(repo, object_id, key, verifiers),
        _ => Err(Error::NotCommitOrTag),
    }
}

fn raw_object(repo: &Repository, object_id: &ObjectId) -> Result<String> {
    let raw = repo
        .executor()
        .with_args(["cat-file", "-p", object_id.as_str()])
        .execute_string()
        .map_err(gittuf_git::Error::from)?;
    Ok(raw)
}

/// Splits a commit's raw text into `(payload-without-signature, signature)`.
/// The signature lives in a `gpgsig` header, whose continuation lines are
/// indented with a single leading space per Git's trailer-folding rule.
fn split_commit_signature(raw: &str) -> (String, Option<String>) {
    let mut payload_lines = Vec::new();
    let mut signature_lines: Vec<String> = Vec::new();
    let mut in_signature = false;

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("gpgsig ") {
            in_signature = true;
            signature_lines.push(rest.to_string());
            continue;
        }
        if in_signature {
            if let Some(rest) = line.strip_prefix(' ') {
                signature_lines.push(rest.to_string());
                continue;
            }
            in_signature = false;
        }
        payload_lines.push(line);
    }

    let signature = (!signature_lines.is_empty()).then(|| signature_lines.join("\n"));
    (payload_lines.join("\n"), signature)
}

/// Tags carry their signature appended to the free-form message, delimited
/// by a `BEGIN ... SIGNATURE` PEM marker; everything before the marker is
/// the signable payload.
fn split_tag_signature(raw: &str) -> (String, Option<String>) {
    match raw.find("-----BEGIN ") {
        Some(idx) => (raw[..idx].to_string(), Some(raw[idx..].to_string())),
        None => (raw.to_string(), None),
    }
}

fn dispatch(
    payload: &str,
    signature: Option<String>,
    key: &VerificationKey,
    verifiers: &Verifiers<'_>,
) -> Result<()> {
    let signature = signature.ok_or(Error::InvalidSignature(
        "object carries no signature".to_string(),
    ))?;

    match key {
        VerificationKey::Gpg { armored_public_key } => {
            verify_gpg(verifiers.gpg, payload.as_bytes(), &signature, armored_public_key)
        },
        VerificationKey::Ssh { public_key } => {
            verify_ssh(verifiers.ssh, payload.as_bytes(), &signature, public_key)
        },
        VerificationKey::Sigstore { identity } => verify_sigstore(
            verifiers.sigstore,
            payload.as_bytes(),
            &signature,
            &verifiers.sigstore_config,
            identity,
        ),
    }
}

fn verify_commit_signature(
    repo: &Repository,
    object_id: &ObjectId,
    key: &VerificationKey,
    verifiers: &Verifiers<'_>,
) -> Result<()> {
    let raw = raw_object(repo, object_id)?;
    let (payload, signature) = split_commit_signature(&raw);
    dispatch(&payload, signature, key, verifiers)
}

fn verify_tag_signature(
    repo: &Repository,
    object_id: &ObjectId,
    key: &VerificationKey,
    verifiers: &Verifiers<'_>,
) -> Result<()> {
    let raw = raw_object(repo, object_id)?;
    let (payload, signature) = split_tag_signature(&raw);
    dispatch(&payload, signature, key, verifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_commit_signature_header() {
        let raw = "tree abc\nparent def\nauthor a <a@example.com> 0 +0000\ncommitter a <a@example.com> 0 +0000\ngpgsig -----BEGIN PGP SIGNATURE-----\n iQEz...\n -----END PGP SIGNATURE-----\n\nmessage body\n";
        let (payload, signature) = split_commit_signature(raw);
        assert!(!payload.contains("gpgsig"));
        assert!(payload.contains("message body"));
        let sig = signature.unwrap();
        assert!(sig.starts_with("-----BEGIN PGP SIGNATURE-----"));
        assert!(sig.contains("iQEz..."));
    }

    #[test]
    fn splits_tag_signature_suffix() {
        let raw = "object abc\ntype commit\ntag v1\ntagger a <a@example.com> 0 +0000\n\nrelease notes\n-----BEGIN SSH SIGNATURE-----\ndata\n-----END SSH SIGNATURE-----\n";
        let (payload, signature) = split_tag_signature(raw);
        assert!(payload.contains("release notes"));
        assert!(!payload.contains("BEGIN SSH SIGNATURE"));
        assert!(signature.unwrap().starts_with("-----BEGIN SSH SIGNATURE-----"));
    }

    #[test]
    fn no_signature_present() {
        let (_, signature) = split_tag_signature("object abc\ntype commit\ntag v1\n\nnotes\n");
        assert!(signature.is_none());
    }
}
