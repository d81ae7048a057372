// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Pluggable verification backends for the three signature methods a
//! commit or tag can carry. Only the interfaces are specified here — the
//! concrete cryptographic primitives (a GPG implementation, a Sigstore/
//! Fulcio/Rekor client) are external collaborators supplied by whoever
//! embeds this crate.

use crate::error::{Error, Result};

/// Detached, armored GPG signature verification.
pub trait GpgVerifier {
    /// `payload` is the object encoded without its signature field;
    /// `signature` is the detached armored signature; `armored_public_key`
    /// is the principal's declared GPG key material.
    fn verify(
        &self,
        payload: &[u8],
        signature: &str,
        armored_public_key: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub fn verify_gpg(
    backend: &dyn GpgVerifier,
    payload: &[u8],
    signature: &str,
    armored_public_key: &str,
) -> Result<()> {
    backend
        .verify(payload, signature, armored_public_key)
        .map_err(Error::IncorrectVerificationKey)
}

/// The parsed structure of an `SSHSIG` armor, prior to any cryptographic
/// check. Namespace is fixed to `"git"` by construction; anything else
/// fails to parse.
pub struct SshSigEnvelope {
    pub version: u32,
    pub signature: Vec<u8>,
}

const SSHSIG_MAGIC: &[u8] = b"SSHSIG";
const SSHSIG_NAMESPACE: &str = "git";
const PEM_BEGIN: &str = "-----BEGIN SSH SIGNATURE-----";
const PEM_END: &str = "-----END SSH SIGNATURE-----";

/// Decode the PEM-armored `SSH SIGNATURE` block, validating the magic
/// header, version and namespace Git always writes (`SSHSIG`, `1`, `git`).
/// This is structural validation only; the actual signature bytes are
/// handed to [`SshVerifier`] unexamined.
pub fn decode_ssh_armor(armored: &str) -> Result<SshSigEnvelope> {
    let body = armored
        .lines()
        .filter(|l| *l != PEM_BEGIN && *l != PEM_END)
        .collect::<String>();

    let decoded = base64::decode(body.trim())
        .map_err(|e| Error::InvalidSignature(format!("bad base64 in SSH signature armor: {e}")))?;

    let mut cursor = decoded.as_slice();

    let magic = take(&mut cursor, SSHSIG_MAGIC.len())
        .ok_or_else(|| Error::InvalidSignature("SSH signature too short for magic".into()))?;
    if magic != SSHSIG_MAGIC {
        return Err(Error::InvalidSignature(
            "SSH signature missing SSHSIG magic header".into(),
        ));
    }

    let version = take_u32(&mut cursor)
        .ok_or_else(|| Error::InvalidSignature("SSH signature missing version".into()))?;
    if version != 1 {
        return Err(Error::InvalidSignature(format!(
            "unsupported SSH signature version {version}"
        )));
    }

    // publickey, namespace, reserved, hash_algorithm, signature — each a
    // length-prefixed field per the `SSHSIG` format; only `namespace` is
    // validated here, the rest pass through to the verifier untouched.
    let _public_key = take_string(&mut cursor)
        .ok_or_else(|| Error::InvalidSignature("SSH signature missing public key".into()))?;
    let namespace = take_string(&mut cursor)
        .ok_or_else(|| Error::InvalidSignature("SSH signature missing namespace".into()))?;
    if namespace != SSHSIG_NAMESPACE.as_bytes() {
        return Err(Error::InvalidSignature(format!(
            "SSH signature namespace must be 'git', got {:?}",
            String::from_utf8_lossy(namespace)
        )));
    }
    let _reserved = take_string(&mut cursor)
        .ok_or_else(|| Error::InvalidSignature("SSH signature missing reserved field".into()))?;
    let _hash_algorithm = take_string(&mut cursor)
        .ok_or_else(|| Error::InvalidSignature("SSH signature missing hash algorithm".into()))?;
    let signature = take_string(&mut cursor)
        .ok_or_else(|| Error::InvalidSignature("SSH signature missing signature blob".into()))?
        .to_vec();

    Ok(SshSigEnvelope { version, signature })
}

fn take<'a>(cursor: &mut &'a [u8], n: usize) -> Option<&'a [u8]> {
    if cursor.len() < n {
        return None;
    }
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Some(head)
}

fn take_u32(cursor: &mut &[u8]) -> Option<u32> {
    let bytes = take(cursor, 4)?;
    Some(u32::from_be_bytes(bytes.try_into().ok()?))
}

fn take_string<'a>(cursor: &mut &'a [u8]) -> Option<&'a [u8]> {
    let len = take_u32(cursor)? as usize;
    take(cursor, len)
}

/// Checks a decoded [`SshSigEnvelope`] against an SSH public key
/// reconstructed from a principal's declared key material.
pub trait SshVerifier {
    fn verify(
        &self,
        payload: &[u8],
        envelope: &SshSigEnvelope,
        ssh_public_key: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub fn verify_ssh(
    backend: &dyn SshVerifier,
    payload: &[u8],
    armored_signature: &str,
    ssh_public_key: &str,
) -> Result<()> {
    let envelope = decode_ssh_armor(armored_signature)?;
    backend
        .verify(payload, &envelope, ssh_public_key)
        .map_err(Error::VerifyingSSHSignature)
}

/// The identity a Sigstore/Fulcio certificate must carry for a principal to
/// be considered the signer.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FulcioIdentity {
    pub issuer: String,
    pub identity: String,
}

/// Root/intermediate certificate pools and an optional set of Rekor/CT-log
/// public keys used to validate a Sigstore bundle.
pub struct SigstoreConfig<'a> {
    pub root_pool: &'a [u8],
    pub intermediate_pool: &'a [u8],
    pub rekor_public_keys: &'a [&'a [u8]],
}

/// Verifies an armored Sigstore/gitsign signed message against a configured
/// trust root, returning the Fulcio certificate's declared identity so the
/// caller can compare it against a principal's `{issuer, identity}`.
pub trait SigstoreVerifier {
    fn verify(
        &self,
        payload: &[u8],
        armored_signed_message: &str,
        config: &SigstoreConfig<'_>,
    ) -> std::result::Result<FulcioIdentity, Box<dyn std::error::Error + Send + Sync>>;
}

pub fn verify_sigstore(
    backend: &dyn SigstoreVerifier,
    payload: &[u8],
    armored_signed_message: &str,
    config: &SigstoreConfig<'_>,
    expected: &FulcioIdentity,
) -> Result<()> {
    let observed = backend
        .verify(payload, armored_signed_message, config)
        .map_err(Error::VerifyingSigstoreSignature)?;
    if &observed != expected {
        return Err(Error::IncorrectVerificationKey(
            format!(
                "certificate identity {observed:?} does not match expected {expected:?}"
            )
            .into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_ssh_armor(namespace: &str) -> String {
        let mut body = Vec::new();
        body.extend_from_slice(SSHSIG_MAGIC);
        body.extend_from_slice(&1u32.to_be_bytes());
        write_string(&mut body, b"ssh-ed25519 AAAA...");
        write_string(&mut body, namespace.as_bytes());
        write_string(&mut body, b"");
        write_string(&mut body, b"sha512");
        write_string(&mut body, b"fake-signature-bytes");

        let encoded = base64::encode(&body);
        format!("{PEM_BEGIN}\n{encoded}\n{PEM_END}\n")
    }

    fn write_string(buf: &mut Vec<u8>, s: &[u8]) {
        buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
        buf.extend_from_slice(s);
    }

    #[test]
    fn decodes_well_formed_envelope() {
        let armor = build_ssh_armor("git");
        let envelope = decode_ssh_armor(&armor).unwrap();
        assert_eq!(envelope.version, 1);
        assert_eq!(envelope.signature, b"fake-signature-bytes");
    }

    #[test]
    fn rejects_wrong_namespace() {
        let armor = build_ssh_armor("file");
        assert!(matches!(
            decode_ssh_armor(&armor),
            Err(Error::InvalidSignature(_))
        ));
    }
}
