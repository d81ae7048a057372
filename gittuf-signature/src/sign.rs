// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! The minimal signing vocabulary [`signer::Signer`](crate::signer::Signer)
//! is built on: a key type and a signature, both opaque byte blobs from
//! this crate's point of view. The concrete bytes are produced by whichever
//! backend (GPG, SSH, Sigstore) a principal's key material names; this
//! crate only needs to move them around and hand them to a verifier.

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature(pub Vec<u8>);

/// A type that can produce a [`Signature`] over arbitrary bytes and report
/// the public key that verifies it.
pub trait Signer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn public_key(&self) -> PublicKey;
    fn sign(&self, data: &[u8]) -> Result<Signature, Self::Error>;
}
