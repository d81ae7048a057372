// Copyright © 2019-2020 The Radicle Foundation <hello@radicle.foundation>
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use std::error::Error;

use crate::sign;

/// A blanket trait over [`sign::Signer`] that can be shared safely among
/// threads.
pub trait Signer: sign::Signer + Send + Sync + dyn_clone::DynClone + 'static {
    fn sign_blocking(&self, data: &[u8]) -> Result<sign::Signature, <Self as sign::Signer>::Error> {
        self.sign(data)
    }
}

/// A boxed [`Error`] used as the associated `Error` type for [`BoxedSigner`].
pub struct BoxedSignError {
    error: Box<dyn Error + Send + Sync + 'static>,
}

impl BoxedSignError {
    pub fn from_std_error<T>(other: T) -> Self
    where
        T: Error + Send + Sync + 'static,
    {
        BoxedSignError {
            error: Box::new(other),
        }
    }
}

impl std::fmt::Debug for BoxedSignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::fmt::Display for BoxedSignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for BoxedSignError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

/// A dynamic [`Signer`] where the associated error is a [`BoxedSignError`],
/// so a `Box<dyn Signer<...>>` can be cloned and passed around without
/// callers caring which concrete key type backs it.
pub struct BoxedSigner {
    signer: Box<dyn Signer<Error = BoxedSignError>>,
}

impl BoxedSigner {
    pub fn new<S>(signer: S) -> Self
    where
        S: Signer<Error = BoxedSignError>,
    {
        BoxedSigner {
            signer: Box::new(signer),
        }
    }

    pub fn public_key(&self) -> sign::PublicKey {
        sign::Signer::public_key(&*self.signer)
    }
}

impl Clone for BoxedSigner {
    fn clone(&self) -> Self {
        BoxedSigner {
            signer: dyn_clone::clone_box(&*self.signer),
        }
    }
}

impl Signer for BoxedSigner {
    fn sign_blocking(&self, data: &[u8]) -> Result<sign::Signature, <Self as sign::Signer>::Error> {
        self.signer.sign_blocking(data)
    }
}

impl sign::Signer for BoxedSigner {
    type Error = BoxedSignError;

    fn public_key(&self) -> sign::PublicKey {
        self.signer.public_key()
    }

    fn sign(&self, data: &[u8]) -> Result<sign::Signature, Self::Error> {
        self.signer.sign(data)
    }
}

/// Adapts any `S: Signer` into one whose associated error is boxed, so it
/// can be lifted into a [`BoxedSigner`].
#[derive(Clone)]
pub struct SomeSigner<S> {
    pub signer: S,
}

impl<S: Signer + Clone> Signer for SomeSigner<S> {
    fn sign_blocking(&self, data: &[u8]) -> Result<sign::Signature, <Self as sign::Signer>::Error> {
        self.signer
            .sign_blocking(data)
            .map_err(BoxedSignError::from_std_error)
    }
}

impl<S> From<SomeSigner<S>> for BoxedSigner
where
    S: Signer + Clone + Send + Sync + 'static,
    S::Error: Error + Send + Sync + 'static,
{
    fn from(other: SomeSigner<S>) -> Self {
        BoxedSigner::new(other)
    }
}

impl<S> sign::Signer for SomeSigner<S>
where
    S: sign::Signer + Clone + Send + Sync + 'static,
    S::Error: Error + Send + Sync + 'static,
{
    type Error = BoxedSignError;

    fn public_key(&self) -> sign::PublicKey {
        self.signer.public_key()
    }

    fn sign(&self, data: &[u8]) -> Result<sign::Signature, Self::Error> {
        sign::Signer::sign(&self.signer, data).map_err(BoxedSignError::from_std_error)
    }
}
