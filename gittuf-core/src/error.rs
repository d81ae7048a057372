// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use thiserror::Error;

/// Errors raised where the Git interface core and the policy metadata core
/// meet: loading/storing metadata documents as blobs, and resolving a
/// principal's declared key material into something the signature engine
/// can verify against.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Git(#[from] gittuf_git::Error),

    #[error(transparent)]
    Signature(#[from] gittuf_signature::Error),

    #[error(transparent)]
    Policy(#[from] gittuf_policy::Error),

    #[error("failed to decode policy metadata at {reference}: {source}")]
    Decode {
        reference: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("principal '{0}' is not a key, and signature verification needs a single key")]
    PrincipalIsNotAKey(String),

    #[error("key '{0}' declares scheme '{1}', which has no corresponding verification method")]
    UnsupportedKeyScheme(String, String),

    #[error("sigstore key material for '{0}' must be '<issuer> <identity>'")]
    MalformedSigstoreKeyMaterial(String),
}

pub type Result<T> = std::result::Result<T, Error>;
