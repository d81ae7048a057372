// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Git(#[from] gittuf_git::Error),

    #[error("object is neither a commit nor a tag")]
    NotCommitOrTag,

    #[error("unable to produce a signature: {0}")]
    UnableToSign(String),

    #[error("signing was requested but no signing key is configured")]
    SigningKeyNotSpecified,

    #[error("'{0}' is not a recognized signing method")]
    UnknownSigningMethod(String),

    #[error("signature does not verify against the supplied key")]
    IncorrectVerificationKey(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to verify a sigstore signature")]
    VerifyingSigstoreSignature(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to verify an SSH signature")]
    VerifyingSSHSignature(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("signature is malformed: {0}")]
    InvalidSignature(String),
}

pub type Result<T> = std::result::Result<T, Error>;
