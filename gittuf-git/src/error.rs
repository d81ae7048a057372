// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

use thiserror::Error;

use crate::executor;

/// Errors raised by the Git interface core (components B through J of the
/// design).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Exec(#[from] executor::Error),

    #[error(transparent)]
    Hash(#[from] gittuf_hash::Error),

    #[error(transparent)]
    RefName(#[from] crate::reference::name::Error),

    #[error("object {0} not found")]
    ObjectNotFound(gittuf_hash::ObjectId),

    #[error("object {0} is not a blob")]
    NotABlob(gittuf_hash::ObjectId),

    #[error("object {0} is not a commit")]
    NotACommit(gittuf_hash::ObjectId),

    #[error("object {0} is not a tag")]
    NotATag(gittuf_hash::ObjectId),

    #[error("object {0} could not be parsed as its declared type")]
    MalformedObjectText(gittuf_hash::ObjectId),

    #[error("'{0}' is not a valid object type")]
    InvalidObjectType(String),

    #[error("the repository's logical clock reports a time before the Unix epoch")]
    ClockBeforeUnixEpoch,

    #[error("'{0}' is not a valid hash-agility digest")]
    InvalidHashAgilityDigest(String),

    #[error("wrote {written} bytes but input was {input} bytes")]
    WrittenBlobLengthMismatch { input: usize, written: usize },

    #[error("tree entry mode is not supported: {0:o}")]
    UnsupportedTreeEntryMode(u32),

    #[error("reference '{0}' not found")]
    ReferenceNotFound(String),

    #[error("cannot propagate content into the root of a tree (empty downstream path)")]
    CannotPropagateIntoRootTree,

    #[error("blob id mismatch after copying from upstream: expected {expected}, got {actual}")]
    CopyingBlobIDsDoNotMatch {
        expected: gittuf_hash::ObjectId,
        actual: gittuf_hash::ObjectId,
    },

    #[error("both commits in a diff are absent")]
    BothCommitsEmpty,

    #[error("hash collision detected while re-hashing object {0}: mapping already has a different target")]
    HashCollisionDetected(gittuf_hash::ObjectId),

    #[error("{reference} was reset to {old} after a failed operation: {cause}")]
    ResetAfterError {
        reference: String,
        old: gittuf_hash::ObjectId,
        #[source]
        cause: Box<Error>,
    },

    #[error("{reference} could not be reset to {old} ({reset_error}) after a failed operation: {cause}")]
    ResetFailedAfterError {
        reference: String,
        old: gittuf_hash::ObjectId,
        reset_error: Box<Error>,
        #[source]
        cause: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
