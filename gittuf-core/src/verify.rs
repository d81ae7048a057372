// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Verifying a signed object against a principal named in policy metadata,
//! rather than against a bare [`VerificationKey`] the caller already has in
//! hand.

use std::collections::BTreeMap;

use gittuf_git::repo::Repository;
use gittuf_hash::ObjectId;
use gittuf_policy::Principal;
use gittuf_signature::Verifiers;

use crate::{
    error::{Error, Result},
    principal_key::verification_key,
};

/// Verifies `object_id`'s signature against the principal named
/// `principal_id` in `principals`. A [`Principal::Person`] cannot be
/// verified against directly — resolve it to one of its keys and call this
/// with that key's principal entry instead.
pub fn verify_principal_signature(
    repo: &Repository,
    object_id: &ObjectId,
    principals: &BTreeMap<String, Principal>,
    principal_id: &str,
    verifiers: &Verifiers<'_>,
) -> Result<()> {
    let principal = principals
        .get(principal_id)
        .ok_or_else(|| gittuf_policy::Error::PrincipalNotFound(principal_id.to_string()))?;
    let key = match principal {
        Principal::Key(key) => key,
        Principal::Person(_) => return Err(Error::PrincipalIsNotAKey(principal_id.to_string())),
    };
    let key = verification_key(key)?;
    tracing::debug!(%object_id, principal = %principal_id, "verifying signature against principal");
    gittuf_signature::verify_signature(repo, object_id, &key, verifiers)?;
    Ok(())
}
