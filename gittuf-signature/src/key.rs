// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! A principal's declared verification key material, tagged by the
//! signature method it is used with.

use crate::backend::FulcioIdentity;

#[derive(Clone, Debug)]
pub enum VerificationKey {
    Gpg { armored_public_key: String },
    Ssh { public_key: String },
    Sigstore { identity: FulcioIdentity },
}
