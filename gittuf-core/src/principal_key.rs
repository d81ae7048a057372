// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Resolving a policy [`Key`] into the [`VerificationKey`] shape the
//! signature engine dispatches on.

use gittuf_policy::Key;
use gittuf_signature::{backend::FulcioIdentity, key::VerificationKey};

use crate::error::{Error, Result};

/// `scheme` on a [`Key`] selects the verification method; `keyval.public`
/// carries whatever that method needs, e.g. an armored GPG public key, an
/// SSH public key line, or (for `sigstore`) `"<issuer> <identity>"`.
pub fn verification_key(key: &Key) -> Result<VerificationKey> {
    match key.scheme.as_str() {
        "gpg" => Ok(VerificationKey::Gpg {
            armored_public_key: key.keyval.public.clone(),
        }),
        "ssh" => Ok(VerificationKey::Ssh {
            public_key: key.keyval.public.clone(),
        }),
        "sigstore" => {
            let mut parts = key.keyval.public.splitn(2, ' ');
            let issuer = parts.next().filter(|s| !s.is_empty());
            let identity = parts.next().filter(|s| !s.is_empty());
            match (issuer, identity) {
                (Some(issuer), Some(identity)) => Ok(VerificationKey::Sigstore {
                    identity: FulcioIdentity {
                        issuer: issuer.to_string(),
                        identity: identity.to_string(),
                    },
                }),
                _ => Err(Error::MalformedSigstoreKeyMaterial(key.keyid.clone())),
            }
        },
        other => Err(Error::UnsupportedKeyScheme(key.keyid.clone(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gittuf_policy::principal::KeyMaterial;

    fn key(scheme: &str, public: &str) -> Key {
        Key {
            keyid: "k".to_string(),
            keytype: scheme.to_string(),
            scheme: scheme.to_string(),
            keyval: KeyMaterial {
                public: public.to_string(),
            },
        }
    }

    #[test]
    fn gpg_scheme_resolves_to_armored_key() {
        let resolved = verification_key(&key("gpg", "-----BEGIN PGP PUBLIC KEY BLOCK-----")).unwrap();
        assert!(matches!(resolved, VerificationKey::Gpg { .. }));
    }

    #[test]
    fn sigstore_scheme_splits_issuer_and_identity() {
        let resolved = verification_key(&key("sigstore", "https://issuer.example me@example.com")).unwrap();
        match resolved {
            VerificationKey::Sigstore { identity } => {
                assert_eq!(identity.issuer, "https://issuer.example");
                assert_eq!(identity.identity, "me@example.com");
            },
            _ => panic!("expected a sigstore key"),
        }
    }

    #[test]
    fn sigstore_scheme_rejects_missing_identity() {
        assert!(matches!(
            verification_key(&key("sigstore", "https://issuer.example")),
            Err(Error::MalformedSigstoreKeyMaterial(_))
        ));
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        assert!(matches!(
            verification_key(&key("quantum", "x")),
            Err(Error::UnsupportedKeyScheme(_, _))
        ));
    }
}
