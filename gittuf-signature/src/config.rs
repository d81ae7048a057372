// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Inspects a repository's Git config to decide whether signing is
//! possible at all, without yet knowing which backend will be used.

use gittuf_git::repo::Repository;

use crate::error::Result;

/// Whether this repository is configured to be able to sign at all.
///
/// SSH signing (`gpg.format = ssh`) additionally requires `user.signingkey`
/// to be set, since there is no ambient default SSH identity the way there
/// is a default GPG key. Every other format (GPG, x509/Sigstore) is assumed
/// signable as long as `git` itself can find a key, which is left to the
/// signing call to discover.
pub fn can_sign(repo: &Repository) -> Result<bool> {
    let config = repo.get_config()?;

    let format = config
        .get("gpg.format")
        .map(|s| s.as_str())
        .unwrap_or("openpgp");

    if format == "ssh" {
        return Ok(config.contains_key("user.signingkey"));
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn has_signing_key(config: &BTreeMap<String, String>, format: &str) -> bool {
        let format = config
            .get("gpg.format")
            .map(|s| s.as_str())
            .unwrap_or("openpgp");
        if format == "ssh" {
            config.contains_key("user.signingkey")
        } else {
            true
        }
    }

    #[test]
    fn ssh_format_requires_signing_key() {
        let mut config = BTreeMap::new();
        config.insert("gpg.format".to_string(), "ssh".to_string());
        assert!(!has_signing_key(&config, "ssh"));
        config.insert("user.signingkey".to_string(), "key::AAAA".to_string());
        assert!(has_signing_key(&config, "ssh"));
    }

    #[test]
    fn non_ssh_format_is_always_signable() {
        let config = BTreeMap::new();
        assert!(has_signing_key(&config, "openpgp"));
    }
}
