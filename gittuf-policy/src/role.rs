// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! A set of principals and the number of them required to form a quorum.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "principalIDs")]
    pub principal_ids: BTreeSet<String>,
    pub threshold: u32,
}

impl Role {
    /// Rejects a role whose principal count cannot meet its own threshold.
    pub fn new(principal_ids: BTreeSet<String>, threshold: u32) -> Result<Self> {
        let role = Self {
            principal_ids,
            threshold,
        };
        role.check_threshold()?;
        Ok(role)
    }

    pub fn check_threshold(&self) -> Result<()> {
        if (self.principal_ids.len() as u32) < self.threshold {
            return Err(Error::CannotMeetThreshold {
                have: self.principal_ids.len(),
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_threshold_above_principal_count() {
        let ids: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        assert!(matches!(
            Role::new(ids, 2),
            Err(Error::CannotMeetThreshold { have: 1, threshold: 2 })
        ));
    }

    #[test]
    fn accepts_threshold_at_principal_count() {
        let ids: BTreeSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        assert!(Role::new(ids, 2).is_ok());
    }
}
