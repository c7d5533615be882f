//! Donor account status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Only `Active` donors appear in search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonorStatus {
    #[default]
    Active,
    Inactive,
    Blocked,
}

impl DonorStatus {
    pub const ALL: [DonorStatus; 3] = [
        DonorStatus::Active,
        DonorStatus::Inactive,
        DonorStatus::Blocked,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DonorStatus::Active => "active",
            DonorStatus::Inactive => "inactive",
            DonorStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for DonorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonorStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid user status '{s}'")))
    }
}
