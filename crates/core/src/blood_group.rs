//! ABO/Rh blood groups.
//!
//! Stored as their canonical text form (`"A+"`, `"O-"`, ...) and checked by a
//! `CHECK` constraint on every table that carries one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }

    /// Parse user input leniently: surrounding whitespace is ignored and the
    /// letters are matched case-insensitively (`" ab+ "` is `AB+`).
    pub fn canonicalize(input: &str) -> Result<Self, CoreError> {
        let normalized = input.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid blood group '{}'. Must be one of: {}",
                    input.trim(),
                    Self::ALL.map(BloodGroup::as_str).join(", ")
                ))
            })
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::canonicalize(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn canonicalize_trims_and_uppercases() {
        assert_eq!(BloodGroup::canonicalize(" o+ ").unwrap(), BloodGroup::OPositive);
        assert_eq!(BloodGroup::canonicalize("ab-").unwrap(), BloodGroup::AbNegative);
    }

    #[test]
    fn canonicalize_rejects_unknown_group() {
        assert_matches!(BloodGroup::canonicalize("C+"), Err(CoreError::Validation(msg)) if msg.contains("C+"));
        assert_matches!(BloodGroup::canonicalize(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn display_matches_stored_form() {
        for group in BloodGroup::ALL {
            assert_eq!(group.to_string(), group.as_str());
            assert_eq!(group.as_str().parse::<BloodGroup>().unwrap(), group);
        }
    }

    #[test]
    fn serde_uses_canonical_text() {
        let json = serde_json::to_string(&BloodGroup::AbPositive).unwrap();
        assert_eq!(json, "\"AB+\"");
        let back: BloodGroup = serde_json::from_str("\"O-\"").unwrap();
        assert_eq!(back, BloodGroup::ONegative);
    }
}
