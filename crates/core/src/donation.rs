//! Donation request lifecycle.
//!
//! ```text
//! pending ──(first respondent)──> in-progress ──(moderation)──> success
//!                                              └─(moderation)──> cancel
//! ```
//!
//! The only automatic transition is `pending -> in-progress`, taken when the
//! first donor registers as a respondent. `success` and `cancel` are terminal
//! and refuse any further respondents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of `additional_message`, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Default number of units when the requester leaves it unspecified.
pub const DEFAULT_UNITS_NEEDED: i32 = 1;

// ---------------------------------------------------------------------------
// Donation status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonationStatus {
    Pending,
    InProgress,
    Success,
    Cancel,
}

impl DonationStatus {
    pub const ALL: [DonationStatus; 4] = [
        DonationStatus::Pending,
        DonationStatus::InProgress,
        DonationStatus::Success,
        DonationStatus::Cancel,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::InProgress => "in-progress",
            DonationStatus::Success => "success",
            DonationStatus::Cancel => "cancel",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, DonationStatus::Success | DonationStatus::Cancel)
    }

    /// Status after a respondent is accepted.
    ///
    /// Fails with `Conflict` when the request is already closed.
    pub fn after_respondent(self) -> Result<DonationStatus, CoreError> {
        match self {
            DonationStatus::Pending | DonationStatus::InProgress => Ok(DonationStatus::InProgress),
            closed => Err(CoreError::Conflict(format!(
                "Request is closed ({closed}) and no longer accepts donors"
            ))),
        }
    }

    /// Validate a moderation transition. Only an in-progress request can be
    /// closed; nothing leaves a terminal state and no state is skipped.
    pub fn validate_transition(self, to: DonationStatus) -> Result<(), CoreError> {
        let allowed = matches!(
            (self, to),
            (DonationStatus::InProgress, DonationStatus::Success)
                | (DonationStatus::InProgress, DonationStatus::Cancel)
        );
        if allowed {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot change request status from '{self}' to '{to}'"
            )))
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid donation status '{trimmed}'. Must be one of: {}",
                    Self::ALL.map(DonationStatus::as_str).join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Emergency,
}

impl Urgency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Urgency::Normal => "Normal",
            Urgency::Urgent => "Urgent",
            Urgency::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Respondent status
// ---------------------------------------------------------------------------

/// Status of a single donor's response to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RespondentStatus {
    #[default]
    Interested,
    Confirmed,
    Declined,
}

impl RespondentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            RespondentStatus::Interested => "interested",
            RespondentStatus::Confirmed => "confirmed",
            RespondentStatus::Declined => "declined",
        }
    }
}
