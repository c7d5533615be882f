//! Past donations recorded by donors.

use bloodlink_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `donation_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DonationHistory {
    pub id: DbId,
    pub donor_id: DbId,
    pub donated_at: Date,
    pub hospital_name: String,
    pub hospital_address: Option<String>,
    pub receiver_id: Option<DbId>,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

/// Request body for `POST /api/v1/donors/me/donations`.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateDonationHistory {
    pub donated_at: Date,
    #[validate(custom(function = "bloodlink_core::validation::not_blank"))]
    pub hospital_name: String,
    pub hospital_address: Option<String>,
    pub receiver_id: Option<DbId>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub note: Option<String>,
}
