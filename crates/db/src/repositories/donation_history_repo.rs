//! Repository for the `donation_history` table.

use bloodlink_core::types::DbId;
use sqlx::PgPool;

use crate::models::donation_history::{CreateDonationHistory, DonationHistory};

const COLUMNS: &str = "id, donor_id, donated_at, hospital_name, hospital_address, \
                       receiver_id, note, created_at";

pub struct DonationHistoryRepo;

impl DonationHistoryRepo {
    pub async fn create(
        pool: &PgPool,
        donor_id: DbId,
        input: &CreateDonationHistory,
    ) -> Result<DonationHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO donation_history
                (donor_id, donated_at, hospital_name, hospital_address, receiver_id, note)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DonationHistory>(&query)
            .bind(donor_id)
            .bind(input.donated_at)
            .bind(input.hospital_name.trim())
            .bind(input.hospital_address.as_deref())
            .bind(input.receiver_id)
            .bind(input.note.as_deref())
            .fetch_one(pool)
            .await
    }

    /// A donor's history, most recent first.
    pub async fn list_for_donor(
        pool: &PgPool,
        donor_id: DbId,
    ) -> Result<Vec<DonationHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM donation_history
             WHERE donor_id = $1
             ORDER BY donated_at DESC, id DESC"
        );
        sqlx::query_as::<_, DonationHistory>(&query)
            .bind(donor_id)
            .fetch_all(pool)
            .await
    }
}
