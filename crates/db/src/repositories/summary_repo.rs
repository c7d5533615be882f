//! Aggregate counters for the moderation dashboard.

use sqlx::PgPool;

use crate::models::summary::{DashboardSummary, RequestCounts, UserCounts};

pub struct SummaryRepo;

impl SummaryRepo {
    pub async fn fetch(pool: &PgPool) -> Result<DashboardSummary, sqlx::Error> {
        let users = sqlx::query_as::<_, UserCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE role = 'user') AS users,
                    COUNT(*) FILTER (WHERE role = 'volunteer') AS volunteers,
                    COUNT(*) FILTER (WHERE role = 'admin') AS admins,
                    COUNT(*) FILTER (WHERE status = 'active' AND is_available) AS available_donors
             FROM users",
        )
        .fetch_one(pool)
        .await?;

        let requests = sqlx::query_as::<_, RequestCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE donation_status = 'pending') AS pending,
                    COUNT(*) FILTER (WHERE donation_status = 'in-progress') AS in_progress,
                    COUNT(*) FILTER (WHERE donation_status = 'success') AS success,
                    COUNT(*) FILTER (WHERE donation_status = 'cancel') AS cancel
             FROM donation_requests",
        )
        .fetch_one(pool)
        .await?;

        Ok(DashboardSummary { users, requests })
    }
}
