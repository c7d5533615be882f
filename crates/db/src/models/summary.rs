//! Moderation dashboard counters.

use serde::Serialize;
use sqlx::FromRow;

/// Account counts by role.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub users: i64,
    pub volunteers: i64,
    pub admins: i64,
    pub available_donors: i64,
}

/// Request counts by lifecycle status.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct RequestCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub success: i64,
    pub cancel: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub users: UserCounts,
    pub requests: RequestCounts,
}
