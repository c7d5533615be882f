//! Repository for the `users` table, including donor search.

use bloodlink_core::donor::DonorStatus;
use bloodlink_core::filter::DonorFilter;
use bloodlink_core::pagination::PageRequest;
use bloodlink_core::roles::ROLE_USER;
use bloodlink_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::filters::push_groups;
use crate::models::user::{DonorMatchRow, NewUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, email, password_hash, role, status, avatar, phone, \
                       blood_group, is_available, location_lng, location_lat, district, \
                       upazila, bio, created_at, updated_at";

/// Totals per donor, joined into donor search.
const HISTORY_TOTALS: &str = "SELECT donor_id, COUNT(*) AS total_donation, \
                                     MAX(donated_at) AS last_donation \
                              FROM donation_history GROUP BY donor_id";

/// Provides account persistence, moderation updates and donor search.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new account as an active, available plain user.
    pub async fn create(pool: &PgPool, input: &NewUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (full_name, email, password_hash, role, avatar, phone, blood_group,
                 location_lng, location_lat, district, upazila)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.full_name.trim())
            .bind(input.email.trim().to_lowercase())
            .bind(&input.password_hash)
            .bind(ROLE_USER)
            .bind(input.avatar.as_deref())
            .bind(input.phone.as_deref())
            .bind(input.blood_group.as_str())
            .bind(input.coordinates.lng)
            .bind(input.coordinates.lat)
            .bind(&input.district)
            .bind(input.upazila.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercase.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim().to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// All users, newest first, optionally restricted to one status.
    pub async fn list(
        pool: &PgPool,
        status: Option<DonorStatus>,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let status = status.map(DonorStatus::as_str);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(pool)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, User>(&query)
            .bind(status)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok((items, total))
    }

    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: DonorStatus,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_role(
        pool: &PgPool,
        id: DbId,
        role: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_availability(
        pool: &PgPool,
        id: DbId,
        is_available: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("UPDATE users SET is_available = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(is_available)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user. Their requests, responses and history go with
    /// them. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Donor search.
    ///
    /// Donors who donated longest ago (or never) come first, then newest
    /// accounts. `total_donation` and `last_donation` are aggregated per query.
    pub async fn search_donors(
        pool: &PgPool,
        filter: &DonorFilter,
        page: PageRequest,
    ) -> Result<(Vec<DonorMatchRow>, i64), sqlx::Error> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE TRUE");
        push_groups(&mut count_qb, &filter.groups);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT u.id, u.full_name, u.email, u.avatar, u.phone, u.blood_group, \
                    u.is_available, u.location_lng, u.location_lat, u.district, u.upazila, \
                    u.created_at, \
                    COALESCE(h.total_donation, 0) AS total_donation, \
                    h.last_donation \
             FROM users u \
             LEFT JOIN ({HISTORY_TOTALS}) h ON h.donor_id = u.id \
             WHERE TRUE"
        ));
        push_groups(&mut qb, &filter.groups);
        qb.push(" ORDER BY h.last_donation ASC NULLS FIRST, u.created_at DESC, u.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = qb
            .build_query_as::<DonorMatchRow>()
            .fetch_all(pool)
            .await?;
        Ok((items, total))
    }
}
