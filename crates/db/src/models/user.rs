//! User / donor entity model and DTOs.

use bloodlink_core::blood_group::BloodGroup;
use bloodlink_core::geo::Coordinates;
use bloodlink_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub blood_group: String,
    pub is_available: bool,
    pub location_lng: f64,
    pub location_lat: f64,
    pub district: String,
    pub upazila: Option<String>,
    pub bio: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Donor location as exposed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct DonorLocation {
    pub coordinates: Coordinates,
    pub district: String,
    pub upazila: Option<String>,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub blood_group: String,
    pub is_available: bool,
    pub location: DonorLocation,
    pub bio: Option<String>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            role: u.role,
            status: u.status,
            avatar: u.avatar,
            phone: u.phone,
            blood_group: u.blood_group,
            is_available: u.is_available,
            location: DonorLocation {
                coordinates: Coordinates::new(u.location_lng, u.location_lat),
                district: u.district,
                upazila: u.upazila,
            },
            bio: u.bio,
            created_at: u.created_at,
        }
    }
}

/// Donor search row with donation totals aggregated from `donation_history`.
#[derive(Debug, Clone, FromRow)]
pub struct DonorMatchRow {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub blood_group: String,
    pub is_available: bool,
    pub location_lng: f64,
    pub location_lat: f64,
    pub district: String,
    pub upazila: Option<String>,
    pub created_at: Timestamp,
    pub total_donation: i64,
    pub last_donation: Option<Date>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DonorMatch {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub blood_group: String,
    pub is_available: bool,
    pub location: DonorLocation,
    pub total_donation: i64,
    pub last_donation: Option<Date>,
    pub created_at: Timestamp,
}

impl From<DonorMatchRow> for DonorMatch {
    fn from(r: DonorMatchRow) -> Self {
        Self {
            id: r.id,
            full_name: r.full_name,
            email: r.email,
            avatar: r.avatar,
            phone: r.phone,
            blood_group: r.blood_group,
            is_available: r.is_available,
            location: DonorLocation {
                coordinates: Coordinates::new(r.location_lng, r.location_lat),
                district: r.district,
                upazila: r.upazila,
            },
            total_donation: r.total_donation,
            last_donation: r.last_donation,
            created_at: r.created_at,
        }
    }
}

/// Request body for `POST /api/v1/donors/register`.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct RegisterDonor {
    #[validate(length(min = 3, message = "must be at least 3 characters"))]
    pub full_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    pub blood_group: String,
    #[validate(custom(function = "bloodlink_core::validation::not_blank"))]
    pub district: String,
    pub upazila: Option<String>,
    #[validate(custom(function = "bloodlink_core::validation::phone_number"))]
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// Validated insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    /// Lowercased before insert.
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub blood_group: BloodGroup,
    pub coordinates: Coordinates,
    pub district: String,
    pub upazila: Option<String>,
}

/// Request body for `PATCH /api/v1/donors/me/availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAvailability {
    pub is_available: bool,
}

/// Request body for `PATCH /api/v1/admin/users/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserStatus {
    pub status: String,
}

/// Request body for `PATCH /api/v1/admin/users/{id}/role`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRole {
    pub role: String,
}

/// Query string for `GET /api/v1/admin/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListParams {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
