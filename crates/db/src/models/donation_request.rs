//! Donation request entity, its respondents, and DTOs.

use bloodlink_core::blood_group::BloodGroup;
use bloodlink_core::donation::{DonationStatus, Urgency};
use bloodlink_core::geo::Coordinates;
use bloodlink_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full row from the `donation_requests` table.
#[derive(Debug, Clone, FromRow)]
pub struct DonationRequest {
    pub id: DbId,
    pub requester_id: DbId,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub hospital_name: String,
    pub blood_group: String,
    pub total_units_needed: i32,
    pub units_fulfilled: i32,
    pub location_lng: f64,
    pub location_lat: f64,
    pub location_address: Option<String>,
    pub location_city: Option<String>,
    pub donation_date: Date,
    pub donation_time: String,
    pub urgency: String,
    pub donation_status: String,
    pub additional_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DonationRequest {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.location_lng, self.location_lat)
    }
}

/// GeoJSON-shaped location as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLocation {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    pub coordinates: Coordinates,
    pub address: Option<String>,
    pub city: Option<String>,
}

fn point_type() -> String {
    "Point".to_string()
}

/// External representation of a request.
#[derive(Debug, Clone, Serialize)]
pub struct DonationRequestResponse {
    pub id: DbId,
    pub requester_id: DbId,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub hospital_name: String,
    pub blood_group: String,
    pub total_units_needed: i32,
    pub units_fulfilled: i32,
    pub location: RequestLocation,
    pub donation_date: Date,
    pub donation_time: String,
    pub urgency: String,
    pub donation_status: String,
    pub additional_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<DonationRequest> for DonationRequestResponse {
    fn from(r: DonationRequest) -> Self {
        let coordinates = r.coordinates();
        Self {
            id: r.id,
            requester_id: r.requester_id,
            recipient_name: r.recipient_name,
            recipient_phone: r.recipient_phone,
            hospital_name: r.hospital_name,
            blood_group: r.blood_group,
            total_units_needed: r.total_units_needed,
            units_fulfilled: r.units_fulfilled,
            location: RequestLocation {
                kind: point_type(),
                coordinates,
                address: r.location_address,
                city: r.location_city,
            },
            donation_date: r.donation_date,
            donation_time: r.donation_time,
            urgency: r.urgency,
            donation_status: r.donation_status,
            additional_message: r.additional_message,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// List row: the request plus the requester's public profile and the number
/// of donors who responded so far.
#[derive(Debug, Clone, FromRow)]
pub struct RequestListRow {
    #[sqlx(flatten)]
    pub request: DonationRequest,
    pub requester_name: String,
    pub requester_avatar: Option<String>,
    pub respondent_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequesterInfo {
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestListItem {
    #[serde(flatten)]
    pub request: DonationRequestResponse,
    pub requester: RequesterInfo,
    pub respondent_count: i64,
}

impl From<RequestListRow> for RequestListItem {
    fn from(row: RequestListRow) -> Self {
        Self {
            request: row.request.into(),
            requester: RequesterInfo {
                name: row.requester_name,
                avatar: row.requester_avatar,
            },
            respondent_count: row.respondent_count,
        }
    }
}

/// A request found by radius search, with its distance from the search center.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyRequest {
    #[serde(flatten)]
    pub request: DonationRequestResponse,
    pub distance_km: f64,
}

// ---------------------------------------------------------------------------
// Respondents
// ---------------------------------------------------------------------------

/// Row from `donation_responses`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DonationResponse {
    pub id: DbId,
    pub request_id: DbId,
    pub donor_id: DbId,
    pub status: String,
    pub applied_at: Timestamp,
}

/// Respondent joined with the donor's public profile, as shown on the
/// request detail view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Respondent {
    pub donor_id: DbId,
    pub full_name: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub blood_group: String,
    pub district: String,
    pub status: String,
    pub applied_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct DonationRequestDetail {
    #[serde(flatten)]
    pub request: DonationRequestResponse,
    pub potential_donors: Vec<Respondent>,
}

/// Result of registering a donor as respondent.
#[derive(Debug, Clone)]
pub enum RespondOutcome {
    Registered {
        response: DonationResponse,
        status: DonationStatus,
    },
    NotFound,
    /// The responding account no longer exists.
    UnknownDonor,
    AlreadyResponded,
    Closed(DonationStatus),
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Location as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationInput {
    pub coordinates: Coordinates,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Request body for `POST /api/v1/donation-requests`.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateDonationRequest {
    #[validate(custom(function = "bloodlink_core::validation::not_blank"))]
    pub recipient_name: String,
    #[validate(custom(function = "bloodlink_core::validation::not_blank"))]
    pub recipient_phone: String,
    #[validate(custom(function = "bloodlink_core::validation::not_blank"))]
    pub hospital_name: String,
    pub blood_group: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub total_units_needed: Option<i32>,
    pub location: LocationInput,
    pub donation_date: Date,
    #[validate(custom(function = "bloodlink_core::validation::not_blank"))]
    pub donation_time: String,
    #[serde(default)]
    pub urgency: Urgency,
    pub additional_message: Option<String>,
}

/// Validated insert payload. Built by the API layer after all checks pass.
#[derive(Debug, Clone)]
pub struct NewDonationRequest {
    pub requester_id: DbId,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub hospital_name: String,
    pub blood_group: BloodGroup,
    pub total_units_needed: i32,
    pub coordinates: Coordinates,
    pub location_address: Option<String>,
    pub location_city: Option<String>,
    pub donation_date: Date,
    pub donation_time: String,
    pub urgency: Urgency,
    pub additional_message: Option<String>,
}

/// Request body for `PATCH /api/v1/donation-requests/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequestStatus {
    pub status: String,
}

/// Query string for `GET /api/v1/donation-requests/nearby`.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyParams {
    pub lng: f64,
    pub lat: f64,
    pub radius_km: Option<f64>,
    #[serde(alias = "bloodGroup")]
    pub blood_group: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
