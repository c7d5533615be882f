//! Handlers for the `/donation-requests` resource.
//!
//! Creation, the public board, the role-scoped listing, radius search,
//! respondent registration and moderation status changes.

use axum::extract::{Path, Query, State};
use axum::Json;
use bloodlink_core::blood_group::BloodGroup;
use bloodlink_core::donation::{DonationStatus, DEFAULT_UNITS_NEEDED};
use bloodlink_core::error::CoreError;
use bloodlink_core::filter::{RequestFilter, RequestSearchParams};
use bloodlink_core::geo::Coordinates;
use bloodlink_core::pagination::{
    PageMeta, PageRequest, Paginated, DEFAULT_PUBLIC_REQUEST_LIMIT, DEFAULT_REQUEST_LIMIT,
};
use bloodlink_core::types::DbId;
use bloodlink_core::validation::{validate_donation_date, validate_message};
use bloodlink_db::models::donation_request::{
    CreateDonationRequest, DonationRequest, DonationRequestDetail, DonationRequestResponse,
    DonationResponse, NearbyParams, NearbyRequest, NewDonationRequest, RequestListItem,
    RespondOutcome, UpdateRequestStatus,
};
use bloodlink_db::repositories::{DonationRequestRepo, TransitionOutcome};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{created, ok, Created, DataResponse};
use crate::state::AppState;

/// Radius used by `/nearby` when the caller does not pass one.
const DEFAULT_RADIUS_KM: f64 = 10.0;
const MAX_RADIUS_KM: f64 = 200.0;

/// Body returned by a successful `donate`.
#[derive(Debug, Serialize)]
pub struct RespondResult {
    pub response: DonationResponse,
    /// Request status after registration.
    pub donation_status: DonationStatus,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_request_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<DonationRequest> {
    DonationRequestRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::request_not_found(id)))
}

/// Run every input check and produce the insert payload.
fn build_new_request(
    requester_id: DbId,
    input: CreateDonationRequest,
) -> AppResult<NewDonationRequest> {
    input.validate()?;
    let blood_group = BloodGroup::canonicalize(&input.blood_group)?;
    validate_donation_date(input.donation_date, chrono::Utc::now().date_naive())?;
    validate_message(input.additional_message.as_deref())?;
    input.location.coordinates.validate()?;

    Ok(NewDonationRequest {
        requester_id,
        recipient_name: input.recipient_name.trim().to_string(),
        recipient_phone: input.recipient_phone.trim().to_string(),
        hospital_name: input.hospital_name.trim().to_string(),
        blood_group,
        total_units_needed: input.total_units_needed.unwrap_or(DEFAULT_UNITS_NEEDED),
        coordinates: input.location.coordinates,
        location_address: input.location.address,
        location_city: input.location.city,
        donation_date: input.donation_date,
        donation_time: input.donation_time.trim().to_string(),
        urgency: input.urgency,
        additional_message: input.additional_message,
    })
}

async fn list_page(
    state: &AppState,
    filter: &RequestFilter,
    page: PageRequest,
) -> AppResult<Paginated<RequestListItem>> {
    let (rows, total) = DonationRequestRepo::list(&state.pool, filter, page).await?;
    Ok(Paginated {
        items: rows.into_iter().map(RequestListItem::from).collect(),
        pagination: PageMeta::new(total, page),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/donation-requests
///
/// Create a request owned by the caller. It starts `pending` with no units
/// fulfilled and no respondents.
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDonationRequest>,
) -> AppResult<Created<DonationRequestResponse>> {
    let new_request = build_new_request(auth.user_id, input)?;
    auth.ensure_account(&state.pool).await?;
    let request = DonationRequestRepo::create(&state.pool, &new_request).await?;

    tracing::info!(
        request_id = request.id,
        requester_id = auth.user_id,
        blood_group = %request.blood_group,
        urgency = %request.urgency,
        "Donation request created",
    );

    Ok(created(request.into()))
}

/// GET /api/v1/donation-requests/public
///
/// The public board. Status defaults to `pending`; `status=all` lifts it.
pub async fn list_public_requests(
    State(state): State<AppState>,
    Query(params): Query<RequestSearchParams>,
) -> AppResult<Json<DataResponse<Paginated<RequestListItem>>>> {
    let filter = RequestFilter::public(&params)?;
    let page = PageRequest::clamped(params.page, params.limit, DEFAULT_PUBLIC_REQUEST_LIMIT);
    let data = list_page(&state, &filter, page).await?;
    Ok(ok(data))
}

/// GET /api/v1/donation-requests
///
/// Plain users see only their own requests; moderators see all of them.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RequestSearchParams>,
) -> AppResult<Json<DataResponse<Paginated<RequestListItem>>>> {
    let owner = (!auth.is_moderator()).then_some(auth.user_id);
    let filter = RequestFilter::scoped(&params, owner)?;
    let page = PageRequest::clamped(params.page, params.limit, DEFAULT_REQUEST_LIMIT);
    let data = list_page(&state, &filter, page).await?;
    Ok(ok(data))
}

/// GET /api/v1/donation-requests/nearby?lng=&lat=&radius_km=&blood_group=
///
/// Pending requests within `radius_km` of the given point, nearest first.
pub async fn list_nearby_requests(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> AppResult<Json<DataResponse<Paginated<NearbyRequest>>>> {
    let center = Coordinates::new(params.lng, params.lat);
    center.validate()?;

    let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    if !(radius_km > 0.0 && radius_km <= MAX_RADIUS_KM) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "radius_km: must be greater than 0 and at most {MAX_RADIUS_KM}"
        ))));
    }

    let filter = RequestFilter::public(&RequestSearchParams {
        blood_group: params.blood_group,
        ..Default::default()
    })?;
    let page = PageRequest::clamped(params.page, params.limit, DEFAULT_PUBLIC_REQUEST_LIMIT);

    let (rows, total) =
        DonationRequestRepo::find_nearby(&state.pool, center, radius_km, &filter, page).await?;

    let items = rows
        .into_iter()
        .map(|(request, distance_km)| NearbyRequest {
            request: request.into(),
            distance_km,
        })
        .collect();

    Ok(ok(Paginated {
        items,
        pagination: PageMeta::new(total, page),
    }))
}

/// GET /api/v1/donation-requests/{id}
///
/// A request with its respondents in registration order. Plain users may
/// only open their own requests or ones they responded to.
pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DonationRequestDetail>>> {
    let request = ensure_request_exists(&state.pool, id).await?;

    if !auth.is_moderator()
        && request.requester_id != auth.user_id
        && !DonationRequestRepo::has_responded(&state.pool, id, auth.user_id).await?
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not allowed to view this donation request".into(),
        )));
    }

    let potential_donors = DonationRequestRepo::list_respondents(&state.pool, id).await?;

    Ok(ok(DonationRequestDetail {
        request: request.into(),
        potential_donors,
    }))
}

/// PUT /api/v1/donation-requests/{id}/donate
///
/// Register the caller as a respondent. The first registration moves a
/// pending request to `in-progress`. A donor can respond once per request,
/// and closed requests accept no one.
pub async fn donate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RespondResult>>> {
    match DonationRequestRepo::respond(&state.pool, id, auth.user_id).await? {
        RespondOutcome::Registered { response, status } => {
            tracing::info!(
                request_id = id,
                donor_id = auth.user_id,
                donation_status = %status,
                "Respondent registered",
            );
            Ok(ok(RespondResult {
                response,
                donation_status: status,
            }))
        }
        RespondOutcome::NotFound => Err(AppError::Core(CoreError::request_not_found(id))),
        RespondOutcome::UnknownDonor => {
            tracing::warn!(request_id = id, donor_id = auth.user_id, "Respondent account missing");
            Err(AppError::Core(CoreError::Unauthorized(
                "Account no longer exists".into(),
            )))
        }
        RespondOutcome::AlreadyResponded => {
            tracing::info!(request_id = id, donor_id = auth.user_id, "Duplicate respondent rejected");
            Err(AppError::Core(CoreError::Conflict(
                "You have already responded to this request".into(),
            )))
        }
        RespondOutcome::Closed(status) => {
            tracing::info!(
                request_id = id,
                donor_id = auth.user_id,
                donation_status = %status,
                "Respondent rejected on closed request",
            );
            Err(AppError::Core(CoreError::Conflict(format!(
                "Donation request is closed ({status})"
            ))))
        }
    }
}

/// PATCH /api/v1/donation-requests/{id}/status
///
/// Move an in-progress request to `success` or `cancel`. Allowed for
/// moderators and for the request's owner.
pub async fn update_request_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRequestStatus>,
) -> AppResult<Json<DataResponse<DonationRequestResponse>>> {
    let to: DonationStatus = input.status.parse()?;

    if !auth.is_moderator() {
        let request = ensure_request_exists(&state.pool, id).await?;
        if request.requester_id != auth.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only the requester or a moderator can change this request".into(),
            )));
        }
    }

    match DonationRequestRepo::update_status(&state.pool, id, to).await? {
        TransitionOutcome::Updated(request) => {
            tracing::info!(
                request_id = id,
                actor_id = auth.user_id,
                actor_role = %auth.role,
                donation_status = %request.donation_status,
                "Donation request status changed",
            );
            Ok(ok(request.into()))
        }
        TransitionOutcome::NotFound => Err(AppError::Core(CoreError::request_not_found(id))),
        TransitionOutcome::Rejected(err) => Err(AppError::Core(err)),
    }
}
