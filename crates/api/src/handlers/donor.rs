//! Handlers for the `/donors` resource: registration, search and the
//! caller's own donor profile.

use axum::extract::{Query, State};
use axum::Json;
use bloodlink_core::blood_group::BloodGroup;
use bloodlink_core::error::CoreError;
use bloodlink_core::filter::{DonorFilter, DonorSearchParams};
use bloodlink_core::pagination::{PageMeta, PageRequest, Paginated, DEFAULT_DONOR_LIMIT};
use bloodlink_db::models::donation_history::{CreateDonationHistory, DonationHistory};
use bloodlink_db::models::user::{
    DonorMatch, NewUser, RegisterDonor, UpdateAvailability, UserResponse,
};
use bloodlink_db::repositories::{DonationHistoryRepo, UserRepo};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{created, ok, Created, DataResponse};
use crate::state::AppState;

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/v1/donors/register
///
/// Create an active, available donor account. The location is resolved from
/// the district (and upazila, when it has its own point).
pub async fn register_donor(
    State(state): State<AppState>,
    Json(input): Json<RegisterDonor>,
) -> AppResult<Created<UserResponse>> {
    input.validate()?;
    let blood_group = BloodGroup::canonicalize(&input.blood_group)?;

    let district = state.geo.find_district(&input.district).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "district: unknown district '{}'",
            input.district.trim()
        )))
    })?;
    let resolution = state
        .geo
        .resolve(Some(&district.name), input.upazila.as_deref());
    let coordinates = resolution.coordinates.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "location: could not resolve coordinates".into(),
        ))
    })?;

    // Prefer the reference spelling of a known upazila.
    let upazila = non_empty(input.upazila).map(|wanted| {
        resolution
            .upazilas
            .iter()
            .find(|name| name.eq_ignore_ascii_case(&wanted))
            .cloned()
            .unwrap_or(wanted)
    });

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let new_user = NewUser {
        full_name: input.full_name.trim().to_string(),
        email: input.email,
        password_hash,
        avatar: non_empty(input.avatar),
        phone: non_empty(input.phone),
        blood_group,
        coordinates,
        district: district.name.clone(),
        upazila,
    };
    let user = UserRepo::create(&state.pool, &new_user).await?;

    tracing::info!(
        user_id = user.id,
        blood_group = %user.blood_group,
        district = %user.district,
        "Donor registered",
    );

    Ok(created(user.into()))
}

/// GET /api/v1/donors/search?blood_group=&district=&upazila=&page=&limit=
///
/// Active, available donors. Those who donated longest ago (or never) come
/// first so the most likely eligible donors are seen first.
pub async fn search_donors(
    State(state): State<AppState>,
    Query(params): Query<DonorSearchParams>,
) -> AppResult<Json<DataResponse<Paginated<DonorMatch>>>> {
    let filter = DonorFilter::from_params(&params)?;
    let page = PageRequest::clamped(params.page, params.limit, DEFAULT_DONOR_LIMIT);

    let (rows, total) = UserRepo::search_donors(&state.pool, &filter, page).await?;

    Ok(ok(Paginated {
        items: rows.into_iter().map(DonorMatch::from).collect(),
        pagination: PageMeta::new(total, page),
    }))
}

/// PATCH /api/v1/donors/me/availability
pub async fn update_my_availability(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateAvailability>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::set_availability(&state.pool, auth.user_id, input.is_available)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::user_not_found(auth.user_id)))?;

    tracing::info!(
        user_id = auth.user_id,
        is_available = input.is_available,
        "Donor availability changed",
    );

    Ok(ok(user.into()))
}

/// POST /api/v1/donors/me/donations
///
/// Record a past donation. It counts toward `total_donation` and may move
/// the donor's `last_donation` forward.
pub async fn record_my_donation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDonationHistory>,
) -> AppResult<Created<DonationHistory>> {
    input.validate()?;

    if input.donated_at > chrono::Utc::now().date_naive() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "donated_at: {} is in the future",
            input.donated_at
        ))));
    }

    auth.ensure_account(&state.pool).await?;

    if let Some(receiver_id) = input.receiver_id {
        if UserRepo::find_by_id(&state.pool, receiver_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "receiver_id: user {receiver_id} does not exist"
            ))));
        }
    }

    let entry = DonationHistoryRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        donor_id = auth.user_id,
        history_id = entry.id,
        donated_at = %entry.donated_at,
        "Donation recorded",
    );

    Ok(created(entry))
}

/// GET /api/v1/donors/me/donations
///
/// The caller's donation history, most recent first.
pub async fn list_my_donations(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DonationHistory>>>> {
    let history = DonationHistoryRepo::list_for_donor(&state.pool, auth.user_id).await?;
    Ok(ok(history))
}
