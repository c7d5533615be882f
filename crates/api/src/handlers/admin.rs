//! Handlers for the `/admin` resource: user moderation and the dashboard
//! summary.
//!
//! Volunteers may list users, block or reactivate them and read the summary.
//! Role changes and deletion are admin-only. Nobody may moderate their own
//! account, and only admins may act on other admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bloodlink_core::donor::DonorStatus;
use bloodlink_core::error::CoreError;
use bloodlink_core::filter::ALL_SENTINEL;
use bloodlink_core::pagination::{PageMeta, PageRequest, Paginated};
use bloodlink_core::roles::{validate_role, ROLE_ADMIN};
use bloodlink_core::types::DbId;
use bloodlink_db::models::summary::DashboardSummary;
use bloodlink_db::models::user::{
    UpdateUserRole, UpdateUserStatus, User, UserListParams, UserResponse,
};
use bloodlink_db::repositories::{SummaryRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireModerator};
use crate::response::{ok, DataResponse};
use crate::state::AppState;

const DEFAULT_USER_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the target of a moderation action, refusing self-targeting and
/// non-admins acting on admins.
async fn moderation_target(state: &AppState, actor: &AuthUser, id: DbId) -> AppResult<User> {
    if actor.user_id == id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot moderate your own account".into(),
        )));
    }

    let target = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::user_not_found(id)))?;

    if target.role == ROLE_ADMIN && actor.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only admins can moderate admins".into(),
        )));
    }
    Ok(target)
}

/// Admin-only actions never touch another admin.
fn ensure_not_admin(target: &User) -> AppResult<()> {
    if target.role == ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin accounts cannot be changed or deleted".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users?status=&page=&limit=
pub async fn list_users(
    RequireModerator(_actor): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Paginated<UserResponse>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SENTINEL))
        .map(str::parse::<DonorStatus>)
        .transpose()?;
    let page = PageRequest::clamped(params.page, params.limit, DEFAULT_USER_LIMIT);

    let (users, total) = UserRepo::list(&state.pool, status, page).await?;

    Ok(ok(Paginated {
        items: users.into_iter().map(UserResponse::from).collect(),
        pagination: PageMeta::new(total, page),
    }))
}

/// PATCH /api/v1/admin/users/{id}/status
///
/// Block, deactivate or reactivate an account.
pub async fn update_user_status(
    RequireModerator(actor): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserStatus>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let status: DonorStatus = input.status.trim().parse()?;
    moderation_target(&state, &actor, id).await?;

    let user = UserRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::user_not_found(id)))?;

    tracing::info!(
        actor_id = actor.user_id,
        target_id = id,
        status = %status,
        "User status changed",
    );

    Ok(ok(user.into()))
}

/// PATCH /api/v1/admin/users/{id}/role
pub async fn update_user_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRole>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role = input.role.trim();
    validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let target = moderation_target(&state, &admin, id).await?;
    ensure_not_admin(&target)?;

    let user = UserRepo::set_role(&state.pool, id, role)
        .await?
        .ok_or(AppError::Core(CoreError::user_not_found(id)))?;

    tracing::info!(
        actor_id = admin.user_id,
        target_id = id,
        role = %user.role,
        "User role changed",
    );

    Ok(ok(user.into()))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Hard delete. The user's requests, responses and history are removed with
/// them.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let target = moderation_target(&state, &admin, id).await?;
    ensure_not_admin(&target)?;

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::user_not_found(id)));
    }

    tracing::info!(actor_id = admin.user_id, target_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/summary
///
/// User counts per role and request counts per status.
pub async fn dashboard_summary(
    RequireModerator(_actor): RequireModerator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let summary = SummaryRepo::fetch(&state.pool).await?;
    Ok(ok(summary))
}
