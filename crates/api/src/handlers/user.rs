//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::Json;
use bloodlink_core::error::CoreError;
use bloodlink_core::types::DbId;
use bloodlink_db::models::user::UserResponse;
use bloodlink_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{ok, DataResponse};
use crate::state::AppState;

/// GET /api/v1/users/{id}
///
/// A user profile. The password hash never leaves the db layer.
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::user_not_found(id)))?;

    Ok(ok(user.into()))
}
