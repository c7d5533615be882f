//! JWT-based caller extraction for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bloodlink_core::error::CoreError;
use bloodlink_core::roles::is_moderator;
use bloodlink_core::types::DbId;
use bloodlink_db::repositories::UserRepo;
use bloodlink_db::DbPool;

use crate::auth::jwt::{validate_token, TokenError};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated caller extracted from the `Authorization: Bearer` header.
///
/// A missing, malformed or expired token rejects with 401, as does a token
/// whose role this service does not know.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// `user`, `volunteer` or `admin`.
    pub role: String,
}

impl AuthUser {
    pub fn is_moderator(&self) -> bool {
        is_moderator(&self.role)
    }

    /// Reject a still-valid token whose account has since been deleted.
    /// Needed before writes that reference the caller's row.
    pub async fn ensure_account(&self, pool: &DbPool) -> AppResult<()> {
        if UserRepo::exists(pool, self.user_id).await? {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Unauthorized(
                "Account no longer exists".into(),
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            let msg = match e {
                TokenError::Invalid(_) => "Invalid or expired token".to_string(),
                TokenError::UnknownRole(role) => format!("Token carries unknown role '{role}'"),
            };
            AppError::Core(CoreError::Unauthorized(msg))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
