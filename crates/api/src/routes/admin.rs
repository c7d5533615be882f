//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Role requirements are enforced by handler extractors.
///
/// ```text
/// GET    /users               -> list_users (admin, volunteer)
/// PATCH  /users/{id}/status   -> update_user_status (admin, volunteer)
/// PATCH  /users/{id}/role     -> update_user_role (admin)
/// DELETE /users/{id}          -> delete_user (admin)
/// GET    /summary             -> dashboard_summary (admin, volunteer)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/status", patch(admin::update_user_status))
        .route("/users/{id}/role", patch(admin::update_user_role))
        .route("/summary", get(admin::dashboard_summary))
}
