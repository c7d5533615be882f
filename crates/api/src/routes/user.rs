//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// ```text
/// GET    /{id}   -> get_user (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(user::get_user))
}
