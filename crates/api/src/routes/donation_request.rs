//! Route definitions for the `/donation-requests` resource.

use axum::routing::{get, patch, put};
use axum::Router;

use crate::handlers::donation_request;
use crate::state::AppState;

/// Routes mounted at `/donation-requests`.
///
/// ```text
/// GET    /                -> list_requests (auth, scoped by role)
/// POST   /                -> create_request (auth)
/// GET    /public          -> list_public_requests
/// GET    /nearby          -> list_nearby_requests
/// GET    /{id}            -> get_request (auth)
/// PATCH  /{id}/status     -> update_request_status (moderator or owner)
/// PUT    /{id}/donate     -> donate (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(donation_request::list_requests).post(donation_request::create_request),
        )
        .route("/public", get(donation_request::list_public_requests))
        .route("/nearby", get(donation_request::list_nearby_requests))
        .route("/{id}", get(donation_request::get_request))
        .route(
            "/{id}/status",
            patch(donation_request::update_request_status),
        )
        .route("/{id}/donate", put(donation_request::donate))
}
