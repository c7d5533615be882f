//! Route definitions for the `/donors` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::donor;
use crate::state::AppState;

/// Routes mounted at `/donors`.
///
/// ```text
/// POST   /register          -> register_donor
/// GET    /search            -> search_donors
/// PATCH  /me/availability   -> update_my_availability (auth)
/// GET    /me/donations      -> list_my_donations (auth)
/// POST   /me/donations      -> record_my_donation (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(donor::register_donor))
        .route("/search", get(donor::search_donors))
        .route("/me/availability", patch(donor::update_my_availability))
        .route(
            "/me/donations",
            get(donor::list_my_donations).post(donor::record_my_donation),
        )
}
