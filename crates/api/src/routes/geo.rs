//! Route definitions for the `/geo` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::geo;
use crate::state::AppState;

/// ```text
/// GET    /districts   -> list_districts
/// GET    /resolve     -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/districts", get(geo::list_districts))
        .route("/resolve", get(geo::resolve))
}
