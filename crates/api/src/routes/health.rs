use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    /// Districts in the loaded geo reference; zero means registration and
    /// radius search cannot resolve locations.
    pub districts: usize,
}

/// GET /health
///
/// 503 while the database is down so load balancers pull the instance.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_up = bloodlink_db::health_check(&state.pool).await.is_ok();
    let districts = state.geo.district_names().len();

    let (code, status, database) = if db_up {
        (StatusCode::OK, "ok", "up")
    } else {
        tracing::warn!("Health check: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            districts,
        }),
    )
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
