use std::sync::Arc;

use bloodlink_core::geo::GeoReference;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Built once in `main` and cloned per request; every field is an `Arc` or a
/// pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bloodlink_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// District/upazila reference table, loaded once at startup.
    pub geo: Arc<GeoReference>,
}
