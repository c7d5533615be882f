//! Handlers for the `/geo` resource, backed by the in-memory reference table.

use axum::extract::{Query, State};
use axum::Json;
use bloodlink_core::geo::GeoResolution;
use serde::Deserialize;

use crate::response::{ok, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub district: Option<String>,
    pub upazila: Option<String>,
}

/// GET /api/v1/geo/districts
pub async fn list_districts(State(state): State<AppState>) -> Json<DataResponse<Vec<String>>> {
    let names: Vec<String> = state
        .geo
        .district_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    ok(names)
}

/// GET /api/v1/geo/resolve?district=&upazila=
///
/// An unknown district is not an error: it resolves to
/// `{ "upazilas": [], "coordinates": [] }`.
pub async fn resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Json<DataResponse<GeoResolution>> {
    let resolution = state
        .geo
        .resolve(params.district.as_deref(), params.upazila.as_deref());
    ok(resolution)
}
