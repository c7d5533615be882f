pub mod admin;
pub mod donation_request;
pub mod donor;
pub mod geo;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /donation-requests                  list (scoped), create
/// /donation-requests/public           public board
/// /donation-requests/nearby           radius search
/// /donation-requests/{id}             detail with respondents
/// /donation-requests/{id}/status      moderation transition (PATCH)
/// /donation-requests/{id}/donate      register as respondent (PUT)
///
/// /donors/register                    create donor account (POST)
/// /donors/search                      donor search
/// /donors/me/availability             toggle availability (PATCH)
/// /donors/me/donations                list, record past donations
///
/// /users/{id}                         profile
///
/// /admin/users                        list
/// /admin/users/{id}                   delete (DELETE)
/// /admin/users/{id}/status            change status (PATCH)
/// /admin/users/{id}/role              change role (PATCH)
/// /admin/summary                      dashboard counts
///
/// /geo/districts                      district names
/// /geo/resolve                        district/upazila resolution
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/donation-requests", donation_request::router())
        .nest("/donors", donor::router())
        .nest("/users", user::router())
        .nest("/admin", admin::router())
        .nest("/geo", geo::router())
}
