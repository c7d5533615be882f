//! HTTP-level tests for the donation request lifecycle: creation, listing,
//! respondent registration and moderation transitions.

mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{
    body_json, get, get_auth, patch_json_auth, post_json, post_json_auth, put_auth, seed_user,
    token_for,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn request_body(blood_group: &str) -> serde_json::Value {
    let date = Utc::now().date_naive() + Days::new(3);
    json!({
        "recipient_name": "Rahim Uddin",
        "recipient_phone": "01712345678",
        "hospital_name": "Dhaka Medical College Hospital",
        "blood_group": blood_group,
        "total_units_needed": 2,
        "location": {
            "coordinates": [90.3976, 23.7257],
            "address": "Bakshibazar, Dhaka",
            "city": "Dhaka"
        },
        "donation_date": date.to_string(),
        "donation_time": "10:30",
        "urgency": "Urgent",
        "additional_message": "Thalassemia patient"
    })
}

/// Create a request through the API and return its id.
async fn create_request(pool: &PgPool, token: &str, blood_group: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/donation-requests",
        request_body(blood_group),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn donate(pool: &PgPool, request_id: i64, token: &str) -> (StatusCode, serde_json::Value) {
    let app = common::build_test_app(pool.clone());
    let response = put_auth(
        app,
        &format!("/api/v1/donation-requests/{request_id}/donate"),
        token,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_starts_pending(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/donation-requests",
        request_body("ab+"),
        &token_for(owner, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["requester_id"], owner);
    assert_eq!(data["blood_group"], "AB+");
    assert_eq!(data["donation_status"], "pending");
    assert_eq!(data["units_fulfilled"], 0);
    assert_eq!(data["total_units_needed"], 2);
    assert_eq!(data["urgency"], "Urgent");
    assert_eq!(data["location"]["type"], "Point");
    assert_eq!(data["location"]["coordinates"], json!([90.3976, 23.7257]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/donation-requests", request_body("O+")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_rejects_past_date(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let mut body = request_body("O+");
    body["donation_date"] = json!((Utc::now().date_naive() - Days::new(1)).to_string());

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/donation-requests",
        body,
        &token_for(owner, "user"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("donation_date"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_rejects_bad_group_and_coordinates(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let token = token_for(owner, "user");

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/donation-requests", request_body("C+"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = request_body("O+");
    body["location"]["coordinates"] = json!([190.0, 23.7]);
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/donation-requests", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("coordinates"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_request_rejects_blank_fields(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let mut body = request_body("O+");
    body["hospital_name"] = json!("   ");
    body["total_units_needed"] = json!(0);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/donation-requests",
        body,
        &token_for(owner, "user"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("hospital_name"), "got: {message}");
    assert!(message.contains("total_units_needed"), "got: {message}");
}

// ---------------------------------------------------------------------------
// Respondent registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_donate_flow(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let donor_a = seed_user(&pool, "a@example.com", "user").await;
    let donor_b = seed_user(&pool, "b@example.com", "user").await;
    let id = create_request(&pool, &token_for(owner, "user"), "O+").await;

    let (status, json) = donate(&pool, id, &token_for(donor_a, "user")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["donation_status"], "in-progress");
    assert_eq!(json["data"]["response"]["donor_id"], donor_a);
    assert_eq!(json["data"]["response"]["status"], "interested");

    let (status, json) = donate(&pool, id, &token_for(donor_a, "user")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");

    let (status, json) = donate(&pool, id, &token_for(donor_b, "user")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["donation_status"], "in-progress");

    // Respondents come back in registration order.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/donation-requests/{id}"),
        &token_for(owner, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let donors: Vec<i64> = json["data"]["potential_donors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["donor_id"].as_i64().unwrap())
        .collect();
    assert_eq!(donors, vec![donor_a, donor_b]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_donate_unknown_request_and_missing_auth(pool: PgPool) {
    let donor = seed_user(&pool, "d@example.com", "user").await;

    let (status, json) = donate(&pool, 9_999, &token_for(donor, "user")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let app = common::build_test_app(pool);
    let response = common::put_auth(app, "/api/v1/donation-requests/1/donate", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_of_deleted_account_is_rejected(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let request_id = create_request(&pool, &token_for(owner, "user"), "A+").await;
    let stale = token_for(987_654, "user");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/donation-requests",
        request_body("B+"),
        &stale,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Account no longer exists");

    let (status, json) = donate(&pool, request_id, &stale).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/donation-requests/{request_id}"),
        &token_for(owner, "user"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["donation_status"], "pending");
    assert_eq!(json["data"]["potential_donors"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_closed_request_refuses_respondents(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let donor_a = seed_user(&pool, "a@example.com", "user").await;
    let donor_b = seed_user(&pool, "b@example.com", "user").await;
    let owner_token = token_for(owner, "user");
    let id = create_request(&pool, &owner_token, "B-").await;

    donate(&pool, id, &token_for(donor_a, "user")).await;

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/donation-requests/{id}/status"),
        json!({ "status": "success" }),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["donation_status"], "success");
    assert_eq!(json["data"]["units_fulfilled"], 2);

    let (status, json) = donate(&pool, id, &token_for(donor_b, "user")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("closed"));
}

// ---------------------------------------------------------------------------
// Moderation transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_change_rules(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let stranger = seed_user(&pool, "x@example.com", "user").await;
    let volunteer = seed_user(&pool, "v@example.com", "volunteer").await;
    let id = create_request(&pool, &token_for(owner, "user"), "A+").await;
    let uri = format!("/api/v1/donation-requests/{id}/status");

    // Pending cannot jump straight to a terminal state.
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &uri,
        json!({ "status": "cancel" }),
        &token_for(volunteer, "volunteer"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    donate(&pool, id, &token_for(stranger, "user")).await;

    // Responding does not make the donor an owner.
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &uri,
        json!({ "status": "cancel" }),
        &token_for(stranger, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &uri,
        json!({ "status": "bogus" }),
        &token_for(volunteer, "volunteer"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &uri,
        json!({ "status": "cancel" }),
        &token_for(volunteer, "volunteer"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["donation_status"], "cancel");
    assert_eq!(json["data"]["units_fulfilled"], 0);
}

// ---------------------------------------------------------------------------
// Listing and detail access
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_board_shows_pending_by_default(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let donor = seed_user(&pool, "d@example.com", "user").await;
    let token = token_for(owner, "user");
    let open = create_request(&pool, &token, "O+").await;
    let taken = create_request(&pool, &token, "O+").await;
    create_request(&pool, &token, "A-").await;
    donate(&pool, taken, &token_for(donor, "user")).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/donation-requests/public?bloodGroup=o%2B").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], open);
    assert_eq!(items[0]["requester"]["name"], "User owner@example.com");
    assert!(items[0]["requester"].get("email").is_none());
    assert_eq!(json["data"]["pagination"]["total"], 1);
    assert_eq!(json["data"]["pagination"]["limit"], 12);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/donation-requests/public?status=all&blood_group=All").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["pagination"]["total"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_board_rejects_unknown_status(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/donation-requests/public?status=done").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scoped_listing_by_role(pool: PgPool) {
    let alice = seed_user(&pool, "alice@example.com", "user").await;
    let bob = seed_user(&pool, "bob@example.com", "user").await;
    let admin = seed_user(&pool, "admin@example.com", "admin").await;
    create_request(&pool, &token_for(alice, "user"), "O+").await;
    create_request(&pool, &token_for(alice, "user"), "O+").await;
    create_request(&pool, &token_for(bob, "user"), "O+").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/donation-requests", &token_for(alice, "user")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["pagination"]["total"], 2);
    assert_eq!(json["data"]["pagination"]["limit"], 10);
    assert!(json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["requester_id"] == alice));

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/donation-requests", &token_for(admin, "admin")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["pagination"]["total"], 3);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/donation-requests").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detail_access(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let responder = seed_user(&pool, "r@example.com", "user").await;
    let stranger = seed_user(&pool, "s@example.com", "user").await;
    let volunteer = seed_user(&pool, "v@example.com", "volunteer").await;
    let id = create_request(&pool, &token_for(owner, "user"), "O+").await;
    donate(&pool, id, &token_for(responder, "user")).await;
    let uri = format!("/api/v1/donation-requests/{id}");

    for (user, role, expected) in [
        (owner, "user", StatusCode::OK),
        (responder, "user", StatusCode::OK),
        (volunteer, "volunteer", StatusCode::OK),
        (stranger, "user", StatusCode::FORBIDDEN),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = get_auth(app, &uri, &token_for(user, role)).await;
        assert_eq!(response.status(), expected, "user {user} ({role})");
    }

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/donation-requests/424242",
        &token_for(volunteer, "volunteer"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_nearby_requests(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com", "user").await;
    let id = create_request(&pool, &token_for(owner, "user"), "O+").await;

    // From Savar, about 20 km from the request.
    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        "/api/v1/donation-requests/nearby?lng=90.2667&lat=23.8583&radius_km=40",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id);
    let distance = items[0]["distance_km"].as_f64().unwrap();
    assert!(distance > 5.0 && distance < 40.0, "distance {distance}");

    // Chattogram is out of range.
    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        "/api/v1/donation-requests/nearby?lng=91.7832&lat=22.3569&radius_km=50",
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["pagination"]["total"], 0);

    let app = common::build_test_app(pool);
    let response = get(
        app,
        "/api/v1/donation-requests/nearby?lng=90.4&lat=23.8&radius_km=0",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
