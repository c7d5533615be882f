#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bloodlink_api::auth::jwt::{Claims, JwtConfig};
use bloodlink_api::config::ServerConfig;
use bloodlink_api::router::build_app_router;
use bloodlink_api::state::AppState;
use bloodlink_core::blood_group::BloodGroup;
use bloodlink_core::geo::{Coordinates, GeoReference};
use bloodlink_core::types::DbId;
use bloodlink_db::models::user::NewUser;
use bloodlink_db::repositories::UserRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_max_connections: 5,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: None,
            leeway_secs: 0,
        },
    }
}

/// Build the full application router, with the production middleware stack,
/// on top of the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        geo: Arc::new(GeoReference::embedded().expect("embedded geo reference")),
    };
    build_app_router(state, &config)
}

/// Sign a bearer token the way the identity service does.
pub fn token_for(user_id: DbId, role: &str) -> String {
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        iss: None,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token signing")
}

/// Insert a user with the given role straight into the database.
pub async fn seed_user(pool: &PgPool, email: &str, role: &str) -> DbId {
    let user = UserRepo::create(
        pool,
        &NewUser {
            full_name: format!("User {email}"),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            avatar: None,
            phone: Some("01711111111".to_string()),
            blood_group: BloodGroup::OPositive,
            coordinates: Coordinates::new(90.4125, 23.8103),
            district: "Dhaka".to_string(),
            upazila: None,
        },
    )
    .await
    .expect("seed user");

    if role != "user" {
        UserRepo::set_role(pool, user.id, role)
            .await
            .expect("set role");
    }
    user.id
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    app.oneshot(request).await.expect("oneshot")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), None).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}
