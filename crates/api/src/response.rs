//! Response envelopes.
//!
//! Successful bodies are `{ "data": ... }`; failures are
//! `{ "error": <message>, "code": <CODE> }`. Everything that writes a body,
//! including the router's fallback and panic handler, goes through here so
//! clients only ever see these two shapes.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `201 Created` with the new resource in the data envelope.
pub type Created<T> = (StatusCode, Json<DataResponse<T>>);

pub fn ok<T: Serialize>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data })
}

pub fn created<T: Serialize>(data: T) -> Created<T> {
    (StatusCode::CREATED, ok(data))
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

pub fn error_body(code: &'static str, message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.into(),
        code,
    })
}
