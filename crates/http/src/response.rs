//! `{message, data}` response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 200 with a message and a payload.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    with_data(StatusCode::OK, message, data)
}

/// 201 with a message and the created payload.
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    with_data(StatusCode::CREATED, message, data)
}

/// A bare `{message}` body.
pub fn message(status: StatusCode, message: impl Into<String>) -> Response {
    let body: Envelope<()> = Envelope {
        message: message.into(),
        data: None,
    };
    (status, Json(body)).into_response()
}

fn with_data<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> Response {
    (
        status,
        Json(Envelope {
            message: message.into(),
            data: Some(data),
        }),
    )
        .into_response()
}
