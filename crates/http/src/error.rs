//! Error handling for the Bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use indexmap::IndexMap;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Per-field validation messages, in field declaration order.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String, errors: FieldErrors },

    #[error("not found: {message}")]
    NotFound { message: String },

    /// Rejected credentials.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Missing, invalid, expired, or revoked bearer token.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error; the summary message is derived from the
    /// field messages. `errors` must not be empty.
    pub fn validation(errors: FieldErrors) -> Self {
        let mut messages = errors.values().flatten();
        let first = messages.next().cloned().unwrap_or_default();
        let message = match messages.count() {
            0 => first,
            1 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n),
        };
        Self::Validation { message, errors }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::Unauthenticated => "unauthenticated",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::Internal(err) = &self {
            let error_id = Uuid::new_v4();
            tracing::error!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = %status.as_u16(),
                error = ?err,
                "request failed"
            );
        } else {
            tracing::debug!(
                error_code = self.code(),
                status_code = %status.as_u16(),
                "request rejected"
            );
        }

        let body = match self {
            AppError::Validation { message, errors } => {
                json!({ "message": message, "errors": errors })
            }
            AppError::NotFound { message } | AppError::Unauthorized { message } => {
                json!({ "error": message })
            }
            AppError::Unauthenticated => json!({ "message": "Unauthenticated." }),
            // Details stay in the log.
            AppError::Internal(_) => json!({ "error": "Internal Error" }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn field_errors(pairs: &[(&str, &str)]) -> FieldErrors {
        pairs
            .iter()
            .map(|(field, message)| (field.to_string(), vec![message.to_string()]))
            .collect()
    }

    #[test]
    fn test_validation_summary_single() {
        let error = AppError::validation(field_errors(&[("title", "The title is required.")]));
        match error {
            AppError::Validation { message, errors } => {
                assert_eq!(message, "The title is required.");
                assert_eq!(errors.len(), 1);
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_validation_summary_counts_remaining_messages() {
        let one_more = AppError::validation(field_errors(&[
            ("title", "The title is required."),
            ("author", "The author is required."),
        ]));
        assert_eq!(
            one_more.to_string(),
            "validation error: The title is required. (and 1 more error)"
        );

        let two_more = AppError::validation(field_errors(&[
            ("title", "The title is required."),
            ("author", "The author is required."),
            ("genre", "The genre is required."),
        ]));
        assert_eq!(
            two_more.to_string(),
            "validation error: The title is required. (and 2 more errors)"
        );
    }

    #[tokio::test]
    async fn test_validation_body_keeps_field_order() {
        let (status, body) = body_of(AppError::validation(field_errors(&[
            ("title", "The title is required."),
            ("author", "The author is required."),
        ])))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["title"], json!(["The title is required."]));
        assert_eq!(body["errors"]["author"], json!(["The author is required."]));
        let fields: Vec<&str> = body["errors"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(fields, vec!["title", "author"]);
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = body_of(AppError::not_found("Book not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Book not found" }));
    }

    #[tokio::test]
    async fn test_unauthorized_and_unauthenticated_bodies() {
        let (status, body) = body_of(AppError::unauthorized("Unauthorized")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));

        let (status, body) = body_of(AppError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Unauthenticated." }));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let internal_error = anyhow::anyhow!("Database connection failed");
        let (status, body) = body_of(AppError::Internal(internal_error)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal Error" }));
    }
}
