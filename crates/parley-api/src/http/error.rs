//! Application error type mapping to HTTP status codes.
//!
//! Error bodies use a `detail` message plus a machine-readable `code`.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use parley_types::error::ChatError;
use parley_types::llm::LlmError;

/// Detail text returned for unknown chat ids.
pub const CHAT_NOT_FOUND_DETAIL: &str = "Czat nie znaleziony";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat-related errors.
    Chat(ChatError),
    /// Malformed multipart body, including oversized uploads.
    Multipart(MultipartError),
    /// Well-formed request missing a required field.
    Validation(String),
    /// Upstream provider failure outside of a chat turn.
    Provider(LlmError),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Multipart(e)
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Provider(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match &self {
            AppError::Chat(ChatError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                "CHAT_NOT_FOUND",
                CHAT_NOT_FOUND_DETAIL.to_string(),
            ),
            AppError::Multipart(e) => (e.status(), "INVALID_FORM", e.body_text()),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Provider(e) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.to_string()),
        };

        if status.is_server_error() {
            tracing::warn!(%status, code, %detail, "Request failed");
        }

        (status, Json(json!({ "detail": detail, "code": code }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::chat::ChatId;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::from(ChatError::NotFound(ChatId::new())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_provider_maps_to_502() {
        let response = AppError::from(LlmError::AuthenticationFailed).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_validation_maps_to_422() {
        let response = AppError::Validation("field 'message' is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
