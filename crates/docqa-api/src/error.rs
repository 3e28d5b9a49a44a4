//! API error handling
//!
//! Every error body carries a machine-readable `code`. The human-readable
//! text goes in `error`, except for an upload with no extractable text,
//! which reports it in `message`.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docqa_core::DocQaError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Informational message (empty uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn with_message(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: None,
            message: Some(message.into()),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest { code: &'static str, error: String },
    EmptyDocument(String),
    PayloadTooLarge(String),
    ServiceUnavailable { code: &'static str, error: String },
    BadGateway(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(code: &'static str, error: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            error: error.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest { code, error } => {
                tracing::info!("Rejected request ({}): {}", code, error);
                (StatusCode::BAD_REQUEST, ApiError::new(code, error))
            }
            AppError::EmptyDocument(message) => {
                tracing::info!("Rejected upload: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ApiError::with_message("EMPTY_DOCUMENT", message),
                )
            }
            AppError::PayloadTooLarge(error) => {
                tracing::info!("Rejected upload: {}", error);
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    ApiError::new("PAYLOAD_TOO_LARGE", error),
                )
            }
            AppError::ServiceUnavailable { code, error } => {
                tracing::warn!("Backend unavailable ({}): {}", code, error);
                (StatusCode::SERVICE_UNAVAILABLE, ApiError::new(code, error))
            }
            AppError::BadGateway(error) => {
                tracing::warn!("Backend failure: {}", error);
                (StatusCode::BAD_GATEWAY, ApiError::new("BACKEND_ERROR", error))
            }
            AppError::Internal(error) => {
                tracing::error!("Internal error: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", error),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

/// Machine-readable code for a pipeline error
fn error_code(err: &DocQaError) -> &'static str {
    match err {
        DocQaError::ValidationError(_) => "VALIDATION_ERROR",
        DocQaError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
        DocQaError::EmptyDocument => "EMPTY_DOCUMENT",
        DocQaError::NoProcessableContent => "NO_PROCESSABLE_CONTENT",
        DocQaError::InvalidBackend(_) => "INVALID_BACKEND",
        DocQaError::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
        DocQaError::BackendNotConfigured(_) => "BACKEND_NOT_CONFIGURED",
        DocQaError::BackendError(_) => "BACKEND_ERROR",
        DocQaError::EmbeddingError(_)
        | DocQaError::VectorStoreError(_)
        | DocQaError::ConfigError(_)
        | DocQaError::Other(_) => "INTERNAL_ERROR",
    }
}

impl From<DocQaError> for AppError {
    fn from(err: DocQaError) -> Self {
        let code = error_code(&err);
        let text = err.to_string();

        match err {
            DocQaError::EmptyDocument => AppError::EmptyDocument(text),
            DocQaError::ValidationError(msg) => AppError::bad_request(code, msg),
            err if err.is_user_error() => AppError::bad_request(code, text),
            DocQaError::BackendUnavailable { .. } | DocQaError::BackendNotConfigured(_) => {
                AppError::ServiceUnavailable { code, error: text }
            }
            DocQaError::BackendError(_) => AppError::BadGateway(text),
            _ => AppError::Internal(text),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request("INVALID_JSON", rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::bad_request("INVALID_MULTIPART", err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DocQaError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(DocQaError::EmptyDocument), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DocQaError::InvalidBackend("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DocQaError::BackendUnavailable {
                backend: "Ollama".into(),
                hint: "run it".into()
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DocQaError::BackendNotConfigured("gemini".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DocQaError::BackendError("500".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(DocQaError::VectorStoreError("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_errors_are_bad_requests() {
        let errors = vec![
            DocQaError::ValidationError("query is required".into()),
            DocQaError::UnsupportedFormat("txt".into()),
            DocQaError::EmptyDocument,
            DocQaError::NoProcessableContent,
            DocQaError::InvalidBackend("gpt".into()),
            DocQaError::BackendUnavailable {
                backend: "Ollama embeddings".into(),
                hint: "run it".into(),
            },
            DocQaError::BackendNotConfigured("gemini".into()),
            DocQaError::BackendError("boom".into()),
            DocQaError::EmbeddingError("bad vector".into()),
            DocQaError::ConfigError("missing".into()),
        ];

        for err in errors {
            let user_error = err.is_user_error();
            let label = err.to_string();
            let status = status_of(err);
            assert_eq!(
                status == StatusCode::BAD_REQUEST,
                user_error,
                "{label} mapped to {status}"
            );
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&DocQaError::NoProcessableContent),
            "NO_PROCESSABLE_CONTENT"
        );
        assert_eq!(error_code(&DocQaError::EmbeddingError("x".into())), "INTERNAL_ERROR");

        let response = AppError::from(DocQaError::BackendUnavailable {
            backend: "Ollama embeddings".into(),
            hint: "run it".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_empty_document_uses_message_field() {
        let body = serde_json::to_value(ApiError::with_message(
            "EMPTY_DOCUMENT",
            DocQaError::EmptyDocument.to_string(),
        ))
        .unwrap();
        assert_eq!(body["message"], "PDF is empty or has no text.");
        assert!(body.get("error").is_none());

        let body = serde_json::to_value(ApiError::new("BAD_REQUEST", "nope")).unwrap();
        assert_eq!(body["error"], "nope");
        assert!(body.get("message").is_none());
    }
}
