use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body is missing required fields or carries blank values.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Required credentials or identifiers are not configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token exchange failed: {message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    #[error("Embedding provider error: {message}")]
    EmbeddingProvider {
        status: Option<u16>,
        message: String,
    },

    #[error("Generation provider error: {message}")]
    GenerationProvider {
        status: Option<u16>,
        message: String,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn auth(err: LlmError) -> Self {
        AppError::Auth {
            status: err.status(),
            message: err.to_string(),
        }
    }

    pub fn embedding(err: LlmError) -> Self {
        AppError::EmbeddingProvider {
            status: err.status(),
            message: err.to_string(),
        }
    }

    pub fn generation(err: LlmError) -> Self {
        AppError::GenerationProvider {
            status: err.status(),
            message: err.to_string(),
        }
    }

    /// Upstream HTTP status, when the failure came from a provider response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Auth { status, .. }
            | AppError::EmbeddingProvider { status, .. }
            | AppError::GenerationProvider { status, .. } => *status,
            _ => None,
        }
    }
}

/// Malformed or mistyped request bodies are reported like any other bad input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let upstream_status = self.upstream_status();

        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Auth { status, message } => {
                tracing::error!(upstream_status = ?status, "Token exchange failed: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AUTH_ERROR",
                    "Failed to authenticate with the model provider".to_string(),
                )
            }
            AppError::EmbeddingProvider { status, message } => {
                tracing::error!(upstream_status = ?status, "Embedding provider error: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMBEDDING_PROVIDER_ERROR",
                    "The embedding provider request failed".to_string(),
                )
            }
            AppError::GenerationProvider { status, message } => {
                tracing::error!(upstream_status = ?status, "Generation provider error: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_PROVIDER_ERROR",
                    "The text generation request failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(upstream) = upstream_status {
            body["upstream_status"] = json!(upstream);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Configuration("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Auth {
                    status: Some(401),
                    message: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::EmbeddingProvider {
                    status: None,
                    message: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::GenerationProvider {
                    status: Some(500),
                    message: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_provider_error_keeps_upstream_status() {
        let err = AppError::embedding(LlmError::Api {
            status: 429,
            message: "slow down".into(),
        });
        assert_eq!(err.upstream_status(), Some(429));
        assert!(err.to_string().contains("slow down"));
    }
}
