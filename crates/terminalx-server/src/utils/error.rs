use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures inside the conversation engine.
///
/// Only `MissingInput` reaches callers of the orchestrator; the other
/// variants are recovered into a textual reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is required")]
    MissingInput,

    #[error("Remote completion failed: {0}")]
    RemoteService(String),

    #[error("Fallback generation failed: {0}")]
    Generator(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Generation failed but a terminal-style reply is still sent to the client
    #[error("Generation error: {message}")]
    GenerationFailed { message: String, response: String },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MissingInput => ApiError::BadRequest(err.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse { error: msg, response: None },
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse { error: msg, response: None },
                )
            }
            ApiError::GenerationFailed { message, response } => {
                tracing::error!("Generation error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: message,
                        response: Some(response),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
