use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::services::ConversationManager;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: String,
    remote_completion: bool,
    active_sessions: usize,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Always ready: the fallback generator answers even without the completion API
pub async fn readiness_check(
    State(manager): State<Arc<ConversationManager>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready".to_string(),
            remote_completion: manager.has_remote(),
            active_sessions: manager.cache().len(),
        }),
    )
}
