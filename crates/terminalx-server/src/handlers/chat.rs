use crate::models::chat::*;
use crate::services::conversation::{ConversationManager, ReplySource};
use crate::utils::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub async fn chat_handler(
    State(manager): State<Arc<ConversationManager>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let start_time = Instant::now();
    let request = match payload {
        Ok(Json(request)) => request,
        // Body without a JSON content type is ignored, leaving no message
        Err(JsonRejection::MissingJsonContentType(_)) => ChatRequest::default(),
        Err(rejection) => return Err(ApiError::BadRequest(rejection.body_text())),
    };
    let request_id = uuid::Uuid::new_v4();
    let message = request.message.unwrap_or_default();

    info!(
        "Chat request {}: session={}, message_len={}",
        request_id,
        request.session_id,
        message.len()
    );

    let reply = manager.handle(&message, &request.session_id).await?;

    debug!(
        "Chat request {} answered via {:?} in {}ms",
        request_id,
        reply.source,
        start_time.elapsed().as_millis()
    );

    if reply.source == ReplySource::GeneratorFailure {
        return Err(ApiError::GenerationFailed {
            message: "Error generating response".to_string(),
            response: reply.response,
        });
    }

    Ok(Json(ChatResponse {
        response: reply.response,
    }))
}

/// Connectivity check used by the terminal frontend
pub async fn api_test_handler() -> Json<ApiTestResponse> {
    Json(ApiTestResponse {
        message: "API is working".to_string(),
    })
}
