use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.settings.server.static_dir.clone();

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/api/test", get(handlers::chat::api_test_handler))
        .route("/api/chat", post(handlers::chat::chat_handler));

    let router = match static_dir {
        // Built frontend; unknown paths resolve to index.html
        Some(dir) => {
            info!("Serving static files from {}", dir);
            let index = Path::new(&dir).join("index.html");
            api_routes.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index)))
        }
        None => api_routes,
    };

    router
        .with_state(state)
        // CORS
        .layer(
            CorsLayer::permissive()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}
