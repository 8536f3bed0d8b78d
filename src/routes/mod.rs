//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route(
            "/api/v1/question/:id/options",
            get(http::http_get_options)
                .post(http::http_post_options)
                .delete(http::http_delete_options),
        )
        .route("/api/v1/evaluate", post(http::http_post_evaluate))
        .route("/api/v1/same_response", post(http::http_post_same_response))
        .route("/api/v1/question/:id/render", get(http::http_get_render))
        .route("/api/v1/question/:id/export", get(http::http_get_export))
        .route("/api/v1/import", post(http::http_post_import))
        .route("/api/v1/question/:id/backup", get(http::http_get_backup))
        .route("/api/v1/restore", post(http::http_post_restore))
        .route("/api/v1/draft", post(http::http_post_draft))
        .route(
            "/api/v1/draft/:id/files",
            get(http::http_get_draft_files).post(http::http_post_draft_file),
        )
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
