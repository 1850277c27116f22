use crate::{AppState, handlers::{get_status, get_text, health_check, ready_check, root, update_text}, websocket::handler::websocket_handler};
use axum::{routing::get, Router};
use std::sync::Arc;

/// Create API routes
pub fn create_api_routes(app_state: Arc<AppState>) -> Router {
    Router::<Arc<AppState>>::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/text", get(get_text).post(update_text))
        .route("/status", get(get_status))
        .route("/ws", get(websocket_handler))
        .with_state(app_state)
}
