use crate::{AppState, models::StatusResponse};
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

/// Report connected clients and document statistics
pub async fn get_status(
    State(app_state): State<Arc<AppState>>,
) -> Json<StatusResponse> {
    let doc = app_state.sync.snapshot().await;
    let connected_clients = app_state.sync.user_count().await;
    debug!("Status requested: {} clients", connected_clients);

    Json(StatusResponse {
        connected_clients,
        text_length: doc.content.chars().count(),
        last_updated: doc.last_updated,
        file_path: app_state.sync.file_path().display().to_string(),
    })
}
