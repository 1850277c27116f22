use crate::{AppState, models::{ErrorResponse, TextResponse, TextUpdateRequest, TextUpdateResponse}};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// Get the current document and live user count
pub async fn get_text(
    State(app_state): State<Arc<AppState>>,
) -> Json<TextResponse> {
    let doc = app_state.sync.snapshot().await;
    Json(TextResponse {
        content: doc.content,
        last_updated: doc.last_updated,
        user_count: app_state.sync.user_count().await,
    })
}

/// Replace the document, persist it and broadcast it to every session
pub async fn update_text(
    State(app_state): State<Arc<AppState>>,
    Json(update): Json<TextUpdateRequest>,
) -> Result<(StatusCode, Json<TextUpdateResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!("REST update received: user={}", update.user_id.as_deref().unwrap_or("anonymous"));

    let timestamp = app_state
        .sync
        .apply_edit(update.content, update.user_id, update.timestamp)
        .await
        .map_err(|e| ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, format!("Text was not saved: {}", e)))?;

    Ok((
        StatusCode::OK,
        Json(TextUpdateResponse {
            message: "Text updated successfully".to_string(),
            timestamp,
        }),
    ))
}
