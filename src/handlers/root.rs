use axum::Json;
use crate::models::RootResponse;

/// Service banner with the available endpoints
pub async fn root() -> Json<RootResponse> {
    let endpoints = [
        ("GET /text", "Get current text content"),
        ("POST /text", "Update text content"),
        ("GET /status", "Get server status"),
        ("WebSocket /ws", "Real-time updates"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Json(RootResponse {
        message: "Collaborative Text Editor API".to_string(),
        endpoints,
    })
}
