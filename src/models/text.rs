use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current document plus live user count
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TextResponse {
    pub content: String,
    pub last_updated: DateTime<Utc>,
    pub user_count: usize,
}

/// Full replacement of the document
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TextUpdateRequest {
    pub content: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// RFC 3339, or naive ISO-8601 read as UTC. Defaults to the server's clock.
    #[serde(default, deserialize_with = "crate::models::timestamp::deserialize_optional")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TextUpdateResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
