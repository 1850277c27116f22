use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for server status
#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub connected_clients: usize,
    pub text_length: usize,
    pub last_updated: DateTime<Utc>,
    pub file_path: String,
}
