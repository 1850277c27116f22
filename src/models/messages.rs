use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Edit submitted by a client over /ws
#[derive(Deserialize, Debug)]
pub struct EditMessage {
    pub content: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ReceivedMessage {
    #[serde(rename = "text_update")]
    TextUpdate(EditMessage),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InitialStateMessage {
    pub content: String,
    pub last_updated: DateTime<Utc>,
    pub user_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextUpdateMessage {
    pub content: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserCountMessage {
    pub user_count: usize,
}

/// Envelopes pushed from the server to sessions
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum SendMessage {
    #[serde(rename = "initial_state")]
    InitialState(InitialStateMessage),
    #[serde(rename = "text_update")]
    TextUpdate(TextUpdateMessage),
    #[serde(rename = "user_count_update")]
    UserCountUpdate(UserCountMessage),
}
