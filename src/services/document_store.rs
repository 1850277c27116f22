use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Snapshot of the shared document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub last_updated: DateTime<Utc>,
}

/// Single authoritative holder of the shared text.
///
/// The store only mutates memory. Persistence and broadcasting are driven by the
/// sync service, which also serializes concurrent edits.
pub struct DocumentStore {
    doc: RwLock<Document>,
}

impl DocumentStore {
    pub fn new(content: String) -> Self {
        Self {
            doc: RwLock::new(Document {
                content,
                last_updated: Utc::now(),
            }),
        }
    }

    /// Read the current content and its timestamp
    pub async fn get(&self) -> Document {
        self.doc.read().await.clone()
    }

    /// Overwrite the whole content and return the timestamp that was applied.
    /// Without an explicit timestamp the current time is used.
    pub async fn replace(&self, content: String, timestamp: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let applied = timestamp.unwrap_or_else(Utc::now);
        let mut doc = self.doc.write().await;
        doc.content = content;
        doc.last_updated = applied;
        applied
    }
}
