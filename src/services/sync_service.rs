use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{InitialStateMessage, SendMessage, TextUpdateMessage, UserCountMessage};
use crate::services::document_store::{Document, DocumentStore};
use crate::services::persistence::{PersistenceError, PersistenceWriter};
use crate::ws::dispatcher::{BroadcastDispatcher, BroadcastReport};
use crate::ws::registry::ConnectionRegistry;
use crate::ws::session::{normalize_user_id, Session};

/// Orchestrates edits: replace, flush, then broadcast.
///
/// `edit_lock` makes a replace and its flush atomic relative to other edits and to joins.
/// Broadcasting happens after the lock is released.
pub struct SyncService {
    store: DocumentStore,
    persistence: PersistenceWriter,
    registry: ConnectionRegistry,
    dispatcher: BroadcastDispatcher,
    edit_lock: Mutex<()>,
}

impl SyncService {
    pub fn new(store: DocumentStore, persistence: PersistenceWriter) -> Self {
        Self {
            store,
            persistence,
            registry: ConnectionRegistry::new(),
            dispatcher: BroadcastDispatcher,
            edit_lock: Mutex::new(()),
        }
    }

    /// Build the service from the backing file, empty when the file does not exist
    pub async fn load(persistence: PersistenceWriter) -> Result<Self, PersistenceError> {
        let content = persistence.load().await?.unwrap_or_default();
        Ok(Self::new(DocumentStore::new(content), persistence))
    }

    pub async fn snapshot(&self) -> Document {
        self.store.get().await
    }

    pub async fn user_count(&self) -> usize {
        self.registry.size().await
    }

    pub fn file_path(&self) -> &Path {
        self.persistence.path()
    }

    /// Apply a full-document replacement under last-write-wins.
    ///
    /// The edit runs on its own task, so dropping the caller cannot release the edit lock
    /// mid-flush or skip the broadcast of an edit that already reached disk.
    /// On a flush failure the in-memory document keeps the new content and nothing is
    /// broadcast; the next successful flush brings the file back in line.
    pub async fn apply_edit(
        self: &Arc<Self>,
        content: String,
        user_id: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, SyncError> {
        let sync = Arc::clone(self);
        tokio::spawn(async move { sync.commit_edit(content, user_id, timestamp).await })
            .await
            .map_err(SyncError::Interrupted)?
    }

    async fn commit_edit(
        &self,
        content: String,
        user_id: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, SyncError> {
        let user_id = normalize_user_id(user_id);

        let applied = {
            let _guard = self.edit_lock.lock().await;
            let applied = self.store.replace(content.clone(), timestamp).await;
            if let Err(e) = self.persistence.flush(&content).await {
                error!("Edit by {} applied in memory but not persisted: {}", user_id, e);
                return Err(SyncError::Persistence(e));
            }
            applied
        };

        info!("Text updated by {} ({} characters)", user_id, content.chars().count());
        let envelope = SendMessage::TextUpdate(TextUpdateMessage { content, user_id, timestamp: applied });
        let recipients = self.registry.all().await;
        let report = self.dispatcher.broadcast(&envelope, &recipients);
        log_report("text_update", report);
        Ok(applied)
    }

    /// Register a session and queue its `initial_state`, then announce the new count.
    ///
    /// Holding the edit lock keeps edits from landing between the snapshot and registration,
    /// so the session sees `initial_state` before any edit it did not make.
    pub async fn join(&self, session: Session) -> usize {
        let user_count = {
            let _guard = self.edit_lock.lock().await;
            let doc = self.store.get().await;
            self.registry.add(session.clone()).await;
            let user_count = self.registry.size().await;

            let initial = SendMessage::InitialState(InitialStateMessage {
                content: doc.content,
                last_updated: doc.last_updated,
                user_count,
            });
            let report = self.dispatcher.broadcast(&initial, std::slice::from_ref(&session));
            if report.failed > 0 {
                warn!("Could not queue initial state for session {}", session.id);
            }
            user_count
        };

        info!("Client {} connected. Total clients: {}", session.user_id, user_count);
        self.broadcast_presence().await;
        user_count
    }

    /// Deregister a session and announce the new count to the remaining ones
    pub async fn leave(&self, session_id: &Uuid) {
        if self.registry.remove(session_id).await {
            info!("Client disconnected. Total clients: {}", self.registry.size().await);
            self.broadcast_presence().await;
        }
    }

    pub async fn broadcast_presence(&self) -> BroadcastReport {
        let recipients = self.registry.all().await;
        let envelope = SendMessage::UserCountUpdate(UserCountMessage { user_count: recipients.len() });
        let report = self.dispatcher.broadcast(&envelope, &recipients);
        log_report("user_count_update", report);
        report
    }
}

#[derive(Debug)]
pub enum SyncError {
    Persistence(PersistenceError),
    /// The edit task panicked or the runtime shut down under it
    Interrupted(tokio::task::JoinError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Persistence(e) => write!(f, "{}", e),
            SyncError::Interrupted(e) => write!(f, "Edit was interrupted: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Persistence(e) => Some(e),
            SyncError::Interrupted(e) => Some(e),
        }
    }
}

fn log_report(kind: &str, report: BroadcastReport) {
    if report.failed > 0 {
        warn!("Broadcast {}: {} delivered, {} failed", kind, report.delivered, report.failed);
    } else {
        debug!("Broadcast {}: {} delivered", kind, report.delivered);
    }
}

/// Periodically re-announce the user count so peers that missed an update converge
pub fn spawn_presence_ticker(sync: Arc<SyncService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sync.broadcast_presence().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn parse(frame: Option<String>) -> SendMessage {
        serde_json::from_str(&frame.expect("frame")).unwrap()
    }

    fn service_at(path: &Path) -> Arc<SyncService> {
        Arc::new(SyncService::new(DocumentStore::new(String::new()), PersistenceWriter::new(path)))
    }

    async fn joined(sync: &SyncService, user: &str) -> (Session, UnboundedReceiver<String>) {
        let (session, rx) = Session::new(Some(user.to_string()));
        sync.join(session.clone()).await;
        (session, rx)
    }

    #[tokio::test]
    async fn edit_is_flushed_and_echoed_to_sender() {
        let dir = tempdir().unwrap();
        let sync = service_at(&dir.path().join("doc.txt"));
        let (_x, mut rx) = joined(&sync, "xavier").await;
        assert!(matches!(parse(rx.recv().await), SendMessage::InitialState(_)));
        assert!(matches!(parse(rx.recv().await), SendMessage::UserCountUpdate(_)));

        let applied = sync.apply_edit("hello".to_string(), Some("xavier".to_string()), None).await.unwrap();

        assert_eq!(std::fs::read_to_string(sync.file_path()).unwrap(), "hello");
        match parse(rx.recv().await) {
            SendMessage::TextUpdate(update) => {
                assert_eq!(update.content, "hello");
                assert_eq!(update.user_id, "xavier");
                assert_eq!(update.timestamp, applied);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn last_serialized_edit_wins() {
        let dir = tempdir().unwrap();
        let sync = service_at(&dir.path().join("doc.txt"));
        sync.apply_edit("foo".to_string(), None, None).await.unwrap();
        sync.apply_edit("bar".to_string(), None, None).await.unwrap();
        assert_eq!(sync.snapshot().await.content, "bar");
        assert_eq!(std::fs::read_to_string(sync.file_path()).unwrap(), "bar");
    }

    #[tokio::test]
    async fn flush_failure_keeps_memory_and_skips_broadcast() {
        let dir = tempdir().unwrap();
        let sync = service_at(&dir.path().join("missing").join("doc.txt"));
        let (_s, mut rx) = joined(&sync, "ann").await;
        rx.recv().await;
        rx.recv().await;

        let result = sync.apply_edit("lost on disk".to_string(), None, None).await;

        assert!(matches!(result, Err(SyncError::Persistence(_))));
        assert_eq!(sync.snapshot().await.content, "lost on disk");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_caller_still_finishes_its_edit_before_the_next_one() {
        let dir = tempdir().unwrap();
        let sync = service_at(&dir.path().join("doc.txt"));
        let (_s, mut rx) = joined(&sync, "watcher").await;
        rx.recv().await;
        rx.recv().await;

        // Polled once, then dropped while the edit task is still pending
        let first = "x".repeat(8 * 1024 * 1024);
        let dropped = tokio::time::timeout(
            Duration::ZERO,
            sync.apply_edit(first.clone(), Some("early".to_string()), None),
        )
        .await;
        assert!(dropped.is_err());

        sync.apply_edit("bar".to_string(), Some("late".to_string()), None).await.unwrap();

        match parse(rx.recv().await) {
            SendMessage::TextUpdate(update) => {
                assert_eq!(update.user_id, "early");
                assert_eq!(update.content.len(), first.len());
            }
            other => panic!("unexpected {:?}", other),
        }
        match parse(rx.recv().await) {
            SendMessage::TextUpdate(update) => assert_eq!(update.content, "bar"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sync.snapshot().await.content, "bar");
        assert_eq!(std::fs::read_to_string(sync.file_path()).unwrap(), "bar");
    }

    #[tokio::test]
    async fn blank_user_id_is_broadcast_as_anonymous() {
        let dir = tempdir().unwrap();
        let sync = service_at(&dir.path().join("doc.txt"));
        let (_s, mut rx) = joined(&sync, "watcher").await;
        rx.recv().await;
        rx.recv().await;

        sync.apply_edit("hi".to_string(), Some("   ".to_string()), None).await.unwrap();

        match parse(rx.recv().await) {
            SendMessage::TextUpdate(update) => assert_eq!(update.user_id, "anonymous"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn join_sends_snapshot_then_presence() {
        let dir = tempdir().unwrap();
        let sync = service_at(&dir.path().join("doc.txt"));
        sync.apply_edit("existing".to_string(), None, None).await.unwrap();
        let (_a, mut rx_a) = joined(&sync, "a").await;
        let (_b, mut rx_b) = joined(&sync, "b").await;

        match parse(rx_b.recv().await) {
            SendMessage::InitialState(init) => {
                assert_eq!(init.content, "existing");
                assert_eq!(init.user_count, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(parse(rx_b.recv().await), SendMessage::UserCountUpdate(UserCountMessage { user_count: 2 }));

        // a saw its own join and then b's
        rx_a.recv().await;
        assert_eq!(parse(rx_a.recv().await), SendMessage::UserCountUpdate(UserCountMessage { user_count: 1 }));
        assert_eq!(parse(rx_a.recv().await), SendMessage::UserCountUpdate(UserCountMessage { user_count: 2 }));
    }

    #[tokio::test]
    async fn leave_announces_remaining_count() {
        let dir = tempdir().unwrap();
        let sync = service_at(&dir.path().join("doc.txt"));
        let (a, _rx_a) = joined(&sync, "a").await;
        let (_b, mut rx_b) = joined(&sync, "b").await;
        let (_c, mut rx_c) = joined(&sync, "c").await;
        while rx_b.try_recv().is_ok() {}
        while rx_c.try_recv().is_ok() {}

        sync.leave(&a.id).await;
        sync.leave(&a.id).await;

        assert_eq!(sync.user_count().await, 2);
        let expected = SendMessage::UserCountUpdate(UserCountMessage { user_count: 2 });
        assert_eq!(parse(rx_b.recv().await), expected);
        assert_eq!(parse(rx_c.recv().await), expected);
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn load_reads_existing_backing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "from disk").unwrap();
        let sync = SyncService::load(PersistenceWriter::new(&path)).await.unwrap();
        assert_eq!(sync.snapshot().await.content, "from disk");
    }
}
