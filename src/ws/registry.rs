use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use tracing::debug;

use super::session::Session;

/// Set of live sessions. Its size is the authoritative user count.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, session: Session) {
        let mut sessions = self.sessions.write().await;
        debug!("Registering session {} ({})", session.id, session.user_id);
        sessions.insert(session.id, session);
    }

    /// Deregister a session. Removing an unknown id is a no-op.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            debug!("Removed session {}", id);
        }
        removed
    }

    pub async fn size(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Snapshot of the registered sessions, safe to iterate without holding the lock
    pub async fn all(&self) -> Vec<Session> {
        self.sessions.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_and_remove_track_size() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = Session::new(None);
        let (b, _rx_b) = Session::new(Some("bob".to_string()));
        registry.add(a.clone()).await;
        registry.add(b).await;
        assert_eq!(registry.size().await, 2);

        assert!(registry.remove(&a.id).await);
        assert_eq!(registry.size().await, 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (a, _rx) = Session::new(None);
        registry.add(a.clone()).await;
        assert!(registry.remove(&a.id).await);
        assert!(!registry.remove(&a.id).await);
        assert_eq!(registry.size().await, 0);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_changes() {
        let registry = ConnectionRegistry::new();
        let (a, _rx) = Session::new(None);
        registry.add(a.clone()).await;
        let snapshot = registry.all().await;
        registry.remove(&a.id).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, a.id);
    }
}
