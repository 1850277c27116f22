use tokio::sync::mpsc;
use uuid::Uuid;

pub const ANONYMOUS_USER: &str = "anonymous";

/// Trimmed client-supplied user id, `anonymous` when absent or blank
pub fn normalize_user_id(user_id: Option<String>) -> String {
    user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| ANONYMOUS_USER.to_string())
}

/// Lifecycle of one persistent connection
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Active,
    Closed,
}

/// One connected client.
///
/// Frames are pushed onto an outbound queue drained by the connection's single writer task,
/// so `send` never waits on the network and frames leave in enqueue order.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    outbound: mpsc::UnboundedSender<String>,
}

impl Session {
    /// Create a session and the receiving end of its outbound queue
    pub fn new(user_id: Option<String>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { id: Uuid::new_v4(), user_id: normalize_user_id(user_id), outbound }, rx)
    }

    /// Queue a frame for this session. Fails once the writer has stopped.
    pub fn send(&self, frame: String) -> Result<(), SessionClosed> {
        self.outbound.send(frame).map_err(|_| SessionClosed(self.id))
    }
}

#[derive(Debug)]
pub struct SessionClosed(pub Uuid);

impl std::fmt::Display for SessionClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session {} is closed", self.0)
    }
}

impl std::error::Error for SessionClosed {}
