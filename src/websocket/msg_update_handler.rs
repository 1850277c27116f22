use std::sync::Arc;
use tracing::{info, error};

use crate::models::EditMessage;
use crate::services::sync_service::SyncService;
use crate::ws::session::Session;

/// Handle an edit submitted over the channel: replace, flush and broadcast to every session.
///
/// A `timestamp` sent by the client is ignored; channel edits are stamped with the server clock.
pub async fn handle_update_message(edit: EditMessage, session: &Session, sync: &Arc<SyncService>) {
    let user_id = edit
        .user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| session.user_id.clone());

    info!("Update message received from session {}: user={}", session.id, user_id);

    if let Err(e) = sync.apply_edit(edit.content, Some(user_id), None).await {
        error!("Edit from session {} was not broadcast: {}", session.id, e);
    }
}
