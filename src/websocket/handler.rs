use std::sync::Arc;
use std::time::Duration;
use axum::{
    extract::{Query, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use futures_util::stream::SplitSink;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::models::ReceivedMessage;
use crate::websocket::msg_update_handler::handle_update_message;
use crate::ws::session::{ConnectionState, Session};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub user_id: Option<String>,
}

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<ConnectQuery>,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, query.user_id, app_state))
}

/// Drive one session from Connecting to Closed
async fn handle_socket(socket: WebSocket, user_id: Option<String>, app_state: Arc<AppState>) {
    let mut state = ConnectionState::Connecting;
    let (session, outbound) = Session::new(user_id);
    let session_id = session.id;
    debug!("Session {} {:?}", session_id, state);

    // Split the socket into sender and receiver
    let (sender, mut receiver) = socket.split();

    // Only this task writes to the socket, in queue order
    let send_timeout = app_state.config.send_timeout();
    let mut write_task = tokio::spawn(write_outbound(sender, outbound, send_timeout));

    app_state.sync.join(session.clone()).await;
    state = transition(session_id, state, ConnectionState::Active);

    // Stops the reader between frames, never in the middle of an edit
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let sync = app_state.sync.clone();
    let reader_session = session.clone();
    let mut read_task = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                _ = &mut stop_rx => break,
                frame = receiver.next() => frame,
            };
            let Some(frame) = frame else { break };
            let msg = match frame {
                Ok(Message::Text(msg)) => msg,
                Ok(Message::Close(_)) => break,
                Ok(Message::Binary(_)) => {
                    warn!("Ignoring binary frame from session {}", reader_session.id);
                    continue;
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!("WebSocket error on session {}: {}", reader_session.id, e);
                    break;
                }
            };

            // Malformed envelopes are dropped and the connection stays open
            let json_msg: ReceivedMessage = match serde_json::from_str(&msg) {
                Ok(json_msg) => json_msg,
                Err(e) => {
                    warn!("Ignoring malformed message from session {}: {}", reader_session.id, e);
                    continue;
                }
            };

            match json_msg {
                ReceivedMessage::TextUpdate(edit) => {
                    handle_update_message(edit, &reader_session, &sync).await;
                }
            }
        }
    });

    // Wait for either task to finish, then stop the other
    tokio::select! {
        _ = (&mut read_task) => write_task.abort(),
        _ = (&mut write_task) => {
            let _ = stop_tx.send(());
            let _ = (&mut read_task).await;
        }
    };

    transition(session_id, state, ConnectionState::Closed);
    app_state.sync.leave(&session_id).await;
    info!("WebSocket connection terminated for session {}", session_id);
}

/// Drain the session's outbound queue into the socket. Stops on the first failed or slow write.
async fn write_outbound(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: UnboundedReceiver<String>,
    send_timeout: Duration,
) {
    while let Some(frame) = outbound.recv().await {
        match tokio::time::timeout(send_timeout, sender.send(Message::Text(frame))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Failed to send frame: {}", e);
                break;
            }
            Err(_) => {
                warn!("Send timed out after {:?}", send_timeout);
                break;
            }
        }
    }
    let _ = sender.close().await;
}

fn transition(session_id: uuid::Uuid, from: ConnectionState, to: ConnectionState) -> ConnectionState {
    debug!("Session {} {:?} -> {:?}", session_id, from, to);
    to
}
