use tracing::{error, warn};

use crate::models::SendMessage;
use super::session::Session;

/// Outcome of one broadcast round
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Best-effort fan-out to sessions.
///
/// A failing recipient is logged and skipped. It is not retried and not deregistered here;
/// its own connection handler removes it when the writer stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct BroadcastDispatcher;

impl BroadcastDispatcher {
    pub fn broadcast(&self, envelope: &SendMessage, recipients: &[Session]) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        if recipients.is_empty() {
            return report;
        }

        let frame = match serde_json::to_string(envelope) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize broadcast envelope: {}", e);
                report.failed = recipients.len();
                return report;
            }
        };

        for session in recipients {
            match session.send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Dropping broadcast for {}: {}", session.user_id, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
