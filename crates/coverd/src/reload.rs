//! Configuration reload requests.
//!
//! Reloading a configuration entry is the host platform's job; the setup flow
//! only fires a request and moves on. Requests travel over an unbounded
//! channel so the sender never blocks, and a send failure is logged rather
//! than propagated.

use tokio::sync::mpsc;
use tracing::warn;

/// Request for the host platform to reload one configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    pub entry_id: String,
}

pub type ReloadSender = mpsc::UnboundedSender<ReloadRequest>;
pub type ReloadReceiver = mpsc::UnboundedReceiver<ReloadRequest>;

pub fn reload_channel() -> (ReloadSender, ReloadReceiver) {
    mpsc::unbounded_channel()
}

/// Fire a reload request for `entry_id`, without waiting for the result.
pub fn request_reload(tx: &ReloadSender, entry_id: &str) {
    let request = ReloadRequest {
        entry_id: entry_id.to_string(),
    };
    if tx.send(request).is_err() {
        warn!("Failed to send reload request for {}: receiver gone", entry_id);
    }
}
