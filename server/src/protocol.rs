//! Wire protocol shared by the WS handler, lobby manager and match runtime.
//!
//! Every frame, both directions, is one JSON object `{id, type, data}`.
//! Responses echo the request id; server-initiated pushes use the message
//! type as the id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

// ---------- client → server ----------

/// Raw inbound frame. `data` stays untyped until the handler for the
/// message type deserializes it.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// Payload of `create_lobby`, `join_lobby`, `match_lobby` and `leave_lobby`.
#[derive(Debug, Deserialize)]
pub struct LobbyRequest {
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub lobby_id: Option<Uuid>,
}

/// Payload of `Release_card`.
#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    pub card_id: i64,
    pub x: i32,
    pub y: i32,
}

// ---------- server → client ----------

#[derive(Debug, Serialize)]
struct Outgoing<'a, T: Serialize> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

/// Handle for pushing frames to one client. The queue is bounded; sends
/// never block the caller and a full queue drops the frame with a log line.
pub type OutboundSender = mpsc::Sender<String>;

/// Serialize and enqueue a typed message. Drops on a full or closed queue.
pub fn send_message<T: Serialize>(tx: &OutboundSender, id: &str, kind: &str, data: T) {
    let frame = Outgoing { id, kind, data };
    let json = match serde_json::to_string(&frame) {
        Ok(json) => json,
        Err(e) => {
            log::error!("failed to encode {kind} frame: {e}");
            return;
        }
    };
    if tx.try_send(json).is_err() {
        log::warn!("outbound queue full or closed, dropping {kind} frame");
    }
}

/// Enqueue a standard error frame.
pub fn send_error(tx: &OutboundSender, id: &str, error: &str, message: &str) {
    let id = if id.is_empty() { "unknown" } else { id };
    send_message(tx, id, "error", ErrorBody { error, message });
}

// ---------- match action channel ----------

/// Actions forwarded from per-client dispatchers into a match loop. The
/// channel is the only way anything outside the loop touches match state.
#[derive(Debug, Clone)]
pub enum MatchAction {
    Release {
        msg_id: String,
        user_id: Uuid,
        card_id: usize,
        x: i32,
        y: i32,
    },
}
