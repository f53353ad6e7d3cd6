//! WebSocket endpoint: one connection per player, identified by the
//! `player_id` query parameter.
//!
//! Each connection gets a bounded outbound queue and a single pump task
//! that multiplexes inbound frames and queued outbound traffic.

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{handle, Message, MessageStream, Session};
use futures::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::settings;
use crate::lobby;
use crate::registry::{self, ClientHandle, CLIENTS};
use crate::ws::control;

pub async fn ws_index(req: HttpRequest, body: web::Payload) -> Result<HttpResponse, Error> {
    let pid_str = req
        .query_string()
        .split('&')
        .find_map(|kv| kv.strip_prefix("player_id="))
        .ok_or_else(|| actix_web::error::ErrorBadRequest("player_id missing"))?;
    let user_id =
        Uuid::parse_str(pid_str).map_err(|_| actix_web::error::ErrorBadRequest("bad UUID"))?;

    let (response, session, ws_stream) = handle(&req, body)?;

    // One live connection per user.
    if registry::is_user_online(user_id) {
        log::warn!("rejecting second connection for user {user_id}");
        let mut session = session;
        actix_web::rt::spawn(async move {
            let frame = serde_json::json!({
                "id": "unknown",
                "type": "error",
                "data": {
                    "error": "already_logged_in",
                    "message": "This account is already connected on another device.",
                },
            });
            let _ = session.text(frame.to_string()).await;
            let _ = session.close(None).await;
        });
        return Ok(response);
    }

    let (outbound_tx, outbound_rx) = mpsc::channel::<String>(settings().outbound_capacity);
    CLIENTS.insert(
        user_id,
        ClientHandle {
            user_id,
            outbound: outbound_tx,
            session: session.clone(),
            lobby_id: None,
            match_tx: None,
        },
    );
    log::info!("client connected: {user_id}");

    actix_web::rt::spawn(client_loop(user_id, session, ws_stream, outbound_rx));

    Ok(response)
}

async fn client_loop(
    user_id: Uuid,
    mut session: Session,
    mut ws_stream: MessageStream,
    mut outbound_rx: mpsc::Receiver<String>,
) {
    loop {
        tokio::select! {
            // client → server
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => control::handle_frame(user_id, &text),
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            // queued server → client
            Some(json) = outbound_rx.recv() => {
                if session.text(json).await.is_err() {
                    log::warn!("WS send failed for {user_id}");
                    break;
                }
            }
        }
    }

    // Disconnect: drop the registry entry and vacate any lobby seat.
    let handle = CLIENTS.remove(&user_id).map(|(_, h)| h);
    if let Some(handle) = handle {
        if let Some(lobby_id) = handle.lobby_id {
            lobby::leave_lobby(lobby_id, user_id);
        }
    }
    let _ = session.close(None).await;
    log::info!("client disconnected: {user_id}");
}
