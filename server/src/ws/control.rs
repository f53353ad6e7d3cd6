//! Frame dispatch: decode the envelope and route by message type.

use crate::lobby::{self, RoomType};
use crate::protocol::{
    send_error, send_message, Envelope, LobbyRequest, MatchAction, ReleaseRequest,
};
use crate::registry::{self, ClientHandle};
use serde_json::Value;
use uuid::Uuid;

pub fn handle_frame(user_id: Uuid, raw: &str) {
    let Some(client) = registry::client(user_id) else {
        return;
    };

    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(env) => env,
        Err(e) => {
            log::warn!("invalid JSON from {user_id}: {e}");
            send_error(&client.outbound, "", "invalid_json", "Malformed JSON");
            return;
        }
    };
    let Envelope { id, kind, data } = envelope;

    match kind.as_str() {
        "create_lobby" => handle_create_lobby(&client, &id, data),
        "join_lobby" => handle_join_lobby(&client, &id, data),
        "match_lobby" => handle_match_lobby(&client, &id, data),
        "leave_lobby" => handle_leave_lobby(&client, &id, data),
        "Release_card" => handle_release_card(&client, &id, data),
        _ => send_error(&client.outbound, &id, "unknown_type", "Unknown message type"),
    }
}

fn handle_create_lobby(client: &ClientHandle, id: &str, data: Value) {
    let Ok(req) = serde_json::from_value::<LobbyRequest>(data) else {
        send_error(
            &client.outbound,
            id,
            "invalid_data",
            "Invalid lobby create data",
        );
        return;
    };
    let room_type = RoomType::parse(&req.room_type);
    let lobby_id = lobby::create_lobby(room_type, false);

    let Some((room_type, slot)) = lobby::join_lobby(lobby_id, client.user_id) else {
        send_error(&client.outbound, id, "join_failed", "Could not join lobby");
        return;
    };
    registry::set_lobby(client.user_id, Some(lobby_id));

    send_message(
        &client.outbound,
        id,
        "lobby_created",
        serde_json::json!({
            "lobby_id": lobby_id,
            "type": room_type,
            "slot": slot,
        }),
    );
}

fn handle_join_lobby(client: &ClientHandle, id: &str, data: Value) {
    let lobby_id = serde_json::from_value::<LobbyRequest>(data)
        .ok()
        .and_then(|req| req.lobby_id);
    let Some(lobby_id) = lobby_id else {
        send_error(
            &client.outbound,
            id,
            "invalid_data",
            "Missing or invalid lobby ID",
        );
        return;
    };

    let Some((room_type, slot)) = lobby::join_lobby(lobby_id, client.user_id) else {
        send_error(&client.outbound, id, "join_failed", "Could not join lobby");
        return;
    };
    registry::set_lobby(client.user_id, Some(lobby_id));

    send_message(
        &client.outbound,
        id,
        "lobby_joined",
        serde_json::json!({
            "lobby_id": lobby_id,
            "type": room_type,
            "slot": slot,
        }),
    );
}

fn handle_match_lobby(client: &ClientHandle, id: &str, data: Value) {
    let Ok(req) = serde_json::from_value::<LobbyRequest>(data) else {
        send_error(&client.outbound, id, "invalid_data", "Invalid match request");
        return;
    };
    let room_type = RoomType::parse(&req.room_type);

    let lobby_id =
        lobby::find_available(room_type).unwrap_or_else(|| lobby::create_lobby(room_type, true));

    let Some((room_type, slot)) = lobby::join_lobby(lobby_id, client.user_id) else {
        send_error(&client.outbound, id, "join_failed", "Could not join lobby");
        return;
    };
    registry::set_lobby(client.user_id, Some(lobby_id));

    send_message(
        &client.outbound,
        id,
        "matched_lobby",
        serde_json::json!({
            "lobby_id": lobby_id,
            "type": room_type,
            "slot": slot,
        }),
    );
}

fn handle_leave_lobby(client: &ClientHandle, id: &str, data: Value) {
    let lobby_id = serde_json::from_value::<LobbyRequest>(data)
        .ok()
        .and_then(|req| req.lobby_id);
    let Some(lobby_id) = lobby_id else {
        send_error(
            &client.outbound,
            id,
            "invalid_data",
            "Missing or invalid lobby ID",
        );
        return;
    };

    if !lobby::leave_lobby(lobby_id, client.user_id) {
        send_error(&client.outbound, id, "leave_failed", "Could not leave lobby");
        return;
    }
    registry::set_lobby(client.user_id, None);

    send_message(
        &client.outbound,
        id,
        "lobby_left",
        serde_json::json!({ "lobby_id": lobby_id }),
    );
}

fn handle_release_card(client: &ClientHandle, id: &str, data: Value) {
    let Ok(req) = serde_json::from_value::<ReleaseRequest>(data) else {
        send_error(
            &client.outbound,
            id,
            "invalid_payload",
            "Invalid release card format",
        );
        return;
    };
    if !(0..=7).contains(&req.card_id) {
        send_error(&client.outbound, id, "missing_fields", "Card id out of range");
        return;
    }

    let action = MatchAction::Release {
        msg_id: id.to_string(),
        user_id: client.user_id,
        card_id: req.card_id as usize,
        x: req.x,
        y: req.y,
    };

    // Non-blocking hand-off into the match loop; a full (or absent)
    // channel surfaces as busy and the client may retry.
    let delivered = client
        .match_tx
        .as_ref()
        .map(|tx| tx.try_send(action).is_ok())
        .unwrap_or(false);
    if !delivered {
        send_error(
            &client.outbound,
            id,
            "match_room_busy",
            "Unable to send to match room",
        );
    }
}
