//! Per-lobby controller: polls every second, promotes a full room to a
//! running match, and tears the room down on timeout, overflow or
//! cancellation.

use crate::config::settings;
use crate::deck::{PlayerLoadout, SERVICES};
use crate::game::runtime::{self, Seat};
use crate::game::snapshot;
use crate::game::state::GameState;
use crate::protocol::{send_error, send_message, MatchAction};
use crate::registry::{self, ClientHandle, MatchHandle, LOBBIES, MATCHES};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

pub(crate) fn spawn_controller(lobby_id: Uuid, cancel: Arc<Notify>) {
    tokio::spawn(control_lobby(lobby_id, cancel));
}

async fn control_lobby(lobby_id: Uuid, cancel: Arc<Notify>) {
    log::info!("lobby control started for {lobby_id}");
    let mut poll = tokio::time::interval(Duration::from_millis(settings().lobby_poll_ms));
    let timeout = Duration::from_secs(settings().lobby_timeout_secs);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let Some((occupants, max_size, elapsed)) = snapshot_room(lobby_id) else {
                    // Promoted or deleted elsewhere; nothing left to watch.
                    return;
                };

                let mut alive = 0usize;
                for user_id in &occupants {
                    if let Some(handle) = registry::client(*user_id) {
                        if handle.is_alive().await {
                            alive += 1;
                        }
                    }
                }

                if alive == max_size {
                    log::info!("lobby {lobby_id} is full, promoting to match");
                    if promote(lobby_id).await {
                        return;
                    }
                } else if alive > max_size {
                    log::warn!("lobby {lobby_id} holds more clients than allowed, closing");
                    close_lobby(lobby_id, "room_closed", "Lobby has too many clients");
                    return;
                }

                if elapsed > timeout {
                    log::info!("lobby {lobby_id} timed out");
                    close_lobby(lobby_id, "timeout", "Lobby timeout reached");
                    return;
                }
            }
            _ = cancel.notified() => {
                log::info!("lobby {lobby_id} canceled");
                close_lobby(lobby_id, "canceled", "Lobby was canceled");
                return;
            }
        }
    }
}

fn snapshot_room(lobby_id: Uuid) -> Option<(Vec<Uuid>, usize, Duration)> {
    let room = LOBBIES.get(&lobby_id)?;
    Some((
        room.occupants(),
        room.room_type.max_size(),
        room.created_at.elapsed(),
    ))
}

/// Remove the lobby and notify whoever is still seated.
fn close_lobby(lobby_id: Uuid, error: &str, message: &str) {
    match LOBBIES.remove(&lobby_id) {
        Some((_, room)) => {
            log::info!("removing lobby {lobby_id}: {message}");
            for user_id in room.occupants() {
                registry::set_lobby(user_id, None);
                if let Some(handle) = registry::client(user_id) {
                    send_error(&handle.outbound, "", error, message);
                }
            }
        }
        None => log::debug!("attempted to remove non-existent lobby {lobby_id}"),
    }
}

/// Turn a full lobby into a running match under the same id. Returns true
/// when the controller's job is done (promoted, or aborted with the room
/// already gone).
async fn promote(lobby_id: Uuid) -> bool {
    let (users, room_type) = {
        let Some(room) = LOBBIES.get(&lobby_id) else {
            return true;
        };
        (room.occupants(), room.room_type)
    };
    if users.len() < room_type.max_size() {
        log::info!("lobby {lobby_id} no longer has enough seated clients");
        return false;
    }

    LOBBIES.remove(&lobby_id);

    let handles: Vec<(Uuid, Option<ClientHandle>)> = users
        .iter()
        .map(|&uid| (uid, registry::client(uid)))
        .collect();

    // Static data loads happen before the match exists; a failure aborts
    // the whole promotion and no match is created.
    let mut seats_data: Vec<(Uuid, PlayerLoadout)> = Vec::with_capacity(users.len());
    for &user_id in &users {
        match SERVICES.decks.load_loadout(user_id) {
            Ok(loadout) => seats_data.push((user_id, loadout)),
            Err(e) => {
                log::error!("deck load failed for {user_id}: {e:?}");
                abort_promotion(&handles, "error", "Failed to load user deck");
                return true;
            }
        }
    }
    let tiles = match SERVICES.maps.load_map(&settings().map_name) {
        Ok(tiles) => tiles,
        Err(e) => {
            log::error!("map load failed: {e:?}");
            abort_promotion(&handles, "error", "Failed to load map");
            return true;
        }
    };

    let gs = GameState::new(
        lobby_id,
        room_type,
        tiles,
        seats_data,
        settings().tick_seconds(),
    );

    let (action_tx, action_rx) = mpsc::channel::<MatchAction>(settings().action_capacity);
    MATCHES.insert(
        lobby_id,
        MatchHandle {
            id: lobby_id,
            room_type,
            actions: action_tx.clone(),
        },
    );

    let mut seats = Vec::with_capacity(users.len());
    for (user_id, handle) in &handles {
        let Some(handle) = handle else { continue };
        registry::attach_match(*user_id, action_tx.clone());

        send_message(
            &handle.outbound,
            "start game",
            "start game",
            serde_json::json!({ "roomID": lobby_id, "type": room_type }),
        );
        if let Some(player) = gs.player(*user_id) {
            send_message(&handle.outbound, "deck", "deck", snapshot::deck_view(player));
        }
        seats.push(Seat {
            user_id: *user_id,
            outbound: handle.outbound.clone(),
        });
    }

    log::info!("lobby {lobby_id} promoted to match");
    runtime::spawn(gs, seats, action_rx);
    true
}

fn abort_promotion(handles: &[(Uuid, Option<ClientHandle>)], error: &str, message: &str) {
    for (user_id, handle) in handles {
        registry::set_lobby(*user_id, None);
        if let Some(handle) = handle {
            send_error(&handle.outbound, "", error, message);
        }
    }
}
