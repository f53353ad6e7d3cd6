//! Process-wide registries for connected clients, open lobbies and running
//! matches. Each map is an independently sharded RW-locked structure;
//! writers hold their shard for the duration of one insert/remove only.

use crate::lobby::{LobbyRoom, RoomType};
use crate::protocol::{MatchAction, OutboundSender};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Connected clients: user id → handle. One live connection per user.
pub static CLIENTS: Lazy<DashMap<Uuid, ClientHandle>> = Lazy::new(DashMap::new);

/// Open lobbies: lobby id → room.
pub static LOBBIES: Lazy<DashMap<Uuid, LobbyRoom>> = Lazy::new(DashMap::new);

/// Running matches: match id → handle.
pub static MATCHES: Lazy<DashMap<Uuid, MatchHandle>> = Lazy::new(DashMap::new);

/// Everything the rest of the server may do to one connection.
#[derive(Clone)]
pub struct ClientHandle {
    pub user_id: Uuid,
    /// Bounded queue drained by the connection's write pump.
    pub outbound: OutboundSender,
    /// Clone of the WS session, used for liveness ping control frames.
    pub session: actix_ws::Session,
    /// Lobby the client currently sits in, if any.
    pub lobby_id: Option<Uuid>,
    /// Action channel of the match the client currently plays in, if any.
    pub match_tx: Option<mpsc::Sender<MatchAction>>,
}

impl ClientHandle {
    /// Send a ping control frame and wait up to a second for the session
    /// to accept it. A closed or wedged connection counts as dead.
    pub async fn is_alive(&self) -> bool {
        let mut session = self.session.clone();
        matches!(
            tokio::time::timeout(Duration::from_secs(1), session.ping(b"")).await,
            Ok(Ok(()))
        )
    }
}

#[derive(Clone)]
pub struct MatchHandle {
    pub id: Uuid,
    pub room_type: RoomType,
    pub actions: mpsc::Sender<MatchAction>,
}

/// Duplicate-login guard: true while a live connection for this user is
/// registered.
pub fn is_user_online(user_id: Uuid) -> bool {
    CLIENTS.contains_key(&user_id)
}

/// Fetch a clone of a client handle without holding the shard lock.
pub fn client(user_id: Uuid) -> Option<ClientHandle> {
    CLIENTS.get(&user_id).map(|e| e.value().clone())
}

/// Point a client at the match it has been promoted into.
pub fn attach_match(user_id: Uuid, tx: mpsc::Sender<MatchAction>) {
    if let Some(mut e) = CLIENTS.get_mut(&user_id) {
        e.match_tx = Some(tx);
        e.lobby_id = None;
    }
}

/// Detach a finished match from its players.
pub fn detach_match(user_ids: &[Uuid]) {
    for uid in user_ids {
        if let Some(mut e) = CLIENTS.get_mut(uid) {
            e.match_tx = None;
        }
    }
}

pub fn set_lobby(user_id: Uuid, lobby_id: Option<Uuid>) {
    if let Some(mut e) = CLIENTS.get_mut(&user_id) {
        e.lobby_id = lobby_id;
    }
}
