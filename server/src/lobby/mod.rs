//! Waiting rooms and their bookkeeping. Each lobby owns a controller task
//! (see [`control`]) that polls liveness and promotes the room to a match
//! once every slot answers.

pub mod control;

use crate::registry::LOBBIES;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    OneVsOne,
    TwoVsTwo,
}

impl RoomType {
    /// Parse the wire string; anything unrecognized falls back to 1v1.
    pub fn parse(s: &str) -> RoomType {
        match s {
            "2v2" => RoomType::TwoVsTwo,
            _ => RoomType::OneVsOne,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::OneVsOne => "1v1",
            RoomType::TwoVsTwo => "2v2",
        }
    }

    pub fn max_size(self) -> usize {
        match self {
            RoomType::OneVsOne => 2,
            RoomType::TwoVsTwo => 4,
        }
    }
}

impl Serialize for RoomType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LobbyRoom {
    pub id: Uuid,
    pub room_type: RoomType,
    /// True when the room was spun up by auto-matchmaking.
    pub auto_match: bool,
    pub slots: Vec<Option<Uuid>>,
    pub created_at: Instant,
    /// Fired to tear the room down; the controller exits on it.
    pub cancel: Arc<Notify>,
}

impl LobbyRoom {
    pub fn new(id: Uuid, room_type: RoomType, auto_match: bool) -> LobbyRoom {
        LobbyRoom {
            id,
            room_type,
            auto_match,
            slots: vec![None; room_type.max_size()],
            created_at: Instant::now(),
            cancel: Arc::new(Notify::new()),
        }
    }

    /// Seat a user in the first empty slot; returns the slot index.
    pub fn join(&mut self, user_id: Uuid) -> Option<usize> {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(user_id);
                return Some(i);
            }
        }
        None
    }

    pub fn leave(&mut self, user_id: Uuid) {
        for slot in &mut self.slots {
            if *slot == Some(user_id) {
                *slot = None;
                break;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Seated users in slot order.
    pub fn occupants(&self) -> Vec<Uuid> {
        self.slots.iter().filter_map(|s| *s).collect()
    }
}

/// Create a lobby, register it and start its controller.
pub fn create_lobby(room_type: RoomType, auto_match: bool) -> Uuid {
    let id = Uuid::new_v4();
    let room = LobbyRoom::new(id, room_type, auto_match);
    let cancel = room.cancel.clone();
    LOBBIES.insert(id, room);
    control::spawn_controller(id, cancel);
    id
}

/// Seat a user in an existing lobby.
pub fn join_lobby(lobby_id: Uuid, user_id: Uuid) -> Option<(RoomType, usize)> {
    let mut room = LOBBIES.get_mut(&lobby_id)?;
    let slot = room.join(user_id)?;
    Some((room.room_type, slot))
}

/// Unseat a user. An emptied lobby is canceled and removed. Returns false
/// when the lobby does not exist.
pub fn leave_lobby(lobby_id: Uuid, user_id: Uuid) -> bool {
    let emptied = {
        let Some(mut room) = LOBBIES.get_mut(&lobby_id) else {
            return false;
        };
        room.leave(user_id);
        room.is_empty()
    };
    if emptied {
        if let Some((_, room)) = LOBBIES.remove(&lobby_id) {
            room.cancel.notify_waiters();
        }
    }
    true
}

/// A joinable lobby of the given type: same room type and a free slot.
pub fn find_available(room_type: RoomType) -> Option<Uuid> {
    LOBBIES
        .iter()
        .find(|e| e.room_type == room_type && !e.is_full())
        .map(|e| e.id)
}
