//! Unit tests for lobby room bookkeeping.

use arena_server::lobby::{LobbyRoom, RoomType};
use uuid::Uuid;

#[test]
fn room_type_parsing_and_capacity() {
    assert_eq!(RoomType::parse("1v1"), RoomType::OneVsOne);
    assert_eq!(RoomType::parse("2v2"), RoomType::TwoVsTwo);
    // Unknown wire strings fall back to the smallest room.
    assert_eq!(RoomType::parse("weird"), RoomType::OneVsOne);

    assert_eq!(RoomType::OneVsOne.max_size(), 2);
    assert_eq!(RoomType::TwoVsTwo.max_size(), 4);
}

#[test]
fn join_fills_the_first_empty_slot() {
    let mut room = LobbyRoom::new(Uuid::new_v4(), RoomType::TwoVsTwo, false);
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    assert_eq!(room.join(a), Some(0));
    assert_eq!(room.join(b), Some(1));
    room.leave(a);
    // The vacated front slot is reused before the later ones.
    assert_eq!(room.join(c), Some(0));
}

#[test]
fn full_rooms_reject_joins() {
    let mut room = LobbyRoom::new(Uuid::new_v4(), RoomType::OneVsOne, false);
    assert_eq!(room.join(Uuid::new_v4()), Some(0));
    assert_eq!(room.join(Uuid::new_v4()), Some(1));
    assert!(room.is_full());
    assert_eq!(room.join(Uuid::new_v4()), None);
}

#[test]
fn leave_detects_the_emptied_room() {
    let mut room = LobbyRoom::new(Uuid::new_v4(), RoomType::OneVsOne, true);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    room.join(a);
    room.join(b);

    room.leave(a);
    assert!(!room.is_empty());
    room.leave(b);
    assert!(room.is_empty());
}

#[test]
fn occupants_preserve_slot_order() {
    let mut room = LobbyRoom::new(Uuid::new_v4(), RoomType::TwoVsTwo, false);
    let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    for u in &users {
        room.join(*u);
    }
    assert_eq!(room.occupants(), users);

    room.leave(users[1]);
    assert_eq!(room.occupants(), vec![users[0], users[2], users[3]]);
}
