//! Unit tests for per-viewer snapshot generation.

use arena_server::deck::{basic_map, starter_loadout};
use arena_server::game::grid::TILE_WALKABLE;
use arena_server::game::snapshot::{deck_view, update_view};
use arena_server::game::state::GameState;
use arena_server::game::unit::UnitKind;
use arena_server::lobby::RoomType;
use uuid::Uuid;

fn new_match(u1: Uuid, u2: Uuid) -> GameState {
    GameState::new(
        Uuid::new_v4(),
        RoomType::OneVsOne,
        basic_map(),
        vec![(u1, starter_loadout()), (u2, starter_loadout())],
        0.5,
    )
}

#[test]
fn side_one_map_is_the_side_zero_map_rotated() {
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let gs = new_match(u1, u2);

    let top = update_view(&gs, gs.player(u1).unwrap());
    let bottom = update_view(&gs, gs.player(u2).unwrap());

    let rows = top.map.len();
    let cols = top.map[0].len();
    for x in 0..rows {
        for y in 0..cols {
            assert_eq!(bottom.map[x][y], top.map[rows - 1 - x][cols - 1 - y]);
        }
    }
}

#[test]
fn side_one_viewer_sees_mirrored_unit_positions() {
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let gs = new_match(u1, u2);

    let top = update_view(&gs, gs.player(u1).unwrap());
    let bottom = update_view(&gs, gs.player(u2).unwrap());

    // Side 0's king is stored at its canonical post.
    let king_top = top.allies[0]
        .iter()
        .find(|u| u.kind == "king_tower")
        .unwrap();
    assert_eq!((king_top.x, king_top.y), (2, 8));

    // The same unit, viewed from the other side of the table.
    let king_bottom = bottom.allies[0]
        .iter()
        .find(|u| u.kind == "king_tower")
        .unwrap();
    assert_eq!((king_bottom.x, king_bottom.y), (32, 11));
    assert_eq!(king_bottom.id, king_top.id);
}

#[test]
fn update_carries_the_viewers_own_resources() {
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let mut gs = new_match(u1, u2);
    gs.player_mut(u2).unwrap().elixir = 7.0;

    let view = update_view(&gs, gs.player(u2).unwrap());
    assert_eq!(view.elixir, 7.0);
    assert_eq!(view.hand, gs.player(u2).unwrap().hand);
    assert_eq!(view.next_card, gs.player(u2).unwrap().next_card);
}

#[test]
fn dead_units_vanish_from_snapshots_after_cleanup() {
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let mut gs = new_match(u1, u2);

    let guard_id = gs.units[0]
        .iter()
        .find(|u| matches!(u.kind, UnitKind::GuardTower(_)))
        .unwrap()
        .id;
    let guard_pos = gs.units[0]
        .iter()
        .find(|u| u.id == guard_id)
        .unwrap()
        .pos;

    gs.units[0]
        .iter_mut()
        .find(|u| u.id == guard_id)
        .unwrap()
        .fighter_mut()
        .unwrap()
        .hp = 0;
    gs.refresh_alive();
    gs.cleanup();

    let view = update_view(&gs, gs.player(u1).unwrap());
    assert!(view.allies[0].iter().all(|u| u.id != guard_id));

    // The fallen tower hands its tiles back to the pathfinder.
    assert_eq!(gs.grid.tile(guard_pos.x, guard_pos.y), Some(TILE_WALKABLE));
}

#[test]
fn deck_view_reflects_hand_preview_and_elixir() {
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let gs = new_match(u1, u2);
    let player = gs.player(u1).unwrap();

    let view = deck_view(player);
    assert_eq!(view.hand, player.hand);
    assert_eq!(view.next_card, player.next_card);
    assert_eq!(view.elixir, player.elixir);
}
