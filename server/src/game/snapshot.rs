//! Per-viewer payloads: the tick snapshot and the hand/deck summary.
//!
//! Stored state is canonical (side-0 viewpoint); a side-1 viewer gets the
//! map rotated 180° and every unit position mirrored to match.

use crate::game::grid::Side;
use crate::game::player::PlayerState;
use crate::game::state::GameState;
use crate::game::unit::Unit;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UnitView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub side: Side,
    pub alive: bool,
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub shield: i32,
}

#[derive(Debug, Serialize)]
pub struct UpdateView {
    pub map: Vec<Vec<u8>>,
    pub allies: [Vec<UnitView>; 2],
    pub elixir: f64,
    pub hand: [i32; 4],
    #[serde(rename = "nextCard")]
    pub next_card: i32,
}

#[derive(Debug, Serialize)]
pub struct DeckView {
    pub hand: [i32; 4],
    #[serde(rename = "nextCard")]
    pub next_card: i32,
    pub elixir: f64,
    #[serde(rename = "elixirTimer")]
    pub elixir_timer: f64,
}

fn unit_view(gs: &GameState, unit: &Unit, viewer: Side) -> UnitView {
    let (x, y) = if viewer == Side::Bottom {
        gs.grid.mirror(unit.pos.x, unit.pos.y)
    } else {
        (unit.pos.x, unit.pos.y)
    };
    let (hp, shield) = match unit.fighter() {
        Some(f) => (f.hp, f.shield),
        None => (0, 0),
    };
    UnitView {
        id: unit.id,
        kind: unit.kind_name(),
        side: unit.side,
        alive: unit.alive,
        x,
        y,
        hp,
        shield,
    }
}

/// The `update` payload one player receives for the current tick.
pub fn update_view(gs: &GameState, viewer: &PlayerState) -> UpdateView {
    let side = viewer.side;
    let allies = [
        gs.units[0].iter().map(|u| unit_view(gs, u, side)).collect(),
        gs.units[1].iter().map(|u| unit_view(gs, u, side)).collect(),
    ];
    UpdateView {
        map: gs.grid.render(side),
        allies,
        elixir: viewer.elixir,
        hand: viewer.hand,
        next_card: viewer.next_card,
    }
}

/// The `deck` payload: hand, preview and elixir for one player.
pub fn deck_view(player: &PlayerState) -> DeckView {
    DeckView {
        hand: player.hand,
        next_card: player.next_card,
        elixir: player.elixir,
        elixir_timer: player.elixir_timer,
    }
}
