//! Authoritative per-match state and the card-release pipeline.

use crate::deck::{CardKind, PlayerLoadout};
use crate::game::grid::{Grid, Position, Side, TILE_BRIDGE, TILE_RIVER, TILE_WALKABLE};
use crate::game::player::PlayerState;
use crate::game::unit::{Unit, UnitKind};
use crate::lobby::RoomType;
use thiserror::Error;
use uuid::Uuid;

/// Canonical (side-0) tower anchors; side 1 gets the mirrored posts.
pub const KING_POST: Position = Position {
    x: 2,
    y: 8,
    long: 4,
    wide: 4,
};
pub const GUARD_POSTS: [Position; 2] = [
    Position {
        x: 6,
        y: 3,
        long: 3,
        wide: 3,
    },
    Position {
        x: 6,
        y: 14,
        long: 3,
        wide: 3,
    },
];

/// Why a release was rejected. Nothing is mutated on rejection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("card {0} is not in this player's hand")]
    CardNotInHand(usize),
    #[error("target tile is out of map bounds")]
    OutOfBounds,
    #[error("tile type cannot host this card")]
    InvalidTile,
    #[error("not enough elixir to release card")]
    NotEnoughElixir,
    #[error("player is not part of this match")]
    UnknownPlayer,
}

impl ReleaseError {
    /// Error kind string surfaced on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ReleaseError::CardNotInHand(_) => "invalid_payload",
            ReleaseError::OutOfBounds | ReleaseError::InvalidTile => "invalid_position",
            ReleaseError::NotEnoughElixir => "not_enough_elixir",
            ReleaseError::UnknownPlayer => "invalid_data",
        }
    }
}

#[derive(Debug)]
pub struct GameState {
    pub id: Uuid,
    pub room_type: RoomType,
    pub grid: Grid,
    /// Players per side; index 0 is the top side.
    pub players: [Vec<PlayerState>; 2],
    /// Units per side, towers first, troops and spells appended on release.
    pub units: [Vec<Unit>; 2],
    /// Tick period in seconds; drives every per-tick accumulator.
    pub tick_period: f64,
}

impl GameState {
    /// Build the opening state: seats become players (alternating sides by
    /// slot order), towers spawn at their posts and block their footprints.
    pub fn new(
        id: Uuid,
        room_type: RoomType,
        tiles: Vec<Vec<u8>>,
        seats: Vec<(Uuid, PlayerLoadout)>,
        tick_period: f64,
    ) -> GameState {
        let mut grid = Grid::new(tiles);
        let mut players: [Vec<PlayerState>; 2] = [Vec::new(), Vec::new()];
        let mut units: [Vec<Unit>; 2] = [Vec::new(), Vec::new()];

        for (slot, (user_id, loadout)) in seats.into_iter().enumerate() {
            let side = Side::from_index(slot % 2);
            players[side.index()].push(PlayerState::new(user_id, side, loadout));
        }

        for side in [Side::Top, Side::Bottom] {
            // Tower stats come from the side's first seat, as they do for
            // shared towers in team matches.
            let Some(owner) = players[side.index()].first() else {
                continue;
            };
            let king_stats = owner.loadout.king.stats.clone();
            let guard_stats = owner.loadout.guard.stats.clone();

            let king_pos = side_post(&grid, &KING_POST, side);
            grid.block_footprint(&king_pos, side);
            units[side.index()].push(Unit::king_tower(side, king_pos, king_stats));

            for post in &GUARD_POSTS {
                let pos = side_post(&grid, post, side);
                grid.block_footprint(&pos, side);
                units[side.index()].push(Unit::guard_tower(side, pos, guard_stats.clone()));
            }
        }

        GameState {
            id,
            room_type,
            grid,
            players,
            units,
            tick_period,
        }
    }

    pub fn player(&self, user_id: Uuid) -> Option<&PlayerState> {
        self.players
            .iter()
            .flatten()
            .find(|p| p.user_id == user_id)
    }

    pub fn player_mut(&mut self, user_id: Uuid) -> Option<&mut PlayerState> {
        self.players
            .iter_mut()
            .flatten()
            .find(|p| p.user_id == user_id)
    }

    /// Validate and apply one `release` action. Checks run in order: hand
    /// membership, map bounds, tile class, elixir. The first failure
    /// surfaces a typed error and leaves all state untouched.
    pub fn release_card(
        &mut self,
        user_id: Uuid,
        card_id: usize,
        x: i32,
        y: i32,
    ) -> Result<(), ReleaseError> {
        let player = self
            .players
            .iter()
            .flatten()
            .find(|p| p.user_id == user_id)
            .ok_or(ReleaseError::UnknownPlayer)?;
        let side = player.side;

        if !player.has_in_hand(card_id) {
            return Err(ReleaseError::CardNotInHand(card_id));
        }
        let card = player
            .loadout
            .cards
            .iter()
            .find(|c| c.index == card_id)
            .ok_or(ReleaseError::CardNotInHand(card_id))?
            .clone();

        if !self.grid.in_bounds(x, y) {
            return Err(ReleaseError::OutOfBounds);
        }
        let tile = self.grid.tile(x, y).unwrap_or(0);
        let tile_ok = match card.kind {
            CardKind::Troop(_) => tile == TILE_WALKABLE,
            CardKind::Spell(_) => matches!(tile, TILE_WALKABLE | TILE_BRIDGE | TILE_RIVER),
        };
        if !tile_ok {
            return Err(ReleaseError::InvalidTile);
        }

        if player.elixir < card.mana as f64 {
            return Err(ReleaseError::NotEnoughElixir);
        }

        // Side-1 players aim in their own rotated view; store canonically.
        let (x, y) = if side == Side::Bottom {
            self.grid.mirror(x, y)
        } else {
            (x, y)
        };
        let pos = Position::tile(x, y);

        let unit = match card.kind {
            CardKind::Troop(stats) => Unit::troop(side, pos, stats),
            CardKind::Spell(spec) => Unit::spell(side, pos, spec),
        };
        self.units[side.index()].push(unit);

        let player = self.player_mut(user_id).expect("player exists");
        player.elixir -= card.mana as f64;
        player.rotate_hand(card_id);
        Ok(())
    }

    /// Fold hit points into alive flags for every unit.
    pub fn refresh_alive(&mut self) {
        for side in &mut self.units {
            for unit in side {
                unit.refresh_alive();
            }
        }
    }

    /// Side whose king tower is destroyed, if any. Checked before cleanup
    /// drops the unit.
    pub fn dead_king_side(&self) -> Option<Side> {
        for units in &self.units {
            for unit in units {
                if matches!(unit.kind, UnitKind::KingTower { .. }) && !unit.is_alive() {
                    return Some(unit.side);
                }
            }
        }
        None
    }

    /// Drop units that died this tick; dead towers give their footprint
    /// back to the map.
    pub fn cleanup(&mut self) {
        for idx in 0..2 {
            let side = Side::from_index(idx);
            let mut kept = Vec::with_capacity(self.units[idx].len());
            for unit in self.units[idx].drain(..) {
                if unit.alive {
                    kept.push(unit);
                } else if unit.is_tower() {
                    self.grid.clear_footprint(&unit.pos, side);
                }
            }
            self.units[idx] = kept;
        }
    }
}

/// A canonical post translated to the given side. Side-0 anchors are used
/// as written; side-1 anchors are the mirrored points (their footprints
/// grow back toward the mirrored origin).
fn side_post(grid: &Grid, post: &Position, side: Side) -> Position {
    match side {
        Side::Top => *post,
        Side::Bottom => {
            let (x, y) = grid.mirror(post.x, post.y);
            Position {
                x,
                y,
                long: post.long,
                wide: post.wide,
            }
        }
    }
}
