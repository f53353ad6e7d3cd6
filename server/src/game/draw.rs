//! Deadline tiebreak for matches where both kings survived.

use crate::game::grid::Side;
use crate::game::state::GameState;
use crate::game::unit::UnitKind;
use std::cmp::Ordering;

/// Pick a winner at the deadline, or `None` for a true draw:
/// more surviving guard towers wins; otherwise the side whose weakest
/// surviving tower has more hit points wins.
pub fn resolve_draw(gs: &GameState) -> Option<Side> {
    let mut guard_count = [0u32; 2];
    let mut min_hp = [i32::MAX; 2];

    for (idx, units) in gs.units.iter().enumerate() {
        for unit in units {
            if !unit.is_alive() {
                continue;
            }
            match &unit.kind {
                UnitKind::GuardTower(f) => {
                    guard_count[idx] += 1;
                    min_hp[idx] = min_hp[idx].min(f.hp);
                }
                UnitKind::KingTower { fighter, .. } => {
                    min_hp[idx] = min_hp[idx].min(fighter.hp);
                }
                _ => {}
            }
        }
    }

    match guard_count[0].cmp(&guard_count[1]) {
        Ordering::Greater => return Some(Side::Top),
        Ordering::Less => return Some(Side::Bottom),
        Ordering::Equal => {}
    }

    match min_hp[0].cmp(&min_hp[1]) {
        Ordering::Greater => Some(Side::Top),
        Ordering::Less => Some(Side::Bottom),
        Ordering::Equal => None,
    }
}
