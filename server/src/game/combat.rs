//! Per-tick combat: target upkeep, movement toward targets, attack cadence
//! and passive skills.

use crate::deck::SkillKind;
use crate::game::grid::{min_footprint_distance, Grid, Position, Side};
use crate::game::path::bfs_path;
use crate::game::state::GameState;
use crate::game::unit::{Unit, UnitKind};
use rand::Rng;
use uuid::Uuid;

/// Critical hits scale the attack before defense is applied.
pub const CRIT_MULTIPLIER: f64 = 1.2;

/// Resolve one tick of combat for every living unit. Within a side the
/// order is troops, then guard towers, then the king.
pub fn resolve(gs: &mut GameState) {
    let mut rng = rand::thread_rng();
    for side in [Side::Top, Side::Bottom] {
        run_pass(gs, side, &mut rng, |u| matches!(u.kind, UnitKind::Troop(_)));
        run_pass(gs, side, &mut rng, |u| {
            matches!(u.kind, UnitKind::GuardTower(_))
        });
        run_pass(gs, side, &mut rng, |u| {
            matches!(u.kind, UnitKind::KingTower { .. })
        });
    }
}

fn run_pass<R, F>(gs: &mut GameState, side: Side, rng: &mut R, select: F)
where
    R: Rng,
    F: Fn(&Unit) -> bool,
{
    let tick = gs.tick_period;
    let grid = &gs.grid;
    let enemy_side = side.opponent();
    let (own, foe) = split_sides(&mut gs.units, side);

    for i in 0..own.len() {
        if !select(&own[i]) || !own[i].is_alive() || own[i].is_dormant_king() {
            continue;
        }
        let apos = own[i].pos;
        let range = own[i].fighter().expect("combat unit").stats.range;

        // Drop a target that died or slipped out of range since last tick;
        // then acquire the nearest living enemy if the slot is empty.
        {
            let stale = own[i]
                .fighter()
                .expect("combat unit")
                .target
                .is_some_and(|id| !target_in_range(foe, id, &apos, side, enemy_side, range));
            let f = own[i].fighter_mut().expect("combat unit");
            if stale {
                f.target = None;
            }
            if f.target.is_none() {
                f.target = nearest_enemy(foe, &apos, side, enemy_side);
                f.cooldown = 0.0;
            }
        }

        let Some(target_id) = own[i].fighter().expect("combat unit").target else {
            continue;
        };

        if target_in_range(foe, target_id, &apos, side, enemy_side, range) {
            engage(own, i, foe, target_id, tick, rng);
        } else if matches!(own[i].kind, UnitKind::Troop(_)) {
            // Out of reach: troops take exactly one step along the
            // shortest walkable path. Towers hold their post.
            step_toward(grid, own, i, foe, target_id);
        }
    }
}

/// Accumulate engaged time and land a hit whenever the cadence threshold
/// is crossed, keeping the carry-over.
fn engage<R: Rng>(
    own: &mut [Unit],
    i: usize,
    foe: &mut [Unit],
    target_id: Uuid,
    tick: f64,
    rng: &mut R,
) {
    let (threshold, ready) = {
        let f = own[i].fighter_mut().expect("combat unit");
        let threshold = 1.0 / f.stats.attack_speed;
        f.cooldown += tick;
        (threshold, f.cooldown >= threshold)
    };
    if !ready {
        return;
    }

    let (atk, crit_rate) = {
        let stats = &own[i].fighter().expect("combat unit").stats;
        (stats.atk, stats.crit_rate)
    };
    let Some(target) = foe.iter_mut().find(|u| u.id == target_id) else {
        return;
    };
    if !target.is_alive() {
        return;
    }

    let def = target.fighter().map(|f| f.stats.def).unwrap_or(0);
    let damage = roll_damage(atk, crit_rate, def, rng);
    target.reduce_hp(damage);

    let f = own[i].fighter_mut().expect("combat unit");
    f.cooldown -= threshold;
    let fire_skill = f.stats.skill.is_some() && !f.skill_used;
    if fire_skill {
        f.skill_used = true;
        apply_passive_skill(&mut own[i]);
    }
}

/// One hit's damage: attack, critically scaled with probability
/// `crit_rate`, minus the defender's defense, never negative.
pub fn roll_damage<R: Rng>(atk: i32, crit_rate: f64, def: i32, rng: &mut R) -> i32 {
    let mut effective = atk as f64;
    if rng.gen::<f64>() < crit_rate {
        effective *= CRIT_MULTIPLIER;
    }
    (effective as i32 - def).max(0)
}

/// Whether the referenced enemy is alive and within attack reach.
fn target_in_range(
    foe: &[Unit],
    id: Uuid,
    from: &Position,
    side: Side,
    enemy_side: Side,
    range: f64,
) -> bool {
    foe.iter()
        .find(|u| u.id == id)
        .filter(|t| t.is_alive())
        .map(|t| min_footprint_distance(from, side, &t.pos, enemy_side) <= range)
        .unwrap_or(false)
}

/// Nearest living non-spell enemy by footprint distance; equal distances
/// resolve to the lowest unit id so acquisition is stable.
fn nearest_enemy(foe: &[Unit], from: &Position, side: Side, enemy_side: Side) -> Option<Uuid> {
    let mut best: Option<(f64, Uuid)> = None;
    for unit in foe {
        if !unit.is_alive() || unit.is_spell() {
            continue;
        }
        let d = min_footprint_distance(from, side, &unit.pos, enemy_side);
        let closer = match best {
            None => true,
            Some((bd, bid)) => d < bd || (d == bd && unit.id < bid),
        };
        if closer {
            best = Some((d, unit.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Advance a troop one tile along the shortest walkable path to its
/// target. No path, no movement.
fn step_toward(grid: &Grid, own: &mut [Unit], i: usize, foe: &[Unit], target_id: Uuid) {
    let Some(target) = foe.iter().find(|u| u.id == target_id) else {
        return;
    };
    let from = own[i].pos;
    let path = bfs_path(grid, (from.x, from.y), (target.pos.x, target.pos.y));
    if path.len() >= 2 {
        let (nx, ny) = path[1];
        own[i].set_location(Position {
            x: nx,
            y: ny,
            long: from.long,
            wide: from.wide,
        });
    }
}

/// Instant passive skills land their whole budget the first time the owner
/// hits something, then never again.
fn apply_passive_skill(unit: &mut Unit) {
    let Some(skill) = unit.fighter().and_then(|f| f.stats.skill.clone()) else {
        return;
    };
    if skill.effect_speed != 0.0 {
        return;
    }
    let total = skill.value * skill.duration;
    match skill.kind {
        SkillKind::Heal => unit.heal(total),
        SkillKind::Shield => {
            if let Some(f) = unit.fighter_mut() {
                f.shield += total;
            }
        }
        SkillKind::Damage => {}
    }
}

fn split_sides(units: &mut [Vec<Unit>; 2], side: Side) -> (&mut Vec<Unit>, &mut Vec<Unit>) {
    let (top, bottom) = units.split_at_mut(1);
    match side {
        Side::Top => (&mut top[0], &mut bottom[0]),
        Side::Bottom => (&mut bottom[0], &mut top[0]),
    }
}
