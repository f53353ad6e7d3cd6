//! Unit tests for deterministic combat resolution.
//!
//! Crit rates are pinned to 0.0 or 1.0 so every roll is predictable.

use arena_server::deck::CombatStats;
use arena_server::game::combat::{self, roll_damage, CRIT_MULTIPLIER};
use arena_server::game::grid::{Grid, Position, Side, TILE_WALKABLE};
use arena_server::game::state::GameState;
use arena_server::game::unit::{Unit, UnitKind};
use arena_server::lobby::RoomType;
use uuid::Uuid;

fn stats(hp: i32, atk: i32, def: i32, attack_speed: f64, range: f64) -> CombatStats {
    CombatStats {
        hp_max: hp,
        shield: 0,
        atk,
        def,
        crit_rate: 0.0,
        attack_speed,
        range,
        speed: 1.0,
        skill: None,
    }
}

fn empty_state() -> GameState {
    GameState {
        id: Uuid::new_v4(),
        room_type: RoomType::OneVsOne,
        grid: Grid::new(vec![vec![TILE_WALKABLE; 20]; 35]),
        players: [Vec::new(), Vec::new()],
        units: [Vec::new(), Vec::new()],
        tick_period: 0.5,
    }
}

fn fighter(unit: &Unit) -> &arena_server::game::unit::Fighter {
    unit.fighter().expect("fighter unit")
}

#[test]
fn damage_formula_subtracts_defense_and_floors_at_zero() {
    let mut rng = rand::thread_rng();
    assert_eq!(roll_damage(50, 0.0, 20, &mut rng), 30);
    assert_eq!(roll_damage(10, 0.0, 50, &mut rng), 0);
    // Guaranteed crit multiplies the attack before defense.
    let expected = (100.0 * CRIT_MULTIPLIER) as i32 - 20;
    assert_eq!(roll_damage(100, 1.0, 20, &mut rng), expected);
}

#[test]
fn king_wakes_on_first_hit_and_targets_next_tick() {
    let mut gs = empty_state();
    let king_pos = Position {
        x: 2,
        y: 8,
        long: 4,
        wide: 4,
    };
    let king = Unit::king_tower(Side::Top, king_pos, stats(1000, 50, 0, 0.8, 8.0));
    gs.units[0].push(king);

    let troop = Unit::troop(
        Side::Bottom,
        Position::tile(7, 9),
        stats(400, 40, 0, 2.0, 3.0),
    );
    let troop_id = troop.id;
    gs.units[1].push(troop);

    assert!(matches!(
        gs.units[0][0].kind,
        UnitKind::KingTower { active: false, .. }
    ));

    // Tick 1: the troop engages (footprint distance 2 ≤ range 3) and its
    // cadence (0.5 per tick vs 1/2.0) lands a hit immediately. The king
    // was dormant when its own pass ran, so it acquired nothing yet.
    combat::resolve(&mut gs);
    assert!(matches!(
        gs.units[0][0].kind,
        UnitKind::KingTower { active: true, .. }
    ));
    assert_eq!(fighter(&gs.units[0][0]).hp, 960);
    assert_eq!(fighter(&gs.units[0][0]).target, None);

    // Tick 2: the awakened king acquires the troop.
    combat::resolve(&mut gs);
    assert_eq!(fighter(&gs.units[0][0]).hp, 920);
    assert_eq!(fighter(&gs.units[0][0]).target, Some(troop_id));
}

#[test]
fn dormant_king_ignores_enemies_in_reach() {
    let mut gs = empty_state();
    let king = Unit::king_tower(
        Side::Top,
        Position {
            x: 2,
            y: 8,
            long: 4,
            wide: 4,
        },
        stats(1000, 50, 0, 1.0, 8.0),
    );
    gs.units[0].push(king);
    // Range too short to ever land a hit from here this tick.
    let troop = Unit::troop(
        Side::Bottom,
        Position::tile(10, 9),
        stats(400, 40, 0, 1.0, 0.5),
    );
    gs.units[1].push(troop);

    combat::resolve(&mut gs);
    assert_eq!(fighter(&gs.units[0][0]).target, None);
    assert_eq!(fighter(&gs.units[0][0]).hp, 1000);
}

#[test]
fn shield_absorbs_the_whole_hit_before_hp() {
    let mut gs = empty_state();
    let attacker = Unit::troop(Side::Top, Position::tile(5, 5), stats(400, 80, 0, 2.0, 5.0));
    gs.units[0].push(attacker);

    let mut def_stats = stats(100, 10, 0, 1.0, 0.2);
    def_stats.shield = 50;
    let defender = Unit::troop(Side::Bottom, Position::tile(5, 7), def_stats);
    gs.units[1].push(defender);

    // First hit is swallowed whole by the 50 shield even though it deals 80.
    combat::resolve(&mut gs);
    assert_eq!(fighter(&gs.units[1][0]).shield, 0);
    assert_eq!(fighter(&gs.units[1][0]).hp, 100);

    // With the shield gone, hits reach hp.
    combat::resolve(&mut gs);
    assert_eq!(fighter(&gs.units[1][0]).hp, 20);
}

#[test]
fn attack_cadence_carries_over_between_ticks() {
    let mut gs = empty_state();
    // 0.8 attacks/second → one hit every 1.25s of engaged time.
    let attacker = Unit::troop(Side::Top, Position::tile(5, 5), stats(400, 40, 0, 0.8, 5.0));
    gs.units[0].push(attacker);
    let defender = Unit::guard_tower(
        Side::Bottom,
        Position::tile(5, 7),
        stats(1000, 10, 0, 1.0, 0.2),
    );
    gs.units[1].push(defender);

    // Hits land on ticks 3 (acc 1.5) and 5 (acc 0.25+1.0 = 1.25).
    for _ in 0..5 {
        combat::resolve(&mut gs);
    }
    assert_eq!(fighter(&gs.units[1][0]).hp, 1000 - 2 * 40);
}

#[test]
fn equal_distances_resolve_to_the_lowest_unit_id() {
    let mut gs = empty_state();
    let attacker = Unit::troop(Side::Top, Position::tile(5, 5), stats(400, 10, 0, 1.0, 10.0));
    gs.units[0].push(attacker);

    let mut left = Unit::guard_tower(
        Side::Bottom,
        Position::tile(5, 3),
        stats(1000, 10, 0, 1.0, 0.2),
    );
    let mut right = Unit::guard_tower(
        Side::Bottom,
        Position::tile(5, 7),
        stats(1000, 10, 0, 1.0, 0.2),
    );
    left.id = Uuid::from_u128(7);
    right.id = Uuid::from_u128(3);
    gs.units[1].push(left);
    gs.units[1].push(right);

    combat::resolve(&mut gs);
    assert_eq!(fighter(&gs.units[0][0]).target, Some(Uuid::from_u128(3)));
}

#[test]
fn troops_step_one_tile_toward_far_targets() {
    let mut gs = empty_state();
    let troop = Unit::troop(
        Side::Bottom,
        Position::tile(10, 5),
        stats(400, 40, 0, 1.0, 1.0),
    );
    gs.units[1].push(troop);
    let target = Unit::guard_tower(Side::Top, Position::tile(5, 5), stats(1000, 10, 0, 1.0, 0.2));
    gs.units[0].push(target);

    combat::resolve(&mut gs);
    assert_eq!(gs.units[1][0].pos, Position::tile(9, 5));

    combat::resolve(&mut gs);
    assert_eq!(gs.units[1][0].pos, Position::tile(8, 5));
}

#[test]
fn towers_never_move() {
    let mut gs = empty_state();
    let guard = Unit::guard_tower(Side::Top, Position::tile(5, 5), stats(1000, 10, 0, 1.0, 0.2));
    gs.units[0].push(guard);
    let troop = Unit::troop(
        Side::Bottom,
        Position::tile(20, 5),
        stats(400, 40, 0, 1.0, 1.0),
    );
    gs.units[1].push(troop);

    combat::resolve(&mut gs);
    assert_eq!(gs.units[0][0].pos, Position::tile(5, 5));
}

#[test]
fn passive_skill_fires_once_per_lifetime() {
    use arena_server::deck::{SkillKind, SkillSpec};

    let mut gs = empty_state();
    let mut atk_stats = stats(400, 40, 0, 2.0, 5.0);
    atk_stats.skill = Some(SkillSpec {
        name: "Bulwark",
        kind: SkillKind::Shield,
        duration: 2,
        effect_speed: 0.0,
        value: 30,
    });
    let attacker = Unit::troop(Side::Top, Position::tile(5, 5), atk_stats);
    gs.units[0].push(attacker);
    let defender = Unit::guard_tower(
        Side::Bottom,
        Position::tile(5, 7),
        stats(1000, 10, 0, 1.0, 0.2),
    );
    gs.units[1].push(defender);

    // One hit per tick at this cadence; the skill lands with the first.
    combat::resolve(&mut gs);
    assert!(fighter(&gs.units[0][0]).skill_used);
    assert_eq!(fighter(&gs.units[0][0]).shield, 60);

    combat::resolve(&mut gs);
    assert_eq!(fighter(&gs.units[0][0]).shield, 60);
}

#[test]
fn dead_targets_are_dropped_and_reacquired() {
    let mut gs = empty_state();
    let attacker = Unit::troop(Side::Top, Position::tile(5, 5), stats(400, 60, 0, 2.0, 5.0));
    gs.units[0].push(attacker);

    let near = Unit::troop(Side::Bottom, Position::tile(5, 6), stats(50, 5, 0, 1.0, 0.2));
    let far = Unit::troop(Side::Bottom, Position::tile(5, 8), stats(500, 5, 0, 1.0, 0.2));
    let far_id = far.id;
    gs.units[1].push(near);
    gs.units[1].push(far);

    // First tick kills the nearer troop outright (60 ≥ 50 hp).
    combat::resolve(&mut gs);
    gs.refresh_alive();
    gs.cleanup();
    assert_eq!(gs.units[1].len(), 1);

    // Next tick the attacker re-resolves to the survivor.
    combat::resolve(&mut gs);
    assert_eq!(fighter(&gs.units[0][0]).target, Some(far_id));
}
