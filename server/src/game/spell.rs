//! Area spells: effect cadence, bounded applications, single-fire life.

use crate::deck::{SkillKind, SpellSpec};
use crate::game::grid::{tile_distance, Position};
use crate::game::state::GameState;
use crate::game::unit::UnitKind;

/// Advance every living spell by one tick. A spell that completes an
/// awakening cycle applies its effect (while it still has applications
/// budgeted) and burns out; cleanup collects it at the end of the tick.
pub fn advance(gs: &mut GameState) {
    let tick = gs.tick_period;
    let mut firing: Vec<(Position, SpellSpec)> = Vec::new();

    for units in &mut gs.units {
        for unit in units.iter_mut() {
            if !unit.alive {
                continue;
            }
            let UnitKind::Spell(ref mut spell) = unit.kind else {
                continue;
            };
            spell.elapsed += tick;
            let interval = 1.0 / spell.spec.effect_speed;
            if spell.elapsed >= interval {
                if spell.applications < spell.spec.duration {
                    spell.elapsed -= interval;
                    spell.applications += 1;
                    firing.push((unit.pos, spell.spec.clone()));
                }
                unit.alive = false;
            }
        }
    }

    for (center, spec) in firing {
        apply_area(gs, center, &spec);
    }
}

/// Apply one spell application to every living unit, either side, whose
/// tile sits within the radius of the center.
pub fn apply_area(gs: &mut GameState, center: Position, spec: &SpellSpec) {
    for units in &mut gs.units {
        for unit in units.iter_mut() {
            if unit.is_spell() || !unit.is_alive() {
                continue;
            }
            if tile_distance(center.x, center.y, unit.pos.x, unit.pos.y) <= spec.radius {
                match spec.kind {
                    SkillKind::Damage => unit.reduce_hp(spec.value),
                    SkillKind::Heal => unit.heal(spec.value),
                    SkillKind::Shield => {
                        if let Some(f) = unit.fighter_mut() {
                            f.shield += spec.value;
                        }
                    }
                }
            }
        }
    }
}
