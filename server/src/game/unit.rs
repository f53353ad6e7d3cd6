//! Units on the board: troops, towers and spell effects.

use crate::deck::{CombatStats, SpellSpec};
use crate::game::grid::{Position, Side};
use uuid::Uuid;

/// Mutable combat state shared by troops and towers.
#[derive(Debug, Clone)]
pub struct Fighter {
    pub hp: i32,
    pub shield: i32,
    /// Attack cadence accumulator, in seconds of engaged time.
    pub cooldown: f64,
    pub target: Option<Uuid>,
    /// Latched once the passive skill has fired; never reset.
    pub skill_used: bool,
    pub stats: CombatStats,
}

impl Fighter {
    fn new(stats: CombatStats) -> Fighter {
        Fighter {
            hp: stats.hp_max,
            shield: stats.shield,
            cooldown: 0.0,
            target: None,
            skill_used: false,
            stats,
        }
    }
}

/// Running state of a placed spell.
#[derive(Debug, Clone)]
pub struct SpellState {
    /// Seconds of effect time accumulated since the last application.
    pub elapsed: f64,
    pub applications: i32,
    pub spec: SpellSpec,
}

#[derive(Debug, Clone)]
pub enum UnitKind {
    Troop(Fighter),
    GuardTower(Fighter),
    KingTower {
        fighter: Fighter,
        /// Kings sit out of combat until the first time they take a hit.
        active: bool,
    },
    Spell(SpellState),
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub id: Uuid,
    pub side: Side,
    pub alive: bool,
    pub pos: Position,
    pub kind: UnitKind,
}

impl Unit {
    pub fn troop(side: Side, pos: Position, stats: CombatStats) -> Unit {
        Unit {
            id: Uuid::new_v4(),
            side,
            alive: true,
            pos,
            kind: UnitKind::Troop(Fighter::new(stats)),
        }
    }

    pub fn guard_tower(side: Side, pos: Position, stats: CombatStats) -> Unit {
        Unit {
            id: Uuid::new_v4(),
            side,
            alive: true,
            pos,
            kind: UnitKind::GuardTower(Fighter::new(stats)),
        }
    }

    pub fn king_tower(side: Side, pos: Position, stats: CombatStats) -> Unit {
        Unit {
            id: Uuid::new_v4(),
            side,
            alive: true,
            pos,
            kind: UnitKind::KingTower {
                fighter: Fighter::new(stats),
                active: false,
            },
        }
    }

    pub fn spell(side: Side, pos: Position, spec: SpellSpec) -> Unit {
        Unit {
            id: Uuid::new_v4(),
            side,
            alive: true,
            pos,
            kind: UnitKind::Spell(SpellState {
                elapsed: 0.0,
                applications: 0,
                spec,
            }),
        }
    }

    pub fn location(&self) -> Position {
        self.pos
    }

    pub fn set_location(&mut self, pos: Position) {
        self.pos = pos;
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            UnitKind::Troop(_) => "troop",
            UnitKind::GuardTower(_) => "guard_tower",
            UnitKind::KingTower { .. } => "king_tower",
            UnitKind::Spell(_) => "spell",
        }
    }

    pub fn is_spell(&self) -> bool {
        matches!(self.kind, UnitKind::Spell(_))
    }

    pub fn is_tower(&self) -> bool {
        matches!(
            self.kind,
            UnitKind::GuardTower(_) | UnitKind::KingTower { .. }
        )
    }

    pub fn fighter(&self) -> Option<&Fighter> {
        match &self.kind {
            UnitKind::Troop(f) | UnitKind::GuardTower(f) => Some(f),
            UnitKind::KingTower { fighter, .. } => Some(fighter),
            UnitKind::Spell(_) => None,
        }
    }

    pub fn fighter_mut(&mut self) -> Option<&mut Fighter> {
        match &mut self.kind {
            UnitKind::Troop(f) | UnitKind::GuardTower(f) => Some(f),
            UnitKind::KingTower { fighter, .. } => Some(fighter),
            UnitKind::Spell(_) => None,
        }
    }

    /// True for a king that has not yet been hit.
    pub fn is_dormant_king(&self) -> bool {
        matches!(self.kind, UnitKind::KingTower { active: false, .. })
    }

    /// Apply one hit's worth of damage. Shield absorbs the whole hit while
    /// any remains; only an unshielded unit loses hit points, and neither
    /// pool goes negative. A king tower wakes on the first hit it
    /// receives, shielded or not.
    pub fn reduce_hp(&mut self, amount: i32) {
        if let UnitKind::KingTower { active, .. } = &mut self.kind {
            *active = true;
        }
        if let Some(f) = self.fighter_mut() {
            if f.shield > 0 {
                f.shield = (f.shield - amount).max(0);
            } else {
                f.hp = (f.hp - amount).max(0);
            }
        }
    }

    /// Restore hit points up to the static maximum. Dead units stay dead.
    pub fn heal(&mut self, amount: i32) {
        if !self.is_alive() {
            return;
        }
        if let Some(f) = self.fighter_mut() {
            f.hp = (f.hp + amount).min(f.stats.hp_max);
        }
    }

    pub fn is_alive(&self) -> bool {
        match self.fighter() {
            Some(f) => self.alive && f.hp > 0,
            None => self.alive,
        }
    }

    /// Fold hp into the alive flag; run once per tick before cleanup.
    pub fn refresh_alive(&mut self) {
        if let Some(f) = self.fighter() {
            if f.hp <= 0 {
                self.alive = false;
            }
        }
    }
}
