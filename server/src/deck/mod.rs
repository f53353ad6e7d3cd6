//! External collaborator contracts and their in-process implementations.
//!
//! The match core consumes three surfaces it does not own: the deck loader
//! (per-user tower stats and card list), the map loader (tile arrays by
//! name) and the reward writer (post-match progression). Each is a trait;
//! the default implementations here are static lookup tables so the server
//! runs self-contained.

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use uuid::Uuid;

use crate::game::grid::{TILE_BRIDGE, TILE_RIVER, TILE_WALKABLE};

// ---------- static data the loaders hand to the core ----------

/// What a passive skill or spell effect does to the units it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    Damage,
    Heal,
    Shield,
}

/// One skill at the owner's current level.
#[derive(Debug, Clone)]
pub struct SkillSpec {
    pub name: &'static str,
    pub kind: SkillKind,
    /// Number of applications the effect is budgeted for.
    pub duration: i32,
    /// Applications per second; 0 means the whole budget lands at once.
    pub effect_speed: f64,
    pub value: i32,
}

/// Combat statics shared by troops and towers.
#[derive(Debug, Clone)]
pub struct CombatStats {
    pub hp_max: i32,
    pub shield: i32,
    pub atk: i32,
    pub def: i32,
    pub crit_rate: f64,
    pub attack_speed: f64,
    pub range: f64,
    pub speed: f64,
    pub skill: Option<SkillSpec>,
}

/// Spell statics.
#[derive(Debug, Clone)]
pub struct SpellSpec {
    pub kind: SkillKind,
    pub duration: i32,
    pub effect_speed: f64,
    pub value: i32,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub enum CardKind {
    Troop(CombatStats),
    Spell(SpellSpec),
}

/// One deck slot at the owner's current level.
#[derive(Debug, Clone)]
pub struct CardSpec {
    pub index: usize,
    pub name: &'static str,
    pub mana: i32,
    pub kind: CardKind,
}

#[derive(Debug, Clone)]
pub struct TowerSpec {
    pub name: &'static str,
    pub stats: CombatStats,
}

/// Everything the core needs to field one player.
#[derive(Debug, Clone)]
pub struct PlayerLoadout {
    pub king: TowerSpec,
    pub guard: TowerSpec,
    pub cards: Vec<CardSpec>,
}

// ---------- collaborator traits ----------

pub trait DeckLoader: Send + Sync {
    fn load_loadout(&self, user_id: Uuid) -> Result<PlayerLoadout>;
}

pub trait MapLoader: Send + Sync {
    fn load_map(&self, name: &str) -> Result<Vec<Vec<u8>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Draw,
    Lose,
}

impl MatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchOutcome::Win => "win",
            MatchOutcome::Draw => "draw",
            MatchOutcome::Lose => "lose",
        }
    }

    /// (experience, gold, gems) granted for this outcome.
    pub fn rewards(self) -> (i64, i64, i64) {
        match self {
            MatchOutcome::Win => (30, 200, 1),
            MatchOutcome::Draw => (10, 50, 0),
            MatchOutcome::Lose => (5, 5, 0),
        }
    }
}

pub trait RewardWriter: Send + Sync {
    fn apply_result(&self, user_id: Uuid, outcome: MatchOutcome) -> Result<()>;
}

/// The collaborator set the lobby manager and match runtime resolve at
/// promotion time.
#[derive(Clone)]
pub struct Services {
    pub decks: Arc<dyn DeckLoader>,
    pub maps: Arc<dyn MapLoader>,
    pub rewards: Arc<dyn RewardWriter>,
}

pub static SERVICES: Lazy<Services> = Lazy::new(|| Services {
    decks: Arc::new(StaticDeckLoader),
    maps: Arc::new(StaticMapLoader),
    rewards: Arc::new(LedgerRewardWriter::default()),
});

// ---------- static deck loader ----------

/// Serves the starter loadout to every user.
pub struct StaticDeckLoader;

impl DeckLoader for StaticDeckLoader {
    fn load_loadout(&self, _user_id: Uuid) -> Result<PlayerLoadout> {
        Ok(starter_loadout())
    }
}

fn no_skill() -> Option<SkillSpec> {
    None
}

/// The level-1 starter deck: six troops, two spells, the stock towers.
pub fn starter_loadout() -> PlayerLoadout {
    let troop = |hp, atk, def, crit, speed_atk, range, skill| CombatStats {
        hp_max: hp,
        shield: 0,
        atk,
        def,
        crit_rate: crit,
        attack_speed: speed_atk,
        range,
        speed: 1.0,
        skill,
    };

    let cards = vec![
        CardSpec {
            index: 0,
            name: "Pawn",
            mana: 2,
            kind: CardKind::Troop(troop(120, 30, 5, 0.05, 1.0, 1.5, no_skill())),
        },
        CardSpec {
            index: 1,
            name: "Bishop",
            mana: 3,
            kind: CardKind::Troop(troop(
                100,
                45,
                5,
                0.10,
                0.8,
                4.0,
                Some(SkillSpec {
                    name: "Benediction",
                    kind: SkillKind::Heal,
                    duration: 3,
                    effect_speed: 0.0,
                    value: 20,
                }),
            )),
        },
        CardSpec {
            index: 2,
            name: "Rook",
            mana: 4,
            kind: CardKind::Troop(troop(
                300,
                40,
                15,
                0.0,
                0.5,
                1.5,
                Some(SkillSpec {
                    name: "Bulwark",
                    kind: SkillKind::Shield,
                    duration: 2,
                    effect_speed: 0.0,
                    value: 30,
                }),
            )),
        },
        CardSpec {
            index: 3,
            name: "Knight",
            mana: 3,
            kind: CardKind::Troop(troop(180, 50, 10, 0.15, 1.2, 1.0, no_skill())),
        },
        CardSpec {
            index: 4,
            name: "Prince",
            mana: 5,
            kind: CardKind::Troop(troop(350, 80, 20, 0.20, 0.7, 1.5, no_skill())),
        },
        CardSpec {
            index: 5,
            name: "Queen",
            mana: 6,
            kind: CardKind::Troop(troop(260, 100, 10, 0.25, 1.0, 3.0, no_skill())),
        },
        CardSpec {
            index: 6,
            name: "Fireball",
            mana: 4,
            kind: CardKind::Spell(SpellSpec {
                kind: SkillKind::Damage,
                duration: 1,
                effect_speed: 2.0,
                value: 150,
                radius: 2.5,
            }),
        },
        CardSpec {
            index: 7,
            name: "Healing Light",
            mana: 3,
            kind: CardKind::Spell(SpellSpec {
                kind: SkillKind::Heal,
                duration: 1,
                effect_speed: 2.0,
                value: 100,
                radius: 3.0,
            }),
        },
    ];

    PlayerLoadout {
        king: TowerSpec {
            name: "King_Tower",
            stats: CombatStats {
                hp_max: 2000,
                shield: 0,
                atk: 90,
                def: 20,
                crit_rate: 0.10,
                attack_speed: 0.8,
                range: 7.0,
                speed: 0.0,
                skill: None,
            },
        },
        guard: TowerSpec {
            name: "Guard_Tower",
            stats: CombatStats {
                hp_max: 1200,
                shield: 100,
                atk: 60,
                def: 15,
                crit_rate: 0.05,
                attack_speed: 1.0,
                range: 6.0,
                speed: 0.0,
                skill: None,
            },
        },
        cards,
    }
}

// ---------- static map loader ----------

/// Builds the stock 35×20 arena: walkable halves separated by a river band
/// with two bridges.
pub struct StaticMapLoader;

pub const BASIC_MAP_ROWS: usize = 35;
pub const BASIC_MAP_COLS: usize = 20;

impl MapLoader for StaticMapLoader {
    fn load_map(&self, name: &str) -> Result<Vec<Vec<u8>>> {
        if name != "Basic Map 35x20" {
            return Err(anyhow!("map not found: {name}"));
        }
        Ok(basic_map())
    }
}

pub fn basic_map() -> Vec<Vec<u8>> {
    let mut tiles = vec![vec![TILE_WALKABLE; BASIC_MAP_COLS]; BASIC_MAP_ROWS];
    let river_row = BASIC_MAP_ROWS / 2;
    for y in 0..BASIC_MAP_COLS {
        let code = if (3..=4).contains(&y) || (15..=16).contains(&y) {
            TILE_BRIDGE
        } else {
            TILE_RIVER
        };
        tiles[river_row][y] = code;
    }
    tiles
}

// ---------- in-memory reward writer ----------

#[derive(Debug, Clone)]
pub struct UserProgress {
    pub level: i32,
    pub experience: i64,
    pub gold: i64,
    pub gems: i64,
}

impl Default for UserProgress {
    fn default() -> Self {
        UserProgress {
            level: 1,
            experience: 0,
            gold: 0,
            gems: 0,
        }
    }
}

/// Keeps progression in memory and logs every applied delta.
#[derive(Default)]
pub struct LedgerRewardWriter {
    ledger: DashMap<Uuid, UserProgress>,
}

impl LedgerRewardWriter {
    /// Experience needed to leave the given level.
    fn level_requirement(level: i32) -> i64 {
        100 * level as i64
    }

    pub fn progress(&self, user_id: Uuid) -> UserProgress {
        self.ledger
            .get(&user_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }
}

impl RewardWriter for LedgerRewardWriter {
    fn apply_result(&self, user_id: Uuid, outcome: MatchOutcome) -> Result<()> {
        let (exp, gold, gems) = outcome.rewards();
        let mut entry = self.ledger.entry(user_id).or_default();
        entry.experience += exp;
        entry.gold += gold;
        entry.gems += gems;

        let requirement = Self::level_requirement(entry.level);
        if entry.experience >= requirement {
            entry.level += 1;
            entry.experience -= requirement;
            log::info!("user {user_id} reached level {}", entry.level);
        }
        log::info!(
            "rewards applied for {user_id}: {} (+{exp} exp, +{gold} gold, +{gems} gems)",
            outcome.as_str()
        );
        Ok(())
    }
}
