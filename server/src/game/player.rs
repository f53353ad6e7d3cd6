//! Per-player resources: elixir and the rotating card queue.

use crate::deck::PlayerLoadout;
use crate::game::grid::Side;
use rand::seq::SliceRandom;
use uuid::Uuid;

pub const ELIXIR_MAX: f64 = 10.0;
pub const ELIXIR_START: f64 = 5.0;

/// Sentinel for an empty hand slot or next-card preview.
pub const NO_CARD: i32 = -1;

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub user_id: Uuid,
    pub side: Side,
    /// Remaining card indexes, head is the next refill.
    pub deck: Vec<usize>,
    pub hand: [i32; 4],
    pub next_card: i32,
    pub elixir: f64,
    /// Fractional regen progress; wraps at 1.0.
    pub elixir_timer: f64,
    pub loadout: PlayerLoadout,
}

impl PlayerState {
    /// Shuffle the loadout's cards into hand / next / deck.
    pub fn new(user_id: Uuid, side: Side, loadout: PlayerLoadout) -> PlayerState {
        let mut indexes: Vec<usize> = loadout.cards.iter().map(|c| c.index).collect();
        indexes.shuffle(&mut rand::thread_rng());

        let hand = [
            indexes[0] as i32,
            indexes[1] as i32,
            indexes[2] as i32,
            indexes[3] as i32,
        ];
        let next_card = indexes[4] as i32;
        let deck = indexes[5..].to_vec();

        PlayerState {
            user_id,
            side,
            deck,
            hand,
            next_card,
            elixir: ELIXIR_START,
            elixir_timer: 1.0,
            loadout,
        }
    }

    /// Advance elixir regeneration by one tick of `dt` seconds. At the cap
    /// regen pauses and the accumulator resets, so no backlog builds up.
    pub fn regen_elixir(&mut self, dt: f64) {
        if self.elixir < ELIXIR_MAX {
            self.elixir_timer += dt;
            if self.elixir_timer >= 1.0 {
                self.elixir = (self.elixir + 1.0).min(ELIXIR_MAX);
                self.elixir_timer -= 1.0;
            }
        } else {
            self.elixir_timer = 0.0;
        }
    }

    pub fn has_in_hand(&self, card: usize) -> bool {
        self.hand.contains(&(card as i32))
    }

    /// Rotate the played card out: it goes to the deck tail, its slot takes
    /// the preview card, and the preview refills from the deck head.
    pub fn rotate_hand(&mut self, card: usize) {
        let Some(slot) = self.hand.iter().position(|&c| c == card as i32) else {
            return;
        };
        self.deck.push(card);
        self.hand[slot] = self.next_card;
        if self.deck.is_empty() {
            self.next_card = NO_CARD;
        } else {
            self.next_card = self.deck.remove(0) as i32;
        }
    }
}
