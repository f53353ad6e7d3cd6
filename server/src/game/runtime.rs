//! The single-writer match loop.
//!
//! One task owns the whole [`GameState`]; ticks, player actions and the
//! match deadline are multiplexed through one selector, so nothing else
//! ever touches match state. Outbound traffic goes through bounded
//! per-client queues and never blocks the loop.

use crate::config::settings;
use crate::deck::{MatchOutcome, SERVICES};
use crate::game::grid::Side;
use crate::game::snapshot;
use crate::game::state::{GameState, ReleaseError};
use crate::game::{combat, draw, spell};
use crate::protocol::{send_error, send_message, MatchAction, OutboundSender};
use crate::registry::{self, MATCHES};
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Duration, Instant};
use uuid::Uuid;

/// One player's delivery endpoint, captured at promotion.
#[derive(Clone)]
pub struct Seat {
    pub user_id: Uuid,
    pub outbound: OutboundSender,
}

/// Start the loop task for an initialized match.
pub fn spawn(gs: GameState, seats: Vec<Seat>, actions: mpsc::Receiver<MatchAction>) {
    tokio::spawn(run_match(gs, seats, actions));
}

async fn run_match(mut gs: GameState, seats: Vec<Seat>, mut actions: mpsc::Receiver<MatchAction>) {
    let match_id = gs.id;
    log::info!("match {match_id} started ({})", gs.room_type.as_str());

    let period = Duration::from_millis(settings().tick_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    let deadline = sleep(Duration::from_secs(settings().match_deadline_secs));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(winner) = step(&mut gs, &seats) {
                    log::info!("match {match_id}: king tower down, side {} wins", winner.index());
                    finish(&gs, &seats, Some(winner));
                    break;
                }
            }
            Some(action) = actions.recv() => {
                handle_action(&mut gs, &seats, action);
            }
            _ = &mut deadline => {
                let winner = draw::resolve_draw(&gs);
                log::info!("match {match_id} hit the deadline, outcome {:?}", winner);
                finish(&gs, &seats, winner);
                break;
            }
        }
    }

    MATCHES.remove(&match_id);
    let users: Vec<Uuid> = seats.iter().map(|s| s.user_id).collect();
    registry::detach_match(&users);
    log::info!("match {match_id} closed");
}

/// One simulation step. Returns the winning side when a king tower fell
/// this tick.
fn step(gs: &mut GameState, seats: &[Seat]) -> Option<Side> {
    let dt = gs.tick_period;
    for player in gs.players.iter_mut().flatten() {
        player.regen_elixir(dt);
    }

    combat::resolve(gs);
    spell::advance(gs);

    gs.refresh_alive();
    let dead_king = gs.dead_king_side();
    gs.cleanup();

    broadcast_updates(gs, seats);

    dead_king.map(Side::opponent)
}

fn broadcast_updates(gs: &GameState, seats: &[Seat]) {
    for seat in seats {
        let Some(player) = gs.player(seat.user_id) else {
            continue;
        };
        let view = snapshot::update_view(gs, player);
        send_message(&seat.outbound, "update", "update", view);
    }
}

fn handle_action(gs: &mut GameState, seats: &[Seat], action: MatchAction) {
    match action {
        MatchAction::Release {
            msg_id,
            user_id,
            card_id,
            x,
            y,
        } => {
            let Some(seat) = seats.iter().find(|s| s.user_id == user_id) else {
                log::warn!("release from user {user_id} not seated in match {}", gs.id);
                return;
            };
            match gs.release_card(user_id, card_id, x, y) {
                Ok(()) => {
                    let player = gs.player(user_id).expect("seated player");
                    send_message(&seat.outbound, &msg_id, "deck", snapshot::deck_view(player));
                }
                Err(ReleaseError::UnknownPlayer) => {
                    log::warn!("release from unknown player {user_id} in match {}", gs.id);
                }
                Err(e) => {
                    send_error(&seat.outbound, &msg_id, e.kind(), &e.to_string());
                }
            }
        }
    }
}

/// Settle rewards and tell every player how it ended. `winner` of `None`
/// means a draw.
fn finish(gs: &GameState, seats: &[Seat], winner: Option<Side>) {
    for seat in seats {
        let Some(player) = gs.player(seat.user_id) else {
            continue;
        };
        let outcome = match winner {
            None => MatchOutcome::Draw,
            Some(w) if player.side == w => MatchOutcome::Win,
            Some(_) => MatchOutcome::Lose,
        };
        if let Err(e) = SERVICES.rewards.apply_result(seat.user_id, outcome) {
            log::error!("reward write failed for {}: {e:?}", seat.user_id);
        }
        send_message(
            &seat.outbound,
            "end_game",
            "game_end",
            serde_json::json!({ "result": outcome.as_str() }),
        );
    }
}
