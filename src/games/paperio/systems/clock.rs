use crate::game::traits::PlayerId;
use crate::games::paperio::state::{GameEvent, GameState};

/// Starts the match timer at the current engine time.
pub fn start_match(state: &mut GameState) {
    state.clock.start(state.now);
    state.events.push(GameEvent::MatchStarted);
    tracing::info!("Match started ({}s)", state.clock.duration.as_secs());
}

/// Clears timer, game-over flag and winner once the arena is empty.
pub fn reset_match(state: &mut GameState) {
    state.clock.reset();
    tracing::info!("Match reset, arena is empty");
}

/// Recomputes the remaining time. Returns `true` on the tick the match ends.
pub fn update_match_clock(state: &mut GameState) -> bool {
    if !state.clock.is_running() {
        return false;
    }

    let elapsed = state.clock.elapsed(state.now);
    state.clock.time_remaining = state.clock.duration.saturating_sub(elapsed);

    if state.clock.time_remaining.is_zero() {
        end_match(state);
        return true;
    }
    false
}

fn end_match(state: &mut GameState) {
    state.clock.game_over = true;
    for player in state.players.values_mut() {
        player.stop();
    }

    let winner_id = determine_winner(state);
    state.clock.winner_id = winner_id;
    state.clock.winner_name = winner_id
        .and_then(|id| state.players.get(&id))
        .map(|p| p.name.clone());

    state.events.push(GameEvent::MatchOver { winner_id });

    match (&state.clock.winner_name, winner_id) {
        (Some(name), Some(id)) => tracing::info!("Match over, winner {} ({})", id, name),
        _ => tracing::info!("Match over, no winner"),
    }
}

/// Player with the strictly greatest area. Ties go to the first player in
/// id order.
pub fn determine_winner(state: &GameState) -> Option<PlayerId> {
    let mut best: Option<(PlayerId, u32)> = None;
    for player in state.players.values() {
        if best.is_none_or(|(_, area)| player.area > area) {
            best = Some((player.id, player.area));
        }
    }
    best.map(|(id, _)| id)
}
