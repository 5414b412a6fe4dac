use super::{enclosure, respawn};
use crate::game::traits::PlayerId;
use crate::games::paperio::config::PaperioConfig;
use crate::games::paperio::state::{Cell, EliminationReason, GameState, GridPos, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Cell became the player's trail
    TrailPlaced,
    /// The entered cell was another player's trail; that player was eliminated
    TrailCut { victim: PlayerId },
    /// The player ran into its own trail and was eliminated
    SelfCollision,
    /// Re-entry into own territory sealed the trail
    Sealed { promoted: usize, enclosed: usize },
    /// Moving around inside own territory
    Inside,
    /// Player unknown, respawning, or match over
    Ignored,
}

/// Evaluates the cell a player just entered.
pub fn on_cell_entered(
    state: &mut GameState,
    player_id: PlayerId,
    pos: GridPos,
    config: &PaperioConfig,
) -> ClaimOutcome {
    if state.clock.game_over {
        return ClaimOutcome::Ignored;
    }
    let Some(player) = state.players.get(&player_id) else {
        return ClaimOutcome::Ignored;
    };
    if player.is_respawning() {
        return ClaimOutcome::Ignored;
    }
    let is_outside = player.is_outside;
    let Some(cell) = state.territory.get(&pos) else {
        return ClaimOutcome::Ignored;
    };

    match cell {
        Cell::Owned { owner, trail: true, .. } if owner == player_id => {
            respawn::reset_player(state, player_id, EliminationReason::SelfCollision, config);
            ClaimOutcome::SelfCollision
        }
        Cell::Owned { owner, trail: true, .. } => {
            handle_trail_hit(state, owner, config);
            // The victim's cells are gone; the mover keeps laying its own trail.
            place_trail(state, player_id, pos, config);
            ClaimOutcome::TrailCut { victim: owner }
        }
        Cell::Owned { owner, trail: false, .. } if owner == player_id => {
            if is_outside {
                let (promoted, enclosed) = complete_player_trail(state, player_id);
                ClaimOutcome::Sealed { promoted, enclosed }
            } else {
                ClaimOutcome::Inside
            }
        }
        _ => place_trail(state, player_id, pos, config),
    }
}

/// Any contact with a trail eliminates the trail's owner.
pub fn handle_trail_hit(state: &mut GameState, victim: PlayerId, config: &PaperioConfig) {
    respawn::reset_player(state, victim, EliminationReason::TrailCut, config);
}

pub fn is_self_trail_collision(player: &Player, pos: &GridPos) -> bool {
    player.is_outside && player.trail.contains(pos)
}

fn place_trail(
    state: &mut GameState,
    player_id: PlayerId,
    pos: GridPos,
    config: &PaperioConfig,
) -> ClaimOutcome {
    let Some(player) = state.players.get(&player_id) else {
        return ClaimOutcome::Ignored;
    };
    if is_self_trail_collision(player, &pos) {
        respawn::reset_player(state, player_id, EliminationReason::SelfCollision, config);
        return ClaimOutcome::SelfCollision;
    }

    let color = player.color;
    state.assign_cell(pos, Cell::trail(player_id, color));
    if let Some(player) = state.players.get_mut(&player_id) {
        player.is_outside = true;
    }
    ClaimOutcome::TrailPlaced
}

/// Promotes every queued trail cell to territory, then captures whatever the
/// new border encloses. Returns `(promoted, enclosed)`.
pub fn complete_player_trail(state: &mut GameState, player_id: PlayerId) -> (usize, usize) {
    let Some(player) = state.players.get_mut(&player_id) else {
        return (0, 0);
    };
    player.is_outside = false;
    let mut trail: Vec<GridPos> = player.trail.iter().copied().collect();
    if trail.is_empty() {
        return (0, 0);
    }
    trail.sort();

    let promoted = trail.len();
    for pos in trail {
        state.claim_cell(pos, player_id);
    }

    let enclosed = enclosure::resolve_enclosure(state, player_id);

    tracing::info!(
        "Player {} sealed trail: {} promoted, {} enclosed",
        player_id,
        promoted,
        enclosed
    );

    (promoted, enclosed)
}
