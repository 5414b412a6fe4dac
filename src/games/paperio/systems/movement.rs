use std::time::Duration;

use super::claim;
use crate::game::traits::PlayerId;
use crate::games::paperio::config::PaperioConfig;
use crate::games::paperio::state::{Direction, GameState, Player, TerritoryGrid};

/// Advances every non-respawning player by one tick of `delta`.
///
/// Each completed cell entry runs the claim engine synchronously for that
/// player before the next player is touched.
pub fn update_movement(state: &mut GameState, config: &PaperioConfig, delta: Duration) {
    if state.clock.game_over {
        return;
    }

    let step = delta.as_secs_f32() / config.move_interval().as_secs_f32();

    for player_id in state.get_player_ids() {
        move_player(state, player_id, step, config);
    }
}

fn move_player(state: &mut GameState, player_id: PlayerId, step: f32, config: &PaperioConfig) {
    {
        let Some(player) = state.players.get_mut(&player_id) else {
            return;
        };
        if player.is_respawning() {
            return;
        }
        if !player.moving && player.direction != Direction::None {
            try_start_move(&state.territory, player);
        }
        if !player.moving {
            player.update_render_position(config.cell_size);
            return;
        }
        player.progress += step;
    }

    loop {
        let arrived = {
            let Some(player) = state.players.get_mut(&player_id) else {
                return;
            };
            if !player.moving || player.progress < 1.0 {
                break;
            }
            player.position = player.target;
            player.from = player.target;
            player.moving = false;
            player.progress -= 1.0;
            player.position
        };

        claim::on_cell_entered(state, player_id, arrived, config);

        let Some(player) = state.players.get_mut(&player_id) else {
            return;
        };
        if player.is_respawning() {
            return;
        }
        if !try_start_move(&state.territory, player) {
            player.progress = 0.0;
            break;
        }
    }

    if let Some(player) = state.players.get_mut(&player_id) {
        player.update_render_position(config.cell_size);
    }
}

/// Starts a move toward the neighbouring cell in the held direction.
///
/// A destination outside the grid cancels the held direction.
pub fn try_start_move(territory: &TerritoryGrid, player: &mut Player) -> bool {
    if player.direction == Direction::None {
        return false;
    }

    let next = player.position.moved(player.direction);
    if !territory.in_bounds(&next) {
        tracing::trace!("Player {} stopped at arena edge {:?}", player.id, player.position);
        player.direction = Direction::None;
        return false;
    }

    player.from = player.position;
    player.target = next;
    player.moving = true;
    true
}
