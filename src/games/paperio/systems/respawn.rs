use rand::Rng;

use crate::game::traits::PlayerId;
use crate::games::paperio::config::PaperioConfig;
use crate::games::paperio::state::{
    Cell, EliminationReason, GameEvent, GameState, GridPos, TerritoryGrid,
};

/// Eliminates a player: every cell it holds becomes empty, its run state is
/// cleared and a respawn deadline is set. No-op for players already waiting
/// to respawn.
pub fn reset_player(
    state: &mut GameState,
    player_id: PlayerId,
    reason: EliminationReason,
    config: &PaperioConfig,
) -> bool {
    match state.players.get(&player_id) {
        Some(player) if !player.is_respawning() => {}
        _ => return false,
    }

    release_cells(state, player_id);

    let respawn_at = state.now + config.respawn_delay();
    if let Some(player) = state.players.get_mut(&player_id) {
        player.trail.clear();
        player.area = 0;
        player.is_outside = false;
        player.stop();
        player.respawn_at = Some(respawn_at);
    }

    state.events.push(GameEvent::PlayerEliminated { player_id, reason });

    tracing::info!(
        "Player {} eliminated ({:?}), respawning in {}ms",
        player_id,
        reason,
        config.respawn_delay_ms
    );

    true
}

/// Empties every trail and territory cell that references the player.
pub fn release_cells(state: &mut GameState, player_id: PlayerId) {
    for pos in state.territory.get_owned_cells(player_id) {
        state.assign_cell(pos, Cell::Empty);
    }
}

/// Players whose respawn deadline has passed, in id order.
pub fn due_respawns(state: &GameState) -> Vec<PlayerId> {
    state
        .players
        .values()
        .filter(|p| p.respawn_at.is_some_and(|at| at <= state.now))
        .map(|p| p.id)
        .collect()
}

pub fn finish_respawn(
    state: &mut GameState,
    player_id: PlayerId,
    config: &PaperioConfig,
) -> Option<GridPos> {
    if !state.players.get(&player_id)?.is_respawning() {
        return None;
    }

    let spawn = find_spawn_position(state, config);
    place_player(state, player_id, spawn, config);

    if let Some(player) = state.players.get_mut(&player_id) {
        player.respawn_at = None;
    }
    state.events.push(GameEvent::PlayerRespawned { player_id });

    tracing::info!("Player {} respawned at {:?}", player_id, spawn);

    Some(spawn)
}

/// Random cell with `spawn_clearance` empty cells all around it. After
/// `spawn_attempts` misses any in-bounds cell is accepted.
pub fn find_spawn_position(state: &mut GameState, config: &PaperioConfig) -> GridPos {
    let (cols, rows) = state.territory.get_grid_dimensions();
    if cols == 0 || rows == 0 {
        return GridPos::new(0, 0);
    }
    let (cols, rows) = (cols as i32, rows as i32);

    let margin = config.safe_zone_radius as i32;
    let x_range = if cols > margin * 2 { margin..cols - margin } else { 0..cols };
    let y_range = if rows > margin * 2 { margin..rows - margin } else { 0..rows };

    for _ in 0..config.spawn_attempts {
        let candidate = GridPos::new(
            state.rng.gen_range(x_range.clone()),
            state.rng.gen_range(y_range.clone()),
        );
        if is_clear(&state.territory, candidate, config.spawn_clearance) {
            return candidate;
        }
    }

    let fallback = GridPos::new(state.rng.gen_range(0..cols), state.rng.gen_range(0..rows));
    tracing::debug!(
        "No clear spawn after {} attempts, falling back to {:?}",
        config.spawn_attempts,
        fallback
    );
    fallback
}

fn is_clear(territory: &TerritoryGrid, center: GridPos, radius: u32) -> bool {
    let r = radius as i32;
    (-r..=r).all(|dy| {
        (-r..=r).all(|dx| {
            territory
                .get(&center.offset(dx, dy))
                .is_none_or(|cell| cell.is_empty())
        })
    })
}

/// Puts the player at rest on `spawn` and grants its safe zone.
pub fn place_player(state: &mut GameState, player_id: PlayerId, spawn: GridPos, config: &PaperioConfig) {
    let Some(player) = state.players.get_mut(&player_id) else {
        return;
    };
    player.place_at(spawn, config.cell_size);
    player.is_outside = false;

    grant_safe_zone(state, player_id, &spawn, config.safe_zone_radius);
}

/// Claims the square of `radius` around `center`, displacing other owners.
pub fn grant_safe_zone(state: &mut GameState, player_id: PlayerId, center: &GridPos, radius: u32) -> usize {
    let r = radius as i32;
    let mut granted = 0;
    for dy in -r..=r {
        for dx in -r..=r {
            let pos = center.offset(dx, dy);
            if state.territory.in_bounds(&pos) && state.claim_cell(pos, player_id).is_some() {
                granted += 1;
            }
        }
    }
    granted
}
