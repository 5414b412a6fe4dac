pub mod codec;
pub mod config;
pub mod state;
pub mod systems;

use std::time::Duration;

use prost::Message;
use crate::game::traits::{Game, GameError, PlayerId, TickResult};
use crate::protocol::paperio::PaperioInput;

pub use config::{Element, PaperioConfig};
pub use state::{
    Cell, Direction, EliminationReason, GameEvent, GameSnapshot, GameState, GridPos, Player,
    PlayerSnapshot, RejectReason, Spectator, TerritoryGrid,
};
use systems::{clock, input, movement, respawn};

pub struct PaperioGame {
    /// Current game state
    state: GameState,
    /// Game configuration
    config: PaperioConfig,
    /// Current tick number
    tick: u32,
}

impl PaperioGame {
    pub fn new() -> Self {
        Self::with_config(PaperioConfig::default())
    }

    pub fn with_config(config: PaperioConfig) -> Self {
        let config = config.validated();
        Self {
            state: GameState::new(
                config.cols(),
                config.rows(),
                config.match_duration(),
                config.rng_seed,
            ),
            config,
            tick: 0,
        }
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &PaperioConfig {
        &self.config
    }

    /// Adds a player under a session-allocated id. Joining again with an id
    /// that is already playing returns the current snapshot.
    pub fn join_player(
        &mut self,
        player_id: PlayerId,
        name: &str,
        element: Option<&str>,
    ) -> Result<PlayerSnapshot, RejectReason> {
        if let Some(existing) = self.state.get_player(player_id) {
            return Ok(existing.snapshot());
        }

        let element = input::validate_join(&self.state, &self.config, element)?;
        let name = input::sanitize_name(name, self.config.max_name_len, player_id);

        self.state.spectators.remove(&player_id);

        let spawn = respawn::find_spawn_position(&mut self.state, &self.config);
        self.state
            .players
            .insert(player_id, Player::new(player_id, name.clone(), element, spawn));
        respawn::place_player(&mut self.state, player_id, spawn, &self.config);

        if self.state.players.len() == 1 {
            clock::start_match(&mut self.state);
        }

        let snapshot = self
            .state
            .get_player(player_id)
            .map(Player::snapshot)
            .ok_or(RejectReason::UnknownPlayer)?;

        self.state.events.push(GameEvent::PlayerJoined(snapshot.clone()));
        self.push_availability();

        tracing::info!(
            "Player {} ({}, {}) joined at {:?}",
            player_id, name, element, spawn
        );

        Ok(snapshot)
    }

    /// Adds a spectator. An id that is currently playing leaves the board first.
    pub fn join_spectator(&mut self, spectator_id: PlayerId, name: &str) -> PlayerId {
        self.remove_player(spectator_id);
        let name = input::sanitize_name(name, self.config.max_name_len, spectator_id);
        tracing::info!("Spectator {} ({}) joined", spectator_id, name);
        self.state
            .spectators
            .insert(spectator_id, Spectator { id: spectator_id, name });
        spectator_id
    }

    /// Returns whether the direction was applied.
    pub fn set_direction(&mut self, player_id: PlayerId, direction: Direction) -> bool {
        match input::set_player_direction(&mut self.state, player_id, direction) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!("Ignored direction {:?} from {}: {}", direction, player_id, reason);
                false
            }
        }
    }

    /// Returns the sanitized name, or `None` for an unknown player.
    pub fn set_name(&mut self, player_id: PlayerId, raw: &str) -> Option<String> {
        let name = input::sanitize_name(raw, self.config.max_name_len, player_id);
        let player = self.state.get_player_mut(player_id)?;
        player.name = name.clone();

        self.state.events.push(GameEvent::PlayerRenamed {
            player_id,
            name: name.clone(),
        });
        Some(name)
    }

    pub fn set_element(
        &mut self,
        player_id: PlayerId,
        element: Option<&str>,
    ) -> Result<Element, RejectReason> {
        let element = input::validate_element_change(&self.state, player_id, element)?;
        let color = element.color();

        if let Some(player) = self.state.get_player_mut(player_id) {
            if player.element == element {
                return Ok(element);
            }
            player.element = element;
            player.color = color;
        }

        for pos in self.state.territory.get_owned_cells(player_id) {
            if let Some(Cell::Owned { owner, trail, .. }) = self.state.territory.get(&pos) {
                self.state.assign_cell(pos, Cell::Owned { owner, color, trail });
            }
        }

        self.state.events.push(GameEvent::PlayerElementChanged {
            player_id,
            element,
            color,
        });
        self.push_availability();

        tracing::info!("Player {} switched to {}", player_id, element);
        Ok(element)
    }

    /// Removes a player, freeing its cells and cancelling any pending respawn.
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        if !self.state.players.contains_key(&player_id) {
            return false;
        }

        respawn::release_cells(&mut self.state, player_id);
        let Some(player) = self.state.players.remove(&player_id) else {
            return false;
        };

        self.state.events.push(GameEvent::PlayerLeft { player_id });
        self.push_availability();
        tracing::info!("Player {} ({}) left the game", player_id, player.name);

        if self.state.players.is_empty() {
            clock::reset_match(&mut self.state);
        }
        true
    }

    pub fn remove_spectator(&mut self, spectator_id: PlayerId) -> bool {
        let removed = self.state.spectators.remove(&spectator_id).is_some();
        if removed {
            tracing::info!("Spectator {} left", spectator_id);
        }
        removed
    }

    pub fn element_availability(&self) -> Vec<(Element, bool)> {
        self.state.element_availability()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    fn push_availability(&mut self) {
        let availability = self.state.element_availability();
        self.state.events.push(GameEvent::ElementAvailability(availability));
    }
}

impl Default for PaperioGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for PaperioGame {
    fn tick(&mut self, delta: Duration) -> TickResult {
        self.tick += 1;
        self.state.now += delta;
        let mut result = TickResult::default();
        let first_event = self.state.events.len();

        if !self.state.clock.game_over {
            // Step 1: fire respawn deadlines
            for player_id in respawn::due_respawns(&self.state) {
                if respawn::finish_respawn(&mut self.state, player_id, &self.config).is_some() {
                    result.respawns.push(player_id);
                }
            }

            // Step 2: movement, claims, enclosures, eliminations
            movement::update_movement(&mut self.state, &self.config, delta);

            // Step 3: match timer
            clock::update_match_clock(&mut self.state);
        }

        result.eliminated = self.state.events[first_event..]
            .iter()
            .filter_map(|event| match event {
                GameEvent::PlayerEliminated { player_id, .. } => Some(*player_id),
                _ => None,
            })
            .collect();
        result.game_over = self.state.clock.game_over;
        result.broadcast = Some(self.encode_state());

        result
    }

    fn handle_input(&mut self, player_id: PlayerId, payload: &[u8]) -> Result<(), GameError> {
        let paperio_input = PaperioInput::decode(payload)
            .map_err(|e| GameError::EncodingError(format!("Failed to decode input: {}", e)))?;

        let direction = systems::direction_from_proto(paperio_input.direction);

        if !self.state.players.contains_key(&player_id) {
            return Err(GameError::PlayerNotFound(player_id));
        }
        if self.state.clock.game_over {
            return Err(GameError::InvalidState("match is over".to_string()));
        }

        input::set_player_direction(&mut self.state, player_id, direction)
            .map_err(|e| GameError::InvalidInput(e.to_string()))?;

        Ok(())
    }

    fn player_left(&mut self, player_id: PlayerId) {
        if !self.remove_player(player_id) {
            self.remove_spectator(player_id);
        }
    }

    /// Encoded `ServerMessage` carrying the full state, ready to send.
    fn encode_state(&self) -> Vec<u8> {
        codec::state_message(&self.snapshot()).encode_to_vec()
    }

    fn tick_rate(&self) -> Duration {
        self.config.tick_duration()
    }

    fn is_game_over(&self) -> bool {
        self.state.clock.game_over
    }

    fn get_winners(&self) -> Vec<PlayerId> {
        self.state.clock.winner_id.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::traits::Game;
    use crate::protocol::server::{ServerMessage, server_message::Payload};

    fn small_game() -> PaperioGame {
        PaperioGame::with_config(PaperioConfig {
            rng_seed: Some(42),
            ..PaperioConfig::with_grid_size(20, 20)
        })
    }

    #[test]
    fn test_game_creation() {
        let game = PaperioGame::new();
        assert_eq!(game.current_tick(), 0);
        assert_eq!(game.state().territory.get_grid_dimensions(), (60, 60));
    }

    #[test]
    fn test_tick_increments() {
        let mut game = small_game();
        assert_eq!(game.current_tick(), 0);
        game.tick(Duration::from_millis(16));
        assert_eq!(game.current_tick(), 1);
        game.tick(Duration::from_millis(16));
        assert_eq!(game.current_tick(), 2);
    }

    #[test]
    fn test_tick_rate() {
        let game = PaperioGame::new();
        assert_eq!(game.tick_rate(), Duration::from_millis(16));
    }

    #[test]
    fn test_player_join() {
        let mut game = small_game();

        let snapshot = game.join_player(1, " Alice ", Some("water")).unwrap();
        assert_eq!(snapshot.name, "Alice");
        assert_eq!(snapshot.element, Element::Water);
        assert_eq!(snapshot.area, 9);

        let owned = game.state().territory.count_territory_of(1);
        assert_eq!(owned, 9);
        assert!(game.state().clock.started_at.is_some());

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::MatchStarted));
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerJoined(p) if p.id == 1)));
    }

    #[test]
    fn test_join_rejections() {
        let mut game = PaperioGame::with_config(PaperioConfig {
            max_players: 2,
            rng_seed: Some(1),
            ..PaperioConfig::with_grid_size(20, 20)
        });

        assert_eq!(game.join_player(1, "A", None), Err(RejectReason::ElementRequired));
        assert_eq!(game.join_player(1, "A", Some("steam")), Err(RejectReason::InvalidElement));
        game.join_player(1, "A", Some("water")).unwrap();
        assert_eq!(game.join_player(2, "B", Some("water")), Err(RejectReason::ElementTaken));
        game.join_player(2, "B", Some("fung")).unwrap();
        assert_eq!(game.join_player(3, "C", Some("desert")), Err(RejectReason::RoomFull));
        assert_eq!(game.state().players.len(), 2);
    }

    #[test]
    fn test_rejoin_is_idempotent() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();
        let again = game.join_player(1, "Alice", Some("fung")).unwrap();
        assert_eq!(again.element, Element::Water);
        assert_eq!(game.state().players.len(), 1);
    }

    #[test]
    fn test_player_leave() {
        let mut game = small_game();

        game.join_player(1, "Alice", Some("water")).unwrap();
        assert!(game.state().get_player(1).is_some());

        game.player_left(1);
        assert!(game.state().get_player(1).is_none());

        let owned = game.state().territory.get_owned_cells(1);
        assert!(owned.is_empty());
        assert!(game.state().clock.started_at.is_none());
    }

    #[test]
    fn test_leave_cancels_pending_respawn() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();
        game.join_player(2, "Bob", Some("fung")).unwrap();
        let config = game.config().clone();
        respawn::reset_player(game.state_mut(), 2, EliminationReason::TrailCut, &config);

        assert!(game.remove_player(2));
        let result = game.tick(config.respawn_delay() * 2);

        assert!(result.respawns.is_empty());
        assert!(game.state().get_player(2).is_none());
    }

    #[test]
    fn test_spectators() {
        let mut game = small_game();
        assert_eq!(game.join_spectator(5, "  watcher "), 5);
        assert_eq!(game.state().spectators.get(&5).unwrap().name, "watcher");
        assert!(game.state().clock.started_at.is_none());
        assert!(game.snapshot().players.is_empty());

        game.player_left(5);
        assert!(game.state().spectators.is_empty());
        assert!(!game.remove_spectator(5));
    }

    #[test]
    fn test_player_switching_to_spectator_leaves_board() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();

        game.join_spectator(1, "Alice");
        assert!(game.state().get_player(1).is_none());
        assert!(game.state().territory.get_owned_cells(1).is_empty());
        assert!(game.state().spectators.contains_key(&1));
        assert!(game.element_availability().contains(&(Element::Water, true)));

        game.player_left(1);
        assert!(game.state().players.is_empty());
        assert!(game.state().spectators.is_empty());
    }

    #[test]
    fn test_handle_input_direction() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();

        let input = PaperioInput { direction: 1 }; // UP
        let bytes = input.encode_to_vec();

        let result = game.handle_input(1, &bytes);
        assert!(result.is_ok());

        let player = game.state().get_player(1).unwrap();
        assert_eq!(player.direction, Direction::Up);

        let reverse = PaperioInput { direction: 2 }.encode_to_vec();
        assert!(matches!(game.handle_input(1, &reverse), Err(GameError::InvalidInput(_))));
        assert!(matches!(game.handle_input(1, &[0xFF, 0xFF]), Err(GameError::EncodingError(_))));
        assert_eq!(game.state().get_player(1).unwrap().direction, Direction::Up);
        assert_eq!(game.handle_input(8, &input.encode_to_vec()), Err(GameError::PlayerNotFound(8)));
    }

    #[test]
    fn test_set_name() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();
        game.drain_events();

        assert_eq!(game.set_name(1, "  <Zed>  "), Some("Zed".to_string()));
        assert_eq!(game.state().get_player(1).unwrap().name, "Zed");
        assert_eq!(game.set_name(1, ""), Some("Player1".to_string()));
        assert_eq!(game.set_name(9, "Ghost"), None);
        assert!(game.drain_events().contains(&GameEvent::PlayerRenamed {
            player_id: 1,
            name: "Zed".to_string(),
        }));
    }

    #[test]
    fn test_set_element_recolors_cells() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();
        game.join_player(2, "Bob", Some("fung")).unwrap();

        assert_eq!(game.set_element(1, Some("fung")), Err(RejectReason::ElementTaken));
        assert_eq!(game.set_element(1, Some("lavar")), Ok(Element::Lavar));

        let color = Element::Lavar.color();
        for pos in game.state().territory.get_owned_cells(1) {
            assert_eq!(game.state().territory.get(&pos), Some(Cell::territory(1, color)));
        }
        assert_eq!(game.state().get_player(1).unwrap().area, 9);
        assert!(game.element_availability().contains(&(Element::Water, true)));
        assert!(game.element_availability().contains(&(Element::Lavar, false)));
    }

    #[test]
    fn test_full_tick_with_movement() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();

        let initial_pos = game.state().get_player(1).unwrap().position;

        let input = PaperioInput { direction: 4 }; // RIGHT
        game.handle_input(1, &input.encode_to_vec()).unwrap();

        game.tick(game.config().move_interval());

        let new_pos = game.state().get_player(1).unwrap().position;
        assert_eq!(new_pos.x, initial_pos.x + 1);
        assert_eq!(new_pos.y, initial_pos.y);
    }

    #[test]
    fn test_tick_broadcast_is_state_message() {
        let mut game = small_game();
        game.join_player(1, "Alice", Some("water")).unwrap();

        let result = game.tick(Duration::from_millis(16));
        let bytes = result.broadcast.unwrap();
        let msg = ServerMessage::decode(&bytes[..]).unwrap();

        match msg.payload {
            Some(Payload::State(state)) => {
                assert_eq!(state.cols, 20);
                assert_eq!(state.owners.len(), 400);
                assert_eq!(state.players.len(), 1);
                assert_eq!(state.owners.iter().filter(|&&o| o == 1).count(), 9);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
