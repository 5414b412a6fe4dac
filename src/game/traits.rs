use std::time::Duration;

pub type PlayerId = u32;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// Player not found in game state
    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),
    /// Invalid input received
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Game is not in a valid state for the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
}

#[derive(Debug, Default)]
pub struct TickResult {
    pub broadcast: Option<Vec<u8>>,
    pub eliminated: Vec<PlayerId>,
    pub respawns: Vec<PlayerId>,
    pub game_over: bool,
}

pub trait Game: Send + Sync {
    fn tick(&mut self, delta: Duration) -> TickResult;
    fn handle_input(&mut self, player_id: PlayerId, input: &[u8]) -> Result<(), GameError>;
    fn player_left(&mut self, player_id: PlayerId);
    fn encode_state(&self) -> Vec<u8>;
    fn tick_rate(&self) -> Duration;
    fn is_game_over(&self) -> bool {
        false
    }
    fn get_winners(&self) -> Vec<PlayerId> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_result_default_is_empty() {
        let result = TickResult::default();
        assert!(result.broadcast.is_none());
        assert!(result.eliminated.is_empty());
        assert!(result.respawns.is_empty());
        assert!(!result.game_over);
    }
}
