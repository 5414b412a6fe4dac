use crate::game::traits::PlayerId;
use crate::games::paperio::config::{Element, PaperioConfig};
use crate::games::paperio::state::{Direction, GameState, RejectReason};

pub fn set_player_direction(
    state: &mut GameState,
    player_id: PlayerId,
    new_direction: Direction,
) -> Result<(), &'static str> {
    if state.clock.game_over {
        return Err("Match is over");
    }

    let player = state.players.get_mut(&player_id)
        .ok_or("Player not found")?;

    if player.is_respawning() {
        return Err("Player is respawning");
    }

    if player.direction.is_opposite(&new_direction) {
        return Err("Cannot reverse direction");
    }

    player.direction = new_direction;
    Ok(())
}

/// Trims, drops anything but letters, digits, spaces, `_`, `-` and `.`,
/// caps the length, and falls back to `Player<id>` when nothing is left.
pub fn sanitize_name(raw: &str, max_len: usize, player_id: PlayerId) -> String {
    let filtered: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
        .take(max_len)
        .collect();

    let name = filtered.trim();
    if name.is_empty() {
        format!("Player{}", player_id)
    } else {
        name.to_string()
    }
}

/// Boundary checks for a join request. Nothing is mutated.
pub fn validate_join(
    state: &GameState,
    config: &PaperioConfig,
    element: Option<&str>,
) -> Result<Element, RejectReason> {
    let element = Element::parse_requested(element)?;

    if state.players.len() >= config.max_players {
        return Err(RejectReason::RoomFull);
    }
    if state.element_holder(element).is_some() {
        return Err(RejectReason::ElementTaken);
    }
    Ok(element)
}

pub fn validate_element_change(
    state: &GameState,
    player_id: PlayerId,
    element: Option<&str>,
) -> Result<Element, RejectReason> {
    if !state.players.contains_key(&player_id) {
        return Err(RejectReason::UnknownPlayer);
    }
    let element = Element::parse_requested(element)?;

    match state.element_holder(element) {
        Some(holder) if holder != player_id => Err(RejectReason::ElementTaken),
        _ => Ok(element),
    }
}

pub fn direction_from_proto(value: i32) -> Direction {
    match value {
        1 => Direction::Up,
        2 => Direction::Down,
        3 => Direction::Left,
        4 => Direction::Right,
        _ => Direction::None,
    }
}

pub fn direction_to_proto(direction: Direction) -> i32 {
    match direction {
        Direction::None => 0,
        Direction::Up => 1,
        Direction::Down => 2,
        Direction::Left => 3,
        Direction::Right => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::paperio::state::{GridPos, Player};
    use std::time::Duration;

    fn setup_game_state() -> GameState {
        let mut state = GameState::new(20, 20, Duration::from_secs(60), Some(2));
        state.players.insert(1, Player::new(1, "Test".to_string(), Element::Water, GridPos::new(10, 10)));
        state
    }

    #[test]
    fn test_cannot_reverse_direction() {
        let mut state = setup_game_state();

        set_player_direction(&mut state, 1, Direction::Right).unwrap();

        let result = set_player_direction(&mut state, 1, Direction::Left);
        assert!(result.is_err());

        assert_eq!(state.get_player(1).unwrap().direction, Direction::Right);
    }

    #[test]
    fn test_can_turn_90_degrees() {
        let mut state = setup_game_state();

        set_player_direction(&mut state, 1, Direction::Right).unwrap();

        set_player_direction(&mut state, 1, Direction::Up).unwrap();
        assert_eq!(state.get_player(1).unwrap().direction, Direction::Up);

        set_player_direction(&mut state, 1, Direction::Left).unwrap();
        assert_eq!(state.get_player(1).unwrap().direction, Direction::Left);
    }

    #[test]
    fn test_stop_then_any_direction() {
        let mut state = setup_game_state();
        set_player_direction(&mut state, 1, Direction::Right).unwrap();
        set_player_direction(&mut state, 1, Direction::None).unwrap();
        set_player_direction(&mut state, 1, Direction::Left).unwrap();
        assert_eq!(state.get_player(1).unwrap().direction, Direction::Left);
    }

    #[test]
    fn test_direction_ignored_when_blocked() {
        let mut state = setup_game_state();
        assert!(set_player_direction(&mut state, 7, Direction::Up).is_err());

        state.get_player_mut(1).unwrap().respawn_at = Some(Duration::from_secs(1));
        assert!(set_player_direction(&mut state, 1, Direction::Up).is_err());

        state.get_player_mut(1).unwrap().respawn_at = None;
        state.clock.game_over = true;
        assert!(set_player_direction(&mut state, 1, Direction::Up).is_err());
        assert_eq!(state.get_player(1).unwrap().direction, Direction::None);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  Alice  ", 16, 1), "Alice");
        assert_eq!(sanitize_name("<b>Bob</b>", 16, 1), "bBobb");
        assert_eq!(sanitize_name("a_very-long.name with spaces", 10, 1), "a_very-lon");
        assert_eq!(sanitize_name("   ", 16, 4), "Player4");
        assert_eq!(sanitize_name("!!!", 16, 9), "Player9");
        assert_eq!(sanitize_name("abc      ", 5, 1), "abc");
    }

    #[test]
    fn test_validate_join() {
        let mut state = setup_game_state();
        let config = PaperioConfig { max_players: 2, ..Default::default() };

        assert_eq!(validate_join(&state, &config, None), Err(RejectReason::ElementRequired));
        assert_eq!(validate_join(&state, &config, Some("plasma")), Err(RejectReason::InvalidElement));
        assert_eq!(validate_join(&state, &config, Some("water")), Err(RejectReason::ElementTaken));
        assert_eq!(validate_join(&state, &config, Some("fung")), Ok(Element::Fung));

        state.players.insert(2, Player::new(2, "Other".to_string(), Element::Fung, GridPos::new(2, 2)));
        assert_eq!(validate_join(&state, &config, Some("desert")), Err(RejectReason::RoomFull));
    }

    #[test]
    fn test_validate_element_change() {
        let mut state = setup_game_state();
        state.players.insert(2, Player::new(2, "Other".to_string(), Element::Fung, GridPos::new(2, 2)));

        assert_eq!(validate_element_change(&state, 1, Some("water")), Ok(Element::Water));
        assert_eq!(validate_element_change(&state, 1, Some("fung")), Err(RejectReason::ElementTaken));
        assert_eq!(validate_element_change(&state, 1, Some("lavar")), Ok(Element::Lavar));
        assert_eq!(validate_element_change(&state, 1, Some("")), Err(RejectReason::ElementRequired));
        assert_eq!(validate_element_change(&state, 3, Some("lavar")), Err(RejectReason::UnknownPlayer));
    }

    #[test]
    fn test_direction_from_proto() {
        assert_eq!(direction_from_proto(0), Direction::None);
        assert_eq!(direction_from_proto(1), Direction::Up);
        assert_eq!(direction_from_proto(2), Direction::Down);
        assert_eq!(direction_from_proto(3), Direction::Left);
        assert_eq!(direction_from_proto(4), Direction::Right);
        assert_eq!(direction_from_proto(99), Direction::None); // Invalid defaults to None
    }

    #[test]
    fn test_direction_to_proto() {
        assert_eq!(direction_to_proto(Direction::None), 0);
        assert_eq!(direction_to_proto(Direction::Up), 1);
        assert_eq!(direction_to_proto(Direction::Down), 2);
        assert_eq!(direction_to_proto(Direction::Left), 3);
        assert_eq!(direction_to_proto(Direction::Right), 4);
    }
}
