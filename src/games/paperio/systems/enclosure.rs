use std::collections::VecDeque;

use crate::game::traits::PlayerId;
use crate::games::paperio::state::{GameState, GridPos, TerritoryGrid};

/// Cells cut off from the arena border by the player's territory.
///
/// Multi-source BFS from every border cell that is not the player's sealed
/// territory; whatever the flood cannot reach, and the player does not
/// already own, is enclosed. O(cols * rows).
pub fn find_enclosed_cells(territory: &TerritoryGrid, player_id: PlayerId) -> Vec<GridPos> {
    let (cols, rows) = territory.get_grid_dimensions();
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let (cols, rows) = (cols as i32, rows as i32);

    let mut outside = vec![false; territory.cells().len()];
    let mut queue = VecDeque::new();

    let border = (0..cols)
        .flat_map(|x| [GridPos::new(x, 0), GridPos::new(x, rows - 1)])
        .chain((0..rows).flat_map(|y| [GridPos::new(0, y), GridPos::new(cols - 1, y)]));

    for pos in border {
        visit(territory, player_id, pos, &mut outside, &mut queue);
    }

    while let Some(pos) = queue.pop_front() {
        for next in pos.neighbors() {
            visit(territory, player_id, next, &mut outside, &mut queue);
        }
    }

    territory
        .iter()
        .filter(|(pos, cell)| {
            let idx = territory.pos_to_index(pos).unwrap_or_default();
            !outside[idx] && cell.solid_owner() != Some(player_id)
        })
        .map(|(pos, _)| pos)
        .collect()
}

fn visit(
    territory: &TerritoryGrid,
    player_id: PlayerId,
    pos: GridPos,
    outside: &mut [bool],
    queue: &mut VecDeque<GridPos>,
) {
    let Some(idx) = territory.pos_to_index(&pos) else {
        return;
    };
    if outside[idx] || territory.is_territory_of(&pos, player_id) {
        return;
    }
    outside[idx] = true;
    queue.push_back(pos);
}

/// Converts every enclosed cell into the player's territory, taking it from
/// its previous owner. Returns the number of captured cells.
pub fn resolve_enclosure(state: &mut GameState, player_id: PlayerId) -> usize {
    let enclosed = find_enclosed_cells(&state.territory, player_id);
    let mut stolen = 0;

    for pos in &enclosed {
        if let Some(previous) = state.claim_cell(*pos, player_id) {
            if previous.owner().is_some() {
                stolen += 1;
            }
        }
    }

    if !enclosed.is_empty() {
        tracing::debug!(
            "Player {} enclosed {} cells ({} taken from others)",
            player_id,
            enclosed.len(),
            stolen
        );
    }

    enclosed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::paperio::config::Element;
    use crate::games::paperio::state::{Cell, Player};
    use std::time::Duration;

    fn setup() -> GameState {
        let mut state = GameState::new(10, 10, Duration::from_secs(60), Some(9));
        state.players.insert(1, Player::new(1, "Alice".to_string(), Element::Water, GridPos::new(2, 2)));
        state.players.insert(2, Player::new(2, "Bob".to_string(), Element::Fung, GridPos::new(8, 8)));
        state
    }

    /// Square ring of territory with corners (x0,y0) and (x1,y1).
    fn ring(state: &mut GameState, player_id: PlayerId, x0: i32, y0: i32, x1: i32, y1: i32) {
        for x in x0..=x1 {
            state.claim_cell(GridPos::new(x, y0), player_id);
            state.claim_cell(GridPos::new(x, y1), player_id);
        }
        for y in y0..=y1 {
            state.claim_cell(GridPos::new(x0, y), player_id);
            state.claim_cell(GridPos::new(x1, y), player_id);
        }
    }

    #[test]
    fn test_ring_encloses_interior() {
        let mut state = setup();
        ring(&mut state, 1, 2, 2, 6, 6);
        assert_eq!(state.get_player(1).unwrap().area, 16);

        let captured = resolve_enclosure(&mut state, 1);

        assert_eq!(captured, 9);
        assert_eq!(state.get_player(1).unwrap().area, 25);
        for y in 3..=5 {
            for x in 3..=5 {
                assert!(state.territory.is_territory_of(&GridPos::new(x, y), 1));
            }
        }
    }

    #[test]
    fn test_open_shape_encloses_nothing() {
        let mut state = setup();
        ring(&mut state, 1, 2, 2, 6, 6);
        state.assign_cell(GridPos::new(6, 4), Cell::Empty);

        assert!(find_enclosed_cells(&state.territory, 1).is_empty());
    }

    #[test]
    fn test_border_pocket_is_not_enclosed() {
        let mut state = setup();
        // L-shape walling off the (0..2, 0..2) corner
        for i in 0..=2 {
            state.claim_cell(GridPos::new(i, 2), 1);
            state.claim_cell(GridPos::new(2, i), 1);
        }

        let enclosed = find_enclosed_cells(&state.territory, 1);

        // Border cells seed the flood, so the corner pocket stays outside
        assert!(enclosed.is_empty());
    }

    #[test]
    fn test_enclosed_foreign_cells_are_taken() {
        let mut state = setup();
        state.claim_cell(GridPos::new(4, 4), 2);
        state.claim_cell(GridPos::new(8, 8), 2);
        state.assign_cell(GridPos::new(5, 4), Cell::trail(2, Element::Fung.color()));
        ring(&mut state, 1, 2, 2, 6, 6);

        let captured = resolve_enclosure(&mut state, 1);

        assert_eq!(captured, 9);
        let bob = state.get_player(2).unwrap();
        assert_eq!(bob.area, 1);
        assert!(!bob.trail.contains(&GridPos::new(5, 4)));
        assert_eq!(state.get_player(1).unwrap().area, 25);
    }

    #[test]
    fn test_no_own_territory_encloses_nothing() {
        let state = setup();
        assert!(find_enclosed_cells(&state.territory, 1).is_empty());
    }
}
