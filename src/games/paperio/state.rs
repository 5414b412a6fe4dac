use crate::game::traits::PlayerId;
use super::config::Element;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// A position on the game grid
///
/// (0,0) is the top-left corner,
/// x is the column and increases to the right, y is the row and increases downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn moved(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Chebyshev distance, matches the square spawn zones
    pub fn distance(&self, other: &GridPos) -> u32 {
        (self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs())
    }

    pub fn neighbors(&self) -> [GridPos; 4] {
        [
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(1, 0),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

/// One grid cell. A non-empty cell always has exactly one owner; `trail`
/// marks a boundary cell that has not been sealed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Owned {
        owner: PlayerId,
        color: u32,
        trail: bool,
    },
}

impl Cell {
    pub fn territory(owner: PlayerId, color: u32) -> Self {
        Cell::Owned { owner, color, trail: false }
    }

    pub fn trail(owner: PlayerId, color: u32) -> Self {
        Cell::Owned { owner, color, trail: true }
    }

    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Cell::Empty => None,
            Cell::Owned { owner, .. } => Some(*owner),
        }
    }

    /// Owner of sealed territory; `None` for empty and trail cells.
    pub fn solid_owner(&self) -> Option<PlayerId> {
        match self {
            Cell::Owned { owner, trail: false, .. } => Some(*owner),
            _ => None,
        }
    }

    /// Owner of an unsealed trail cell.
    pub fn trail_owner(&self) -> Option<PlayerId> {
        match self {
            Cell::Owned { owner, trail: true, .. } => Some(*owner),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

pub struct TerritoryGrid {
    /// Number of columns
    cols: u32,
    /// Number of rows
    rows: u32,
    /// Row-major cell storage
    cells: Vec<Cell>,
}

impl TerritoryGrid {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::Empty; (cols * rows) as usize],
        }
    }

    pub fn get_grid_dimensions(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    pub fn in_bounds(&self, pos: &GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 &&
            (pos.x as u32) < self.cols &&
            (pos.y as u32) < self.rows
    }

    pub fn pos_to_index(&self, pos: &GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y as u32 * self.cols + pos.x as u32) as usize)
        } else {
            None
        }
    }

    pub fn index_to_pos(&self, index: usize) -> GridPos {
        let cols = self.cols.max(1) as usize;
        GridPos::new((index % cols) as i32, (index / cols) as i32)
    }

    pub fn get(&self, pos: &GridPos) -> Option<Cell> {
        self.pos_to_index(pos).map(|idx| self.cells[idx])
    }

    /// Raw write with no area bookkeeping; engine code goes through
    /// [`GameState::assign_cell`].
    pub(crate) fn set(&mut self, pos: &GridPos, cell: Cell) {
        if let Some(idx) = self.pos_to_index(pos) {
            self.cells[idx] = cell;
        }
    }

    pub fn get_cell_owner(&self, pos: &GridPos) -> Option<PlayerId> {
        self.get(pos).and_then(|c| c.owner())
    }

    pub fn is_territory_of(&self, pos: &GridPos, player_id: PlayerId) -> bool {
        self.get(pos).and_then(|c| c.solid_owner()) == Some(player_id)
    }

    pub fn count_territory_of(&self, player_id: PlayerId) -> usize {
        self.cells.iter().filter(|c| c.solid_owner() == Some(player_id)).count()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (self.index_to_pos(idx), *cell))
    }

    /// Every cell referencing the player, trail or territory.
    pub fn get_owned_cells(&self, player_id: PlayerId) -> Vec<GridPos> {
        self.iter()
            .filter(|(_, cell)| cell.owner() == Some(player_id))
            .map(|(pos, _)| pos)
            .collect()
    }
}

impl std::fmt::Debug for TerritoryGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerritoryGrid")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("claimed_cells", &self.cells.iter().filter(|c| !c.is_empty()).count())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Unique player identifier
    pub id: PlayerId,
    /// Display name
    pub name: String,
    pub element: Element,
    /// Player's color (RGBA packed as u32), derived from the element
    pub color: u32,
    /// Discrete cell the player currently occupies
    pub position: GridPos,
    /// Cell the current move started from
    pub from: GridPos,
    /// Cell the current move is heading to
    pub target: GridPos,
    /// Interpolation progress between `from` and `target`, in [0, 1)
    pub progress: f32,
    /// Whether a move toward `target` is in flight
    pub moving: bool,
    /// Continuous render position in world units
    pub x: f32,
    pub y: f32,
    /// Held movement direction, last write wins
    pub direction: Direction,
    /// Number of sealed territory cells owned by this player
    pub area: u32,
    /// Unsealed trail cells laid while outside own territory
    pub trail: HashSet<GridPos>,
    /// Whether the player left its territory since the last seal
    pub is_outside: bool,
    /// Engine time at which the pending respawn fires
    pub respawn_at: Option<Duration>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, element: Element, position: GridPos) -> Self {
        Self {
            id,
            name,
            element,
            color: element.color(),
            position,
            from: position,
            target: position,
            progress: 0.0,
            moving: false,
            x: 0.0,
            y: 0.0,
            direction: Direction::None,
            area: 0,
            trail: HashSet::new(),
            is_outside: false,
            respawn_at: None,
        }
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_at.is_some()
    }

    pub fn has_trail(&self) -> bool {
        !self.trail.is_empty()
    }

    /// Puts the player at rest on `pos`.
    pub fn place_at(&mut self, pos: GridPos, cell_size: f32) {
        self.position = pos;
        self.from = pos;
        self.target = pos;
        self.progress = 0.0;
        self.moving = false;
        self.direction = Direction::None;
        self.update_render_position(cell_size);
    }

    pub fn stop(&mut self) {
        self.direction = Direction::None;
        self.moving = false;
        self.progress = 0.0;
        self.from = self.position;
        self.target = self.position;
    }

    /// Linear interpolation of `from` to `target`, progress clamped to [0, 1].
    pub fn update_render_position(&mut self, cell_size: f32) {
        let t = self.progress.clamp(0.0, 1.0);
        let lerp = |a: i32, b: i32| (a as f32 + (b - a) as f32 * t) * cell_size;
        self.x = lerp(self.from.x, self.target.x);
        self.y = lerp(self.from.y, self.target.y);
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            element: self.element,
            color: self.color,
            col: self.position.x,
            row: self.position.y,
            x: self.x,
            y: self.y,
            direction: self.direction,
            area: self.area,
            is_outside: self.is_outside,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spectator {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct MatchClock {
    /// Engine time of the 0 -> 1 player transition
    pub started_at: Option<Duration>,
    pub duration: Duration,
    pub time_remaining: Duration,
    pub game_over: bool,
    pub winner_id: Option<PlayerId>,
    pub winner_name: Option<String>,
}

impl MatchClock {
    pub fn new(duration: Duration) -> Self {
        Self {
            started_at: None,
            duration,
            time_remaining: duration,
            game_over: false,
            winner_id: None,
            winner_name: None,
        }
    }

    pub fn start(&mut self, now: Duration) {
        *self = Self::new(self.duration);
        self.started_at = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.duration);
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && !self.game_over
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.started_at
            .map(|start| now.saturating_sub(start))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("room is full")]
    RoomFull,
    #[error("element already taken")]
    ElementTaken,
    #[error("element is required")]
    ElementRequired,
    #[error("invalid element")]
    InvalidElement,
    #[error("unknown player")]
    UnknownPlayer,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::RoomFull => "ROOM_FULL",
            RejectReason::ElementTaken => "ELEMENT_TAKEN",
            RejectReason::ElementRequired => "ELEMENT_REQUIRED",
            RejectReason::InvalidElement => "INVALID_ELEMENT",
            RejectReason::UnknownPlayer => "UNKNOWN_PLAYER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationReason {
    /// Another player touched this player's trail
    TrailCut,
    /// Player crossed its own trail
    SelfCollision,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerJoined(PlayerSnapshot),
    PlayerLeft { player_id: PlayerId },
    PlayerRenamed { player_id: PlayerId, name: String },
    PlayerElementChanged { player_id: PlayerId, element: Element, color: u32 },
    ElementAvailability(Vec<(Element, bool)>),
    PlayerEliminated { player_id: PlayerId, reason: EliminationReason },
    PlayerRespawned { player_id: PlayerId },
    MatchStarted,
    MatchOver { winner_id: Option<PlayerId> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub element: Element,
    pub color: u32,
    pub col: i32,
    pub row: i32,
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub area: u32,
    pub is_outside: bool,
}

/// Full copy of the simulation, taken between ticks.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub players: BTreeMap<PlayerId, PlayerSnapshot>,
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<Cell>,
    pub game_time: Duration,
    pub time_remaining: Duration,
    pub game_over: bool,
    pub winner_id: Option<PlayerId>,
    pub winner_name: Option<String>,
}

#[derive(Debug)]
pub struct GameState {
    /// All players in the game, iterated in id order
    pub players: BTreeMap<PlayerId, Player>,
    /// Read-only observers
    pub spectators: BTreeMap<PlayerId, Spectator>,
    /// Territory ownership grid
    pub territory: TerritoryGrid,
    pub clock: MatchClock,
    /// Engine time, advanced by every tick
    pub now: Duration,
    /// Pending notifications for the broadcast layer
    pub events: Vec<GameEvent>,
    pub rng: StdRng,
}

impl GameState {
    pub fn new(cols: u32, rows: u32, match_duration: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            players: BTreeMap::new(),
            spectators: BTreeMap::new(),
            territory: TerritoryGrid::new(cols, rows),
            clock: MatchClock::new(match_duration),
            now: Duration::ZERO,
            events: Vec::new(),
            rng,
        }
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn get_player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    pub fn get_active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| !p.is_respawning())
    }

    /// Writes `cell` at `pos` keeping every player's `area` and `trail` in
    /// step with the grid. Returns the previous cell, `None` out of bounds.
    pub fn assign_cell(&mut self, pos: GridPos, cell: Cell) -> Option<Cell> {
        let previous = self.territory.get(&pos)?;
        if previous == cell {
            return Some(previous);
        }

        if let Some(owner) = previous.solid_owner() {
            if let Some(player) = self.players.get_mut(&owner) {
                player.area = player.area.saturating_sub(1);
            }
        }
        if let Some(owner) = previous.trail_owner() {
            if let Some(player) = self.players.get_mut(&owner) {
                player.trail.remove(&pos);
            }
        }

        self.territory.set(&pos, cell);

        if let Some(owner) = cell.solid_owner() {
            if let Some(player) = self.players.get_mut(&owner) {
                player.area += 1;
            }
        }
        if let Some(owner) = cell.trail_owner() {
            if let Some(player) = self.players.get_mut(&owner) {
                player.trail.insert(pos);
            }
        }

        Some(previous)
    }

    /// Hands `pos` to the player as sealed territory.
    pub fn claim_cell(&mut self, pos: GridPos, player_id: PlayerId) -> Option<Cell> {
        let color = self.players.get(&player_id)?.color;
        self.assign_cell(pos, Cell::territory(player_id, color))
    }

    pub fn element_holder(&self, element: Element) -> Option<PlayerId> {
        self.players
            .values()
            .find(|p| p.element == element)
            .map(|p| p.id)
    }

    pub fn element_availability(&self) -> Vec<(Element, bool)> {
        Element::ALL
            .into_iter()
            .map(|e| (e, self.element_holder(e).is_none()))
            .collect()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let (cols, rows) = self.territory.get_grid_dimensions();
        GameSnapshot {
            players: self
                .get_active_players()
                .map(|p| (p.id, p.snapshot()))
                .collect(),
            cols,
            rows,
            cells: self.territory.cells().to_vec(),
            // Frozen at the match length once the clock has run out
            game_time: self.clock.elapsed(self.now).min(self.clock.duration),
            time_remaining: self.clock.time_remaining,
            game_over: self.clock.game_over,
            winner_id: self.clock.winner_id,
            winner_name: self.clock.winner_name.clone(),
        }
    }
}
