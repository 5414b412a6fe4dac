use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use super::state::RejectReason;

/// Largest grid side in cells.
pub const MAX_GRID_SIDE: u32 = 4096;
pub const MAX_TICK_RATE_HZ: u32 = 1000;

/// Whole cells along one side, at least one and at most `MAX_GRID_SIDE`.
fn grid_extent(length: f32, cell_size: f32) -> u32 {
    let cells = (length / cell_size).floor();
    if cells.is_finite() && cells >= 1.0 {
        (cells as u32).min(MAX_GRID_SIDE)
    } else {
        1
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaperioConfig {
    /// Arena width in world units
    pub arena_width: f32,
    /// Arena height in world units
    pub arena_height: f32,
    /// Side length of one grid cell in world units
    pub cell_size: f32,
    /// Server tick rate in Hz (ticks per second)
    pub tick_rate_hz: u32,
    /// Time a player needs to cross one cell
    pub move_interval_ms: u64,
    /// Delay between elimination and respawn
    pub respawn_delay_ms: u64,
    /// Match length, counted from the first join
    pub match_duration_secs: u64,
    /// Maximum number of players per match
    pub max_players: usize,
    /// Radius of the territory square granted on spawn
    pub safe_zone_radius: u32,
    /// Radius that must be completely empty around a spawn point
    pub spawn_clearance: u32,
    /// Random spawn candidates tried before falling back
    pub spawn_attempts: u32,
    /// Longest accepted display name, in characters
    pub max_name_len: usize,
    /// Fixed seed for spawn selection; entropy-seeded when absent
    pub rng_seed: Option<u64>,
}

impl PaperioConfig {
    pub fn with_grid_size(cols: u32, rows: u32) -> Self {
        let base = Self::default();
        Self {
            arena_width: cols as f32 * base.cell_size,
            arena_height: rows as f32 * base.cell_size,
            ..base
        }
    }

    pub fn cols(&self) -> u32 {
        grid_extent(self.arena_width, self.cell_size)
    }

    pub fn rows(&self) -> u32 {
        grid_extent(self.arena_height, self.cell_size)
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis((1000 / self.tick_rate_hz.max(1) as u64).max(1))
    }

    /// Replaces values the engine cannot run with, logging each change.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            tracing::warn!("cell_size {} is not positive, using {}", self.cell_size, defaults.cell_size);
            self.cell_size = defaults.cell_size;
        }

        let max_extent = MAX_GRID_SIDE as f32 * self.cell_size;
        for (label, extent) in [("arena_width", &mut self.arena_width), ("arena_height", &mut self.arena_height)] {
            let clamped = if extent.is_finite() {
                extent.clamp(self.cell_size, max_extent)
            } else {
                self.cell_size
            };
            if clamped != *extent {
                tracing::warn!("{} {} out of range, using {}", label, extent, clamped);
                *extent = clamped;
            }
        }

        let tick_rate_hz = self.tick_rate_hz.clamp(1, MAX_TICK_RATE_HZ);
        if tick_rate_hz != self.tick_rate_hz {
            tracing::warn!("tick_rate_hz {} out of range, using {}", self.tick_rate_hz, tick_rate_hz);
            self.tick_rate_hz = tick_rate_hz;
        }

        if self.move_interval_ms == 0 {
            tracing::warn!("move_interval_ms must be > 0, using {}", defaults.move_interval_ms);
            self.move_interval_ms = defaults.move_interval_ms;
        }

        self
    }

    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.move_interval_ms.max(1))
    }

    pub fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_delay_ms)
    }

    pub fn match_duration(&self) -> Duration {
        Duration::from_secs(self.match_duration_secs)
    }
}

impl Default for PaperioConfig {
    fn default() -> Self {
        Self {
            arena_width: 1200.0,
            arena_height: 1200.0,
            cell_size: 20.0,
            tick_rate_hz: 60,
            move_interval_ms: 120,
            respawn_delay_ms: 2000,
            match_duration_secs: 180,
            max_players: 4,
            safe_zone_radius: 1,
            spawn_clearance: 3,
            spawn_attempts: 50,
            max_name_len: 16,
            rng_seed: None,
        }
    }
}

/// Cosmetic element a player picks on join. Each element is held by at most
/// one active player and decides the player's colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Water,
    Fung,
    Lavar,
    Desert,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Water, Element::Fung, Element::Lavar, Element::Desert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Water => "water",
            Element::Fung => "fung",
            Element::Lavar => "lavar",
            Element::Desert => "desert",
        }
    }

    /// RGBA packed as u32
    pub fn color(&self) -> u32 {
        match self {
            Element::Water => 0x3B82F6FF,
            Element::Fung => 0x22C55EFF,
            Element::Lavar => 0xEF4444FF,
            Element::Desert => 0xEAB308FF,
        }
    }

    /// Parses an optional raw element name from a client request.
    pub fn parse_requested(raw: Option<&str>) -> Result<Element, RejectReason> {
        match raw.map(str::trim) {
            None | Some("") => Err(RejectReason::ElementRequired),
            Some(name) => name.parse(),
        }
    }
}

impl FromStr for Element {
    type Err = RejectReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Element::ALL
            .into_iter()
            .find(|e| e.as_str() == lowered)
            .ok_or(RejectReason::InvalidElement)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
