//! Tunable parameters of a scene.

use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GridCoord;

/// Parameters describing a single tactics scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub tile_length: f32,
    /// Manhattan radius revealed around each player unit.
    pub fog_radius: u32,
    /// Maximum Manhattan distance of a player move.
    pub move_range: u32,
    /// Maximum Manhattan distance of an attack.
    pub attack_range: u32,
    /// Damage dealt by player attacks.
    pub player_damage: u32,
    /// Damage dealt by enemy attacks.
    pub enemy_damage: u32,
    /// Number of enemies spawned when the scene starts.
    pub enemy_count: u32,
    /// How long a damaged unit's stats panel stays up, in milliseconds.
    pub stats_display_ms: u64,
    /// Seed for enemy placement and attribute rolls.
    pub seed: u64,
    /// Tiles the player units start on, in spawn order.
    pub player_starts: Vec<GridCoord>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 40,
            tile_length: 64.0,
            fog_radius: 10,
            move_range: 3,
            attack_range: 1,
            player_damage: 20,
            enemy_damage: 10,
            enemy_count: 10,
            stats_display_ms: 1_000,
            seed: 0x5EED,
            player_starts: vec![GridCoord::new(20, 20), GridCoord::new(0, 0)],
        }
    }
}

impl GameConfig {
    /// Delay before an auto-shown stats panel hides again.
    #[must_use]
    pub fn stats_display_delay(&self) -> Duration {
        Duration::from_millis(self.stats_display_ms)
    }

    /// Checks that the configuration describes a playable scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }

        if !(self.tile_length.is_finite() && self.tile_length > 0.0) {
            return Err(ConfigError::InvalidTileLength);
        }

        if self.move_range == 0 {
            return Err(ConfigError::ZeroRange { rule: "move_range" });
        }
        if self.attack_range == 0 {
            return Err(ConfigError::ZeroRange {
                rule: "attack_range",
            });
        }

        if self.player_starts.is_empty() {
            return Err(ConfigError::NoPlayers);
        }

        let mut seen = HashSet::new();
        for &cell in &self.player_starts {
            if cell.column() >= self.columns || cell.row() >= self.rows {
                return Err(ConfigError::PlayerStartOutOfBounds { cell });
            }
            if !seen.insert(cell) {
                return Err(ConfigError::DuplicatePlayerStart { cell });
            }
        }

        let capacity = u64::from(self.columns) * u64::from(self.rows);
        let requested = self.player_starts.len() as u64 + u64::from(self.enemy_count);
        if requested > capacity {
            return Err(ConfigError::TooManyUnits {
                requested,
                capacity,
            });
        }

        Ok(())
    }
}

/// Reasons a [`GameConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid has no tiles.
    #[error("grid must have at least one tile, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// The tile length is not a positive finite number.
    #[error("tile length must be a positive number")]
    InvalidTileLength,
    /// A range rule is zero, so the action could never reach another tile.
    #[error("{rule} must be at least 1")]
    ZeroRange {
        /// Name of the offending setting.
        rule: &'static str,
    },
    /// No player start was configured.
    #[error("at least one player start is required")]
    NoPlayers,
    /// A player start lies outside the grid.
    #[error("player start {cell} lies outside the grid")]
    PlayerStartOutOfBounds {
        /// Offending start tile.
        cell: GridCoord,
    },
    /// Two players would start on the same tile.
    #[error("player start {cell} is listed twice")]
    DuplicatePlayerStart {
        /// Offending start tile.
        cell: GridCoord,
    },
    /// The grid cannot hold every unit.
    #[error("{requested} units do not fit on a grid of {capacity} tiles")]
    TooManyUnits {
        /// Players plus enemies requested.
        requested: u64,
        /// Tiles available.
        capacity: u64,
    },
}
