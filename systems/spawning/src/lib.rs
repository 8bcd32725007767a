#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning system that populates a scene with players and enemies.

use std::collections::HashSet;

use fog_tactics_core::{
    AttributeRanges, Attributes, Command, Faction, GridCoord, OccupancyView,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Attribute value shared by every player attribute.
pub const PLAYER_ATTRIBUTE_VALUE: u32 = 100;

const PLACEMENT_ATTEMPTS_PER_ENEMY: u32 = 256;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    enemy_count: u32,
}

impl Config {
    /// Creates a new configuration using the provided seed and enemy count.
    #[must_use]
    pub const fn new(rng_seed: u64, enemy_count: u32) -> Self {
        Self {
            rng_seed,
            enemy_count,
        }
    }
}

/// Pure system that emits spawn commands for a fresh scene.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
    enemy_count: u32,
    enemy_ranges: AttributeRanges,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            enemy_count: config.enemy_count,
            enemy_ranges: AttributeRanges::enemy(),
        }
    }

    /// Emits one player spawn per start tile, in order.
    pub fn spawn_players(&self, starts: &[GridCoord], out: &mut Vec<Command>) {
        out.extend(starts.iter().map(|&cell| Command::SpawnUnit {
            faction: Faction::Player,
            cell,
            attributes: Attributes::uniform(PLAYER_ATTRIBUTE_VALUE),
        }));
    }

    /// Emits enemy spawns on random free tiles with rolled attributes.
    ///
    /// Tiles are resampled while occupied; an enemy whose attempts run out is
    /// skipped. Returns the number of spawn commands emitted.
    pub fn spawn_enemies(&mut self, occupancy: OccupancyView<'_>, out: &mut Vec<Command>) -> u32 {
        let (columns, rows) = occupancy.dimensions();
        if columns == 0 || rows == 0 {
            return 0;
        }

        let mut claimed = HashSet::new();
        let mut spawned = 0;
        for _ in 0..self.enemy_count {
            let Some(cell) = self.free_tile(occupancy, &claimed, columns, rows) else {
                continue;
            };
            let Some(attributes) = self.roll_attributes() else {
                continue;
            };
            let _ = claimed.insert(cell);
            out.push(Command::SpawnUnit {
                faction: Faction::Enemy,
                cell,
                attributes,
            });
            spawned += 1;
        }
        spawned
    }

    fn free_tile(
        &mut self,
        occupancy: OccupancyView<'_>,
        claimed: &HashSet<GridCoord>,
        columns: u32,
        rows: u32,
    ) -> Option<GridCoord> {
        (0..PLACEMENT_ATTEMPTS_PER_ENEMY).find_map(|_| {
            let cell = GridCoord::new(self.rng.gen_range(0..columns), self.rng.gen_range(0..rows));
            (occupancy.is_free(cell) && !claimed.contains(&cell)).then_some(cell)
        })
    }

    fn roll_attributes(&mut self) -> Option<Attributes> {
        let ranges = self.enemy_ranges;
        Attributes::try_from_fn(&ranges, |attribute| {
            let range = ranges.get(attribute);
            self.rng.gen_range(range.min()..=range.max())
        })
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Spawning};
    use fog_tactics_core::{Command, Faction, GridCoord, OccupancyView};

    #[test]
    fn players_spawn_in_start_order() {
        let spawning = Spawning::new(Config::new(1, 0));
        let mut out = Vec::new();
        spawning.spawn_players(&[GridCoord::new(20, 20), GridCoord::new(0, 0)], &mut out);
        let cells: Vec<GridCoord> = out
            .iter()
            .map(|command| match command {
                Command::SpawnUnit { faction, cell, .. } => {
                    assert_eq!(*faction, Faction::Player);
                    *cell
                }
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        assert_eq!(cells, vec![GridCoord::new(20, 20), GridCoord::new(0, 0)]);
    }

    #[test]
    fn full_grid_yields_no_enemies() {
        let cells = [Some(fog_tactics_core::UnitId::new(0)); 4];
        let occupancy = OccupancyView::new(&cells, 2, 2);
        let mut spawning = Spawning::new(Config::new(9, 3));
        let mut out = Vec::new();
        assert_eq!(spawning.spawn_enemies(occupancy, &mut out), 0);
        assert!(out.is_empty());
    }
}
