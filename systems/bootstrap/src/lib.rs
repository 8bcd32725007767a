#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that prepares a Fog Tactics scene from a [`GameConfig`].

use fog_tactics_core::{Command, Event, GameConfig, TileGrid};
use fog_tactics_system_spawning::{Config as SpawningConfig, Spawning};
use fog_tactics_world::{self as world, query, World};
use tracing::info;

/// Produces the initial world and the data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap {
    config: GameConfig,
}

impl Bootstrap {
    /// Creates a bootstrap for the provided configuration.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    /// Configuration the scene is built from.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the tile grid configuration required for rendering.
    #[must_use]
    pub fn tile_grid<'world>(&self, world: &'world World) -> &'world TileGrid {
        query::tile_grid(world)
    }

    /// Commands that size the grid and install the rules.
    pub fn configure(&self, out: &mut Vec<Command>) {
        out.push(Command::ConfigureGrid {
            columns: self.config.columns,
            rows: self.config.rows,
            tile_length: self.config.tile_length,
        });
        out.push(Command::ConfigureRules {
            fog_radius: self.config.fog_radius,
            move_range: self.config.move_range,
            attack_range: self.config.attack_range,
        });
    }

    /// Builds a populated world: grid, rules, players, then enemies.
    ///
    /// Returns the world together with every event emitted while building it.
    #[must_use]
    pub fn build_world(&self) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        let mut commands = Vec::new();

        self.configure(&mut commands);
        let mut spawning = Spawning::new(SpawningConfig::new(
            self.config.seed,
            self.config.enemy_count,
        ));
        spawning.spawn_players(&self.config.player_starts, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        let enemies = spawning.spawn_enemies(query::occupancy_view(&world), &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        info!(
            seed = self.config.seed,
            enemies,
            columns = self.config.columns,
            rows = self.config.rows,
            "scene bootstrapped"
        );
        (world, events)
    }
}

#[cfg(test)]
mod tests {
    use super::Bootstrap;
    use fog_tactics_core::{Event, Faction, GameConfig, GridCoord};
    use fog_tactics_world::query;

    #[test]
    fn default_scene_matches_the_standard_layout() {
        let bootstrap = Bootstrap::default();
        let (world, events) = bootstrap.build_world();

        assert_eq!(bootstrap.welcome_banner(&world), "Welcome to Fog Tactics.");
        assert_eq!(bootstrap.tile_grid(&world).columns(), 40);
        assert_eq!(bootstrap.tile_grid(&world).tile_length(), 64.0);

        let units = query::unit_view(&world);
        let players: Vec<GridCoord> = units
            .of_faction(Faction::Player)
            .map(|unit| unit.cell)
            .collect();
        assert_eq!(players, vec![GridCoord::new(20, 20), GridCoord::new(0, 0)]);
        assert_eq!(units.of_faction(Faction::Enemy).count(), 10);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::CommandRejected { .. })));
    }

    #[test]
    fn configuration_flows_into_the_world() {
        let config = GameConfig {
            columns: 12,
            rows: 8,
            fog_radius: 3,
            enemy_count: 2,
            player_starts: vec![GridCoord::new(1, 1)],
            ..GameConfig::default()
        };
        let (world, _) = Bootstrap::new(config).build_world();

        assert_eq!(query::tile_grid(&world).rows(), 8);
        assert_eq!(query::fog_radius(&world), 3);
        assert_eq!(query::unit_view(&world).len(), 3);
        assert!(query::fog_view(&world).is_visible(GridCoord::new(4, 1)));
        assert!(!query::fog_view(&world).is_visible(GridCoord::new(5, 1)));
    }
}
