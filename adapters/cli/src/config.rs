//! Loading the scene configuration from disk and the command line.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fog_tactics_core::GameConfig;

/// Command-line values that take precedence over the configuration file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) enemies: Option<u32>,
    pub(crate) fog_radius: Option<u32>,
}

impl Overrides {
    fn apply(self, config: &mut GameConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(enemies) = self.enemies {
            config.enemy_count = enemies;
        }
        if let Some(fog_radius) = self.fog_radius {
            config.fog_radius = fog_radius;
        }
    }
}

/// Reads the optional TOML file, applies overrides and validates the result.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            parse(&text).with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    overrides.apply(&mut config);
    config.validate().context("configuration is not playable")?;
    Ok(config)
}

fn parse(text: &str) -> Result<GameConfig> {
    Ok(toml::from_str(text)?)
}
