#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Fog Tactics scene.

mod config;
mod headless;
mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fog_tactics_rendering::{Color, Presentation, RenderingBackend, Scene, TileGridPresentation};
use fog_tactics_rendering_macroquad::{MacroquadBackend, CONTROL_PANEL_WIDTH};
use fog_tactics_system_bootstrap::Bootstrap;
use fog_tactics_system_combat::CombatResolver;
use fog_tactics_system_turn::{TurnController, TurnRules};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use self::{config::Overrides, scene::SceneDriver};

const DEFAULT_LOG_FILTER: &str = "fog_tactics=info";

/// Initial window size assumed when centring the camera.
const INITIAL_VIEWPORT: Vec2 = Vec2::new(1200.0 - CONTROL_PANEL_WIDTH, 900.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Debug, Parser)]
#[command(name = "fog-tactics", about = "Turn-based tactics under fog of war", version)]
struct Cli {
    /// TOML file with scene parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for enemy placement and attribute rolls.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of enemies to spawn.
    #[arg(long)]
    enemies: Option<u32>,

    /// Manhattan radius revealed around each player unit.
    #[arg(long)]
    fog_radius: Option<u32>,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long, value_enum, default_value = "on")]
    vsync: Toggle,

    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,

    /// Run this many enemy rounds without opening a window.
    #[arg(long, value_name = "N")]
    headless_rounds: Option<u32>,
}

/// Entry point for the Fog Tactics command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::load(
        cli.config.as_deref(),
        Overrides {
            seed: cli.seed,
            enemies: cli.enemies,
            fog_radius: cli.fog_radius,
        },
    )?;

    let rules = TurnRules::from_config(&config);
    let combat = CombatResolver::new(config.player_damage, config.enemy_damage);
    let bootstrap = Bootstrap::new(config);
    let (world, _) = bootstrap.build_world();
    info!("{}", bootstrap.welcome_banner(&world));

    let tile_grid = TileGridPresentation::from_tile_grid(
        bootstrap.tile_grid(&world),
        Color::from_rgb_u8(0x1f, 0x2b, 0x22),
    )
    .context("failed to describe the tile grid")?;
    let mut controller = TurnController::new(world, rules, combat);

    if let Some(rounds) = cli.headless_rounds {
        let _ = headless::run(&mut controller, rounds);
        return Ok(());
    }

    let mut driver = SceneDriver::new(controller);
    let mut scene = Scene::new(tile_grid);
    driver.populate(&mut scene);
    let start = driver
        .first_player()
        .and_then(|id| scene.unit(id))
        .map(|unit| tile_grid.tile_center(unit.cell));
    if let Some(center) = start {
        scene.camera.center_on(center, INITIAL_VIEWPORT);
    }

    let presentation = Presentation::new(
        "Fog Tactics",
        Color::from_rgb_u8(0x12, 0x14, 0x18),
        scene,
    );
    MacroquadBackend::new()
        .with_vsync(cli.vsync == Toggle::On)
        .with_show_fps(cli.show_fps)
        .run(presentation, move |dt, input, scene| driver.update(dt, input, scene))
        .context("rendering backend failed")
}
