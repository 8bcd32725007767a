//! Bridges the turn controller and the rendering contract.

use std::time::Duration;

use fog_tactics_core::{Event, Faction, UnitId};
use fog_tactics_rendering::{
    ActionMenuPresentation, FrameInput, HitTarget, InspectorPresentation, MenuChoice, Scene,
    SceneHighlight, StatsPanel, UnitPresentation, ACTED_TINT,
};
use fog_tactics_system_turn::{Highlight, TurnController, TurnError, TurnPhase};
use fog_tactics_world::query;
use glam::Vec2;
use tracing::{debug, info};

/// Owns the controller and translates frame input into controller calls.
#[derive(Debug)]
pub(crate) struct SceneDriver {
    controller: TurnController,
}

impl SceneDriver {
    pub(crate) fn new(controller: TurnController) -> Self {
        Self { controller }
    }

    #[cfg(test)]
    pub(crate) fn controller(&self) -> &TurnController {
        &self.controller
    }

    /// Processes one frame of input and refreshes `scene` afterwards.
    pub(crate) fn update(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        if input.drag_delta != Vec2::ZERO {
            scene.camera.pan(input.drag_delta);
        }
        if input.wheel_delta != 0.0 {
            scene.camera.apply_wheel(input.wheel_delta);
        }

        for unit in self.controller.tick(dt) {
            debug!(unit = %unit, "stats panel hidden");
        }

        let hit = input
            .cursor_world_space
            .and_then(|position| scene.hit_test(position));
        self.track_hover(hit);

        if input.cancel {
            self.controller.cancel();
        }

        match input.menu_choice {
            Some(MenuChoice::Cancel) => self.controller.cancel(),
            Some(MenuChoice::Action(action)) => report(self.controller.choose(action)),
            None => {}
        }

        if input.next_round {
            let report = self.controller.next_round();
            info!(
                round = report.round,
                enemies_acted = report.decisions.len(),
                fallen = ?report.fallen_players(),
                "enemy turn finished"
            );
        }

        if let Some(hit) = hit {
            if input.primary_click {
                self.primary_click(hit);
            }
            if input.secondary_click {
                if let HitTarget::Unit { id, .. } = hit {
                    report(self.controller.toggle_inspector(id));
                }
            }
        }

        for event in self.controller.drain_events() {
            if let Event::RoundAdvanced { round } = event {
                debug!(round, "round label updated");
            }
        }

        self.populate(scene);
    }

    fn track_hover(&mut self, hit: Option<HitTarget>) {
        let hovered = match hit {
            Some(HitTarget::Unit { id, .. }) => Some(id),
            _ => None,
        };
        if hovered == self.controller.hovered() {
            return;
        }
        if let Some(previous) = self.controller.hovered() {
            self.controller.unhover(previous);
        }
        if let Some(unit) = hovered {
            self.controller.hover(unit);
        }
    }

    fn primary_click(&mut self, hit: HitTarget) {
        match (self.controller.phase(), hit) {
            (TurnPhase::SelectingMoveTarget { .. }, hit) => {
                report(self.controller.select_tile(hit.cell()));
            }
            (TurnPhase::SelectingAttackTarget { .. }, HitTarget::Unit { id, .. }) => {
                match self.controller.select_enemy(id) {
                    Ok(outcome) => info!(
                        target = %outcome.target,
                        damage = outcome.damage,
                        health = outcome.target_health_after,
                        died = outcome.died,
                        "attack resolved"
                    ),
                    Err(error) => refused(&error),
                }
            }
            (
                TurnPhase::AwaitingAction | TurnPhase::ActionMenuOpen { .. },
                HitTarget::Unit { id, .. },
            ) => report(self.controller.select_unit(id)),
            (TurnPhase::ActionMenuOpen { .. }, HitTarget::Tile(_)) => self.controller.cancel(),
            _ => {}
        }
    }

    /// Rebuilds every controller-derived part of the scene.
    pub(crate) fn populate(&self, scene: &mut Scene) {
        let world = self.controller.world();

        scene.fog.clear();
        scene.fog.extend(query::fog_view(world).iter());

        scene.highlights = self
            .controller
            .highlights()
            .iter()
            .map(|highlight| match *highlight {
                Highlight::Tile(cell) => SceneHighlight::Tile(cell),
                Highlight::EnemyMarker(unit) => SceneHighlight::Enemy(unit),
            })
            .collect();

        scene.units = query::unit_view(world)
            .iter()
            .map(|snapshot| {
                let mut unit = UnitPresentation::new(snapshot.id, snapshot.faction, snapshot.cell);
                unit.visible = snapshot.visible;
                unit.interactive = self.controller.is_interactive(snapshot.id);
                if snapshot.faction == Faction::Player && snapshot.flags.has_acted {
                    unit.tint = Some(ACTED_TINT);
                }
                if self.controller.stats_visible(snapshot.id) {
                    unit.stats = Some(StatsPanel::from_vitals(&snapshot.vitals));
                }
                unit
            })
            .collect();

        scene.action_menu = self.controller.action_menu().map(|menu| {
            ActionMenuPresentation::new(
                menu.unit,
                menu.anchor,
                menu.entries.iter().map(|entry| (entry.action, entry.enabled)),
            )
        });

        scene.inspector = self
            .controller
            .inspected()
            .and_then(|unit| query::unit(world, unit))
            .map(|snapshot| InspectorPresentation {
                unit: snapshot.id,
                faction: snapshot.faction,
                level: snapshot.vitals.level,
                attributes: snapshot.attributes,
                equipment: snapshot.equipment,
            });

        scene.round = query::round(world);
    }

    /// First player unit, used to centre the camera on start.
    pub(crate) fn first_player(&self) -> Option<UnitId> {
        query::living_units(self.controller.world(), Faction::Player)
            .first()
            .copied()
    }
}

fn report<T>(result: Result<T, TurnError>) {
    if let Err(error) = result {
        refused(&error);
    }
}

fn refused(error: &TurnError) {
    debug!(%error, "request refused");
}

#[cfg(test)]
mod tests {
    use super::SceneDriver;
    use fog_tactics_core::{ActionKind, GameConfig, GridCoord, UnitId};
    use fog_tactics_rendering::{
        Color, FrameInput, MenuChoice, Scene, SceneHighlight, TileGridPresentation,
    };
    use fog_tactics_system_bootstrap::Bootstrap;
    use fog_tactics_system_combat::CombatResolver;
    use fog_tactics_system_turn::{TurnController, TurnPhase, TurnRules};
    use fog_tactics_world::query;
    use glam::Vec2;
    use std::time::Duration;

    fn driver() -> (SceneDriver, Scene) {
        let config = GameConfig {
            enemy_count: 0,
            ..GameConfig::default()
        };
        let rules = TurnRules::from_config(&config);
        let (world, _) = Bootstrap::new(config).build_world();
        let grid = TileGridPresentation::from_tile_grid(
            query::tile_grid(&world),
            Color::from_rgb_u8(0, 0, 0),
        )
        .expect("valid grid");
        let driver = SceneDriver::new(TurnController::new(
            world,
            rules,
            CombatResolver::default(),
        ));
        let mut scene = Scene::new(grid);
        driver.populate(&mut scene);
        (driver, scene)
    }

    fn click(cell: GridCoord) -> FrameInput {
        FrameInput {
            cursor_world_space: Some(Vec2::new(
                cell.column() as f32 * 64.0 + 32.0,
                cell.row() as f32 * 64.0 + 32.0,
            )),
            primary_click: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn populate_reflects_the_world() {
        let (_, scene) = driver();

        assert_eq!(scene.units.len(), 2);
        assert_eq!(scene.round, 1);
        assert!(!scene.is_fogged(GridCoord::new(20, 20)));
        assert!(scene.is_fogged(GridCoord::new(39, 39)));
        assert!(scene.action_menu.is_none());
    }

    #[test]
    fn clicking_through_a_move_relocates_the_unit() {
        let (mut driver, mut scene) = driver();
        let dt = Duration::from_millis(16);

        driver.update(dt, click(GridCoord::new(20, 20)), &mut scene);
        let menu = scene.action_menu.clone().expect("menu opened");
        assert_eq!(menu.unit, UnitId::new(0));

        driver.update(
            dt,
            FrameInput {
                menu_choice: Some(MenuChoice::Action(ActionKind::Move)),
                ..FrameInput::default()
            },
            &mut scene,
        );
        assert!(scene
            .highlights
            .contains(&SceneHighlight::Tile(GridCoord::new(20, 22))));

        driver.update(dt, click(GridCoord::new(20, 22)), &mut scene);

        let moved = scene.unit(UnitId::new(0)).expect("unit presented");
        assert_eq!(moved.cell, GridCoord::new(20, 22));
        assert!(moved.tint.is_some());
        assert!(!moved.interactive);
        assert!(scene.highlights.is_empty());
        assert_eq!(driver.controller().phase(), TurnPhase::AwaitingAction);
    }

    #[test]
    fn camera_follows_wheel_and_drag() {
        let (mut driver, mut scene) = driver();
        driver.update(
            Duration::ZERO,
            FrameInput {
                wheel_delta: 100.0,
                drag_delta: Vec2::new(9.0, 0.0),
                ..FrameInput::default()
            },
            &mut scene,
        );

        assert!((scene.camera.zoom() - 0.9).abs() < 1e-6);
        assert!((scene.camera.scroll().x + 9.0).abs() < 1e-4);
    }

    #[test]
    fn right_click_toggles_the_inspector() {
        let (mut driver, mut scene) = driver();
        let inspect = FrameInput {
            primary_click: false,
            secondary_click: true,
            ..click(GridCoord::new(20, 20))
        };

        driver.update(Duration::ZERO, inspect.clone(), &mut scene);
        let inspector = scene.inspector.expect("inspector open");
        assert!(inspector.lines().contains(&String::from("ATT: 100")));

        driver.update(Duration::ZERO, inspect, &mut scene);
        assert!(scene.inspector.is_none());
    }

    #[test]
    fn next_round_updates_the_label() {
        let (mut driver, mut scene) = driver();
        driver.update(
            Duration::ZERO,
            FrameInput {
                next_round: true,
                ..FrameInput::default()
            },
            &mut scene,
        );
        assert_eq!(scene.round, 2);
    }

    #[test]
    fn hovering_a_unit_shows_its_stats() {
        let (mut driver, mut scene) = driver();
        let hover = FrameInput {
            primary_click: false,
            ..click(GridCoord::new(0, 0))
        };
        driver.update(Duration::ZERO, hover, &mut scene);

        let unit = scene.unit(UnitId::new(1)).expect("second player");
        assert_eq!(unit.stats.map(|stats| stats.health), Some(100));

        driver.update(Duration::ZERO, FrameInput::default(), &mut scene);
        assert!(scene.unit(UnitId::new(1)).expect("present").stats.is_none());
    }
}
