use std::time::Duration;

use fog_tactics_core::{
    ActionError, ActionKind, Attributes, Command, Event, Faction, GridCoord, UnitId,
};
use fog_tactics_system_combat::CombatResolver;
use fog_tactics_system_turn::{Highlight, TurnController, TurnError, TurnPhase, TurnRules};
use fog_tactics_world::{self as world, query, World};

struct Scene {
    world: World,
    ids: Vec<UnitId>,
}

impl Scene {
    fn new() -> Self {
        Self {
            world: World::new(),
            ids: Vec::new(),
        }
    }

    fn spawn(mut self, faction: Faction, cell: GridCoord) -> Self {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SpawnUnit {
                faction,
                cell,
                attributes: Attributes::uniform(100),
            },
            &mut events,
        );
        let id = events
            .into_iter()
            .find_map(|event| match event {
                Event::UnitSpawned { unit, .. } => Some(unit),
                _ => None,
            })
            .expect("spawn accepted");
        self.ids.push(id);
        self
    }

    fn apply(mut self, command: Command) -> Self {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::CommandRejected { .. })),
            "setup command rejected: {events:?}"
        );
        self
    }

    fn controller(self) -> (TurnController, Vec<UnitId>) {
        (
            TurnController::new(self.world, TurnRules::default(), CombatResolver::default()),
            self.ids,
        )
    }
}

fn fog_recomputes(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::FogRecomputed { .. }))
        .count()
}

#[test]
fn move_highlights_the_diamond_and_returns_to_idle() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .controller();
    let player = ids[0];

    controller.select_unit(player).expect("selectable");
    assert_eq!(controller.phase(), TurnPhase::ActionMenuOpen { unit: player });
    controller.choose(ActionKind::Move).expect("move offered");
    assert_eq!(controller.highlights().len(), 25);
    assert!(controller.highlights().contains_tile(GridCoord::new(23, 20)));
    assert!(!controller.highlights().contains_tile(GridCoord::new(22, 22)));

    let _ = controller.drain_events();
    controller
        .select_tile(GridCoord::new(22, 21))
        .expect("highlighted tile");

    assert_eq!(controller.phase(), TurnPhase::AwaitingAction);
    assert!(controller.highlights().is_empty());
    assert_eq!(fog_recomputes(&controller.drain_events()), 1);
    let snapshot = query::unit(controller.world(), player).expect("alive");
    assert_eq!(snapshot.cell, GridCoord::new(22, 21));
    assert!(snapshot.flags.has_moved && snapshot.flags.has_acted);
}

#[test]
fn acted_unit_cannot_reopen_the_menu_until_the_round_resets() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .controller();
    let player = ids[0];

    controller.select_unit(player).expect("selectable");
    controller.choose(ActionKind::Move).expect("move offered");
    controller
        .select_tile(GridCoord::new(20, 21))
        .expect("highlighted tile");

    assert_eq!(
        controller.select_unit(player),
        Err(TurnError::IllegalAction(ActionError::AlreadyActed {
            unit: player
        }))
    );
    assert!(!controller.is_interactive(player));

    let report = controller.next_round();
    assert_eq!(report.round, 2);
    assert!(controller.is_interactive(player));
    controller.select_unit(player).expect("selectable again");
}

#[test]
fn tiles_outside_the_highlight_are_refused() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .controller();
    let player = ids[0];

    controller.select_unit(player).expect("selectable");
    controller.choose(ActionKind::Move).expect("move offered");
    assert_eq!(
        controller.select_tile(GridCoord::new(24, 20)),
        Err(TurnError::NotSelectableTile {
            cell: GridCoord::new(24, 20)
        })
    );
    assert_eq!(
        controller.phase(),
        TurnPhase::SelectingMoveTarget { unit: player }
    );
}

#[test]
fn occupied_destination_is_rejected_and_keeps_the_submenu_open() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(22, 20))
        .controller();
    let player = ids[0];

    controller.select_unit(player).expect("selectable");
    controller.choose(ActionKind::Move).expect("move offered");
    let error = controller
        .select_tile(GridCoord::new(22, 20))
        .expect_err("tile is occupied");

    assert!(matches!(error, TurnError::Rejected(_)));
    assert_eq!(
        controller.phase(),
        TurnPhase::SelectingMoveTarget { unit: player }
    );
    assert!(!query::unit(controller.world(), player)
        .expect("alive")
        .flags
        .has_acted);
}

#[test]
fn surviving_target_shows_its_stats_until_the_delay_elapses() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(20, 21))
        .controller();
    let (player, enemy) = (ids[0], ids[1]);

    controller.select_unit(player).expect("selectable");
    controller.choose(ActionKind::Attack).expect("enemy adjacent");
    assert_eq!(
        controller.highlights().iter().copied().collect::<Vec<_>>(),
        vec![Highlight::EnemyMarker(enemy)]
    );

    let outcome = controller.select_enemy(enemy).expect("attack resolves");

    assert_eq!(outcome.target_health_after, 80);
    assert!(!outcome.died);
    assert!(controller.stats_visible(enemy));
    assert!(controller.tick(Duration::from_millis(999)).is_empty());
    assert_eq!(controller.tick(Duration::from_millis(1)), vec![enemy]);
    assert!(!controller.stats_visible(enemy));
    assert!(query::unit(controller.world(), player)
        .expect("alive")
        .flags
        .has_acted);
}

#[test]
fn lethal_attack_removes_the_enemy_in_the_same_call() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(21, 20))
        .apply(Command::Attack {
            attacker: UnitId::new(0),
            target: UnitId::new(1),
            damage: 85,
        })
        .apply(Command::AdvanceRound)
        .controller();
    let (player, enemy) = (ids[0], ids[1]);
    assert_eq!(
        query::unit(controller.world(), enemy)
            .expect("alive")
            .vitals
            .health,
        15
    );

    controller.select_unit(player).expect("selectable");
    controller.choose(ActionKind::Attack).expect("enemy adjacent");
    let outcome = controller.select_enemy(enemy).expect("attack resolves");

    assert!(outcome.died);
    assert_eq!(outcome.target_health_after, 0);
    assert!(query::unit(controller.world(), enemy).is_none());
    assert!(!query::is_occupied(controller.world(), GridCoord::new(21, 20)));
    assert!(!controller.highlights().contains_enemy(enemy));
    assert!(!controller.stats_visible(enemy));
}

#[test]
fn attack_without_adjacent_enemies_reports_missing_target() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(22, 20))
        .controller();
    let player = ids[0];

    controller.select_unit(player).expect("selectable");
    assert_eq!(
        controller.choose(ActionKind::Attack),
        Err(TurnError::MissingTarget { unit: player })
    );
    assert_eq!(controller.phase(), TurnPhase::ActionMenuOpen { unit: player });
}

#[test]
fn hidden_enemies_are_never_offered_or_hovered() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(21, 20))
        .apply(Command::ConfigureRules {
            fog_radius: 0,
            move_range: 3,
            attack_range: 1,
        })
        .controller();
    let (player, enemy) = (ids[0], ids[1]);

    controller.hover(enemy);
    assert_eq!(controller.hovered(), None);
    assert!(!controller.is_interactive(enemy));
    assert_eq!(
        controller.toggle_inspector(enemy),
        Err(TurnError::NotSelectableUnit { unit: enemy })
    );

    controller.select_unit(player).expect("selectable");
    assert_eq!(
        controller.choose(ActionKind::Attack),
        Err(TurnError::MissingTarget { unit: player })
    );
}

#[test]
fn inspector_toggles_open_and_closed() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(25, 20))
        .controller();
    let enemy = ids[1];

    assert_eq!(controller.toggle_inspector(enemy), Ok(Some(enemy)));
    assert_eq!(controller.inspected(), Some(enemy));
    assert_eq!(controller.toggle_inspector(ids[0]), Ok(None));
    assert_eq!(controller.inspected(), None);
}

#[test]
fn adjacent_enemy_attacks_without_moving_at_round_end() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(21, 20))
        .controller();
    let (player, enemy) = (ids[0], ids[1]);

    let report = controller.next_round();

    assert_eq!(report.decisions.len(), 1);
    assert_eq!(report.decisions[0].target, Some(player));
    assert_eq!(report.decisions[0].step, None);
    assert!(report.decisions[0].attacked);
    assert_eq!(
        query::unit(controller.world(), enemy).expect("alive").cell,
        GridCoord::new(21, 20)
    );
    assert_eq!(
        query::unit(controller.world(), player)
            .expect("alive")
            .vitals
            .health,
        90
    );
    assert_eq!(controller.phase(), TurnPhase::AwaitingAction);
}

#[test]
fn enemy_attack_ignores_a_zero_player_attack_range() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(21, 20))
        .apply(Command::ConfigureRules {
            fog_radius: 10,
            move_range: 2,
            attack_range: 0,
        })
        .controller();
    let player = ids[0];

    let report = controller.next_round();

    assert!(report.decisions[0].attacked);
    assert!(!report
        .events
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. })));
    assert_eq!(
        query::unit(controller.world(), player)
            .expect("alive")
            .vitals
            .health,
        90
    );
}

#[test]
fn enemies_converge_on_the_nearest_player_each_round() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Player, GridCoord::new(0, 0))
        .spawn(Faction::Enemy, GridCoord::new(20, 26))
        .controller();
    let enemy = ids[2];

    for expected_row in [25, 24, 23, 22, 21] {
        let _ = controller.next_round();
        assert_eq!(
            query::unit(controller.world(), enemy).expect("alive").cell,
            GridCoord::new(20, expected_row)
        );
    }

    let report = controller.next_round();
    assert_eq!(
        query::unit(controller.world(), enemy).expect("alive").cell,
        GridCoord::new(20, 21)
    );
    assert!(report.decisions[0].attacked);
}

#[test]
fn players_killed_by_enemies_become_stale() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(20, 20))
        .spawn(Faction::Enemy, GridCoord::new(21, 20))
        .apply(Command::Attack {
            attacker: UnitId::new(1),
            target: UnitId::new(0),
            damage: 95,
        })
        .controller();
    let player = ids[0];

    let report = controller.next_round();

    assert_eq!(report.fallen_players(), vec![player]);
    assert_eq!(
        controller.select_unit(player),
        Err(TurnError::StaleReference { unit: player })
    );
    assert_eq!(query::fog_view(controller.world()).visible_count(), 0);
}

#[test]
fn action_menu_lists_every_action() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(3, 3))
        .controller();
    assert!(controller.action_menu().is_none());

    controller.select_unit(ids[0]).expect("selectable");
    let menu = controller.action_menu().expect("menu open");

    assert_eq!(menu.anchor, GridCoord::new(3, 3));
    assert_eq!(
        menu.entries
            .iter()
            .map(|entry| entry.action)
            .collect::<Vec<_>>(),
        ActionKind::ALL.to_vec()
    );
    assert!(menu.entries.iter().all(|entry| entry.enabled));
}

#[test]
fn special_consumes_the_action() {
    let (mut controller, ids) = Scene::new()
        .spawn(Faction::Player, GridCoord::new(3, 3))
        .controller();

    controller.select_unit(ids[0]).expect("selectable");
    controller.choose(ActionKind::Special).expect("special accepted");

    assert_eq!(controller.phase(), TurnPhase::AwaitingAction);
    assert!(query::unit(controller.world(), ids[0])
        .expect("alive")
        .flags
        .has_acted);
}
