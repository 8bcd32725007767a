use fog_tactics_core::{
    ActionError, ActionKind, Attributes, Command, Direction, Event, Faction, GridCoord,
    RejectionReason, UnitId,
};
use fog_tactics_world::{self as world, query, World};

fn spawn(world: &mut World, faction: Faction, cell: GridCoord) -> UnitId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnUnit {
            faction,
            cell,
            attributes: Attributes::uniform(100),
        },
        &mut events,
    );
    events
        .into_iter()
        .find_map(|event| match event {
            Event::UnitSpawned { unit, .. } => Some(unit),
            _ => None,
        })
        .expect("spawn accepted")
}

fn fog_recomputes(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::FogRecomputed { .. }))
        .count()
}

fn rejection(events: &[Event]) -> Option<RejectionReason> {
    events.iter().find_map(|event| match event {
        Event::CommandRejected { reason, .. } => Some(*reason),
        _ => None,
    })
}

#[test]
fn fog_reveals_every_tile_within_radius_of_a_player() {
    let mut world = World::new();
    let _ = spawn(&mut world, Faction::Player, GridCoord::new(20, 20));
    let _ = spawn(&mut world, Faction::Player, GridCoord::new(0, 0));

    let fog = query::fog_view(&world);
    for cell in query::tile_grid(&world).tiles() {
        let expected = cell.manhattan_distance(GridCoord::new(20, 20)) <= 10
            || cell.manhattan_distance(GridCoord::new(0, 0)) <= 10;
        assert_eq!(fog.is_visible(cell), expected, "tile {cell}");
    }
}

#[test]
fn move_updates_position_flags_and_fog_once() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(20, 20));
    let before = query::fog_recomputations(&world);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: player,
            to: GridCoord::new(22, 21),
        },
        &mut events,
    );

    assert_eq!(fog_recomputes(&events), 1);
    assert_eq!(query::fog_recomputations(&world), before + 1);
    let snapshot = query::unit(&world, player).expect("player alive");
    assert_eq!(snapshot.cell, GridCoord::new(22, 21));
    assert!(snapshot.flags.has_moved);
    assert!(snapshot.flags.has_acted);
    assert!(!query::is_occupied(&world, GridCoord::new(20, 20)));
    assert!(query::is_occupied(&world, GridCoord::new(22, 21)));
    assert!(query::fog_view(&world).is_visible(GridCoord::new(32, 21)));
    assert!(!query::fog_view(&world).is_visible(GridCoord::new(10, 20)));
}

#[test]
fn move_beyond_range_is_rejected_without_side_effects() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(20, 20));
    let before = query::fog_recomputations(&world);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: player,
            to: GridCoord::new(24, 20),
        },
        &mut events,
    );

    assert_eq!(
        rejection(&events),
        Some(RejectionReason::Action(ActionError::OutOfRange {
            from: GridCoord::new(20, 20),
            to: GridCoord::new(24, 20),
            distance: 4,
            range: 3,
        }))
    );
    assert_eq!(query::fog_recomputations(&world), before);
    let snapshot = query::unit(&world, player).expect("player alive");
    assert_eq!(snapshot.cell, GridCoord::new(20, 20));
    assert!(!snapshot.flags.has_acted);
}

#[test]
fn second_move_in_a_round_is_rejected() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(5, 5));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: player,
            to: GridCoord::new(6, 5),
        },
        &mut events,
    );
    events.clear();

    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: player,
            to: GridCoord::new(7, 5),
        },
        &mut events,
    );
    assert_eq!(
        rejection(&events),
        Some(RejectionReason::Action(ActionError::AlreadyMoved { unit: player }))
    );
}

#[test]
fn lethal_attack_removes_target_and_releases_tile() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(20, 20));
    let enemy = spawn(&mut world, Faction::Enemy, GridCoord::new(21, 20));

    let mut events = Vec::new();
    for _ in 0..4 {
        world::apply(
            &mut world,
            Command::Attack {
                attacker: enemy,
                target: player,
                damage: 10,
            },
            &mut events,
        );
    }
    events.clear();
    world::apply(
        &mut world,
        Command::Attack {
            attacker: player,
            target: enemy,
            damage: 120,
        },
        &mut events,
    );

    assert!(events.contains(&Event::UnitDamaged {
        unit: enemy,
        attacker: player,
        damage: 120,
        health_after: 0,
    }));
    assert!(events.contains(&Event::UnitDied {
        unit: enemy,
        faction: Faction::Enemy,
        cell: GridCoord::new(21, 20),
    }));
    assert!(query::unit(&world, enemy).is_none());
    assert!(!query::is_occupied(&world, GridCoord::new(21, 20)));
    let player_health = query::unit(&world, player)
        .expect("player alive")
        .vitals
        .health;
    assert_eq!(player_health, 60);
}

#[test]
fn attack_requires_adjacency_and_opposing_factions() {
    let mut world = World::new();
    let first = spawn(&mut world, Faction::Player, GridCoord::new(1, 1));
    let second = spawn(&mut world, Faction::Player, GridCoord::new(1, 2));
    let enemy = spawn(&mut world, Faction::Enemy, GridCoord::new(3, 1));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Attack {
            attacker: first,
            target: second,
            damage: 20,
        },
        &mut events,
    );
    assert_eq!(
        rejection(&events),
        Some(RejectionReason::Action(ActionError::SameFaction {
            attacker: first,
            target: second,
        }))
    );

    events.clear();
    world::apply(
        &mut world,
        Command::Attack {
            attacker: first,
            target: enemy,
            damage: 20,
        },
        &mut events,
    );
    assert!(matches!(
        rejection(&events),
        Some(RejectionReason::Action(ActionError::OutOfRange { distance: 2, .. }))
    ));
    assert_eq!(
        query::unit(&world, enemy).expect("enemy alive").vitals.health,
        100
    );
}

#[test]
fn enemy_attacks_reach_adjacent_tiles_regardless_of_player_range() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(4, 4));
    let near = spawn(&mut world, Faction::Enemy, GridCoord::new(5, 4));
    let far = spawn(&mut world, Faction::Enemy, GridCoord::new(4, 6));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureRules {
            fog_radius: 10,
            move_range: 2,
            attack_range: 3,
        },
        &mut events,
    );

    events.clear();
    world::apply(
        &mut world,
        Command::Attack {
            attacker: far,
            target: player,
            damage: 10,
        },
        &mut events,
    );
    assert!(matches!(
        rejection(&events),
        Some(RejectionReason::Action(ActionError::OutOfRange {
            distance: 2,
            range: 1,
            ..
        }))
    ));

    world::apply(
        &mut world,
        Command::ConfigureRules {
            fog_radius: 10,
            move_range: 2,
            attack_range: 0,
        },
        &mut events,
    );

    events.clear();
    world::apply(
        &mut world,
        Command::Attack {
            attacker: near,
            target: player,
            damage: 10,
        },
        &mut events,
    );
    assert_eq!(rejection(&events), None);
    assert_eq!(
        query::unit(&world, player).expect("player alive").vitals.health,
        90
    );
}

#[test]
fn advance_round_resets_flags_and_increments_round() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(4, 4));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::EndAction {
            unit: player,
            action: ActionKind::Hold,
        },
        &mut events,
    );
    assert!(query::unit(&world, player).expect("alive").flags.has_acted);

    events.clear();
    world::apply(&mut world, Command::AdvanceRound, &mut events);

    assert!(events.contains(&Event::RoundAdvanced { round: 2 }));
    assert_eq!(fog_recomputes(&events), 1);
    let flags = query::unit(&world, player).expect("alive").flags;
    assert!(!flags.has_moved);
    assert!(!flags.has_acted);
}

#[test]
fn end_action_refuses_targeted_actions() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(4, 4));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::EndAction {
            unit: player,
            action: ActionKind::Attack,
        },
        &mut events,
    );
    assert_eq!(
        rejection(&events),
        Some(RejectionReason::Action(ActionError::NeedsTarget {
            action: ActionKind::Attack,
        }))
    );
}

#[test]
fn enemy_step_into_an_occupied_tile_is_rejected() {
    let mut world = World::new();
    let player = spawn(&mut world, Faction::Player, GridCoord::new(20, 20));
    let enemy = spawn(&mut world, Faction::Enemy, GridCoord::new(21, 20));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StepUnit {
            unit: enemy,
            direction: Direction::West,
        },
        &mut events,
    );
    assert_eq!(
        rejection(&events),
        Some(RejectionReason::Action(ActionError::Occupied {
            cell: GridCoord::new(20, 20),
            occupant: player,
        }))
    );
    assert_eq!(
        query::unit(&world, enemy).expect("alive").cell,
        GridCoord::new(21, 20)
    );
}

#[test]
fn commands_for_removed_units_report_unknown_unit() {
    let mut world = World::new();
    let mut events = Vec::new();
    let ghost = UnitId::new(99);
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: ghost,
            to: GridCoord::new(0, 0),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            unit: Some(ghost),
            reason: RejectionReason::Action(ActionError::UnknownUnit { unit: ghost }),
        }]
    );
}

#[test]
fn enemy_visibility_follows_fog() {
    let mut world = World::new();
    let _ = spawn(&mut world, Faction::Player, GridCoord::new(0, 0));
    let near = spawn(&mut world, Faction::Enemy, GridCoord::new(5, 5));
    let far = spawn(&mut world, Faction::Enemy, GridCoord::new(30, 30));

    let units = query::unit_view(&world);
    assert!(units.get(near).expect("near").visible);
    assert!(!units.get(far).expect("far").visible);
    assert_eq!(
        query::units_within(&world, GridCoord::new(5, 4), 1, Faction::Enemy),
        vec![near]
    );
}
