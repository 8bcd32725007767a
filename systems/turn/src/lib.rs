#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input-driven turn controller for Fog Tactics.
//!
//! The [`TurnController`] owns the authoritative [`World`] and is the only
//! place that pumps commands into it. Player input arrives as discrete
//! requests (select a unit, choose an action, pick a tile or an enemy); each
//! request either advances the [`TurnPhase`] state machine or fails with a
//! [`TurnError`] that leaves every piece of state untouched. Ending the round
//! hands control to the enemy AI for every living enemy, in id order.

mod highlight;
mod timers;

use std::time::Duration;

use fog_tactics_core::{
    ActionError, ActionKind, Command, Event, Faction, GameConfig, GridCoord, RejectionReason,
    UnitId, UnitSnapshot,
};
use fog_tactics_system_combat::{AttackOutcome, CombatResolver};
use fog_tactics_system_enemy_ai::{EnemyAi, EnemyDecision};
use fog_tactics_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use highlight::{Highlight, HighlightSet};
pub use timers::StatsDisplayTimers;

/// Phase of the player's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    /// No unit is selected.
    AwaitingAction,
    /// The action menu is open for a unit.
    ActionMenuOpen {
        /// Unit the menu belongs to.
        unit: UnitId,
    },
    /// Destination tiles are highlighted for a move.
    SelectingMoveTarget {
        /// Unit being moved.
        unit: UnitId,
    },
    /// Adjacent enemies are highlighted for an attack.
    SelectingAttackTarget {
        /// Unit attacking.
        unit: UnitId,
    },
    /// Enemies are taking their turn.
    RoundEnding,
}

/// Ranges and delays the controller enforces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnRules {
    /// Maximum Manhattan distance of a player move.
    pub move_range: u32,
    /// Maximum Manhattan distance of an attack.
    pub attack_range: u32,
    /// How long an auto-shown stats panel stays up.
    pub stats_display_delay: Duration,
}

impl TurnRules {
    /// Extracts the rules from a scene configuration.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            move_range: config.move_range,
            attack_range: config.attack_range,
            stats_display_delay: config.stats_display_delay(),
        }
    }
}

impl Default for TurnRules {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

/// Entry of the action menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Action the entry triggers.
    pub action: ActionKind,
    /// Whether the entry can currently be chosen.
    pub enabled: bool,
}

/// Action menu offered for a selected unit. Cancel is always available.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionMenu {
    /// Unit the menu belongs to.
    pub unit: UnitId,
    /// Tile the unit stands on.
    pub anchor: GridCoord,
    /// Entries in menu order.
    pub entries: Vec<MenuEntry>,
}

/// What happened while the enemies took their turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundReport {
    /// Round that started.
    pub round: u32,
    /// Decision of each enemy, in id order.
    pub decisions: Vec<EnemyDecision>,
    /// Every event produced during the round change.
    pub events: Vec<Event>,
}

impl RoundReport {
    /// Player units that died during the enemy turn.
    #[must_use]
    pub fn fallen_players(&self) -> Vec<UnitId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::UnitDied {
                    unit,
                    faction: Faction::Player,
                    ..
                } => Some(*unit),
                _ => None,
            })
            .collect()
    }
}

/// Reasons a player request is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TurnError {
    /// The request violates the round rules.
    #[error(transparent)]
    IllegalAction(#[from] ActionError),
    /// The named unit is no longer alive.
    #[error("unit {unit} is no longer active")]
    StaleReference {
        /// Unit that was named.
        unit: UnitId,
    },
    /// No enemy is in range to attack.
    #[error("no enemy within reach of unit {unit}")]
    MissingTarget {
        /// Unit that wanted to attack.
        unit: UnitId,
    },
    /// The tile is not one of the highlighted destinations.
    #[error("tile {cell} is not a highlighted destination")]
    NotSelectableTile {
        /// Requested tile.
        cell: GridCoord,
    },
    /// The unit is not one of the highlighted targets, or cannot be seen.
    #[error("unit {unit} cannot be selected")]
    NotSelectableUnit {
        /// Requested unit.
        unit: UnitId,
    },
    /// The request does not fit the current phase.
    #[error("request not available while {phase:?}")]
    WrongPhase {
        /// Phase the controller was in.
        phase: TurnPhase,
    },
    /// The world refused the resulting command.
    #[error("command rejected: {0}")]
    Rejected(RejectionReason),
}

/// State machine driving a Fog Tactics scene.
#[derive(Debug)]
pub struct TurnController {
    world: World,
    phase: TurnPhase,
    rules: TurnRules,
    combat: CombatResolver,
    enemy_ai: EnemyAi,
    highlights: HighlightSet,
    stats_timers: StatsDisplayTimers,
    hovered: Option<UnitId>,
    inspected: Option<UnitId>,
    events: Vec<Event>,
}

impl TurnController {
    /// Takes ownership of a prepared world.
    #[must_use]
    pub fn new(world: World, rules: TurnRules, combat: CombatResolver) -> Self {
        Self {
            world,
            phase: TurnPhase::AwaitingAction,
            rules,
            combat,
            enemy_ai: EnemyAi::new(combat),
            highlights: HighlightSet::default(),
            stats_timers: StatsDisplayTimers::default(),
            hovered: None,
            inspected: None,
            events: Vec::new(),
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current phase of the turn.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Highlights offered by the open submenu.
    #[must_use]
    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    /// Takes every event produced since the previous call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Reports whether pointer input should reach the unit.
    ///
    /// Player units stop responding once they acted; enemies respond while
    /// they are visible.
    #[must_use]
    pub fn is_interactive(&self, unit: UnitId) -> bool {
        query::unit(&self.world, unit).map_or(false, |snapshot| match snapshot.faction {
            Faction::Player => !snapshot.flags.has_acted,
            Faction::Enemy => snapshot.visible,
        })
    }

    /// Opens the action menu for a player unit.
    pub fn select_unit(&mut self, unit: UnitId) -> Result<(), TurnError> {
        match self.phase {
            TurnPhase::AwaitingAction | TurnPhase::ActionMenuOpen { .. } => {}
            phase => return Err(TurnError::WrongPhase { phase }),
        }

        let snapshot = self.living(unit)?;
        if snapshot.faction != Faction::Player {
            return Err(ActionError::NotPlayerUnit { unit }.into());
        }
        if snapshot.flags.has_acted {
            return Err(ActionError::AlreadyActed { unit }.into());
        }

        self.highlights.clear();
        self.enter(TurnPhase::ActionMenuOpen { unit });
        Ok(())
    }

    /// Menu for the unit whose action menu is open.
    #[must_use]
    pub fn action_menu(&self) -> Option<ActionMenu> {
        let TurnPhase::ActionMenuOpen { unit } = self.phase else {
            return None;
        };
        let snapshot = query::unit(&self.world, unit)?;
        let entries = ActionKind::ALL
            .into_iter()
            .map(|action| MenuEntry {
                action,
                enabled: action != ActionKind::Move || !snapshot.flags.has_moved,
            })
            .collect();
        Some(ActionMenu {
            unit,
            anchor: snapshot.cell,
            entries,
        })
    }

    /// Chooses an entry from the open action menu.
    pub fn choose(&mut self, action: ActionKind) -> Result<(), TurnError> {
        let TurnPhase::ActionMenuOpen { unit } = self.phase else {
            return Err(TurnError::WrongPhase { phase: self.phase });
        };
        let snapshot = self.living(unit)?;
        if snapshot.flags.has_acted {
            return Err(ActionError::AlreadyActed { unit }.into());
        }

        match action {
            ActionKind::Move => {
                if snapshot.flags.has_moved {
                    return Err(ActionError::AlreadyMoved { unit }.into());
                }
                let tiles = query::reachable_tiles(&self.world, snapshot.cell, self.rules.move_range);
                self.highlights
                    .replace_with(tiles.into_iter().map(Highlight::Tile));
                self.enter(TurnPhase::SelectingMoveTarget { unit });
            }
            ActionKind::Attack => {
                let targets: Vec<UnitId> = query::units_within(
                    &self.world,
                    snapshot.cell,
                    self.rules.attack_range,
                    Faction::Enemy,
                )
                .into_iter()
                .filter(|enemy| {
                    query::unit(&self.world, *enemy).map_or(false, |enemy| enemy.visible)
                })
                .collect();
                if targets.is_empty() {
                    return Err(TurnError::MissingTarget { unit });
                }
                self.highlights
                    .replace_with(targets.into_iter().map(Highlight::EnemyMarker));
                self.enter(TurnPhase::SelectingAttackTarget { unit });
            }
            ActionKind::Special | ActionKind::Hold => {
                let events = self.execute(vec![Command::EndAction { unit, action }]);
                self.check(&events)?;
                if action == ActionKind::Special {
                    info!(unit = %unit, "special action triggered");
                }
                self.highlights.clear();
                self.enter(TurnPhase::AwaitingAction);
            }
        }
        Ok(())
    }

    /// Picks a highlighted destination while selecting a move target.
    pub fn select_tile(&mut self, cell: GridCoord) -> Result<(), TurnError> {
        let TurnPhase::SelectingMoveTarget { unit } = self.phase else {
            return Err(TurnError::WrongPhase { phase: self.phase });
        };
        let _ = self.living(unit)?;
        if !self.highlights.contains_tile(cell) {
            return Err(TurnError::NotSelectableTile { cell });
        }

        let events = self.execute(vec![Command::MoveUnit { unit, to: cell }]);
        self.check(&events)?;

        self.highlights.clear();
        self.enter(TurnPhase::AwaitingAction);
        Ok(())
    }

    /// Picks a highlighted enemy while selecting an attack target.
    pub fn select_enemy(&mut self, enemy: UnitId) -> Result<AttackOutcome, TurnError> {
        let TurnPhase::SelectingAttackTarget { unit } = self.phase else {
            return Err(TurnError::WrongPhase { phase: self.phase });
        };
        let attacker = self.living(unit)?;
        if !self.highlights.contains_enemy(enemy) {
            return Err(TurnError::NotSelectableUnit { unit: enemy });
        }
        let target = query::unit(&self.world, enemy)
            .ok_or(TurnError::StaleReference { unit: enemy })?;

        let mut commands = Vec::new();
        self.combat.attack(&attacker, &target, &mut commands);
        let events = self.execute(commands);
        self.check(&events)?;
        let outcome = CombatResolver::outcome(&events, enemy)
            .ok_or(TurnError::MissingTarget { unit })?;

        if !outcome.died {
            self.stats_timers
                .schedule(enemy, self.rules.stats_display_delay);
        }

        self.highlights.clear();
        self.enter(TurnPhase::AwaitingAction);
        Ok(outcome)
    }

    /// Closes any open menu or submenu without consuming the action.
    pub fn cancel(&mut self) {
        if self.phase == TurnPhase::RoundEnding {
            return;
        }
        self.highlights.clear();
        self.enter(TurnPhase::AwaitingAction);
    }

    /// Ends the player's round and lets every living enemy act.
    pub fn next_round(&mut self) -> RoundReport {
        self.highlights.clear();
        self.enter(TurnPhase::RoundEnding);

        let mut events = self.execute(vec![Command::AdvanceRound]);
        let round = query::round(&self.world);
        info!(round, "round started");

        let mut decisions = Vec::new();
        for enemy in query::living_units(&self.world, Faction::Enemy) {
            if query::unit(&self.world, enemy).is_none() {
                continue;
            }

            let units = query::unit_view(&self.world);
            let mut commands = Vec::new();
            let mut decision = self.enemy_ai.plan(
                enemy,
                &units,
                query::occupancy_view(&self.world),
                &mut commands,
            );
            debug!(?decision, "enemy planned");
            let applied = self.execute(commands);
            decision.attacked = decision.attacked
                && decision
                    .target
                    .map_or(false, |target| CombatResolver::outcome(&applied, target).is_some());
            events.extend(applied);
            decisions.push(decision);
        }

        self.enter(TurnPhase::AwaitingAction);
        RoundReport {
            round,
            decisions,
            events,
        }
    }

    /// Marks `unit` as hovered. Hidden units are ignored.
    pub fn hover(&mut self, unit: UnitId) {
        if query::unit(&self.world, unit).map_or(false, |snapshot| snapshot.visible) {
            self.hovered = Some(unit);
        }
    }

    /// Clears the hover mark if it belongs to `unit`.
    pub fn unhover(&mut self, unit: UnitId) {
        if self.hovered == Some(unit) {
            self.hovered = None;
        }
    }

    /// Unit currently hovered.
    #[must_use]
    pub fn hovered(&self) -> Option<UnitId> {
        self.hovered
    }

    /// Opens the inspector for a visible unit, or closes it when open.
    ///
    /// Returns the unit being inspected afterwards.
    pub fn toggle_inspector(&mut self, unit: UnitId) -> Result<Option<UnitId>, TurnError> {
        if self.inspected.take().is_some() {
            return Ok(None);
        }

        let snapshot = self.living(unit)?;
        if !snapshot.visible {
            return Err(TurnError::NotSelectableUnit { unit });
        }
        self.inspected = Some(unit);
        Ok(self.inspected)
    }

    /// Unit shown in the inspector.
    #[must_use]
    pub fn inspected(&self) -> Option<UnitId> {
        self.inspected
    }

    /// Reports whether the stats panel of `unit` should be drawn.
    #[must_use]
    pub fn stats_visible(&self, unit: UnitId) -> bool {
        self.hovered == Some(unit) || self.stats_timers.is_pending(unit)
    }

    /// Advances deferred tasks. Returns the units whose stats panel hid.
    pub fn tick(&mut self, dt: Duration) -> Vec<UnitId> {
        let world = &self.world;
        self.stats_timers
            .advance(dt, |unit| query::unit(world, unit).is_some())
    }

    fn living(&mut self, unit: UnitId) -> Result<UnitSnapshot, TurnError> {
        query::unit(&self.world, unit).ok_or_else(|| {
            if self.phase_unit() == Some(unit) {
                self.highlights.clear();
                self.phase = TurnPhase::AwaitingAction;
            }
            TurnError::StaleReference { unit }
        })
    }

    fn phase_unit(&self) -> Option<UnitId> {
        match self.phase {
            TurnPhase::ActionMenuOpen { unit }
            | TurnPhase::SelectingMoveTarget { unit }
            | TurnPhase::SelectingAttackTarget { unit } => Some(unit),
            TurnPhase::AwaitingAction | TurnPhase::RoundEnding => None,
        }
    }

    fn enter(&mut self, phase: TurnPhase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "turn phase changed");
            self.phase = phase;
        }
    }

    fn check(&self, events: &[Event]) -> Result<(), TurnError> {
        match events.iter().find_map(|event| match event {
            Event::CommandRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            Some(RejectionReason::Action(ActionError::UnknownUnit { unit })) => {
                Err(TurnError::StaleReference { unit })
            }
            Some(reason) => Err(TurnError::Rejected(reason)),
            None => Ok(()),
        }
    }

    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut batch = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut batch);
        }

        for event in &batch {
            match event {
                Event::UnitDied { unit, faction, cell } => {
                    info!(unit = %unit, ?faction, cell = %cell, "unit died");
                    self.forget(*unit);
                }
                Event::CommandRejected { unit, reason } => {
                    warn!(?unit, %reason, "command rejected");
                }
                _ => {}
            }
        }

        self.events.extend(batch.iter().cloned());
        batch
    }

    fn forget(&mut self, unit: UnitId) {
        let _ = self.highlights.remove_unit(unit);
        let _ = self.stats_timers.cancel(unit);
        if self.hovered == Some(unit) {
            self.hovered = None;
        }
        if self.inspected == Some(unit) {
            self.inspected = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TurnController, TurnError, TurnPhase, TurnRules};
    use fog_tactics_core::{ActionKind, Attributes, Command, Event, Faction, GridCoord, UnitId};
    use fog_tactics_system_combat::CombatResolver;
    use fog_tactics_world::{self as world, World};

    fn controller_with(units: &[(Faction, GridCoord)]) -> TurnController {
        let mut world = World::new();
        let mut events = Vec::new();
        for &(faction, cell) in units {
            world::apply(
                &mut world,
                Command::SpawnUnit {
                    faction,
                    cell,
                    attributes: Attributes::uniform(100),
                },
                &mut events,
            );
        }
        TurnController::new(world, TurnRules::default(), CombatResolver::default())
    }

    #[test]
    fn cancel_returns_to_idle_without_consuming_the_action() {
        let mut controller = controller_with(&[(Faction::Player, GridCoord::new(5, 5))]);
        let unit = UnitId::new(0);

        controller.select_unit(unit).expect("player selectable");
        controller.choose(ActionKind::Move).expect("move offered");
        assert!(!controller.highlights().is_empty());

        controller.cancel();

        assert_eq!(controller.phase(), TurnPhase::AwaitingAction);
        assert!(controller.highlights().is_empty());
        controller.select_unit(unit).expect("still selectable");
    }

    #[test]
    fn select_unit_is_refused_while_a_submenu_is_open() {
        let mut controller = controller_with(&[
            (Faction::Player, GridCoord::new(5, 5)),
            (Faction::Player, GridCoord::new(9, 9)),
        ]);
        controller.select_unit(UnitId::new(0)).expect("selectable");
        controller.choose(ActionKind::Move).expect("move offered");

        assert_eq!(
            controller.select_unit(UnitId::new(1)),
            Err(TurnError::WrongPhase {
                phase: TurnPhase::SelectingMoveTarget {
                    unit: UnitId::new(0)
                }
            })
        );
    }

    #[test]
    fn stale_selection_is_reported() {
        let mut controller = controller_with(&[]);
        assert_eq!(
            controller.select_unit(UnitId::new(7)),
            Err(TurnError::StaleReference {
                unit: UnitId::new(7)
            })
        );
    }

    #[test]
    fn hold_consumes_the_action() {
        let mut controller = controller_with(&[(Faction::Player, GridCoord::new(5, 5))]);
        let unit = UnitId::new(0);
        controller.select_unit(unit).expect("selectable");
        controller.choose(ActionKind::Hold).expect("hold accepted");

        assert!(!controller.is_interactive(unit));
        assert!(controller.select_unit(unit).is_err());
        assert!(controller
            .drain_events()
            .contains(&Event::UnitActed {
                unit,
                action: ActionKind::Hold,
            }));
    }
}
