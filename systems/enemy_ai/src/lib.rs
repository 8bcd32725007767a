#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy decision making: chase the nearest player and strike when adjacent.
//!
//! Each enemy picks the living player with the smallest Manhattan distance
//! (ties go to the lower id), walks one tile along the shortest path towards
//! it and attacks if that leaves it adjacent. Every other unit blocks the
//! path, and the enemy never steps onto the target's own tile.

use fog_tactics_core::{Command, Faction, GridCoord, OccupancyView, UnitId, UnitSnapshot, UnitView};
use fog_tactics_system_combat::CombatResolver;
use fog_tactics_system_pathfinding::Pathfinder;

/// Plans enemy turns against immutable views.
#[derive(Debug, Default)]
pub struct EnemyAi {
    pathfinder: Pathfinder,
    combat: CombatResolver,
}

impl EnemyAi {
    /// Creates the system using the provided combat rules.
    #[must_use]
    pub fn new(combat: CombatResolver) -> Self {
        Self {
            pathfinder: Pathfinder::new(),
            combat,
        }
    }

    /// Emits the commands for a single enemy's turn.
    ///
    /// Unknown or non-enemy units and enemies without a living target yield
    /// an idle decision and no commands.
    pub fn plan(
        &mut self,
        enemy: UnitId,
        units: &UnitView,
        occupancy: OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) -> EnemyDecision {
        let idle = EnemyDecision {
            enemy,
            target: None,
            step: None,
            attacked: false,
        };

        let Some(actor) = units.get(enemy).filter(|unit| unit.faction == Faction::Enemy) else {
            return idle;
        };
        let Some(target) = nearest_target(actor.cell, units) else {
            return idle;
        };

        let (columns, rows) = occupancy.dimensions();
        let mut position = actor.cell;
        let mut step = None;

        let path = self
            .pathfinder
            .shortest_path(actor.cell, target.cell, columns, rows, |cell| {
                !occupancy.is_free(cell)
            });
        if let Some(next) = path.and_then(|path| path.next_hop()) {
            if next != target.cell {
                if let Some(direction) = actor.cell.direction_to(next) {
                    out.push(Command::StepUnit {
                        unit: enemy,
                        direction,
                    });
                    position = next;
                    step = Some(next);
                }
            }
        }

        let attacked = position.manhattan_distance(target.cell) == 1;
        if attacked {
            self.combat.attack(actor, target, out);
        }

        EnemyDecision {
            enemy,
            target: Some(target.id),
            step,
            attacked,
        }
    }
}

/// Summary of what an enemy decided to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyDecision {
    /// Enemy that was planned.
    pub enemy: UnitId,
    /// Player chosen as the target, if any remained.
    pub target: Option<UnitId>,
    /// Tile the enemy stepped onto.
    pub step: Option<GridCoord>,
    /// Whether an attack was queued. The turn controller clears it when the
    /// world refuses the attack.
    pub attacked: bool,
}

/// Living player closest to `origin`; ties resolve to the lowest id.
#[must_use]
pub fn nearest_target(origin: GridCoord, units: &UnitView) -> Option<&UnitSnapshot> {
    units
        .of_faction(Faction::Player)
        .min_by_key(|unit| (origin.manhattan_distance(unit.cell), unit.id))
}
