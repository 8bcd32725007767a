#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Fog Tactics.
//!
//! The world owns the tile grid, every living unit, the dense occupancy grid
//! and the fog-of-war field. It is mutated exclusively through [`apply`]; each
//! rejected command leaves the state untouched and is reported as
//! [`Event::CommandRejected`].

mod fog;

use fog::FogField;
use fog_tactics_core::{
    grid_index, ActionError, ActionKind, Attributes, Command, Direction, Equipment, Event,
    Faction, GridCoord, GridError, RejectionReason, RoundFlags, TileGrid, UnitId, Vitals,
    WELCOME_BANNER,
};
use tracing::debug;

const DEFAULT_GRID_COLUMNS: u32 = 40;
const DEFAULT_GRID_ROWS: u32 = 40;
const DEFAULT_TILE_LENGTH: f32 = 64.0;
const DEFAULT_FOG_RADIUS: u32 = 10;
const DEFAULT_MOVE_RANGE: u32 = 3;
const DEFAULT_ATTACK_RANGE: u32 = 1;
/// Enemies only strike adjacent tiles, whatever the player attack range is.
const ENEMY_ATTACK_RANGE: u32 = 1;

/// Represents the authoritative Fog Tactics world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tile_grid: TileGrid,
    rules: Rules,
    units: Vec<Unit>,
    occupancy: OccupancyGrid,
    fog: FogField,
    fog_recomputations: u64,
    round: u32,
    next_unit_id: u32,
}

impl World {
    /// Creates an empty world on the default 40x40 grid.
    #[must_use]
    pub fn new() -> Self {
        let tile_grid = TileGrid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_TILE_LENGTH);
        let mut fog = FogField::default();
        fog.recompute(tile_grid.columns(), tile_grid.rows(), &[], DEFAULT_FOG_RADIUS);
        Self {
            banner: WELCOME_BANNER,
            occupancy: OccupancyGrid::new(tile_grid.columns(), tile_grid.rows()),
            tile_grid,
            rules: Rules::default(),
            units: Vec::new(),
            fog,
            fog_recomputations: 0,
            round: 1,
            next_unit_id: 0,
        }
    }

    fn unit_index(&self, unit: UnitId) -> Result<usize, ActionError> {
        self.units
            .iter()
            .position(|candidate| candidate.id == unit)
            .ok_or(ActionError::UnknownUnit { unit })
    }

    fn player_cells(&self) -> Vec<GridCoord> {
        self.units
            .iter()
            .filter(|unit| unit.faction == Faction::Player)
            .map(|unit| unit.cell)
            .collect()
    }

    fn refresh_fog(&mut self, out_events: &mut Vec<Event>) {
        let players = self.player_cells();
        self.fog.recompute(
            self.tile_grid.columns(),
            self.tile_grid.rows(),
            &players,
            self.rules.fog_radius,
        );
        self.fog_recomputations += 1;
        out_events.push(Event::FogRecomputed {
            visible_tiles: self.fog.visible_count(),
        });
    }

    fn ensure_vacant(&self, unit: Option<UnitId>, cell: GridCoord) -> Result<(), RejectionReason> {
        if !self.tile_grid.contains(cell) {
            return Err(out_of_bounds(&self.tile_grid, cell).into());
        }

        match self.occupancy.occupant(cell) {
            Some(occupant) if Some(occupant) != unit => {
                Err(ActionError::Occupied { cell, occupant }.into())
            }
            _ => Ok(()),
        }
    }

    fn relocate(&mut self, index: usize, to: GridCoord, out_events: &mut Vec<Event>) {
        let unit = &mut self.units[index];
        let from = unit.cell;
        self.occupancy.vacate(from);
        self.occupancy.occupy(unit.id, to);
        unit.cell = to;
        out_events.push(Event::UnitMoved {
            unit: unit.id,
            from,
            to,
        });
    }

    fn spawn(
        &mut self,
        faction: Faction,
        cell: GridCoord,
        attributes: Attributes,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        self.ensure_vacant(None, cell)?;

        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.wrapping_add(1);
        self.units.push(Unit {
            id,
            faction,
            cell,
            vitals: Vitals::fresh(),
            attributes,
            equipment: Equipment::empty(),
            flags: RoundFlags::default(),
        });
        self.occupancy.occupy(id, cell);
        out_events.push(Event::UnitSpawned {
            unit: id,
            faction,
            cell,
        });
        self.refresh_fog(out_events);
        Ok(())
    }

    fn move_unit(
        &mut self,
        unit: UnitId,
        to: GridCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let index = self.unit_index(unit)?;
        let mover = &self.units[index];
        if mover.faction != Faction::Player {
            return Err(ActionError::NotPlayerUnit { unit }.into());
        }
        if mover.flags.has_moved {
            return Err(ActionError::AlreadyMoved { unit }.into());
        }
        if mover.flags.has_acted {
            return Err(ActionError::AlreadyActed { unit }.into());
        }

        self.ensure_vacant(Some(unit), to)?;

        let from = mover.cell;
        let distance = from.manhattan_distance(to);
        if distance > self.rules.move_range {
            return Err(ActionError::OutOfRange {
                from,
                to,
                distance,
                range: self.rules.move_range,
            }
            .into());
        }

        self.relocate(index, to, out_events);
        let flags = &mut self.units[index].flags;
        flags.has_moved = true;
        flags.has_acted = true;
        out_events.push(Event::UnitActed {
            unit,
            action: ActionKind::Move,
        });
        self.refresh_fog(out_events);
        Ok(())
    }

    fn step_unit(
        &mut self,
        unit: UnitId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let index = self.unit_index(unit)?;
        let stepper = &self.units[index];
        if stepper.faction != Faction::Enemy {
            return Err(ActionError::NotEnemyUnit { unit }.into());
        }

        let from = stepper.cell;
        let to = from
            .step(direction, self.tile_grid.columns(), self.tile_grid.rows())
            .ok_or_else(|| {
                let (column, row) = signed_neighbour(from, direction);
                GridError::OutOfBounds {
                    column,
                    row,
                    columns: self.tile_grid.columns(),
                    rows: self.tile_grid.rows(),
                }
            })?;
        self.ensure_vacant(Some(unit), to)?;

        self.relocate(index, to, out_events);
        self.refresh_fog(out_events);
        Ok(())
    }

    fn attack(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        damage: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let attacker_index = self.unit_index(attacker)?;
        let target_index = self.unit_index(target)?;
        let source = &self.units[attacker_index];
        let victim = &self.units[target_index];

        if source.faction == victim.faction {
            return Err(ActionError::SameFaction { attacker, target }.into());
        }
        if source.faction == Faction::Player && source.flags.has_acted {
            return Err(ActionError::AlreadyActed { unit: attacker }.into());
        }

        let range = match source.faction {
            Faction::Player => self.rules.attack_range,
            Faction::Enemy => ENEMY_ATTACK_RANGE,
        };
        let distance = source.cell.manhattan_distance(victim.cell);
        if distance > range {
            return Err(ActionError::OutOfRange {
                from: source.cell,
                to: victim.cell,
                distance,
                range,
            }
            .into());
        }

        let attacker_faction = source.faction;
        let victim = &mut self.units[target_index];
        victim.vitals.health = victim.vitals.health.saturating_sub(damage);
        let health_after = victim.vitals.health;
        let survived = victim.vitals.is_alive();
        out_events.push(Event::UnitDamaged {
            unit: target,
            attacker,
            damage,
            health_after,
        });

        if attacker_faction == Faction::Player {
            self.units[attacker_index].flags.has_acted = true;
            out_events.push(Event::UnitActed {
                unit: attacker,
                action: ActionKind::Attack,
            });
        }

        if !survived {
            let fallen = self.units.remove(target_index);
            self.occupancy.vacate(fallen.cell);
            debug!(unit = %fallen.id, cell = %fallen.cell, "unit removed");
            out_events.push(Event::UnitDied {
                unit: fallen.id,
                faction: fallen.faction,
                cell: fallen.cell,
            });
            self.refresh_fog(out_events);
        }

        Ok(())
    }

    fn end_action(
        &mut self,
        unit: UnitId,
        action: ActionKind,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        let index = self.unit_index(unit)?;
        let actor = &mut self.units[index];
        if actor.faction != Faction::Player {
            return Err(ActionError::NotPlayerUnit { unit }.into());
        }
        if matches!(action, ActionKind::Move | ActionKind::Attack) {
            return Err(ActionError::NeedsTarget { action }.into());
        }
        if actor.flags.has_acted {
            return Err(ActionError::AlreadyActed { unit }.into());
        }

        actor.flags.has_acted = true;
        out_events.push(Event::UnitActed { unit, action });
        Ok(())
    }

    fn advance_round(&mut self, out_events: &mut Vec<Event>) {
        self.round = self.round.saturating_add(1);
        for unit in &mut self.units {
            unit.flags = RoundFlags::default();
        }
        out_events.push(Event::RoundAdvanced { round: self.round });
        self.refresh_fog(out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let subject = command_subject(&command);
    let result = match command {
        Command::ConfigureGrid {
            columns,
            rows,
            tile_length,
        } => {
            world.tile_grid = TileGrid::new(columns, rows, tile_length);
            world.units.clear();
            world.occupancy = OccupancyGrid::new(columns, rows);
            out_events.push(Event::GridConfigured { columns, rows });
            world.refresh_fog(out_events);
            Ok(())
        }
        Command::ConfigureRules {
            fog_radius,
            move_range,
            attack_range,
        } => {
            world.rules = Rules {
                fog_radius,
                move_range,
                attack_range,
            };
            world.refresh_fog(out_events);
            Ok(())
        }
        Command::SpawnUnit {
            faction,
            cell,
            attributes,
        } => world.spawn(faction, cell, attributes, out_events),
        Command::MoveUnit { unit, to } => world.move_unit(unit, to, out_events),
        Command::StepUnit { unit, direction } => world.step_unit(unit, direction, out_events),
        Command::Attack {
            attacker,
            target,
            damage,
        } => world.attack(attacker, target, damage, out_events),
        Command::EndAction { unit, action } => world.end_action(unit, action, out_events),
        Command::AdvanceRound => {
            world.advance_round(out_events);
            Ok(())
        }
    };

    if let Err(reason) = result {
        debug!(?subject, %reason, "command rejected");
        out_events.push(Event::CommandRejected {
            unit: subject,
            reason,
        });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use fog_tactics_core::{
        Faction, FogView, GridCoord, OccupancyView, TileGrid, UnitId, UnitSnapshot, UnitView,
    };

    use super::{Unit, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's tile grid configuration.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Number of the round currently being played, starting at one.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Manhattan radius revealed around each player unit.
    #[must_use]
    pub fn fog_radius(world: &World) -> u32 {
        world.rules.fog_radius
    }

    /// Number of times the fog field has been rebuilt.
    #[must_use]
    pub fn fog_recomputations(world: &World) -> u64 {
        world.fog_recomputations
    }

    /// Captures a read-only view of every living unit.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(
            world
                .units
                .iter()
                .map(|unit| snapshot(world, unit))
                .collect(),
        )
    }

    /// Captures a single living unit.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world
            .units
            .iter()
            .find(|candidate| candidate.id == unit)
            .map(|found| snapshot(world, found))
    }

    /// Identifiers of every living unit of a faction in id order.
    #[must_use]
    pub fn living_units(world: &World, faction: Faction) -> Vec<UnitId> {
        let mut units: Vec<UnitId> = world
            .units
            .iter()
            .filter(|unit| unit.faction == faction)
            .map(|unit| unit.id)
            .collect();
        units.sort_unstable();
        units
    }

    /// Captures a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        let (columns, rows) = world.occupancy.dimensions();
        OccupancyView::new(world.occupancy.cells(), columns, rows)
    }

    /// Captures a read-only view of the fog field.
    #[must_use]
    pub fn fog_view(world: &World) -> FogView<'_> {
        FogView::new(
            world.fog.cells(),
            world.tile_grid.columns(),
            world.tile_grid.rows(),
            world.fog.radius(),
        )
    }

    /// Reports whether a unit occupies the tile.
    #[must_use]
    pub fn is_occupied(world: &World, cell: GridCoord) -> bool {
        world.occupancy.occupant(cell).is_some()
    }

    /// Every in-bounds tile within `range` of `origin`, in row-major order.
    #[must_use]
    pub fn reachable_tiles(world: &World, origin: GridCoord, range: u32) -> Vec<GridCoord> {
        world
            .tile_grid
            .tiles()
            .filter(|tile| origin.manhattan_distance(*tile) <= range)
            .collect()
    }

    /// Living units of a faction within `range` of `origin`, in id order.
    #[must_use]
    pub fn units_within(
        world: &World,
        origin: GridCoord,
        range: u32,
        faction: Faction,
    ) -> Vec<UnitId> {
        let mut units: Vec<UnitId> = world
            .units
            .iter()
            .filter(|unit| unit.faction == faction && origin.manhattan_distance(unit.cell) <= range)
            .map(|unit| unit.id)
            .collect();
        units.sort_unstable();
        units
    }

    fn snapshot(world: &World, unit: &Unit) -> UnitSnapshot {
        UnitSnapshot {
            id: unit.id,
            faction: unit.faction,
            cell: unit.cell,
            vitals: unit.vitals,
            attributes: unit.attributes,
            equipment: unit.equipment,
            flags: unit.flags,
            visible: world.fog.is_visible(unit.cell),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rules {
    fog_radius: u32,
    move_range: u32,
    attack_range: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            fog_radius: DEFAULT_FOG_RADIUS,
            move_range: DEFAULT_MOVE_RANGE,
            attack_range: DEFAULT_ATTACK_RANGE,
        }
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    faction: Faction,
    cell: GridCoord,
    vitals: Vitals,
    attributes: Attributes,
    equipment: Equipment,
    flags: RoundFlags,
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<UnitId>>,
}

impl OccupancyGrid {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    fn occupant(&self, cell: GridCoord) -> Option<UnitId> {
        grid_index(cell, self.columns, self.rows)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, unit: UnitId, cell: GridCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            *slot = Some(unit);
        }
    }

    fn vacate(&mut self, cell: GridCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            *slot = None;
        }
    }

    fn slot_mut(&mut self, cell: GridCoord) -> Option<&mut Option<UnitId>> {
        let index = grid_index(cell, self.columns, self.rows)?;
        self.cells.get_mut(index)
    }

    fn cells(&self) -> &[Option<UnitId>] {
        &self.cells
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

fn command_subject(command: &Command) -> Option<UnitId> {
    match command {
        Command::MoveUnit { unit, .. }
        | Command::StepUnit { unit, .. }
        | Command::EndAction { unit, .. } => Some(*unit),
        Command::Attack { attacker, .. } => Some(*attacker),
        Command::ConfigureGrid { .. }
        | Command::ConfigureRules { .. }
        | Command::SpawnUnit { .. }
        | Command::AdvanceRound => None,
    }
}

fn out_of_bounds(tile_grid: &TileGrid, cell: GridCoord) -> GridError {
    GridError::OutOfBounds {
        column: i64::from(cell.column()),
        row: i64::from(cell.row()),
        columns: tile_grid.columns(),
        rows: tile_grid.rows(),
    }
}

fn signed_neighbour(cell: GridCoord, direction: Direction) -> (i64, i64) {
    let column = i64::from(cell.column());
    let row = i64::from(cell.row());
    match direction {
        Direction::North => (column, row - 1),
        Direction::South => (column, row + 1),
        Direction::West => (column - 1, row),
        Direction::East => (column + 1, row),
    }
}
