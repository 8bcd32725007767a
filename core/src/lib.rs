#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Fog Tactics engine.
//!
//! Adapters and the turn controller submit [`Command`] values describing
//! desired mutations, the world executes those commands via its `apply` entry
//! point, and then reports [`Event`] values describing what changed. Systems
//! read immutable views ([`UnitView`], [`OccupancyView`], [`FogView`]) and
//! respond exclusively with new command batches.

mod config;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ConfigError, GameConfig};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Fog Tactics.";

/// Upper bound of a unit's health pool.
pub const MAX_HEALTH: u32 = 100;

/// Upper bound of a unit's mana pool.
pub const MAX_MANA: u32 = 50;

/// Experience required to fill the experience bar.
pub const MAX_EXPERIENCE: u32 = 100;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the world's tile grid, discarding every unit.
    ConfigureGrid {
        /// Number of tile columns laid out in the grid.
        columns: u32,
        /// Number of tile rows laid out in the grid.
        rows: u32,
        /// Length of each square tile measured in world units.
        tile_length: f32,
    },
    /// Updates the ranges enforced by the world.
    ConfigureRules {
        /// Manhattan radius revealed around each player unit.
        fog_radius: u32,
        /// Maximum Manhattan distance a player unit may move per round.
        move_range: u32,
        /// Maximum Manhattan distance between an attacking player unit and its target.
        attack_range: u32,
    },
    /// Requests that a new unit enter the grid.
    SpawnUnit {
        /// Side the unit fights for.
        faction: Faction,
        /// Tile the unit should occupy.
        cell: GridCoord,
        /// Attribute record assigned to the unit.
        attributes: Attributes,
    },
    /// Relocates a player unit to a tile within its movement range.
    MoveUnit {
        /// Unit being moved.
        unit: UnitId,
        /// Destination tile.
        to: GridCoord,
    },
    /// Advances an enemy unit by a single tile.
    StepUnit {
        /// Unit attempting to step.
        unit: UnitId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Applies fixed damage from one unit to an opposing unit.
    Attack {
        /// Unit performing the attack.
        attacker: UnitId,
        /// Unit receiving the damage.
        target: UnitId,
        /// Amount of health removed from the target.
        damage: u32,
    },
    /// Spends a player unit's action on something that does not touch the grid.
    EndAction {
        /// Unit whose action is consumed.
        unit: UnitId,
        /// Action being recorded. Only [`ActionKind::Special`] and
        /// [`ActionKind::Hold`] are accepted.
        action: ActionKind,
    },
    /// Starts a new round, restoring every player unit's flags.
    AdvanceRound,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the tile grid was (re)configured.
    GridConfigured {
        /// Number of tile columns.
        columns: u32,
        /// Number of tile rows.
        rows: u32,
    },
    /// Confirms that a unit entered the grid.
    UnitSpawned {
        /// Identifier allocated to the unit.
        unit: UnitId,
        /// Side the unit fights for.
        faction: Faction,
        /// Tile the unit occupies.
        cell: GridCoord,
    },
    /// Confirms that a unit changed tiles.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Tile occupied before the move.
        from: GridCoord,
        /// Tile occupied after the move.
        to: GridCoord,
    },
    /// Reports damage applied to a unit.
    UnitDamaged {
        /// Unit that received the damage.
        unit: UnitId,
        /// Unit that dealt the damage.
        attacker: UnitId,
        /// Damage requested by the attacker.
        damage: u32,
        /// Health remaining after the hit, never below zero.
        health_after: u32,
    },
    /// Reports that a unit was removed after its health reached zero.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
        /// Side the unit fought for.
        faction: Faction,
        /// Tile released by the unit.
        cell: GridCoord,
    },
    /// Reports that a player unit spent its action.
    UnitActed {
        /// Unit that acted.
        unit: UnitId,
        /// Action that was recorded.
        action: ActionKind,
    },
    /// Reports that the fog field was rebuilt.
    FogRecomputed {
        /// Number of tiles visible after the recomputation.
        visible_tiles: u32,
    },
    /// Announces the start of a new round.
    RoundAdvanced {
        /// Number of the round that just began.
        round: u32,
    },
    /// Reports that a command was refused and left the world untouched.
    CommandRejected {
        /// Unit named by the command, if any.
        unit: Option<UnitId>,
        /// Reason the command was refused.
        reason: RejectionReason,
    },
}

/// Side a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Unit controlled through the action menu.
    Player,
    /// Unit controlled by the enemy AI.
    Enemy,
}

/// Actions offered to a player unit once per round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Relocate within the movement range.
    Move,
    /// Strike an adjacent enemy.
    Attack,
    /// Trigger the unit's special ability.
    Special,
    /// Forfeit the action for this round.
    Hold,
}

impl ActionKind {
    /// Every action in menu order.
    pub const ALL: [ActionKind; 4] = [Self::Move, Self::Attack, Self::Special, Self::Hold];

    /// Label shown in the action menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Attack => "Attack",
            Self::Special => "Special",
            Self::Hold => "Hold",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cardinal directions used when navigating the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row zero.
    North,
    /// Away from row zero.
    South,
    /// Towards column zero.
    West,
    /// Away from column zero.
    East,
}

impl Direction {
    /// Order in which neighbours are expanded by breadth-first searches.
    pub const EXPANSION_ORDER: [Direction; 4] = [Self::North, Self::South, Self::West, Self::East];
}

/// Location of a single tile on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the neighbouring coordinate in `direction` when it lies within
    /// a grid of the provided dimensions.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<GridCoord> {
        let (column, row) = match direction {
            Direction::North => (self.column, self.row.checked_sub(1)?),
            Direction::South => (self.column, self.row.checked_add(1)?),
            Direction::West => (self.column.checked_sub(1)?, self.row),
            Direction::East => (self.column.checked_add(1)?, self.row),
        };

        (column < columns && row < rows).then_some(GridCoord::new(column, row))
    }

    /// Direction leading to an orthogonally adjacent coordinate.
    #[must_use]
    pub fn direction_to(self, neighbour: GridCoord) -> Option<Direction> {
        if self.manhattan_distance(neighbour) != 1 {
            return None;
        }

        Some(if neighbour.row < self.row {
            Direction::North
        } else if neighbour.row > self.row {
            Direction::South
        } else if neighbour.column < self.column {
            Direction::West
        } else {
            Direction::East
        })
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Point in continuous world space measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldPoint {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component, growing downwards.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Describes the discrete tile layout of the battlefield.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_length: f32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile expressed in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the grid measured in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid measured in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Reports whether the coordinate lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.column < self.columns && cell.row < self.rows
    }

    /// Resolves a signed column/row pair into a coordinate on the grid.
    pub fn tile_at(&self, column: i64, row: i64) -> Result<GridCoord, GridError> {
        let out_of_bounds = GridError::OutOfBounds {
            column,
            row,
            columns: self.columns,
            rows: self.rows,
        };
        let column = u32::try_from(column).map_err(|_| out_of_bounds)?;
        let row = u32::try_from(row).map_err(|_| out_of_bounds)?;
        let cell = GridCoord::new(column, row);
        if self.contains(cell) {
            Ok(cell)
        } else {
            Err(out_of_bounds)
        }
    }

    /// Resolves the tile under a world-space point.
    pub fn world_to_grid(&self, point: WorldPoint) -> Result<GridCoord, GridError> {
        if !point.x.is_finite() || !point.y.is_finite() || self.tile_length <= 0.0 {
            return Err(GridError::OutsideWorld);
        }

        let column = (point.x / self.tile_length).floor() as i64;
        let row = (point.y / self.tile_length).floor() as i64;
        self.tile_at(column, row)
    }

    /// Centre of the tile expressed in world units.
    #[must_use]
    pub fn grid_to_world(&self, cell: GridCoord) -> WorldPoint {
        WorldPoint::new(
            (cell.column as f32 + 0.5) * self.tile_length,
            (cell.row as f32 + 0.5) * self.tile_length,
        )
    }

    /// Iterates over every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = GridCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| GridCoord::new(column, row)))
    }
}

/// Unique identifier assigned to a unit by the world.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an equippable item.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Named statistic carried by every unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Physical attack.
    Attack,
    /// Physical defense.
    Defense,
    /// Special attack.
    SpecialAttack,
    /// Speed.
    Speed,
    /// Experience yield.
    Experience,
    /// Vision.
    Vision,
    /// Luck.
    Luck,
    /// Movement.
    Movement,
}

impl Attribute {
    /// Every attribute in display order.
    pub const ALL: [Attribute; 8] = [
        Self::Attack,
        Self::Defense,
        Self::SpecialAttack,
        Self::Speed,
        Self::Experience,
        Self::Vision,
        Self::Luck,
        Self::Movement,
    ];

    /// Three letter label used by the attribute inspector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attack => "ATT",
            Self::Defense => "DEF",
            Self::SpecialAttack => "SPA",
            Self::Speed => "SPD",
            Self::Experience => "EXP",
            Self::Vision => "VIS",
            Self::Luck => "LUC",
            Self::Movement => "MOV",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive range an attribute value must fall within.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeRange {
    min: u32,
    max: u32,
}

impl AttributeRange {
    /// Creates a range, ordering the bounds if they arrive swapped.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Range admitting a single value.
    #[must_use]
    pub const fn exactly(value: u32) -> Self {
        Self::new(value, value)
    }

    /// Smallest admitted value.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Largest admitted value.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether the value lies within the range.
    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Per-attribute validation policy applied when constructing [`Attributes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeRanges {
    ranges: [AttributeRange; 8],
}

impl AttributeRanges {
    /// Applies the same range to every attribute.
    #[must_use]
    pub const fn uniform(range: AttributeRange) -> Self {
        Self { ranges: [range; 8] }
    }

    /// Policy for player units: every attribute is fixed at 100.
    #[must_use]
    pub const fn player() -> Self {
        Self::uniform(AttributeRange::exactly(100))
    }

    /// Policy for enemy units: 50..=150, except experience in 0..=100.
    #[must_use]
    pub fn enemy() -> Self {
        Self::uniform(AttributeRange::new(50, 150))
            .with(Attribute::Experience, AttributeRange::new(0, 100))
    }

    /// Replaces the range for a single attribute.
    #[must_use]
    pub fn with(mut self, attribute: Attribute, range: AttributeRange) -> Self {
        self.ranges[attribute as usize] = range;
        self
    }

    /// Range enforced for the attribute.
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> AttributeRange {
        self.ranges[attribute as usize]
    }
}

/// Fixed-field attribute record carried by every unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    attack: u32,
    defense: u32,
    special_attack: u32,
    speed: u32,
    experience: u32,
    vision: u32,
    luck: u32,
    movement: u32,
}

impl Attributes {
    /// Record with every attribute set to `value`.
    #[must_use]
    pub const fn uniform(value: u32) -> Self {
        Self {
            attack: value,
            defense: value,
            special_attack: value,
            speed: value,
            experience: value,
            vision: value,
            luck: value,
            movement: value,
        }
    }

    /// Builds a record from per-attribute values, validating each against
    /// `ranges`.
    pub fn try_from_fn<F>(ranges: &AttributeRanges, mut value_of: F) -> Result<Self, AttributeError>
    where
        F: FnMut(Attribute) -> u32,
    {
        let mut attributes = Self::uniform(0);
        for attribute in Attribute::ALL {
            let value = value_of(attribute);
            let range = ranges.get(attribute);
            if !range.contains(value) {
                return Err(AttributeError::OutOfRange {
                    attribute,
                    value,
                    min: range.min(),
                    max: range.max(),
                });
            }
            *attributes.slot_mut(attribute) = value;
        }
        Ok(attributes)
    }

    /// Value of a single attribute.
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Attack => self.attack,
            Attribute::Defense => self.defense,
            Attribute::SpecialAttack => self.special_attack,
            Attribute::Speed => self.speed,
            Attribute::Experience => self.experience,
            Attribute::Vision => self.vision,
            Attribute::Luck => self.luck,
            Attribute::Movement => self.movement,
        }
    }

    /// Iterates over every attribute and its value in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, u32)> + '_ {
        Attribute::ALL
            .into_iter()
            .map(move |attribute| (attribute, self.get(attribute)))
    }

    fn slot_mut(&mut self, attribute: Attribute) -> &mut u32 {
        match attribute {
            Attribute::Attack => &mut self.attack,
            Attribute::Defense => &mut self.defense,
            Attribute::SpecialAttack => &mut self.special_attack,
            Attribute::Speed => &mut self.speed,
            Attribute::Experience => &mut self.experience,
            Attribute::Vision => &mut self.vision,
            Attribute::Luck => &mut self.luck,
            Attribute::Movement => &mut self.movement,
        }
    }
}

/// Slot an item may be equipped into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Main hand weapon.
    PrimaryWeapon,
    /// Off hand weapon.
    SecondaryWeapon,
    /// Weapon used by special abilities.
    SpecialWeapon,
    /// Trinket.
    Ornament,
    /// Head armour.
    Helmet,
    /// Torso armour.
    Chestplate,
    /// Leg armour.
    Leggings,
    /// Foot armour.
    Boots,
}

impl EquipmentSlot {
    /// Every slot in display order.
    pub const ALL: [EquipmentSlot; 8] = [
        Self::PrimaryWeapon,
        Self::SecondaryWeapon,
        Self::SpecialWeapon,
        Self::Ornament,
        Self::Helmet,
        Self::Chestplate,
        Self::Leggings,
        Self::Boots,
    ];

    /// Label used by the attribute inspector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PrimaryWeapon => "Primary Weapon",
            Self::SecondaryWeapon => "Secondary Weapon",
            Self::SpecialWeapon => "Special Weapon",
            Self::Ornament => "Ornament",
            Self::Helmet => "Helmet",
            Self::Chestplate => "Chestplate",
            Self::Leggings => "Leggings",
            Self::Boots => "Boots",
        }
    }
}

/// Items equipped by a unit. Equipment carries no gameplay effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Equipment {
    slots: [Option<ItemId>; 8],
}

impl Equipment {
    /// Equipment with every slot empty.
    #[must_use]
    pub const fn empty() -> Self {
        Self { slots: [None; 8] }
    }

    /// Item occupying the slot, if any.
    #[must_use]
    pub const fn get(&self, slot: EquipmentSlot) -> Option<ItemId> {
        self.slots[slot as usize]
    }

    /// Places an item into the slot, returning the item it replaced.
    pub fn set(&mut self, slot: EquipmentSlot, item: Option<ItemId>) -> Option<ItemId> {
        std::mem::replace(&mut self.slots[slot as usize], item)
    }

    /// Reports whether no slot holds an item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterates over every slot and its content in display order.
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, Option<ItemId>)> + '_ {
        EquipmentSlot::ALL
            .into_iter()
            .map(move |slot| (slot, self.get(slot)))
    }
}

/// Health, mana, experience and level of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Vitals {
    /// Remaining health, `0..=MAX_HEALTH`.
    pub health: u32,
    /// Remaining mana, `0..=MAX_MANA`.
    pub mana: u32,
    /// Accumulated experience, `0..=MAX_EXPERIENCE`.
    pub experience: u32,
    /// Current level, starting at one.
    pub level: u32,
}

impl Vitals {
    /// Vitals of a freshly spawned unit.
    #[must_use]
    pub const fn fresh() -> Self {
        Self {
            health: MAX_HEALTH,
            mana: MAX_MANA,
            experience: 0,
            level: 1,
        }
    }

    /// Reports whether the unit is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Per-round bookkeeping for a player unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoundFlags {
    /// The unit moved this round.
    pub has_moved: bool,
    /// The unit spent its action this round.
    pub has_acted: bool,
}

/// Immutable representation of a single unit used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Side the unit fights for.
    pub faction: Faction,
    /// Tile currently occupied by the unit.
    pub cell: GridCoord,
    /// Health, mana, experience and level.
    pub vitals: Vitals,
    /// Attribute record.
    pub attributes: Attributes,
    /// Equipped items.
    pub equipment: Equipment,
    /// Round flags. Always clear for enemies.
    pub flags: RoundFlags,
    /// Whether the unit's tile is currently revealed by the fog.
    pub visible: bool,
}

/// Read-only snapshot describing all living units.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the snapshots belonging to `faction` in id order.
    pub fn of_faction(&self, faction: Faction) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.faction == faction)
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<UnitId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<UnitId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the unit occupying the provided tile, if any.
    #[must_use]
    pub fn occupant(&self, cell: GridCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the tile lies on the grid and holds no unit.
    #[must_use]
    pub fn is_free(&self, cell: GridCoord) -> bool {
        self.index(cell).map_or(false, |index| {
            self.cells.get(index).copied().unwrap_or(None).is_none()
        })
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: GridCoord) -> Option<usize> {
        grid_index(cell, self.columns, self.rows)
    }
}

/// Read-only view into the fog-of-war bitmap.
#[derive(Clone, Copy, Debug)]
pub struct FogView<'a> {
    visible: &'a [bool],
    columns: u32,
    rows: u32,
    radius: u32,
}

impl<'a> FogView<'a> {
    /// Captures a fog view backed by a row-major visibility slice.
    #[must_use]
    pub fn new(visible: &'a [bool], columns: u32, rows: u32, radius: u32) -> Self {
        Self {
            visible,
            columns,
            rows,
            radius,
        }
    }

    /// Reports whether the tile is revealed. Tiles off the grid are hidden.
    #[must_use]
    pub fn is_visible(&self, cell: GridCoord) -> bool {
        grid_index(cell, self.columns, self.rows)
            .and_then(|index| self.visible.get(index).copied())
            .unwrap_or(false)
    }

    /// Manhattan radius the field was computed with.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of revealed tiles.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|visible| **visible).count()
    }

    /// Iterates over the visibility of every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        self.visible.iter().copied()
    }

    /// Provides the dimensions of the underlying fog field.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Row-major index of `cell` inside a grid of the provided dimensions.
#[must_use]
pub fn grid_index(cell: GridCoord, columns: u32, rows: u32) -> Option<usize> {
    if cell.column() < columns && cell.row() < rows {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}

/// Coordinates that fall outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The tile lies outside `[0, columns) x [0, rows)`.
    #[error("tile ({column}, {row}) lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Requested column.
        column: i64,
        /// Requested row.
        row: i64,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// The world point could not be mapped onto any tile.
    #[error("world position does not map onto the grid")]
    OutsideWorld,
}

/// Reasons an action request is illegal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ActionError {
    /// The unit is not part of the active set.
    #[error("unit {unit} is no longer active")]
    UnknownUnit {
        /// Unit that was named.
        unit: UnitId,
    },
    /// The unit is not controlled by the player.
    #[error("unit {unit} is not a player unit")]
    NotPlayerUnit {
        /// Unit that was named.
        unit: UnitId,
    },
    /// The unit is not controlled by the enemy AI.
    #[error("unit {unit} is not an enemy unit")]
    NotEnemyUnit {
        /// Unit that was named.
        unit: UnitId,
    },
    /// The unit already moved this round.
    #[error("unit {unit} already moved this round")]
    AlreadyMoved {
        /// Unit that was named.
        unit: UnitId,
    },
    /// The unit already spent its action this round.
    #[error("unit {unit} already acted this round")]
    AlreadyActed {
        /// Unit that was named.
        unit: UnitId,
    },
    /// Attacker and target fight for the same side.
    #[error("unit {attacker} cannot attack its ally {target}")]
    SameFaction {
        /// Attacking unit.
        attacker: UnitId,
        /// Targeted unit.
        target: UnitId,
    },
    /// The destination or target lies beyond the permitted range.
    #[error("{to} is {distance} tiles from {from}, beyond the range of {range}")]
    OutOfRange {
        /// Origin tile.
        from: GridCoord,
        /// Requested tile.
        to: GridCoord,
        /// Manhattan distance between the tiles.
        distance: u32,
        /// Permitted range.
        range: u32,
    },
    /// Another unit already occupies the tile.
    #[error("tile {cell} is occupied by unit {occupant}")]
    Occupied {
        /// Requested tile.
        cell: GridCoord,
        /// Unit occupying the tile.
        occupant: UnitId,
    },
    /// The action cannot be recorded without a target.
    #[error("{action} needs a target")]
    NeedsTarget {
        /// Action that was requested.
        action: ActionKind,
    },
}

/// Reason attached to [`Event::CommandRejected`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum RejectionReason {
    /// The command named a tile outside the grid.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The command requested an illegal action.
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Attribute values that violate their validation policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The value lies outside the admitted range.
    #[error("{attribute} value {value} lies outside {min}..={max}")]
    OutOfRange {
        /// Offending attribute.
        attribute: Attribute,
        /// Offending value.
        value: u32,
        /// Smallest admitted value.
        min: u32,
        /// Largest admitted value.
        max: u32,
    },
}
