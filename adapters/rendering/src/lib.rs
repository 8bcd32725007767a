#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Fog Tactics adapters.

mod camera;

pub use camera::{Camera, MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_STEP};

use anyhow::Result as AnyResult;
use fog_tactics_core::{
    grid_index, ActionKind, Attribute, Attributes, Equipment, Faction, GridCoord, TileGrid,
    UnitId, Vitals, WorldPoint, MAX_EXPERIENCE, MAX_HEALTH, MAX_MANA,
};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Tint applied to a unit that already acted this round.
pub const ACTED_TINT: Color = Color::from_rgb_u8(0x77, 0x77, 0x77);

/// Sprite used to draw a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Player-controlled character.
    Character,
    /// Computer-controlled enemy.
    Enemy,
}

impl SpriteKey {
    /// Sprite drawn for members of `faction`.
    #[must_use]
    pub const fn for_faction(faction: Faction) -> Self {
        match faction {
            Faction::Player => Self::Character,
            Faction::Enemy => Self::Enemy,
        }
    }

    /// Asset name the sprite is loaded under.
    #[must_use]
    pub const fn asset_key(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Enemy => "enemy",
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position expressed in world units, if the cursor lies inside the grid.
    pub cursor_world_space: Option<Vec2>,
    /// Whether the primary button was pressed on this frame.
    pub primary_click: bool,
    /// Whether the secondary button was pressed on this frame.
    pub secondary_click: bool,
    /// Vertical wheel delta; positive values zoom out.
    pub wheel_delta: f32,
    /// Screen-space drag delta used to pan the camera.
    pub drag_delta: Vec2,
    /// Action menu entry chosen on this frame.
    pub menu_choice: Option<MenuChoice>,
    /// Whether the Next Round control was activated on this frame.
    pub next_round: bool,
    /// Whether the adapter requested that the current interaction be cancelled.
    pub cancel: bool,
}

/// Describes how the tile grid should be presented.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns laid out in the grid.
    pub columns: u32,
    /// Number of rows laid out in the grid.
    pub rows: u32,
    /// Side length of a single square tile in world units.
    pub tile_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::InvalidTileLength`] when `tile_length` is not
    /// a positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
            line_color,
        })
    }

    /// Creates a descriptor matching the world's tile grid.
    ///
    /// # Errors
    ///
    /// Propagates the validation performed by [`TileGridPresentation::new`].
    pub fn from_tile_grid(grid: &TileGrid, line_color: Color) -> Result<Self, RenderingError> {
        Self::new(grid.columns(), grid.rows(), grid.tile_length(), line_color)
    }

    fn grid(&self) -> TileGrid {
        TileGrid::new(self.columns, self.rows, self.tile_length)
    }

    /// Total width of the grid in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.grid().width()
    }

    /// Total height of the grid in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.grid().height()
    }

    /// Tile containing the world position, if it lies inside the grid.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> Option<GridCoord> {
        self.grid()
            .world_to_grid(WorldPoint::new(position.x, position.y))
            .ok()
    }

    /// World position of the tile's centre.
    #[must_use]
    pub fn tile_center(&self, cell: GridCoord) -> Vec2 {
        let center = self.grid().grid_to_world(cell);
        Vec2::new(center.x, center.y)
    }

    /// World position of the tile's top-left corner.
    #[must_use]
    pub fn tile_origin(&self, cell: GridCoord) -> Vec2 {
        self.tile_center(cell) - Vec2::splat(self.tile_length * 0.5)
    }
}

/// Stats panel contents shown next to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatsPanel {
    /// Current level.
    pub level: u32,
    /// Current health points.
    pub health: u32,
    /// Current mana points.
    pub mana: u32,
    /// Accumulated experience.
    pub experience: u32,
}

impl StatsPanel {
    /// Builds the panel from a unit's vitals.
    #[must_use]
    pub const fn from_vitals(vitals: &Vitals) -> Self {
        Self {
            level: vitals.level,
            health: vitals.health,
            mana: vitals.mana,
            experience: vitals.experience,
        }
    }

    /// Filled fraction of the health bar.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        fraction(self.health, MAX_HEALTH)
    }

    /// Filled fraction of the mana bar.
    #[must_use]
    pub fn mana_fraction(&self) -> f32 {
        fraction(self.mana, MAX_MANA)
    }

    /// Filled fraction of the experience bar.
    #[must_use]
    pub fn experience_fraction(&self) -> f32 {
        fraction(self.experience, MAX_EXPERIENCE)
    }
}

fn fraction(value: u32, max: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    (value as f32 / max as f32).clamp(0.0, 1.0)
}

/// Describes a unit placed on the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitPresentation {
    /// Identifier of the unit.
    pub id: UnitId,
    /// Faction of the unit.
    pub faction: Faction,
    /// Tile the unit occupies.
    pub cell: GridCoord,
    /// Sprite drawn for the unit.
    pub sprite: SpriteKey,
    /// Optional tint, used to grey out units that already acted.
    pub tint: Option<Color>,
    /// Whether the unit is drawn at all.
    pub visible: bool,
    /// Whether the unit reacts to hover and clicks.
    pub interactive: bool,
    /// Stats panel shown next to the unit, if any.
    pub stats: Option<StatsPanel>,
}

impl UnitPresentation {
    /// Creates a visible, interactive unit descriptor with its faction sprite.
    #[must_use]
    pub const fn new(id: UnitId, faction: Faction, cell: GridCoord) -> Self {
        Self {
            id,
            faction,
            cell,
            sprite: SpriteKey::for_faction(faction),
            tint: None,
            visible: true,
            interactive: true,
            stats: None,
        }
    }
}

/// Highlight drawn on top of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneHighlight {
    /// Tile offered as a destination.
    Tile(GridCoord),
    /// Enemy offered as a target.
    Enemy(UnitId),
}

/// Entry a player may pick in the action menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    /// One of the unit actions.
    Action(ActionKind),
    /// Closes the menu.
    Cancel,
}

impl MenuChoice {
    /// Caption shown on the menu button.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Action(action) => action.label(),
            Self::Cancel => "Cancel",
        }
    }
}

/// Single button of the action menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuOption {
    /// Choice reported when the button is pressed.
    pub choice: MenuChoice,
    /// Caption of the button.
    pub label: &'static str,
    /// Whether the button accepts presses.
    pub enabled: bool,
}

/// Action menu anchored next to a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionMenuPresentation {
    /// Unit the menu belongs to.
    pub unit: UnitId,
    /// Tile the menu is anchored to.
    pub anchor: GridCoord,
    /// Buttons in display order; `Cancel` comes last.
    pub options: Vec<MenuOption>,
}

impl ActionMenuPresentation {
    /// Builds a menu from `(action, enabled)` pairs, appending a cancel button.
    #[must_use]
    pub fn new<I>(unit: UnitId, anchor: GridCoord, entries: I) -> Self
    where
        I: IntoIterator<Item = (ActionKind, bool)>,
    {
        let mut options: Vec<MenuOption> = entries
            .into_iter()
            .map(|(action, enabled)| MenuOption {
                choice: MenuChoice::Action(action),
                label: action.label(),
                enabled,
            })
            .collect();
        options.push(MenuOption {
            choice: MenuChoice::Cancel,
            label: MenuChoice::Cancel.label(),
            enabled: true,
        });

        Self {
            unit,
            anchor,
            options,
        }
    }
}

/// Attribute and equipment listing for the inspected unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InspectorPresentation {
    /// Unit being inspected.
    pub unit: UnitId,
    /// Faction of the inspected unit.
    pub faction: Faction,
    /// Level of the inspected unit.
    pub level: u32,
    /// Attribute values.
    pub attributes: Attributes,
    /// Equipped items.
    pub equipment: Equipment,
}

impl InspectorPresentation {
    /// Text lines shown in the panel, attributes first and equipment after.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(Attribute::ALL.len() + 10);
        lines.push(format!("{} {} (level {})", faction_name(self.faction), self.unit, self.level));
        lines.extend(
            self.attributes
                .iter()
                .map(|(attribute, value)| format!("{attribute}: {value}")),
        );
        lines.push(String::from("Equipment"));
        lines.extend(self.equipment.iter().map(|(slot, item)| match item {
            Some(item) => format!("{}: item {}", slot.label(), item.get()),
            None => format!("{}: empty", slot.label()),
        }));
        lines
    }
}

fn faction_name(faction: Faction) -> &'static str {
    match faction {
        Faction::Player => "Character",
        Faction::Enemy => "Enemy",
    }
}

/// Object found under the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    /// An interactive, visible unit.
    Unit {
        /// Identifier of the unit.
        id: UnitId,
        /// Tile the unit occupies.
        cell: GridCoord,
    },
    /// A tile without an interactive unit on it.
    Tile(GridCoord),
}

impl HitTarget {
    /// Tile that was hit.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        match self {
            Self::Unit { cell, .. } | Self::Tile(cell) => *cell,
        }
    }
}

/// Complete description of the board for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid layout.
    pub tile_grid: TileGridPresentation,
    /// Row-major visibility flags; `true` marks tiles outside the fog.
    pub fog: Vec<bool>,
    /// Highlights drawn above the tiles.
    pub highlights: Vec<SceneHighlight>,
    /// Units placed on the board, sorted by identifier.
    pub units: Vec<UnitPresentation>,
    /// Open action menu, if any.
    pub action_menu: Option<ActionMenuPresentation>,
    /// Inspector panel contents, if open.
    pub inspector: Option<InspectorPresentation>,
    /// Round currently being played.
    pub round: u32,
    /// Viewport transform.
    pub camera: Camera,
}

impl Scene {
    /// Creates an empty scene with every tile fogged.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation) -> Self {
        let tiles = tile_grid.columns as usize * tile_grid.rows as usize;
        Self {
            tile_grid,
            fog: vec![false; tiles],
            highlights: Vec::new(),
            units: Vec::new(),
            action_menu: None,
            inspector: None,
            round: 1,
            camera: Camera::new(),
        }
    }

    /// Reports whether `cell` is currently hidden by fog.
    #[must_use]
    pub fn is_fogged(&self, cell: GridCoord) -> bool {
        grid_index(cell, self.tile_grid.columns, self.tile_grid.rows)
            .and_then(|index| self.fog.get(index))
            .map_or(true, |visible| !visible)
    }

    /// Unit descriptor with the provided identifier.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&UnitPresentation> {
        self.units.iter().find(|unit| unit.id == id)
    }

    /// Resolves what lies under a world position.
    ///
    /// Hidden and non-interactive units are transparent to the test.
    #[must_use]
    pub fn hit_test(&self, world: Vec2) -> Option<HitTarget> {
        let cell = self.tile_grid.tile_at(world)?;
        let unit = self
            .units
            .iter()
            .find(|unit| unit.cell == cell && unit.visible && unit.interactive);

        Some(match unit {
            Some(unit) => HitTarget::Unit { id: unit.id, cell },
            None => HitTarget::Tile(cell),
        })
    }
}

/// Top-level description of what the backend should draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title applied to the window.
    pub window_title: String,
    /// Color used to clear the frame before drawing.
    pub clear_color: Color,
    /// Scene drawn on the first frame.
    pub scene: Scene,
}

impl Presentation {
    /// Creates a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Fog Tactics scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and mutates the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive finite side length.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(
                    f,
                    "tile_length must be positive and finite (received {tile_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
