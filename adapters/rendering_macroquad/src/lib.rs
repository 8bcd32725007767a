#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Fog Tactics.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the adapter depends on macroquad without its default `audio`
//! feature. Units are drawn as primitive shapes keyed by their sprite.

mod ui;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::Result;
use fog_tactics_rendering::{
    Color, FrameInput, MenuChoice, Presentation, RenderingBackend, Scene, SceneHighlight,
    SpriteKey, StatsPanel, UnitPresentation,
};
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::{
    color::BLACK,
    input::{
        is_key_down, is_key_pressed, is_mouse_button_down, is_mouse_button_pressed,
        mouse_position, mouse_wheel, KeyCode, MouseButton,
    },
};
use std::time::Duration;
use tracing::info;

/// Width of the side panel in screen pixels.
pub const CONTROL_PANEL_WIDTH: f32 = 240.0;

/// Wheel delta reported for one notch, matching browser line scrolling.
const WHEEL_NOTCH_DELTA: f32 = 100.0;

/// Keyboard panning speed in screen pixels per second.
const KEYBOARD_PAN_SPEED: f32 = 480.0;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    next_round_latched: bool,
    menu_choice_latched: Option<MenuChoice>,
}

impl ControlPanelInputState {
    /// Returns whether the UI requested the next round and clears the latch.
    pub fn take_next_round(&mut self) -> bool {
        let latched = self.next_round_latched;
        self.next_round_latched = false;
        latched
    }

    /// Records that the Next Round button was pressed this frame.
    pub fn register_next_round(&mut self) {
        self.next_round_latched = true;
    }

    /// Returns the latched action menu choice, clearing it so it fires once.
    pub fn take_menu_choice(&mut self) -> Option<MenuChoice> {
        self.menu_choice_latched.take()
    }

    /// Records the action menu entry pressed this frame.
    pub fn register_menu_choice(&mut self, choice: MenuChoice) {
        self.menu_choice_latched = Some(choice);
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` quits the game loop.
    quit_requested: bool,
    /// `Escape` cancels the current interaction.
    cancel: bool,
    /// `N` ends the player phase.
    next_round: bool,
    /// Screen-space pan requested through the arrow keys, per second.
    pan_direction: Vec2,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let mut pan_direction = Vec2::ZERO;
        if is_key_down(KeyCode::Left) {
            pan_direction.x += 1.0;
        }
        if is_key_down(KeyCode::Right) {
            pan_direction.x -= 1.0;
        }
        if is_key_down(KeyCode::Up) {
            pan_direction.y += 1.0;
        }
        if is_key_down(KeyCode::Down) {
            pan_direction.y -= 1.0;
        }

        Self {
            quit_requested: is_key_pressed(KeyCode::Q),
            cancel: is_key_pressed(KeyCode::Escape),
            next_round: is_key_pressed(KeyCode::N),
            pan_direction,
        }
    }
}

/// Raw pointer and button observations gathered for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PointerObservations {
    cursor_screen: Vec2,
    primary_click: bool,
    secondary_click: bool,
    wheel_notches: f32,
    drag_delta: Vec2,
    over_ui: bool,
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a frame and returns the average rate once a second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1200,
            window_height: 900,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut control_panel_input = ControlPanelInputState::default();
            let mut last_mouse = current_mouse();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let dt_seconds = macroquad::time::get_frame_time().max(0.0);
                let frame_dt = Duration::from_secs_f32(dt_seconds);

                let mouse = current_mouse();
                let mut drag_delta = keyboard.pan_direction * KEYBOARD_PAN_SPEED * dt_seconds;
                if is_mouse_button_down(MouseButton::Middle) {
                    drag_delta += mouse - last_mouse;
                }
                last_mouse = mouse;

                let panel_left = (screen_width - CONTROL_PANEL_WIDTH).max(0.0);
                let over_ui = mouse.x >= panel_left
                    || macroquad::ui::root_ui()
                        .is_mouse_over(MacroquadVec2::new(mouse.x, mouse.y));
                let observations = PointerObservations {
                    cursor_screen: mouse,
                    primary_click: is_mouse_button_pressed(MouseButton::Left),
                    secondary_click: is_mouse_button_pressed(MouseButton::Right),
                    wheel_notches: mouse_wheel().1,
                    drag_delta,
                    over_ui,
                };

                let mut frame_input = gather_frame_input(&scene, observations);
                frame_input.menu_choice = control_panel_input.take_menu_choice();
                frame_input.next_round =
                    control_panel_input.take_next_round() || keyboard.next_round;
                frame_input.cancel = keyboard.cancel;

                update_scene(frame_dt, frame_input, &mut scene);

                draw_tiles(&scene);
                draw_highlights(&scene);
                draw_units(&scene);
                draw_fog(&scene);
                draw_stats_panels(&scene);

                let panel_background = to_macroquad_color(clear_color.lighten(0.15));
                macroquad::shapes::draw_rectangle(
                    panel_left,
                    0.0,
                    CONTROL_PANEL_WIDTH,
                    screen_height,
                    panel_background,
                );
                let action_menu = scene.action_menu.as_ref().map(|menu| {
                    let tile_length = scene.tile_grid.tile_length * scene.camera.zoom();
                    let anchor = scene
                        .camera
                        .world_to_screen(scene.tile_grid.tile_origin(menu.anchor))
                        + Vec2::new(tile_length, 0.0);
                    (menu, MacroquadVec2::new(anchor.x, anchor.y))
                });
                let context = ControlPanelUiContext {
                    origin: MacroquadVec2::new(panel_left, 0.0),
                    size: MacroquadVec2::new(CONTROL_PANEL_WIDTH, screen_height),
                    background: panel_background,
                    round: scene.round,
                    inspector: scene.inspector.map(|inspector| inspector.lines()),
                    action_menu,
                };
                let ControlPanelUiResult {
                    next_round,
                    menu_choice,
                } = draw_control_panel_ui(&mut macroquad::ui::root_ui(), context);
                if next_round {
                    control_panel_input.register_next_round();
                }
                if let Some(choice) = menu_choice {
                    control_panel_input.register_menu_choice(choice);
                }

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        info!(fps = per_second, "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn current_mouse() -> Vec2 {
    let (x, y) = mouse_position();
    Vec2::new(x, y)
}

fn gather_frame_input(scene: &Scene, observations: PointerObservations) -> FrameInput {
    let mut input = FrameInput {
        wheel_delta: -observations.wheel_notches * WHEEL_NOTCH_DELTA,
        drag_delta: observations.drag_delta,
        ..FrameInput::default()
    };

    if observations.over_ui {
        return input;
    }

    let world = scene.camera.screen_to_world(observations.cursor_screen);
    if scene.tile_grid.tile_at(world).is_none() {
        return input;
    }

    input.cursor_world_space = Some(world);
    input.primary_click = observations.primary_click;
    input.secondary_click = observations.secondary_click;
    input
}

fn screen_rect(scene: &Scene, origin: Vec2) -> (Vec2, f32) {
    let top_left = scene.camera.world_to_screen(origin);
    (top_left, scene.tile_grid.tile_length * scene.camera.zoom())
}

fn draw_tiles(scene: &Scene) {
    let grid = scene.tile_grid;
    let ground = to_macroquad_color(Color::from_rgb_u8(0x3a, 0x5a, 0x40));
    let (origin, _) = screen_rect(scene, Vec2::ZERO);
    let (far_corner, _) = screen_rect(scene, Vec2::new(grid.width(), grid.height()));
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        far_corner.x - origin.x,
        far_corner.y - origin.y,
        ground,
    );

    let line_color = to_macroquad_color(grid.line_color);
    for column in 0..=grid.columns {
        let (top, _) = screen_rect(scene, Vec2::new(column as f32 * grid.tile_length, 0.0));
        macroquad::shapes::draw_line(top.x, origin.y, top.x, far_corner.y, 1.0, line_color);
    }
    for row in 0..=grid.rows {
        let (left, _) = screen_rect(scene, Vec2::new(0.0, row as f32 * grid.tile_length));
        macroquad::shapes::draw_line(origin.x, left.y, far_corner.x, left.y, 1.0, line_color);
    }
}

fn draw_highlights(scene: &Scene) {
    let tile_fill = macroquad::color::Color::new(0.2, 0.8, 0.3, 0.35);
    let marker = macroquad::color::Color::new(0.95, 0.2, 0.2, 1.0);
    for highlight in &scene.highlights {
        match *highlight {
            SceneHighlight::Tile(cell) => {
                let (top_left, step) = screen_rect(scene, scene.tile_grid.tile_origin(cell));
                macroquad::shapes::draw_rectangle(top_left.x, top_left.y, step, step, tile_fill);
            }
            SceneHighlight::Enemy(id) => {
                let Some(unit) = scene.unit(id) else {
                    continue;
                };
                let (top_left, step) = screen_rect(scene, scene.tile_grid.tile_origin(unit.cell));
                macroquad::shapes::draw_rectangle_lines(
                    top_left.x, top_left.y, step, step, 3.0, marker,
                );
            }
        }
    }
}

fn unit_fill(unit: &UnitPresentation) -> macroquad::color::Color {
    let base = match unit.sprite {
        SpriteKey::Character => Color::from_rgb_u8(0x3b, 0x7d, 0xd8),
        SpriteKey::Enemy => Color::from_rgb_u8(0xc0, 0x39, 0x2b),
    };
    to_macroquad_color(unit.tint.unwrap_or(base))
}

fn draw_units(scene: &Scene) {
    for unit in scene.units.iter().filter(|unit| unit.visible) {
        let (top_left, step) = screen_rect(scene, scene.tile_grid.tile_origin(unit.cell));
        let center = top_left + Vec2::splat(step * 0.5);
        let fill = unit_fill(unit);
        match unit.sprite {
            SpriteKey::Character => {
                macroquad::shapes::draw_circle(center.x, center.y, step * 0.38, fill);
                macroquad::shapes::draw_circle_lines(center.x, center.y, step * 0.38, 2.0, BLACK);
            }
            SpriteKey::Enemy => {
                let inset = step * 0.15;
                let side = step - 2.0 * inset;
                macroquad::shapes::draw_rectangle(
                    top_left.x + inset,
                    top_left.y + inset,
                    side,
                    side,
                    fill,
                );
                macroquad::shapes::draw_rectangle_lines(
                    top_left.x + inset,
                    top_left.y + inset,
                    side,
                    side,
                    2.0,
                    BLACK,
                );
            }
        }
    }
}

fn draw_fog(scene: &Scene) {
    let shade = macroquad::color::Color::new(0.0, 0.0, 0.0, 0.55);
    let grid = scene.tile_grid;
    for (index, visible) in scene.fog.iter().enumerate() {
        if *visible || grid.columns == 0 {
            continue;
        }
        let column = index as u32 % grid.columns;
        let row = index as u32 / grid.columns;
        let origin = Vec2::new(column as f32, row as f32) * grid.tile_length;
        let (top_left, step) = screen_rect(scene, origin);
        macroquad::shapes::draw_rectangle(top_left.x, top_left.y, step, step, shade);
    }
}

fn draw_stats_panels(scene: &Scene) {
    for unit in scene.units.iter().filter(|unit| unit.visible) {
        let Some(stats) = unit.stats else {
            continue;
        };
        let (top_left, step) = screen_rect(scene, scene.tile_grid.tile_origin(unit.cell));
        draw_stats_panel(stats, top_left + Vec2::new(step + 4.0, 0.0));
    }
}

fn draw_stats_panel(stats: StatsPanel, origin: Vec2) {
    const BAR_WIDTH: f32 = 80.0;
    const BAR_HEIGHT: f32 = 8.0;

    macroquad::shapes::draw_rectangle(
        origin.x - 2.0,
        origin.y - 2.0,
        BAR_WIDTH + 4.0,
        BAR_HEIGHT * 3.0 + 26.0,
        macroquad::color::Color::new(0.0, 0.0, 0.0, 0.7),
    );
    macroquad::text::draw_text(
        &format!("Lv {}", stats.level),
        origin.x,
        origin.y + 12.0,
        16.0,
        macroquad::color::WHITE,
    );

    let bars = [
        (stats.health_fraction(), macroquad::color::Color::new(0.8, 0.1, 0.1, 1.0)),
        (stats.mana_fraction(), macroquad::color::Color::new(0.2, 0.4, 0.9, 1.0)),
        (stats.experience_fraction(), macroquad::color::Color::new(0.9, 0.8, 0.2, 1.0)),
    ];
    for (index, (fraction, color)) in bars.into_iter().enumerate() {
        let y = origin.y + 16.0 + index as f32 * (BAR_HEIGHT + 2.0);
        macroquad::shapes::draw_rectangle(origin.x, y, BAR_WIDTH, BAR_HEIGHT, BLACK);
        macroquad::shapes::draw_rectangle(origin.x, y, BAR_WIDTH * fraction, BAR_HEIGHT, color);
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
