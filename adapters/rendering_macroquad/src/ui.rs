//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! Every use of `macroquad::ui` lives here so the rest of the adapter stays
//! agnostic of Macroquad's UI types.

use fog_tactics_rendering::{ActionMenuPresentation, MenuChoice};
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, widgets::Window, Ui},
};

/// Width of a single action menu button row.
pub(crate) const ACTION_MENU_WIDTH: f32 = 150.0;

const ACTION_MENU_ROW_HEIGHT: f32 = 30.0;

/// Outcome of drawing the UI widgets for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Whether the Next Round button was pressed.
    pub next_round: bool,
    /// Action menu entry pressed during this frame.
    pub menu_choice: Option<MenuChoice>,
}

/// Layout and data of the side panel for the current frame.
#[derive(Clone, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub origin: Vec2,
    /// Panel dimensions in screen space.
    pub size: Vec2,
    /// Background colour applied to the window skin.
    pub background: Color,
    /// Round currently being played.
    pub round: u32,
    /// Inspector text, if the inspector is open.
    pub inspector: Option<Vec<String>>,
    /// Open action menu and its screen anchor.
    pub action_menu: Option<(&'a ActionMenuPresentation, Vec2)>,
}

/// Draws the side panel and, when open, the floating action menu.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 3.0, 3.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .color_selected(Color::from_rgba(70, 70, 70, 255))
        .color_selected_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(0.0, 0.0, 6.0, 6.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut result = ControlPanelUiResult::default();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(None, &format!("Round {}", context.round));
        ui.label(None, "Left click: select  Right click: inspect");
        ui.label(None, "N: next round  Esc: cancel  Q: quit");
        result.next_round = ui.button(None, "Next Round");

        if let Some(lines) = &context.inspector {
            ui.separator();
            for line in lines {
                ui.label(None, line);
            }
        }
    });

    if let Some((menu, anchor)) = context.action_menu {
        result.menu_choice = draw_action_menu(ui, menu, anchor);
    }

    ui.pop_skin();

    result
}

fn draw_action_menu(ui: &mut Ui, menu: &ActionMenuPresentation, anchor: Vec2) -> Option<MenuChoice> {
    let size = Vec2::new(
        ACTION_MENU_WIDTH,
        ACTION_MENU_ROW_HEIGHT * menu.options.len() as f32 + 24.0,
    );
    let mut chosen = None;
    let _ = Window::new(
        hash!("action_menu", menu.unit.get(), menu.anchor.column(), menu.anchor.row()),
        anchor,
        size,
    )
    .titlebar(false)
    .movable(false)
    .ui(ui, |ui| {
        for option in &menu.options {
            if option.enabled {
                if ui.button(None, option.label) {
                    chosen = Some(option.choice);
                }
            } else {
                ui.label(None, &format!("{} (used)", option.label));
            }
        }
    });
    chosen
}
