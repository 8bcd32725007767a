//! Pan and zoom state shared by rendering backends.

use glam::Vec2;

/// Smallest permitted zoom factor.
pub const MIN_ZOOM: f32 = 0.5;

/// Largest permitted zoom factor.
pub const MAX_ZOOM: f32 = 2.0;

/// Zoom change applied per unit of wheel delta.
pub const WHEEL_ZOOM_STEP: f32 = 0.001;

/// Viewport transform mapping world units onto the screen.
///
/// `scroll` is the world position shown at the top-left corner of the
/// screen; `zoom` scales world units into pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    scroll: Vec2,
    zoom: f32,
}

impl Camera {
    /// Camera at the origin with unit zoom.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scroll: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// World position shown at the top-left corner of the screen.
    #[must_use]
    pub const fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Current zoom factor.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Drags the view by a screen-space delta; content follows the pointer.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.scroll -= screen_delta / self.zoom;
    }

    /// Applies a wheel delta, where positive values zoom out.
    pub fn apply_wheel(&mut self, delta_y: f32) {
        self.set_zoom(self.zoom - delta_y * WHEEL_ZOOM_STEP);
    }

    /// Sets the zoom factor, clamped to `MIN_ZOOM..=MAX_ZOOM`.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Scrolls so that `world` appears at the centre of a viewport.
    pub fn center_on(&mut self, world: Vec2, viewport: Vec2) {
        self.scroll = world - viewport / (2.0 * self.zoom);
    }

    /// Converts a screen position into world units.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.zoom + self.scroll
    }

    /// Converts a world position into screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.scroll) * self.zoom
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, MAX_ZOOM, MIN_ZOOM};
    use glam::Vec2;

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut camera = Camera::new();
        camera.apply_wheel(100.0);
        assert!((camera.zoom() - 0.9).abs() < 1e-6);

        camera.apply_wheel(10_000.0);
        assert_eq!(camera.zoom(), MIN_ZOOM);

        camera.apply_wheel(-10_000.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);
    }

    #[test]
    fn transforms_are_inverse() {
        let mut camera = Camera::new();
        camera.set_zoom(2.0);
        camera.pan(Vec2::new(-40.0, 20.0));
        let world = Vec2::new(300.0, 120.0);
        let round_trip = camera.screen_to_world(camera.world_to_screen(world));
        assert!((round_trip - world).length() < 1e-4);
        assert_eq!(camera.scroll(), Vec2::new(20.0, -10.0));
    }

    #[test]
    fn center_on_places_point_mid_viewport() {
        let mut camera = Camera::new();
        camera.center_on(Vec2::new(1312.0, 1312.0), Vec2::new(800.0, 600.0));
        assert_eq!(
            camera.world_to_screen(Vec2::new(1312.0, 1312.0)),
            Vec2::new(400.0, 300.0)
        );
    }
}
