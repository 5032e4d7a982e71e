//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default scale bounds for the viewport.
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;

/// Camera manages the view transform over the unbounded world plane.
///
/// It owns the pan offset and scale, converting between screen pixels and
/// world coordinates. The scale is always clamped to `[min_scale, max_scale]`;
/// the offset is unconstrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current scale (1.0 = 100%).
    pub scale: f64,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the affine transform converting world to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.offset.x) / self.scale,
            (screen_point.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        Point::new(
            world_point.x * self.scale + self.offset.x,
            world_point.y * self.scale + self.offset.y,
        )
    }

    /// Pan the camera by a delta in screen pixels.
    ///
    /// Pan is expressed in screen space, so no scale correction is applied.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the world point under `screen_point` fixed.
    ///
    /// Returns `false` without mutating the offset when the clamped scale
    /// equals the current scale, so the offset cannot drift at the limits.
    pub fn zoom_at(&mut self, factor: f64, screen_point: Point) -> bool {
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        // World point under the cursor before the zoom.
        let world_point = self.screen_to_world(screen_point);

        self.scale = new_scale;

        // Recompute the offset so the same world point stays under the cursor.
        let new_screen = self.world_to_screen(world_point);
        self.offset += Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
        true
    }

    /// Reset to the default position and scale.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }

    /// World point currently at the center of a viewport of the given size.
    pub fn viewport_center_world(&self, viewport: Size) -> Point {
        self.screen_to_world(Point::new(viewport.width / 2.0, viewport.height / 2.0))
    }

    /// Visible world rectangle for a viewport of the given size.
    pub fn visible_world_rect(&self, viewport: Size) -> kurbo::Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(viewport.width, viewport.height));
        kurbo::Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.scale = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_anchoring() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(17.0, -42.0);

        let anchor = Point::new(400.0, 300.0);
        let before = camera.screen_to_world(anchor);
        assert!(camera.zoom_at(1.7, anchor));
        let after = camera.screen_to_world(anchor);

        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp_is_noop_at_limits() {
        let mut camera = Camera::new();
        camera.scale = camera.max_scale;
        let offset = camera.offset;

        assert!(!camera.zoom_at(2.0, Point::new(100.0, 100.0)));
        assert_eq!(camera.offset, offset);

        camera.scale = camera.min_scale;
        assert!(!camera.zoom_at(0.5, Point::new(100.0, 100.0)));
        assert_eq!(camera.offset, offset);
    }

    #[test]
    fn test_zoom_in_out_restores_scale_and_anchor() {
        // Scenario D: zoom in twice and back out twice at the same point.
        let mut camera = Camera::new();
        let anchor = Point::new(400.0, 300.0);
        let original = camera.screen_to_world(anchor);

        camera.zoom_at(2.0, anchor);
        camera.zoom_at(2.0, anchor);
        camera.zoom_at(0.5, anchor);
        camera.zoom_at(0.5, anchor);

        assert!((camera.scale - 1.0).abs() < 1e-9);
        let restored = camera.screen_to_world(anchor);
        assert!((restored.x - original.x).abs() < 1e-9);
        assert!((restored.y - original.y).abs() < 1e-9);
    }

    #[test]
    fn test_viewport_center() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(100.0, 0.0);
        camera.scale = 2.0;
        let center = camera.viewport_center_world(Size::new(800.0, 600.0));
        assert!((center.x - 150.0).abs() < f64::EPSILON);
        assert!((center.y - 150.0).abs() < f64::EPSILON);
    }
}
