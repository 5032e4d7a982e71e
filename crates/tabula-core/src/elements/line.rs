//! Straight line element with optional arrowheads.

use super::{point_to_segment_dist, stroke_hit_tolerance, Color, DashStyle, ElementId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight line between two world-space endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: ElementId,
    /// First endpoint.
    pub p1: Point,
    /// Second endpoint.
    pub p2: Point,
    /// Stroke width in world units.
    pub width: f64,
    /// Draw an arrowhead at `p1`.
    #[serde(default)]
    pub arrow_start: bool,
    /// Draw an arrowhead at `p2`.
    #[serde(default)]
    pub arrow_end: bool,
    pub color: Color,
    /// Track the active theme's foreground color on theme change.
    pub is_auto_color: bool,
    #[serde(default)]
    pub dash: DashStyle,
}

impl Line {
    pub const DEFAULT_WIDTH: f64 = 2.0;

    pub fn new(id: ElementId, p1: Point, p2: Point) -> Self {
        Self {
            id,
            p1,
            p2,
            width: Self::DEFAULT_WIDTH,
            arrow_start: false,
            arrow_end: false,
            color: Color::black(),
            is_auto_color: true,
            dash: DashStyle::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.p1.x.min(self.p2.x),
            self.p1.y.min(self.p2.y),
            self.p1.x.max(self.p2.x),
            self.p1.y.max(self.p2.y),
        )
    }

    pub fn hit_test(&self, point: Point, scale: f64) -> bool {
        let tolerance = stroke_hit_tolerance(self.width, scale);
        point_to_segment_dist(point, self.p1, self.p2) <= tolerance
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_near_line() {
        // Scenario A: line (0,0)-(100,0) at scale 1, click at (50,2).
        let line = Line::new(1, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 2.0), 1.0));
        assert!(!line.hit_test(Point::new(50.0, 20.0), 1.0));
    }

    #[test]
    fn test_hit_zoomed_out() {
        // At scale 0.1 the screen tolerance maps to a much larger world band.
        let line = Line::new(1, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 40.0), 0.1));
    }

    #[test]
    fn test_degenerate_line() {
        let p = Point::new(10.0, 10.0);
        let line = Line::new(1, p, p);
        assert!(line.hit_test(Point::new(12.0, 10.0), 1.0));
        assert!((line.length()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_normalized() {
        let line = Line::new(1, Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        let bounds = line.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 80.0).abs() < f64::EPSILON);
    }
}
