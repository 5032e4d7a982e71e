//! Freehand pen stroke element.

use super::{point_to_polyline_dist, stroke_hit_tolerance, Color, DashStyle, ElementId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand stroke: an ordered sequence of world-space points, append-only
/// while drawing and immutable afterward (raw capture, no resampling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub id: ElementId,
    pub points: Vec<Point>,
    /// Stroke width in world units.
    pub width: f64,
    pub color: Color,
    pub is_auto_color: bool,
    #[serde(default)]
    pub dash: DashStyle,
}

impl Pen {
    pub const DEFAULT_WIDTH: f64 = 2.0;

    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            points: Vec::new(),
            width: Self::DEFAULT_WIDTH,
            color: Color::black(),
            is_auto_color: true,
            dash: DashStyle::default(),
        }
    }

    /// Append a captured point while drawing.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Rect::new(min_x, min_y, max_x, max_y)
    }

    pub fn hit_test(&self, point: Point, scale: f64) -> bool {
        let tolerance = stroke_hit_tolerance(self.width, scale);
        point_to_polyline_dist(point, &self.points) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_bounds() {
        let mut pen = Pen::new(1);
        pen.add_point(Point::new(0.0, 0.0));
        pen.add_point(Point::new(100.0, 50.0));
        pen.add_point(Point::new(50.0, 100.0));

        let bounds = pen.bounds();
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_on_segment() {
        let mut pen = Pen::new(1);
        pen.add_point(Point::new(0.0, 0.0));
        pen.add_point(Point::new(100.0, 0.0));
        assert!(pen.hit_test(Point::new(50.0, 3.0), 1.0));
        assert!(!pen.hit_test(Point::new(50.0, 30.0), 1.0));
    }

    #[test]
    fn test_single_point_stroke() {
        let mut pen = Pen::new(1);
        pen.add_point(Point::new(10.0, 10.0));
        assert!(pen.hit_test(Point::new(11.0, 11.0), 1.0));
    }

    #[test]
    fn test_empty_stroke_misses() {
        let pen = Pen::new(1);
        assert!(!pen.hit_test(Point::ZERO, 1.0));
    }
}
