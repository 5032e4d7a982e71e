//! Parametric box-bounded shapes.

use super::{Color, DashStyle, ElementId};
use kurbo::{BezPath, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};

/// Kind of parametric shape, all defined by an axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Triangle,
    Diamond,
    Hexagon,
    Star,
}

/// A parametric shape with stroke and optional fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub id: ElementId,
    /// Top-left corner of the bounding box, in world coordinates.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub kind: ShapeKind,
    /// Stroke color.
    pub color: Color,
    pub is_auto_color: bool,
    /// Fill color; the transparent sentinel means no fill.
    pub fill_color: Color,
    /// Track the theme foreground for the fill as well.
    pub is_auto_fill: bool,
    pub stroke_width: f64,
    #[serde(default)]
    pub dash: DashStyle,
}

impl ShapeElement {
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

    pub fn new(id: ElementId, position: Point, width: f64, height: f64, kind: ShapeKind) -> Self {
        Self {
            id,
            position,
            width,
            height,
            kind,
            color: Color::black(),
            is_auto_color: true,
            fill_color: Color::transparent(),
            is_auto_fill: false,
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            dash: DashStyle::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Outline path for this shape's kind, fitted to its bounding box.
    pub fn outline_path(&self) -> BezPath {
        outline_for(self.kind, self.bounds())
    }
}

/// Build the outline path for a shape kind fitted to `bounds`.
pub fn outline_for(kind: ShapeKind, bounds: Rect) -> BezPath {
    match kind {
        ShapeKind::Rectangle => bounds.to_path(0.1),
        ShapeKind::Ellipse => {
            let center = bounds.center();
            kurbo::Ellipse::new(center, Vec2::new(bounds.width() / 2.0, bounds.height() / 2.0), 0.0)
                .to_path(0.1)
        }
        ShapeKind::Triangle => polygon(&[
            Point::new(bounds.center().x, bounds.y0),
            Point::new(bounds.x1, bounds.y1),
            Point::new(bounds.x0, bounds.y1),
        ]),
        ShapeKind::Diamond => polygon(&[
            Point::new(bounds.center().x, bounds.y0),
            Point::new(bounds.x1, bounds.center().y),
            Point::new(bounds.center().x, bounds.y1),
            Point::new(bounds.x0, bounds.center().y),
        ]),
        ShapeKind::Hexagon => {
            let center = bounds.center();
            let rx = bounds.width() / 2.0;
            let ry = bounds.height() / 2.0;
            let vertices: Vec<Point> = (0..6)
                .map(|i| {
                    let angle = -std::f64::consts::FRAC_PI_2
                        + f64::from(i) * std::f64::consts::PI / 3.0;
                    Point::new(center.x + rx * angle.cos(), center.y + ry * angle.sin())
                })
                .collect();
            polygon(&vertices)
        }
        ShapeKind::Star => {
            // Five-point star: alternating outer and inner vertices inscribed
            // in the bounding ellipse.
            const INNER_RATIO: f64 = 0.4;
            let center = bounds.center();
            let rx = bounds.width() / 2.0;
            let ry = bounds.height() / 2.0;
            let vertices: Vec<Point> = (0..10)
                .map(|i| {
                    let angle = -std::f64::consts::FRAC_PI_2
                        + f64::from(i) * std::f64::consts::PI / 5.0;
                    let (kx, ky) = if i % 2 == 0 {
                        (rx, ry)
                    } else {
                        (rx * INNER_RATIO, ry * INNER_RATIO)
                    };
                    Point::new(center.x + kx * angle.cos(), center.y + ky * angle.sin())
                })
                .collect();
            polygon(&vertices)
        }
    }
}

fn polygon(vertices: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = vertices.first() else {
        return path;
    };
    path.move_to(*first);
    for vertex in &vertices[1..] {
        path.line_to(*vertex);
    }
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;

    #[test]
    fn test_bounds() {
        let shape = ShapeElement::new(1, Point::new(10.0, 20.0), 100.0, 50.0, ShapeKind::Ellipse);
        let bounds = shape.bounds();
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outline_paths_stay_in_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 60.0);
        for kind in [
            ShapeKind::Rectangle,
            ShapeKind::Ellipse,
            ShapeKind::Triangle,
            ShapeKind::Diamond,
            ShapeKind::Hexagon,
            ShapeKind::Star,
        ] {
            let path = outline_for(kind, bounds);
            assert!(!path.elements().is_empty(), "{kind:?} produced no path");
            let path_bounds = path.bounding_box();
            assert!(path_bounds.x0 >= bounds.x0 - 1e-6);
            assert!(path_bounds.y0 >= bounds.y0 - 1e-6);
            assert!(path_bounds.x1 <= bounds.x1 + 1e-6);
            assert!(path_bounds.y1 <= bounds.y1 + 1e-6);
        }
    }

    #[test]
    fn test_star_has_ten_vertices() {
        let path = outline_for(ShapeKind::Star, Rect::new(0.0, 0.0, 100.0, 100.0));
        // MoveTo + 9 LineTo + ClosePath.
        assert_eq!(path.elements().len(), 11);
    }
}
