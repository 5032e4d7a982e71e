//! Resize-handle sets and the handle-drag resize algorithm.

use crate::elements::{Element, TextElement, MIN_BOX_SIZE};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Handle draw size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in screen pixels. Deliberately larger than the body
/// hit padding so a handle wins over body-drag when they overlap near an
/// edge.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// Corner positions of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge midpoints of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeSide {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of resize handle; the tag determines which edges move during resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Endpoint handle for lines (0 = p1, 1 = p2).
    Endpoint(usize),
    /// Corner handle for box-shaped elements.
    Corner(Corner),
    /// Edge midpoint handle for box-shaped elements.
    Edge(EdgeSide),
}

/// A handle with its world position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a world point hits this handle. `tolerance` is already
    /// adjusted for camera scale.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The handle set for an element: 2 endpoints for a line, 8 handles
/// (4 corners + 4 edge midpoints) for box-shaped variants, none for pen
/// strokes (their geometry is immutable after capture).
pub fn handles_for(element: &Element) -> Vec<Handle> {
    match element {
        Element::Line(line) => vec![
            Handle::new(line.p1, HandleKind::Endpoint(0)),
            Handle::new(line.p2, HandleKind::Endpoint(1)),
        ],
        Element::Pen(_) => Vec::new(),
        _ => box_handles(element.bounds()),
    }
}

fn box_handles(bounds: Rect) -> Vec<Handle> {
    let center = bounds.center();
    vec![
        Handle::new(Point::new(bounds.x0, bounds.y0), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(Point::new(bounds.x1, bounds.y0), HandleKind::Corner(Corner::TopRight)),
        Handle::new(Point::new(bounds.x0, bounds.y1), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(Point::new(bounds.x1, bounds.y1), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(Point::new(center.x, bounds.y0), HandleKind::Edge(EdgeSide::Top)),
        Handle::new(Point::new(bounds.x1, center.y), HandleKind::Edge(EdgeSide::Right)),
        Handle::new(Point::new(center.x, bounds.y1), HandleKind::Edge(EdgeSide::Bottom)),
        Handle::new(Point::new(bounds.x0, center.y), HandleKind::Edge(EdgeSide::Left)),
    ]
}

/// Find which handle (if any) of an element is hit at a world point, with
/// the handle tolerance adjusted for camera scale.
pub fn hit_test_handles(element: &Element, point: Point, scale: f64) -> Option<HandleKind> {
    let tolerance = HANDLE_HIT_TOLERANCE / scale;
    handles_for(element)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

/// Geometry captured when a handle drag starts, needed for the proportional
/// scaling math during the drag.
#[derive(Debug, Clone, Copy)]
pub struct ResizeStart {
    /// Bounding box at gesture start.
    pub bounds: Rect,
    /// width/height at gesture start.
    pub aspect: f64,
    /// Font size at gesture start, for text elements.
    pub font_size: Option<f64>,
}

impl ResizeStart {
    pub fn capture(element: &Element) -> Self {
        let bounds = element.bounds();
        Self {
            bounds,
            aspect: bounds.width() / bounds.height().max(f64::EPSILON),
            font_size: match element {
                Element::Text(text) => Some(text.font_size),
                _ => None,
            },
        }
    }
}

/// Recompute a box from its gesture-start geometry, the dragged handle, and
/// the current world pointer.
///
/// The dragged corner/edge follows the pointer; the opposite corner/edge is
/// the fixed anchor. When `lock_aspect` is set (corner handles on non-text
/// elements), whichever of width/height implies the larger box under the
/// start ratio wins and the other dimension is derived from it. The minimum
/// size floor is enforced afterwards, re-deriving the ratio-locked dimension
/// if it was clamped.
pub fn resize_box(start: &ResizeStart, handle: HandleKind, pointer: Point, lock_aspect: bool) -> Rect {
    let b = start.bounds;
    match handle {
        HandleKind::Corner(corner) => {
            let (raw_w, raw_h, anchor) = match corner {
                Corner::TopLeft => (b.x1 - pointer.x, b.y1 - pointer.y, Point::new(b.x1, b.y1)),
                Corner::TopRight => (pointer.x - b.x0, b.y1 - pointer.y, Point::new(b.x0, b.y1)),
                Corner::BottomLeft => (b.x1 - pointer.x, pointer.y - b.y0, Point::new(b.x1, b.y0)),
                Corner::BottomRight => (pointer.x - b.x0, pointer.y - b.y0, Point::new(b.x0, b.y0)),
            };
            let (w, h) = constrain_size(raw_w, raw_h, start.aspect, lock_aspect);
            match corner {
                Corner::TopLeft => Rect::new(anchor.x - w, anchor.y - h, anchor.x, anchor.y),
                Corner::TopRight => Rect::new(anchor.x, anchor.y - h, anchor.x + w, anchor.y),
                Corner::BottomLeft => Rect::new(anchor.x - w, anchor.y, anchor.x, anchor.y + h),
                Corner::BottomRight => Rect::new(anchor.x, anchor.y, anchor.x + w, anchor.y + h),
            }
        }
        HandleKind::Edge(edge) => match edge {
            EdgeSide::Left => {
                let w = (b.x1 - pointer.x).max(MIN_BOX_SIZE);
                Rect::new(b.x1 - w, b.y0, b.x1, b.y1)
            }
            EdgeSide::Right => {
                let w = (pointer.x - b.x0).max(MIN_BOX_SIZE);
                Rect::new(b.x0, b.y0, b.x0 + w, b.y1)
            }
            EdgeSide::Top => {
                let h = (b.y1 - pointer.y).max(MIN_BOX_SIZE);
                Rect::new(b.x0, b.y1 - h, b.x1, b.y1)
            }
            EdgeSide::Bottom => {
                let h = (pointer.y - b.y0).max(MIN_BOX_SIZE);
                Rect::new(b.x0, b.y0, b.x1, b.y0 + h)
            }
        },
        HandleKind::Endpoint(_) => b,
    }
}

fn constrain_size(raw_w: f64, raw_h: f64, aspect: f64, lock_aspect: bool) -> (f64, f64) {
    if !lock_aspect {
        return (raw_w.max(MIN_BOX_SIZE), raw_h.max(MIN_BOX_SIZE));
    }
    // Whichever dimension implies the larger box under the ratio wins.
    let (mut w, mut h) = if raw_w > raw_h * aspect {
        (raw_w, raw_w / aspect)
    } else {
        (raw_h * aspect, raw_h)
    };
    if w < MIN_BOX_SIZE {
        w = MIN_BOX_SIZE;
        h = w / aspect;
    }
    if h < MIN_BOX_SIZE {
        h = MIN_BOX_SIZE;
        w = h * aspect;
    }
    (w, h)
}

/// Apply a handle drag to an element. Any resize invalidates a cached
/// rendered bitmap.
pub fn apply_resize(element: &mut Element, handle: HandleKind, pointer: Point, start: &ResizeStart) {
    match element {
        Element::Line(line) => {
            match handle {
                HandleKind::Endpoint(0) => line.p1 = pointer,
                HandleKind::Endpoint(1) => line.p2 = pointer,
                _ => {}
            }
            return;
        }
        Element::Pen(_) => return,
        _ => {}
    }

    // Text does not lock aspect; corner drags scale the font instead.
    let is_text = matches!(element, Element::Text(_));
    let lock_aspect = !is_text && matches!(handle, HandleKind::Corner(_));
    let new_bounds = resize_box(start, handle, pointer, lock_aspect);

    match element {
        Element::Shape(shape) => {
            shape.position = Point::new(new_bounds.x0, new_bounds.y0);
            shape.width = new_bounds.width();
            shape.height = new_bounds.height();
        }
        Element::Text(text) => {
            text.position = Point::new(new_bounds.x0, new_bounds.y0);
            text.width = new_bounds.width();
            text.height = new_bounds.height();
            if let (HandleKind::Corner(_), Some(initial)) = (handle, start.font_size) {
                let ratio = new_bounds.width() / start.bounds.width().max(f64::EPSILON);
                text.font_size = (initial * ratio)
                    .clamp(TextElement::MIN_FONT_SIZE, TextElement::MAX_FONT_SIZE);
            }
        }
        Element::Image(image) => {
            image.position = Point::new(new_bounds.x0, new_bounds.y0);
            image.width = new_bounds.width();
            image.height = new_bounds.height();
        }
        Element::PdfRef(pdf) => {
            pdf.position = Point::new(new_bounds.x0, new_bounds.y0);
            pdf.width = new_bounds.width();
            pdf.height = new_bounds.height();
        }
        Element::Line(_) | Element::Pen(_) => unreachable!(),
    }
    element.mark_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BitmapHandle, ImageElement, Line, ShapeElement, ShapeKind, SourceRef};

    fn shape(width: f64, height: f64) -> Element {
        Element::Shape(ShapeElement::new(1, Point::ZERO, width, height, ShapeKind::Rectangle))
    }

    #[test]
    fn test_box_handle_set() {
        let handles = handles_for(&shape(100.0, 50.0));
        assert_eq!(handles.len(), 8);
        assert!(matches!(handles[0].kind, HandleKind::Corner(Corner::TopLeft)));
        assert!(matches!(handles[4].kind, HandleKind::Edge(EdgeSide::Top)));
    }

    #[test]
    fn test_line_handle_set() {
        let line = Element::Line(Line::new(1, Point::ZERO, Point::new(100.0, 100.0)));
        let handles = handles_for(&line);
        assert_eq!(handles.len(), 2);
    }

    #[test]
    fn test_handle_wins_over_body() {
        // A point near a corner, inside the body, must still hit the handle.
        let el = shape(100.0, 100.0);
        let hit = hit_test_handles(&el, Point::new(95.0, 95.0), 1.0);
        assert_eq!(hit, Some(HandleKind::Corner(Corner::BottomRight)));
        assert!(el.hit_test(Point::new(95.0, 95.0), 1.0));
    }

    #[test]
    fn test_handle_tolerance_scales_with_zoom() {
        let el = shape(100.0, 100.0);
        // Zoomed out, the same screen-space tolerance covers more world units.
        assert_eq!(hit_test_handles(&el, Point::new(120.0, 100.0), 1.0), None);
        assert_eq!(
            hit_test_handles(&el, Point::new(120.0, 100.0), 0.5),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
    }

    #[test]
    fn test_corner_resize_locks_aspect() {
        // Scenario B: box (0,0,100,50), ratio 2.0; drag bottom-right to
        // (40,40).
        let mut el = shape(100.0, 50.0);
        let start = ResizeStart::capture(&el);
        apply_resize(
            &mut el,
            HandleKind::Corner(Corner::BottomRight),
            Point::new(40.0, 40.0),
            &start,
        );

        let bounds = el.bounds();
        assert!((bounds.width() - bounds.height() * 2.0).abs() < 1e-9);
        // The opposite (top-left) corner did not move.
        assert!(bounds.x0.abs() < 1e-9);
        assert!(bounds.y0.abs() < 1e-9);
    }

    #[test]
    fn test_top_left_resize_anchors_bottom_right() {
        let mut el = shape(100.0, 100.0);
        let start = ResizeStart::capture(&el);
        apply_resize(
            &mut el,
            HandleKind::Corner(Corner::TopLeft),
            Point::new(-50.0, -50.0),
            &start,
        );

        let bounds = el.bounds();
        assert!((bounds.x1 - 100.0).abs() < 1e-9);
        assert!((bounds.y1 - 100.0).abs() < 1e-9);
        assert!((bounds.width() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_size_keeps_ratio() {
        let mut el = shape(100.0, 50.0);
        let start = ResizeStart::capture(&el);
        // Collapse the box entirely; the floor must kick in.
        apply_resize(
            &mut el,
            HandleKind::Corner(Corner::BottomRight),
            Point::new(-500.0, -500.0),
            &start,
        );

        let bounds = el.bounds();
        assert!(bounds.width() >= MIN_BOX_SIZE);
        assert!(bounds.height() >= MIN_BOX_SIZE);
        assert!((bounds.width() / bounds.height() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_resize_changes_one_dimension() {
        let mut el = shape(100.0, 50.0);
        let start = ResizeStart::capture(&el);
        apply_resize(&mut el, HandleKind::Edge(EdgeSide::Right), Point::new(140.0, 999.0), &start);

        let bounds = el.bounds();
        assert!((bounds.width() - 140.0).abs() < 1e-9);
        assert!((bounds.height() - 50.0).abs() < 1e-9);
        assert!(bounds.x0.abs() < 1e-9);
    }

    #[test]
    fn test_text_corner_resize_scales_font() {
        let mut text = crate::elements::TextElement::new(1, Point::ZERO, "hi".into());
        text.width = 200.0;
        text.height = 100.0;
        text.font_size = 20.0;
        let mut el = Element::Text(text);
        let start = ResizeStart::capture(&el);

        apply_resize(
            &mut el,
            HandleKind::Corner(Corner::BottomRight),
            Point::new(400.0, 130.0),
            &start,
        );

        let Element::Text(text) = &el else { unreachable!() };
        // Font follows the width ratio (2x), not an aspect lock.
        assert!((text.font_size - 40.0).abs() < 1e-9);
        assert!((text.width - 400.0).abs() < 1e-9);
        assert!((text.height - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_invalidates_cache() {
        let image = ImageElement::new(1, Point::ZERO, SourceRef::new());
        image.cache.complete(BitmapHandle::new(10, 10));
        let mut el = Element::Image(image);
        let start = ResizeStart::capture(&el);

        apply_resize(
            &mut el,
            HandleKind::Corner(Corner::BottomRight),
            Point::new(500.0, 400.0),
            &start,
        );
        assert!(el.render_cache().unwrap().bitmap().is_none());
    }

    #[test]
    fn test_line_endpoint_follows_pointer() {
        let mut el = Element::Line(Line::new(1, Point::ZERO, Point::new(100.0, 0.0)));
        let start = ResizeStart::capture(&el);
        apply_resize(&mut el, HandleKind::Endpoint(1), Point::new(60.0, 80.0), &start);

        let Element::Line(line) = &el else { unreachable!() };
        assert_eq!(line.p2, Point::new(60.0, 80.0));
        assert_eq!(line.p1, Point::ZERO);
    }
}
