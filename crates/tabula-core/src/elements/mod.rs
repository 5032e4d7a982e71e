//! Element definitions for the whiteboard.

mod image;
mod line;
mod pdf;
mod pen;
mod shape;
mod text;

pub use image::ImageElement;
pub use line::Line;
pub use pdf::PdfRef;
pub use pen::Pen;
pub use shape::{ShapeElement, ShapeKind};
pub use text::TextElement;

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

/// Unique element identifier, monotonic within a board.
pub type ElementId = u64;

/// Base hit tolerance for strokes, in screen pixels.
pub const BASE_HIT_TOLERANCE: f64 = 6.0;
/// Extra screen-space padding added around a stroke's own width, so thin
/// lines stay clickable at any zoom.
pub const STROKE_HIT_PADDING: f64 = 4.0;
/// Minimum width/height of box-shaped elements, in world units.
pub const MIN_BOX_SIZE: f64 = 20.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Sentinel for "do not paint".
    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Color> for peniko::Color {
    fn from(color: Color) -> Self {
        peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke dash style for lines, pen paths, and shape outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Opaque reference to host-owned source data (image bytes, a PDF document).
/// The engine never interprets it, only passes it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef(pub Uuid);

impl SourceRef {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceRef {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle to a host-owned bitmap produced by the content rasterizer
/// or an image decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapHandle {
    pub id: Uuid,
    pub width: u32,
    pub height: u32,
}

impl BitmapHandle {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
        }
    }
}

#[derive(Debug, Default)]
struct CacheSlot {
    bitmap: Option<BitmapHandle>,
    rendering: bool,
}

/// Cached rendered bitmap for content-bearing elements.
///
/// Interior mutability lets the renderer set the in-flight guard while the
/// rest of the frame only holds `&Board`. The cache is derived state: it is
/// never serialized, never compared, and never cloned into snapshots.
#[derive(Debug, Default)]
pub struct RenderCache {
    slot: RwLock<CacheSlot>,
}

impl Clone for RenderCache {
    fn clone(&self) -> Self {
        // Deep copies (snapshots, duplicates) start with a cold cache.
        Self::default()
    }
}

impl RenderCache {
    /// The cached bitmap, if one has been delivered since the last
    /// invalidation.
    pub fn bitmap(&self) -> Option<BitmapHandle> {
        self.slot.read().ok().and_then(|slot| slot.bitmap)
    }

    /// Claim the in-flight guard. Returns `true` exactly once per missing
    /// bitmap so duplicate async requests are not issued.
    pub fn begin_render(&self) -> bool {
        let Ok(mut slot) = self.slot.write() else {
            return false;
        };
        if slot.bitmap.is_some() || slot.rendering {
            return false;
        }
        slot.rendering = true;
        true
    }

    /// Store a completed bitmap and release the guard.
    pub fn complete(&self, bitmap: BitmapHandle) {
        if let Ok(mut slot) = self.slot.write() {
            slot.bitmap = Some(bitmap);
            slot.rendering = false;
        }
    }

    /// Release the guard after a failed rasterization, leaving the bitmap
    /// unset so the next draw retries.
    pub fn fail(&self) {
        if let Ok(mut slot) = self.slot.write() {
            slot.rendering = false;
        }
    }

    /// Drop the cached bitmap and the guard. A completion that arrives for
    /// content invalidated while it was in flight is stale; because the guard
    /// is cleared here, the next draw re-issues the request.
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.write() {
            slot.bitmap = None;
            slot.rendering = false;
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.slot.read().map(|slot| slot.rendering).unwrap_or(false)
    }
}

/// Distance from a point to a line segment (a→b).
///
/// Degenerate segments (both endpoints coincident) fall back to the direct
/// point distance.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// World-space hit tolerance for a stroke of `width` world units at the given
/// camera scale: the hitbox widens with both the on-screen stroke width and a
/// constant screen-space padding.
pub fn stroke_hit_tolerance(width: f64, scale: f64) -> f64 {
    let screen_tolerance = BASE_HIT_TOLERANCE.max(width * scale / 2.0 + STROKE_HIT_PADDING);
    screen_tolerance / scale
}

/// An element placed on the infinite canvas.
///
/// A closed sum type: geometry, hit-testing, and rendering all match
/// exhaustively on the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    Line(Line),
    Pen(Pen),
    Shape(ShapeElement),
    Text(TextElement),
    Image(ImageElement),
    #[serde(rename = "pdf-reference")]
    PdfRef(PdfRef),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Line(el) => el.id,
            Element::Pen(el) => el.id,
            Element::Shape(el) => el.id,
            Element::Text(el) => el.id,
            Element::Image(el) => el.id,
            Element::PdfRef(el) => el.id,
        }
    }

    pub fn set_id(&mut self, id: ElementId) {
        match self {
            Element::Line(el) => el.id = id,
            Element::Pen(el) => el.id = id,
            Element::Shape(el) => el.id = id,
            Element::Text(el) => el.id = id,
            Element::Image(el) => el.id = id,
            Element::PdfRef(el) => el.id = id,
        }
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Element::Line(el) => el.bounds(),
            Element::Pen(el) => el.bounds(),
            Element::Shape(el) => el.bounds(),
            Element::Text(el) => el.bounds(),
            Element::Image(el) => el.bounds(),
            Element::PdfRef(el) => el.bounds(),
        }
    }

    /// Check whether a world point hits this element at the given camera
    /// scale. Strokes use distance-to-segment with a zoom-aware tolerance;
    /// box-shaped variants use point-in-box.
    pub fn hit_test(&self, point: Point, scale: f64) -> bool {
        match self {
            Element::Line(el) => el.hit_test(point, scale),
            Element::Pen(el) => el.hit_test(point, scale),
            Element::Shape(el) => el.bounds().contains(point),
            Element::Text(el) => el.bounds().contains(point),
            Element::Image(el) => el.bounds().contains(point),
            Element::PdfRef(el) => el.bounds().contains(point),
        }
    }

    /// Move the element's defining geometry by a world-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Element::Line(el) => {
                el.p1 += delta;
                el.p2 += delta;
            }
            Element::Pen(el) => {
                for p in &mut el.points {
                    *p += delta;
                }
            }
            Element::Shape(el) => el.position += delta,
            Element::Text(el) => el.position += delta,
            Element::Image(el) => el.position += delta,
            Element::PdfRef(el) => el.position += delta,
        }
    }

    /// Marquee rule: box-shaped elements select on full containment,
    /// line/pen paths select when any single defining point is inside.
    pub fn marquee_hit(&self, rect: Rect) -> bool {
        match self {
            Element::Line(el) => rect.contains(el.p1) || rect.contains(el.p2),
            Element::Pen(el) => el.points.iter().any(|p| rect.contains(*p)),
            _ => {
                let bounds = self.bounds();
                rect.x0 <= bounds.x0
                    && rect.y0 <= bounds.y0
                    && rect.x1 >= bounds.x1
                    && rect.y1 >= bounds.y1
            }
        }
    }

    /// Whether this variant carries a resizable bounding box.
    pub fn is_box(&self) -> bool {
        matches!(
            self,
            Element::Shape(_) | Element::Text(_) | Element::Image(_) | Element::PdfRef(_)
        )
    }

    /// The render cache for content-bearing variants.
    pub fn render_cache(&self) -> Option<&RenderCache> {
        match self {
            Element::Text(el) => Some(&el.cache),
            Element::Image(el) => Some(&el.cache),
            Element::PdfRef(el) => Some(&el.cache),
            _ => None,
        }
    }

    /// Invalidate any cached rendered bitmap. The single choke point every
    /// mutator goes through, so an invalidation cannot be missed.
    pub fn mark_dirty(&self) {
        if let Some(cache) = self.render_cache() {
            cache.invalidate();
        }
    }

    /// Resynchronize theme-tracking colors against the active foreground.
    /// Returns `true` when anything changed (the caller must treat the cached
    /// bitmap as stale, since color is baked into it).
    pub fn sync_auto_colors(&mut self, foreground: Color) -> bool {
        let mut changed = false;
        let (color, is_auto) = match self {
            Element::Line(el) => (&mut el.color, el.is_auto_color),
            Element::Pen(el) => (&mut el.color, el.is_auto_color),
            Element::Shape(el) => {
                if el.is_auto_fill && el.fill_color != foreground {
                    el.fill_color = foreground;
                    changed = true;
                }
                (&mut el.color, el.is_auto_color)
            }
            Element::Text(el) => (&mut el.color, el.is_auto_color),
            Element::Image(el) => (&mut el.color, el.is_auto_color),
            Element::PdfRef(el) => (&mut el.color, el.is_auto_color),
        };
        if is_auto && *color != foreground {
            *color = foreground;
            changed = true;
        }
        if changed {
            self.mark_dirty();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_dist_degenerate() {
        let p = Point::new(3.0, 4.0);
        let a = Point::new(0.0, 0.0);
        let dist = point_to_segment_dist(p, a, a);
        assert!((dist - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segment_dist_projection() {
        let dist = point_to_segment_dist(
            Point::new(50.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((dist - 10.0).abs() < f64::EPSILON);

        // Beyond the endpoint the distance is to the endpoint itself.
        let dist = point_to_segment_dist(
            Point::new(110.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((dist - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stroke_tolerance_scales() {
        // At scale 1 a thin stroke gets the base tolerance.
        assert!((stroke_hit_tolerance(2.0, 1.0) - BASE_HIT_TOLERANCE).abs() < f64::EPSILON);
        // Zoomed out, the world-space tolerance grows so the stroke stays
        // clickable on screen.
        assert!(stroke_hit_tolerance(2.0, 0.25) > stroke_hit_tolerance(2.0, 1.0));
        // A wide stroke widens its own hitbox.
        let wide = stroke_hit_tolerance(20.0, 1.0);
        assert!((wide - (20.0 / 2.0 + STROKE_HIT_PADDING)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_cache_guard() {
        let cache = RenderCache::default();
        assert!(cache.begin_render());
        // Guard held: no duplicate requests.
        assert!(!cache.begin_render());

        cache.complete(BitmapHandle::new(100, 50));
        assert!(cache.bitmap().is_some());
        // A bitmap is present: nothing to render.
        assert!(!cache.begin_render());

        cache.invalidate();
        assert!(cache.bitmap().is_none());
        assert!(cache.begin_render());

        cache.fail();
        assert!(!cache.is_rendering());
        assert!(cache.begin_render());
    }

    #[test]
    fn test_clone_strips_cache() {
        let cache = RenderCache::default();
        cache.complete(BitmapHandle::new(10, 10));
        let copy = cache.clone();
        assert!(copy.bitmap().is_none());
    }

    #[test]
    fn test_marquee_rules() {
        let shape = Element::Shape(ShapeElement::new(
            1,
            Point::new(10.0, 10.0),
            40.0,
            20.0,
            ShapeKind::Rectangle,
        ));
        // Fully enclosing selects.
        assert!(shape.marquee_hit(Rect::new(0.0, 0.0, 100.0, 100.0)));
        // Partial overlap does not.
        assert!(!shape.marquee_hit(Rect::new(0.0, 0.0, 30.0, 100.0)));

        let line = Element::Line(Line::new(2, Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        // Touching a single endpoint selects.
        assert!(line.marquee_hit(Rect::new(-5.0, -5.0, 5.0, 5.0)));
        assert!(!line.marquee_hit(Rect::new(20.0, 20.0, 80.0, 80.0)));
    }

    #[test]
    fn test_auto_color_resync() {
        let mut line = Line::new(1, Point::ZERO, Point::new(10.0, 0.0));
        line.is_auto_color = true;
        let mut el = Element::Line(line);

        let fg = Color::new(30, 30, 30, 255);
        assert!(el.sync_auto_colors(fg));
        // Second pass is a no-op.
        assert!(!el.sync_auto_colors(fg));

        // Non-auto elements keep their color.
        let mut fixed = Line::new(2, Point::ZERO, Point::new(10.0, 0.0));
        fixed.is_auto_color = false;
        fixed.color = Color::new(200, 40, 40, 255);
        let mut el = Element::Line(fixed);
        assert!(!el.sync_auto_colors(fg));
    }
}
