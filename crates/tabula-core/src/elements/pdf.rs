//! Embedded-document reference element.

use super::{Color, ElementId, RenderCache, SourceRef};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Fractional sub-region of the card that opens the external PDF viewer on
/// click instead of starting a drag (the thumbnail area).
const PREVIEW_X0: f64 = 0.25;
const PREVIEW_Y0: f64 = 0.2;
const PREVIEW_X1: f64 = 0.75;
const PREVIEW_Y1: f64 = 0.8;

/// A reference card for an embedded PDF document. The engine renders a small
/// preview card through the content rasterizer (never the document itself)
/// and passes the annotation list through to the external sub-viewer opaquely.
#[derive(Debug, Serialize, Deserialize)]
pub struct PdfRef {
    pub id: ElementId,
    /// Top-left corner of the card, in world coordinates.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Display name of the document.
    pub name: String,
    /// Opaque handle to the host-owned document.
    pub source: SourceRef,
    /// Card foreground color (baked into the rendered preview).
    pub color: Color,
    pub is_auto_color: bool,
    /// Annotation list owned by the external PDF sub-viewer, keyed by this
    /// element's id. Opaque pass-through data.
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
    /// Rendered preview card, never serialized.
    #[serde(skip)]
    pub cache: RenderCache,
}

impl Clone for PdfRef {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            position: self.position,
            width: self.width,
            height: self.height,
            name: self.name.clone(),
            source: self.source,
            color: self.color,
            is_auto_color: self.is_auto_color,
            annotations: self.annotations.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl PartialEq for PdfRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.position == other.position
            && self.width == other.width
            && self.height == other.height
            && self.name == other.name
            && self.source == other.source
            && self.color == other.color
            && self.is_auto_color == other.is_auto_color
            && self.annotations == other.annotations
    }
}

impl PdfRef {
    pub fn new(id: ElementId, position: Point, name: String, source: SourceRef) -> Self {
        Self {
            id,
            position,
            width: 180.0,
            height: 240.0,
            name,
            source,
            color: Color::black(),
            is_auto_color: true,
            annotations: Vec::new(),
            cache: RenderCache::default(),
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

    /// The preview sub-region in world coordinates: a fixed fractional
    /// rectangle of the card's own bounding box.
    pub fn preview_region(&self) -> Rect {
        Rect::new(
            self.position.x + self.width * PREVIEW_X0,
            self.position.y + self.height * PREVIEW_Y0,
            self.position.x + self.width * PREVIEW_X1,
            self.position.y + self.height * PREVIEW_Y1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_region_inside_card() {
        let pdf = PdfRef::new(1, Point::new(100.0, 100.0), "notes.pdf".into(), SourceRef::new());
        let region = pdf.preview_region();
        let bounds = pdf.bounds();
        assert!(bounds.x0 < region.x0 && region.x1 < bounds.x1);
        assert!(bounds.y0 < region.y0 && region.y1 < bounds.y1);
        assert!(region.contains(bounds.center()));
        // The card edge is outside the preview region, so it still drags.
        assert!(!region.contains(Point::new(bounds.x0 + 2.0, bounds.y0 + 2.0)));
    }
}
