//! Image element backed by host-owned source data.

use super::{Color, ElementId, RenderCache, SourceRef};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An image placed on the canvas. The engine holds only an opaque source
/// reference; decoding happens at the renderer boundary and the decoded
/// bitmap is cached like any other derived content.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageElement {
    pub id: ElementId,
    /// Top-left corner of the bounding box, in world coordinates.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Opaque handle to the host-owned pixel source.
    pub source: SourceRef,
    /// Border/placeholder tint.
    pub color: Color,
    pub is_auto_color: bool,
    /// Lazily-resolved decoded bitmap, never serialized.
    #[serde(skip)]
    pub cache: RenderCache,
}

impl Clone for ImageElement {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            position: self.position,
            width: self.width,
            height: self.height,
            source: self.source,
            color: self.color,
            is_auto_color: self.is_auto_color,
            cache: self.cache.clone(),
        }
    }
}

impl PartialEq for ImageElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.position == other.position
            && self.width == other.width
            && self.height == other.height
            && self.source == other.source
            && self.color == other.color
            && self.is_auto_color == other.is_auto_color
    }
}

impl ImageElement {
    pub fn new(id: ElementId, position: Point, source: SourceRef) -> Self {
        Self {
            id,
            position,
            width: 320.0,
            height: 240.0,
            source,
            color: Color::black(),
            is_auto_color: true,
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
}
