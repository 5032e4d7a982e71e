//! Rich-text element (markdown with inline/block math).

use super::{Color, ElementId, RenderCache};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A rich-text block. The raw markup (markdown, optionally containing
/// `$...$` or `$$...$$` math) is rasterized by the external content renderer;
/// the engine only caches the resulting bitmap.
#[derive(Debug, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    /// Top-left corner of the bounding box, in world coordinates.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Raw markup content.
    pub content: String,
    /// Font size in world units.
    pub font_size: f64,
    pub color: Color,
    pub is_auto_color: bool,
    /// Derived, never serialized: the rasterized bitmap and its in-flight
    /// guard.
    #[serde(skip)]
    pub cache: RenderCache,
}

impl Clone for TextElement {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            position: self.position,
            width: self.width,
            height: self.height,
            content: self.content.clone(),
            font_size: self.font_size,
            color: self.color,
            is_auto_color: self.is_auto_color,
            cache: self.cache.clone(),
        }
    }
}

impl PartialEq for TextElement {
    fn eq(&self, other: &Self) -> bool {
        // The cache is derived state and takes no part in equality.
        self.id == other.id
            && self.position == other.position
            && self.width == other.width
            && self.height == other.height
            && self.content == other.content
            && self.font_size == other.font_size
            && self.color == other.color
            && self.is_auto_color == other.is_auto_color
    }
}

impl TextElement {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const MIN_FONT_SIZE: f64 = 8.0;
    pub const MAX_FONT_SIZE: f64 = 200.0;

    pub fn new(id: ElementId, position: Point, content: String) -> Self {
        Self {
            id,
            position,
            width: 200.0,
            height: 100.0,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
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

    /// Replace the markup content, invalidating the cached bitmap.
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.cache.invalidate();
    }
}
