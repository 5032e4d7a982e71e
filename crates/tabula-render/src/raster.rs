//! Content rasterizer boundary (markup + math → bitmap).

use tabula_core::elements::{Color, ElementId};
use thiserror::Error;

/// A fire-and-forget rasterization request for a content-bearing element.
///
/// The color and theme are baked into the produced bitmap, which is why any
/// color or theme change invalidates the element's cache.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRequest {
    pub element: ElementId,
    /// Raw markup: markdown, optionally containing `$...$` or `$$...$$`
    /// math. For document reference cards this is the display name.
    pub markup: String,
    /// Box size in world units.
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub color: Color,
    pub light_theme: bool,
}

/// Recoverable rasterization failures. The engine leaves the bitmap unset
/// and retries on the next draw; nothing here is fatal.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("rasterizer unavailable: {0}")]
    Unavailable(String),
    #[error("rasterization rejected: {0}")]
    Rejected(String),
}

/// External markup renderer. Implementations rasterize asynchronously and
/// deliver results through `Engine::complete_raster`; there is no
/// cancellation, stale completions are ignored by the engine.
pub trait ContentRasterizer {
    fn request(&self, request: RasterRequest) -> Result<(), RasterError>;
}
