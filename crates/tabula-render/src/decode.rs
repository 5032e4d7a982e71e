//! Image decoder boundary and an in-memory implementation.

use image::GenericImageView;
use std::cell::RefCell;
use std::collections::HashMap;
use tabula_core::elements::{BitmapHandle, ElementId, SourceRef};
use thiserror::Error;

/// Recoverable decode failures; the element keeps its placeholder and the
/// next draw retries.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown image source")]
    UnknownSource,
    #[error("image decode failed: {0}")]
    Decode(String),
}

/// External decoder for image and preview-card sources. Like the content
/// rasterizer, requests are fire-and-forget; completions flow back through
/// `Engine::complete_raster`.
pub trait ImageDecoder {
    fn request(&self, element: ElementId, source: &SourceRef) -> Result<(), DecodeError>;
}

/// Decoder over host-registered in-memory byte buffers, backed by the
/// `image` crate. Decoding happens at request time; completions are queued
/// and drained by the host's frame loop, which keeps the one-extra-frame
/// staleness contract of the async boundary.
#[derive(Default)]
pub struct InMemoryDecoder {
    sources: HashMap<SourceRef, Vec<u8>>,
    completed: RefCell<Vec<(ElementId, Option<BitmapHandle>)>>,
}

impl InMemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the encoded bytes behind a source reference.
    pub fn insert_source(&mut self, source: SourceRef, bytes: Vec<u8>) {
        self.sources.insert(source, bytes);
    }

    /// Take the queued completions, to be fed to `Engine::complete_raster`.
    pub fn drain_completions(&self) -> Vec<(ElementId, Option<BitmapHandle>)> {
        self.completed.borrow_mut().drain(..).collect()
    }
}

impl ImageDecoder for InMemoryDecoder {
    fn request(&self, element: ElementId, source: &SourceRef) -> Result<(), DecodeError> {
        let bytes = self.sources.get(source).ok_or(DecodeError::UnknownSource)?;
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                let (width, height) = decoded.dimensions();
                self.completed
                    .borrow_mut()
                    .push((element, Some(BitmapHandle::new(width, height))));
                Ok(())
            }
            Err(err) => {
                // Corrupt data is recoverable: queue a failed completion so
                // the in-flight guard is released.
                self.completed.borrow_mut().push((element, None));
                Err(DecodeError::Decode(err.to_string()))
            }
        }
    }
}
