//! Tabula renderer: a backend-independent scene builder.
//!
//! [`scene::build_scene`] is a pure function of (camera, board, interaction
//! state) producing a display list; executing it on a GPU or window surface
//! is the host shell's concern behind the [`renderer::Renderer`] trait.

pub mod decode;
pub mod raster;
pub mod renderer;
pub mod scene;

pub use decode::{DecodeError, ImageDecoder, InMemoryDecoder};
pub use raster::{ContentRasterizer, RasterError, RasterRequest};
pub use renderer::{RenderContext, Renderer, SceneRenderer};
pub use scene::{build_scene, DrawCmd, Scene};
