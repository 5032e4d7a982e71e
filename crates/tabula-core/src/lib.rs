//! Tabula Core Library
//!
//! Platform-agnostic data structures and logic for the Tabula infinite-canvas
//! whiteboard: camera transforms, the element model, boards and projects,
//! snapshot history, hit-testing, and the pointer-driven interaction engine.

pub mod board;
pub mod camera;
pub mod elements;
pub mod engine;
pub mod handles;
pub mod history;
pub mod host;
pub mod interaction;

pub use board::{Board, BoardState, Project};
pub use camera::Camera;
pub use elements::{
    BitmapHandle, Color, DashStyle, Element, ElementId, ShapeKind, SourceRef,
};
pub use engine::{Engine, EngineError};
pub use handles::{Corner, EdgeSide, Handle, HandleKind};
pub use history::History;
pub use host::{HostContext, ToolId};
pub use interaction::{EngineSignal, Gesture, Modifiers, PointerButton, TouchEvent, TouchPhase};
