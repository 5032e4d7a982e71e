//! Normalized input events and the gesture state machine.

use crate::elements::{Element, ElementId, SourceRef};
use crate::handles::{HandleKind, ResizeStart};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Double-click detection window.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Touch contact lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// A single touch contact event, in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Stable contact identifier for the duration of the touch.
    pub id: u64,
    pub phase: TouchPhase,
    pub position: Point,
}

/// Signals the engine emits for its external collaborators. The engine never
/// opens an editor or viewer itself.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    /// Double-click on a text element: the host should open its editor.
    OpenTextEditor { element: ElementId },
    /// Click on a pdf-reference preview region: the host should open the
    /// external sub-viewer with the current annotation list.
    OpenPdfPreview {
        element: ElementId,
        source: SourceRef,
        annotations: Vec<serde_json::Value>,
    },
}

/// The primary gesture. Exactly one is active at a time; entry happens on
/// pointer-down, exit on pointer-up, and pointer-move routes only to the
/// active variant.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Canvas panning; `last` is the previous pointer position in screen
    /// space.
    Panning { last: Point },
    /// Capturing a freehand path into a pen element.
    DrawingPath { element: ElementId },
    /// Dragging a resize handle. The original element is kept for abort.
    DraggingHandle {
        element: ElementId,
        handle: HandleKind,
        start: ResizeStart,
        original: Element,
    },
    /// Moving the selected elements: each move applies the incremental
    /// world-space delta to every selected element in place (render caches
    /// stay warm, a move does not invalidate them). The originals captured at
    /// gesture start are the abort state.
    DraggingElements {
        last: Point,
        originals: Vec<Element>,
    },
    /// Drag-drawing a marquee selection rectangle, in world space.
    MarqueeSelecting { start: Point, current: Point },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// The marquee rectangle, normalized, if a marquee drag is active.
    pub fn marquee_rect(&self) -> Option<kurbo::Rect> {
        match self {
            Gesture::MarqueeSelecting { start, current } => Some(kurbo::Rect::new(
                start.x.min(current.x),
                start.y.min(current.y),
                start.x.max(current.x),
                start.y.max(current.y),
            )),
            _ => None,
        }
    }
}

/// Double-click detection over successive left-button downs.
#[derive(Debug, Default)]
pub struct ClickTracker {
    last: Option<(Instant, Point)>,
}

impl ClickTracker {
    /// Register a left-button down; returns `true` when it completes a
    /// double-click (and resets, so a triple click does not chain).
    pub fn register(&mut self, position: Point) -> bool {
        let now = Instant::now();
        if let Some((time, point)) = self.last {
            let within_time = now.duration_since(time).as_millis() < DOUBLE_CLICK_TIME_MS;
            let within_distance = position.distance(point) < DOUBLE_CLICK_DISTANCE;
            if within_time && within_distance {
                self.last = None;
                return true;
            }
        }
        self.last = Some((now, position));
        false
    }
}

/// Active pinch gesture state. The start distance is rebased every frame so
/// the incremental zoom factors cannot compound error.
#[derive(Debug, Clone, Copy)]
pub struct PinchState {
    pub last_distance: f64,
    pub last_midpoint: Point,
}

/// Tracks live touch contacts and derives the pinch gesture from them.
#[derive(Debug, Default)]
pub struct TouchTracker {
    points: std::collections::BTreeMap<u64, Point>,
    pinch: Option<PinchState>,
    /// Contact currently mapped onto the pointer pipeline, if any.
    pointer_contact: Option<u64>,
}

impl TouchTracker {
    pub fn insert(&mut self, id: u64, position: Point) {
        self.points.insert(id, position);
    }

    pub fn update(&mut self, id: u64, position: Point) {
        self.points.insert(id, position);
    }

    pub fn remove(&mut self, id: u64) {
        self.points.remove(&id);
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    /// The two oldest contacts, when a pinch is possible.
    pub fn pinch_pair(&self) -> Option<(Point, Point)> {
        let mut iter = self.points.values();
        let a = *iter.next()?;
        let b = *iter.next()?;
        Some((a, b))
    }

    pub fn pinch(&self) -> Option<PinchState> {
        self.pinch
    }

    pub fn set_pinch(&mut self, pinch: Option<PinchState>) {
        self.pinch = pinch;
    }

    pub fn pointer_contact(&self) -> Option<u64> {
        self.pointer_contact
    }

    pub fn set_pointer_contact(&mut self, contact: Option<u64>) {
        self.pointer_contact = contact;
    }
}
