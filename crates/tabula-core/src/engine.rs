//! The whiteboard engine: pointer-driven interaction and the command surface.
//!
//! All element/camera mutation happens synchronously inside the input
//! handling call stack; the only asynchronous boundary is bitmap delivery
//! through [`Engine::complete_raster`]. A pointer-down's history snapshot
//! always precedes the mutation it protects, and pointer-up finalizes exactly
//! one gesture.

use crate::board::{Board, BoardState, Project};
use crate::camera::Camera;
use crate::elements::{
    BitmapHandle, Element, ElementId, ImageElement, Line, PdfRef, Pen, ShapeElement, ShapeKind,
    SourceRef, TextElement,
};
use crate::handles::{apply_resize, hit_test_handles, ResizeStart};
use crate::history::History;
use crate::host::{theme_foreground, HostContext, ToolId};
use crate::interaction::{
    ClickTracker, EngineSignal, Gesture, Modifiers, PinchState, PointerButton, TouchEvent,
    TouchPhase, TouchTracker,
};
use kurbo::{Point, Size, Vec2};
use log::debug;
use thiserror::Error;

/// World-space offset applied to duplicated elements.
const DUPLICATE_OFFSET: f64 = 20.0;
/// Wheel delta divisor for ctrl/cmd zoom.
const WHEEL_ZOOM_DIVISOR: f64 = 500.0;

/// Errors surfaced to the host UI. No engine failure is fatal; every error
/// leaves the engine state unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed persisted state: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("duplicate element id {0} in persisted state")]
    DuplicateElementId(ElementId),
    #[error("project must contain at least one board")]
    EmptyProject,
}

/// The whiteboard engine. Owns the project, the selection, board-local
/// history, and the active gesture; talks to the host shell only through the
/// injected [`HostContext`].
pub struct Engine<H: HostContext> {
    host: H,
    project: Project,
    selection: Vec<ElementId>,
    history: History,
    gesture: Gesture,
    active_tool: ToolId,
    grid_enabled: bool,
    viewport: Size,
    clicks: ClickTracker,
    touches: TouchTracker,
}

impl<H: HostContext> Engine<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            project: Project::new(),
            selection: Vec::new(),
            history: History::new(),
            gesture: Gesture::Idle,
            active_tool: ToolId::Select,
            grid_enabled: true,
            viewport: Size::new(800.0, 600.0),
            clicks: ClickTracker::default(),
            touches: TouchTracker::default(),
        }
    }

    pub fn board(&self) -> &Board {
        self.project.active_board()
    }

    fn board_mut(&mut self) -> &mut Board {
        self.project.active_board_mut()
    }

    pub fn camera(&self) -> &Camera {
        &self.board().camera
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn active_tool(&self) -> ToolId {
        self.active_tool
    }

    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn is_light_theme(&self) -> bool {
        self.host.is_light_theme()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Tool/command surface
    // ------------------------------------------------------------------

    pub fn set_active_tool(&mut self, tool: ToolId) {
        self.active_tool = tool;
    }

    pub fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid_enabled = enabled;
    }

    pub fn resize_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Add a line centered in the current viewport.
    pub fn add_line(&mut self) -> ElementId {
        self.add_element(|id, center| {
            Element::Line(Line::new(
                id,
                center - Vec2::new(80.0, 0.0),
                center + Vec2::new(80.0, 0.0),
            ))
        })
    }

    /// Add a parametric shape centered in the current viewport.
    pub fn add_shape(&mut self, kind: ShapeKind) -> ElementId {
        self.add_element(|id, center| {
            Element::Shape(ShapeElement::new(
                id,
                center - Vec2::new(75.0, 50.0),
                150.0,
                100.0,
                kind,
            ))
        })
    }

    /// Add a text block centered in the current viewport.
    pub fn add_text(&mut self, content: impl Into<String>) -> ElementId {
        let content = content.into();
        self.add_element(|id, center| {
            Element::Text(TextElement::new(id, center - Vec2::new(100.0, 50.0), content))
        })
    }

    /// Add a formula block: a text element whose content is a display-math
    /// region for the external renderer.
    pub fn add_formula(&mut self, latex: impl Into<String>) -> ElementId {
        self.add_text(format!("$${}$$", latex.into()))
    }

    /// Add an image centered in the current viewport.
    pub fn add_image(&mut self, source: SourceRef) -> ElementId {
        self.add_element(|id, center| {
            Element::Image(ImageElement::new(id, center - Vec2::new(160.0, 120.0), source))
        })
    }

    /// Add an embedded-document reference card centered in the viewport.
    pub fn add_pdf_reference(&mut self, name: impl Into<String>, source: SourceRef) -> ElementId {
        let name = name.into();
        self.add_element(|id, center| {
            Element::PdfRef(PdfRef::new(id, center - Vec2::new(90.0, 120.0), name, source))
        })
    }

    fn add_element(&mut self, build: impl FnOnce(ElementId, Point) -> Element) -> ElementId {
        self.save_history();
        let center = self.camera().viewport_center_world(self.viewport);
        let id = self.board_mut().alloc_id();
        let mut element = build(id, center);
        element.sync_auto_colors(theme_foreground(self.host.is_light_theme()));
        self.board_mut().push_element(element);
        self.set_selection(vec![id]);
        id
    }

    /// Clone every selected element with fresh ids, offset so the copies are
    /// visible; the copies become the new selection.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        self.save_history();
        let mut new_ids = Vec::new();
        for id in self.selection.clone() {
            let Some(mut copy) = self.board().get(id).cloned() else {
                continue;
            };
            let new_id = self.board_mut().alloc_id();
            copy.set_id(new_id);
            copy.translate(Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET));
            self.board_mut().push_element(copy);
            new_ids.push(new_id);
        }
        self.set_selection(new_ids.clone());
        new_ids
    }

    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.save_history();
        for id in std::mem::take(&mut self.selection) {
            self.board_mut().remove(id);
        }
        self.host.selection_changed(&self.selection);
    }

    /// Remove every element and reset the camera. The camera reset is not
    /// undoable; the element removal is.
    pub fn clear_board(&mut self) {
        self.save_history();
        self.board_mut().clear();
        self.set_selection(Vec::new());
    }

    pub fn undo(&mut self) {
        let current = self.board().elements.clone();
        if let Some(snapshot) = self.history.undo(&current) {
            debug!("undo to {} elements", snapshot.len());
            let board = self.board_mut();
            board.elements = snapshot;
            board.reseed_ids();
            self.set_selection(Vec::new());
        }
        self.notify_history();
    }

    pub fn redo(&mut self) {
        let current = self.board().elements.clone();
        if let Some(snapshot) = self.history.redo(&current) {
            debug!("redo to {} elements", snapshot.len());
            let board = self.board_mut();
            board.elements = snapshot;
            board.reseed_ids();
            self.set_selection(Vec::new());
        }
        self.notify_history();
    }

    // ------------------------------------------------------------------
    // Boards
    // ------------------------------------------------------------------

    /// Add a new board; returns its index. Does not switch to it.
    pub fn add_board(&mut self, name: impl Into<String>) -> usize {
        self.project.add_board(name)
    }

    /// Switch the active board. The live state of the outgoing board stays in
    /// the project; selection and history are board-local and are cleared.
    pub fn switch_board(&mut self, index: usize) -> bool {
        if !self.project.switch_to(index) {
            return false;
        }
        debug!("switched to board {index}");
        self.gesture = Gesture::Idle;
        self.history.clear();
        self.set_selection(Vec::new());
        self.notify_history();
        true
    }

    // ------------------------------------------------------------------
    // External boundaries
    // ------------------------------------------------------------------

    /// Theme signal: rewrite every auto color/fill in the project and
    /// invalidate the cached bitmaps those colors are baked into.
    pub fn theme_changed(&mut self, is_light: bool) {
        let foreground = theme_foreground(is_light);
        let mut changed = 0usize;
        for board in &mut self.project.boards {
            for element in &mut board.elements {
                if element.sync_auto_colors(foreground) {
                    changed += 1;
                }
            }
        }
        debug!("theme change resynced {changed} elements");
    }

    /// Write back an annotation list from the external PDF sub-viewer. The
    /// element is searched in every board, active or not.
    pub fn set_pdf_annotations(
        &mut self,
        element: ElementId,
        annotations: Vec<serde_json::Value>,
    ) -> bool {
        for board in &mut self.project.boards {
            if let Some(Element::PdfRef(pdf)) = board.get_mut(element) {
                pdf.annotations = annotations;
                return true;
            }
        }
        false
    }

    /// Deliver the result of an asynchronous rasterization/decode request.
    ///
    /// A completion for content that was invalidated while the request was in
    /// flight is stale and ignored: the guard was cleared with the cache, so
    /// the next draw re-issues the request.
    pub fn complete_raster(&mut self, element: ElementId, result: Option<BitmapHandle>) {
        for board in &self.project.boards {
            if let Some(cache) = board.get(element).and_then(Element::render_cache) {
                if !cache.is_rendering() {
                    debug!("ignoring stale raster completion for element {element}");
                    return;
                }
                match result {
                    Some(bitmap) => cache.complete(bitmap),
                    None => cache.fail(),
                }
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence boundary
    // ------------------------------------------------------------------

    /// Snapshot of the active board for persistence: elements (render caches
    /// stripped by the deep copy) plus camera.
    pub fn board_state(&self) -> BoardState {
        BoardState {
            elements: self.board().elements.clone(),
            camera: self.camera().clone(),
        }
    }

    /// Replace the active board's contents. Malformed state is rejected with
    /// the engine untouched.
    pub fn load_board_state(&mut self, state: BoardState) -> Result<(), EngineError> {
        validate_unique_ids(&state.elements)?;
        let board = self.board_mut();
        board.elements = state.elements;
        board.camera = state.camera;
        board.reseed_ids();
        self.gesture = Gesture::Idle;
        self.history.clear();
        self.set_selection(Vec::new());
        self.notify_history();
        Ok(())
    }

    pub fn load_board_state_json(&mut self, json: &str) -> Result<(), EngineError> {
        let state = BoardState::from_json(json)?;
        self.load_board_state(state)
    }

    /// Replace the whole project. Validated board-by-board before anything is
    /// applied.
    pub fn load_project(&mut self, project: Project) -> Result<(), EngineError> {
        if project.boards.is_empty() {
            return Err(EngineError::EmptyProject);
        }
        for board in &project.boards {
            validate_unique_ids(&board.elements)?;
        }
        let mut project = project;
        project.active = project.active.min(project.boards.len() - 1);
        for board in &mut project.boards {
            board.reseed_ids();
        }
        self.project = project;
        self.gesture = Gesture::Idle;
        self.history.clear();
        self.set_selection(Vec::new());
        self.notify_history();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Handle a pointer-down, resolving it in priority order: pan trigger,
    /// double-click routing, pen capture, handle drag, body drag / preview
    /// short-circuit, marquee.
    pub fn pointer_down(
        &mut self,
        position: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Option<EngineSignal> {
        if !self.gesture.is_idle() {
            return None;
        }
        let world = self.camera().screen_to_world(position);
        let scale = self.camera().scale;

        // 1. Pan trigger: shift, middle button, or the explicit pan tool.
        if modifiers.shift || button == PointerButton::Middle || self.active_tool == ToolId::Pan {
            self.gesture = Gesture::Panning { last: position };
            return None;
        }
        if button != PointerButton::Left {
            return None;
        }

        // 2. Double-click on a text element routes to the external editor
        // without starting a drag.
        if self.clicks.register(position) {
            if let Some(id) = self.board().hit_test_top(world, scale) {
                if matches!(self.board().get(id), Some(Element::Text(_))) {
                    return Some(EngineSignal::OpenTextEditor { element: id });
                }
            }
        }

        // 3. Pen tool: snapshot, then start capturing raw points.
        if self.active_tool == ToolId::Pen {
            self.save_history();
            let id = self.board_mut().alloc_id();
            let mut pen = Pen::new(id);
            pen.color = theme_foreground(self.host.is_light_theme());
            pen.add_point(world);
            self.board_mut().push_element(Element::Pen(pen));
            self.gesture = Gesture::DrawingPath { element: id };
            return None;
        }

        // 4. Handles of selected elements win over any body drag.
        for id in self.selection.clone() {
            let Some(element) = self.board().get(id) else {
                continue;
            };
            if let Some(handle) = hit_test_handles(element, world, scale) {
                let start = ResizeStart::capture(element);
                let original = element.clone();
                self.save_history();
                self.gesture = Gesture::DraggingHandle {
                    element: id,
                    handle,
                    start,
                    original,
                };
                return None;
            }
        }

        // 5. Body hit test over all elements, topmost first.
        if let Some(id) = self.board().hit_test_top(world, scale) {
            if let Some(Element::PdfRef(pdf)) = self.board().get(id) {
                if pdf.preview_region().contains(world) {
                    return Some(EngineSignal::OpenPdfPreview {
                        element: id,
                        source: pdf.source,
                        annotations: pdf.annotations.clone(),
                    });
                }
            }
            if !self.selection.contains(&id) {
                self.set_selection(vec![id]);
            }
            self.save_history();
            let originals: Vec<Element> = self
                .selection
                .iter()
                .filter_map(|&sel| self.board().get(sel).cloned())
                .collect();
            self.gesture = Gesture::DraggingElements {
                last: world,
                originals,
            };
        } else {
            self.set_selection(Vec::new());
            self.gesture = Gesture::MarqueeSelecting {
                start: world,
                current: world,
            };
        }
        None
    }

    /// Route a pointer move to the active gesture only.
    pub fn pointer_move(&mut self, position: Point) {
        let world = self.camera().screen_to_world(position);
        let gesture = std::mem::take(&mut self.gesture);
        self.gesture = match gesture {
            Gesture::Panning { last } => {
                self.board_mut().camera.pan(position - last);
                Gesture::Panning { last: position }
            }
            Gesture::DrawingPath { element } => {
                if let Some(Element::Pen(pen)) = self.board_mut().get_mut(element) {
                    pen.add_point(world);
                }
                Gesture::DrawingPath { element }
            }
            Gesture::DraggingHandle {
                element,
                handle,
                start,
                original,
            } => {
                if let Some(target) = self.board_mut().get_mut(element) {
                    apply_resize(target, handle, world, &start);
                }
                Gesture::DraggingHandle {
                    element,
                    handle,
                    start,
                    original,
                }
            }
            Gesture::DraggingElements { last, originals } => {
                let delta = world - last;
                for original in &originals {
                    if let Some(target) = self.board_mut().get_mut(original.id()) {
                        target.translate(delta);
                    }
                }
                Gesture::DraggingElements {
                    last: world,
                    originals,
                }
            }
            Gesture::MarqueeSelecting { start, .. } => Gesture::MarqueeSelecting {
                start,
                current: world,
            },
            Gesture::Idle => Gesture::Idle,
        };
    }

    /// Finalize the active gesture.
    pub fn pointer_up(&mut self, _position: Point) {
        let gesture = std::mem::take(&mut self.gesture);
        match &gesture {
            Gesture::MarqueeSelecting { .. } => {
                if let Some(rect) = gesture.marquee_rect() {
                    let ids = self.board().elements_in_marquee(rect);
                    self.set_selection(ids);
                }
            }
            Gesture::DrawingPath { element } => {
                self.set_selection(vec![*element]);
            }
            _ => {}
        }
    }

    /// Abort the active gesture (e.g. Escape), restoring the state captured
    /// at gesture start.
    pub fn abort_gesture(&mut self) {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::DrawingPath { element } => {
                self.board_mut().remove(element);
                // The restored state equals the snapshot taken at gesture
                // start, so that entry is redundant.
                self.history.discard_last_save();
                self.notify_history();
            }
            Gesture::DraggingHandle {
                element, original, ..
            } => {
                if let Some(target) = self.board_mut().get_mut(element) {
                    *target = original;
                }
                self.history.discard_last_save();
                self.notify_history();
            }
            Gesture::DraggingElements { originals, .. } => {
                for original in originals {
                    if let Some(target) = self.board_mut().get_mut(original.id()) {
                        *target = original;
                    }
                }
                self.history.discard_last_save();
                self.notify_history();
            }
            Gesture::Panning { .. } | Gesture::MarqueeSelecting { .. } | Gesture::Idle => {}
        }
    }

    /// Wheel input: ctrl/cmd zooms at the pointer, plain scroll pans.
    pub fn scroll(&mut self, position: Point, delta: Vec2, modifiers: Modifiers) {
        if modifiers.ctrl || modifiers.meta {
            let factor = 1.0 - delta.y / WHEEL_ZOOM_DIVISOR;
            if (factor - 1.0).abs() > 0.001 {
                self.board_mut().camera.zoom_at(factor, position);
            }
        } else {
            self.board_mut().camera.pan(delta);
        }
    }

    // ------------------------------------------------------------------
    // Touch input
    // ------------------------------------------------------------------

    /// Handle a touch contact. A single contact maps onto the pointer
    /// pipeline; two contacts form a combined pinch-zoom + pan gesture.
    pub fn touch(&mut self, event: TouchEvent) -> Option<EngineSignal> {
        match event.phase {
            TouchPhase::Started => {
                self.touches.insert(event.id, event.position);
                match self.touches.count() {
                    1 => {
                        self.touches.set_pointer_contact(Some(event.id));
                        return self.pointer_down(
                            event.position,
                            PointerButton::Left,
                            Modifiers::default(),
                        );
                    }
                    2 => {
                        // The second finger turns the interaction into a
                        // pinch: any single-touch gesture is abandoned.
                        if self.touches.pointer_contact().is_some() {
                            self.touches.set_pointer_contact(None);
                            self.abort_gesture();
                        }
                        if let Some((a, b)) = self.touches.pinch_pair() {
                            self.touches.set_pinch(Some(PinchState {
                                last_distance: a.distance(b).max(f64::EPSILON),
                                last_midpoint: a.midpoint(b),
                            }));
                        }
                    }
                    _ => {}
                }
            }
            TouchPhase::Moved => {
                self.touches.update(event.id, event.position);
                if let (Some(pinch), Some((a, b))) =
                    (self.touches.pinch(), self.touches.pinch_pair())
                {
                    let distance = a.distance(b).max(f64::EPSILON);
                    let midpoint = a.midpoint(b);
                    let camera = &mut self.board_mut().camera;
                    camera.zoom_at(distance / pinch.last_distance, midpoint);
                    camera.pan(midpoint - pinch.last_midpoint);
                    // Rebase every frame so incremental factors cannot
                    // compound error.
                    self.touches.set_pinch(Some(PinchState {
                        last_distance: distance,
                        last_midpoint: midpoint,
                    }));
                } else if self.touches.pointer_contact() == Some(event.id) {
                    self.pointer_move(event.position);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(event.id);
                if self.touches.count() < 2 {
                    self.touches.set_pinch(None);
                }
                if self.touches.pointer_contact() == Some(event.id) {
                    self.touches.set_pointer_contact(None);
                    self.pointer_up(event.position);
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn save_history(&mut self) {
        let elements = self.project.active_board().elements.clone();
        self.history.save(&elements);
        self.notify_history();
    }

    fn set_selection(&mut self, ids: Vec<ElementId>) {
        if self.selection != ids {
            self.selection = ids;
            self.host.selection_changed(&self.selection);
        }
    }

    fn notify_history(&mut self) {
        let can_undo = self.history.can_undo();
        let can_redo = self.history.can_redo();
        self.host.history_changed(can_undo, can_redo);
    }
}

fn validate_unique_ids(elements: &[Element]) -> Result<(), EngineError> {
    let mut seen = std::collections::HashSet::new();
    for element in elements {
        if !seen.insert(element.id()) {
            return Err(EngineError::DuplicateElementId(element.id()));
        }
    }
    Ok(())
}
