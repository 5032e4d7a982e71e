//! Boards and projects: the ordered element store plus its saved camera.

use crate::camera::Camera;
use crate::elements::{Element, ElementId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A board: an ordered element sequence plus its saved camera.
///
/// Paint order is array order; the last element is drawn last and hit-tested
/// first, so visually-on-top elements win selection ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub elements: Vec<Element>,
    pub camera: Camera,
    next_element_id: ElementId,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            elements: Vec::new(),
            camera: Camera::new(),
            next_element_id: 1,
        }
    }

    /// Allocate the next monotonic element id for this board.
    pub fn alloc_id(&mut self) -> ElementId {
        let id = self.next_element_id;
        self.next_element_id += 1;
        id
    }

    /// Append an element on top of the paint order.
    pub fn push_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| el.id() == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.id() == id)
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|el| el.id() == id)?;
        Some(self.elements.remove(index))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|el| el.id() == id)
    }

    /// Topmost element hit at a world point, if any (reverse paint order).
    pub fn hit_test_top(&self, point: Point, scale: f64) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|el| el.hit_test(point, scale))
            .map(|el| el.id())
    }

    /// Elements selected by a marquee rectangle, in paint order.
    pub fn elements_in_marquee(&self, rect: Rect) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|el| el.marquee_hit(rect))
            .map(|el| el.id())
            .collect()
    }

    /// Remove all elements and reset the camera.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.camera.reset();
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Re-seed the id allocator after restoring an element sequence, so new
    /// ids never collide with restored ones.
    pub fn reseed_ids(&mut self) {
        let max = self.elements.iter().map(|el| el.id()).max().unwrap_or(0);
        self.next_element_id = self.next_element_id.max(max + 1);
    }
}

/// Persisted form of a single board: the element sequence (render caches
/// stripped) plus its camera. JSON-compatible tagged-union shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardState {
    pub elements: Vec<Element>,
    pub camera: Camera,
}

impl BoardState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A project: a collection of named boards, one of which is active.
///
/// Boards are owned in place, so the outgoing board's live element/camera
/// state is already in the project when the active index moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub boards: Vec<Board>,
    pub active: usize,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    pub fn new() -> Self {
        Self {
            boards: vec![Board::new("Board 1")],
            active: 0,
        }
    }

    pub fn active_board(&self) -> &Board {
        &self.boards[self.active]
    }

    pub fn active_board_mut(&mut self) -> &mut Board {
        &mut self.boards[self.active]
    }

    /// Add a new board; returns its index.
    pub fn add_board(&mut self, name: impl Into<String>) -> usize {
        self.boards.push(Board::new(name));
        self.boards.len() - 1
    }

    /// Switch the active board. Returns `false` for an out-of-range index.
    pub fn switch_to(&mut self, index: usize) -> bool {
        if index >= self.boards.len() {
            return false;
        }
        self.active = index;
        true
    }

    /// Find an element in any board, active or not.
    pub fn find_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.boards.iter_mut().find_map(|board| board.get_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Line, ShapeElement, ShapeKind};

    fn line(board: &mut Board, x: f64) -> ElementId {
        let id = board.alloc_id();
        board.push_element(Element::Line(Line::new(
            id,
            Point::new(x, 0.0),
            Point::new(x + 100.0, 0.0),
        )));
        id
    }

    #[test]
    fn test_monotonic_ids() {
        let mut board = Board::new("test");
        let a = board.alloc_id();
        let b = board.alloc_id();
        assert!(b > a);
    }

    #[test]
    fn test_topmost_wins_hit_ties() {
        let mut board = Board::new("test");
        let below = board.alloc_id();
        board.push_element(Element::Shape(ShapeElement::new(
            below,
            Point::new(0.0, 0.0),
            100.0,
            100.0,
            ShapeKind::Rectangle,
        )));
        let above = board.alloc_id();
        board.push_element(Element::Shape(ShapeElement::new(
            above,
            Point::new(50.0, 50.0),
            100.0,
            100.0,
            ShapeKind::Rectangle,
        )));

        // Point inside both boxes: the later (topmost) element wins.
        assert_eq!(board.hit_test_top(Point::new(75.0, 75.0), 1.0), Some(above));
        // Point only inside the lower element.
        assert_eq!(board.hit_test_top(Point::new(25.0, 25.0), 1.0), Some(below));
        assert_eq!(board.hit_test_top(Point::new(500.0, 500.0), 1.0), None);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut board = Board::new("test");
        let a = line(&mut board, 0.0);
        let b = line(&mut board, 200.0);
        let c = line(&mut board, 400.0);

        board.remove(b);
        let remaining: Vec<ElementId> = board.elements.iter().map(Element::id).collect();
        assert_eq!(remaining, vec![a, c]);
    }

    #[test]
    fn test_reseed_ids_after_restore() {
        let mut board = Board::new("test");
        let id = board.alloc_id();
        board.push_element(Element::Line(Line::new(id, Point::ZERO, Point::new(1.0, 0.0))));

        let mut restored = Board::new("restored");
        restored.elements = board.elements.clone();
        restored.reseed_ids();
        assert!(restored.alloc_id() > id);
    }

    #[test]
    fn test_find_element_across_boards() {
        let mut project = Project::new();
        let id = {
            let board = project.active_board_mut();
            line(board, 0.0)
        };
        let other = project.add_board("Board 2");
        project.switch_to(other);
        // The element is still reachable even though its board is inactive.
        assert!(project.find_element_mut(id).is_some());
    }
}
