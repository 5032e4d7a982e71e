//! Snapshot-based undo/redo over a board's element sequence.

use crate::elements::Element;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Stack-of-snapshots history manager.
///
/// Each snapshot is a deep value copy of the whole element sequence; render
/// caches are not carried (element clones start cold). Saving is O(element
/// count) per edit, which is fine at human-paced interaction rates. Camera
/// state is deliberately never part of a snapshot: undo must not move the
/// viewport.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Vec<Element>>,
    redo_stack: Vec<Vec<Element>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the current state onto the undo stack (call before mutating).
    ///
    /// A save identical to the top of the stack is skipped, so accidental
    /// no-op saves do not grow history. Every real save clears the redo
    /// stack; the oldest entries are evicted first once the depth bound is
    /// reached.
    pub fn save(&mut self, elements: &[Element]) {
        if self.undo_stack.last().is_some_and(|top| top == elements) {
            return;
        }
        self.undo_stack.push(elements.to_vec());
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the most recent snapshot, pushing `current` onto the redo stack.
    /// Returns the element sequence to restore, or `None` if nothing to undo.
    pub fn undo(&mut self, current: &[Element]) -> Option<Vec<Element>> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        Some(snapshot)
    }

    /// Mirror of [`History::undo`].
    pub fn redo(&mut self, current: &[Element]) -> Option<Vec<Element>> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        Some(snapshot)
    }

    /// Drop the most recent save without touching the redo stack. Used when a
    /// gesture is aborted after its pre-mutation snapshot was taken.
    pub fn discard_last_save(&mut self) {
        self.undo_stack.pop();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget everything (board switch, board load).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }
}
