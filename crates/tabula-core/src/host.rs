//! Host boundary: the injected context and tool identifiers.

use crate::elements::{Color, ElementId};
use serde::{Deserialize, Serialize};

/// Drag tools the interaction state machine routes on. Element creation
/// (shapes, text, images, documents) goes through the engine's command
/// surface instead of a drag tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    #[default]
    Select,
    Pan,
    Pen,
}

/// The small interface the engine needs from its host UI shell, injected at
/// construction. This replaces any global "active app" reference: the engine
/// knows nothing about the shell beyond these calls.
pub trait HostContext {
    /// Whether the light theme is active (drives auto colors and is baked
    /// into rasterized bitmaps).
    fn is_light_theme(&self) -> bool;

    /// Called after every selection change with the new selection.
    fn selection_changed(&mut self, selected: &[ElementId]);

    /// Called whenever undo/redo availability may have changed.
    fn history_changed(&mut self, can_undo: bool, can_redo: bool);
}

/// Foreground color tracked by auto-colored elements for a theme.
pub fn theme_foreground(is_light: bool) -> Color {
    if is_light {
        Color::new(30, 30, 30, 255)
    } else {
        Color::new(232, 232, 232, 255)
    }
}

/// Canvas background color for a theme.
pub fn theme_background(is_light: bool) -> Color {
    if is_light {
        Color::new(250, 250, 250, 255)
    } else {
        Color::new(24, 24, 26, 255)
    }
}
