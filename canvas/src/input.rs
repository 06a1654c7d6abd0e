//! Input model: modifier keys, mouse buttons, keyboard commands, and the
//! gesture state machine.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. A gesture can only begin from `Idle`, so exactly one handler
//! owns any given pointer-move frame.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::hit::ResizeAnchor;
use crate::scene::ShapeId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser's `KeyboardEvent.key`
/// (e.g. `"Delete"`, `"ArrowUp"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Whether this is the pan-modifier key (Space).
    #[must_use]
    pub fn is_pan_modifier(&self) -> bool {
        self.0 == " " || self.0 == "Space" || self.0 == "Spacebar"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down, zooms out).
    pub dy: f64,
}

/// Editor command bound to a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    /// Move the selection by one step in direction `(dx, dy)`; `large`
    /// when the modifier is held.
    Nudge { dx: f64, dy: f64, large: bool },
    Delete,
    Duplicate,
    Undo,
    Redo,
    ToggleGrid,
    ToggleSnap,
    ResetView,
    BringToFront,
    SendToBack,
    ClearSelection,
}

/// Resolve a key press to an editor command, if it is bound.
#[must_use]
pub fn key_command(key: &Key, modifiers: Modifiers) -> Option<KeyCommand> {
    let nudge = |dx, dy| Some(KeyCommand::Nudge { dx, dy, large: modifiers.shift });
    match key.0.as_str() {
        "ArrowLeft" => nudge(-1.0, 0.0),
        "ArrowRight" => nudge(1.0, 0.0),
        "ArrowUp" => nudge(0.0, -1.0),
        "ArrowDown" => nudge(0.0, 1.0),
        "Delete" | "Backspace" => Some(KeyCommand::Delete),
        "Escape" => Some(KeyCommand::ClearSelection),
        k if modifiers.command() => match k.to_ascii_lowercase().as_str() {
            "d" => Some(KeyCommand::Duplicate),
            "z" if modifiers.shift => Some(KeyCommand::Redo),
            "z" => Some(KeyCommand::Undo),
            "y" => Some(KeyCommand::Redo),
            _ => None,
        },
        "g" | "G" => Some(KeyCommand::ToggleGrid),
        "s" | "S" => Some(KeyCommand::ToggleSnap),
        "0" => Some(KeyCommand::ResetView),
        "]" => Some(KeyCommand::BringToFront),
        "[" => Some(KeyCommand::SendToBack),
        _ => None,
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected table, if any.
    pub selected_id: Option<ShapeId>,
    /// The table under the pointer while idle, if any.
    pub hovered_id: Option<ShapeId>,
    /// The CSS cursor most recently requested from the host.
    pub cursor: String,
    /// Keyboard focus is inside a text input; shortcuts are suppressed.
    pub text_focus: bool,
    /// The pan-modifier key is held.
    pub pan_key_held: bool,
    /// Host timestamp of the last processed hover update, in milliseconds.
    pub last_hover_ms: Option<f64>,
}

/// Internal state for the input state machine.
///
/// Each active variant carries the gesture context needed to compute the
/// next frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving the view by dragging.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// The user is moving a table.
    Dragging {
        id: ShapeId,
        /// Pointer position minus the table's top-left at drag start, in scene units.
        grab_offset: Point,
    },
    /// The user is resizing a table by one of its handles.
    Resizing {
        id: ShapeId,
        anchor: ResizeAnchor,
        /// Scene-space pointer position at the previous frame.
        last_scene: Point,
        /// Table centre when the gesture began; re-anchors each frame.
        start_center: Point,
    },
    /// The user is rotating a table by its rotate handle.
    Rotating {
        id: ShapeId,
        /// Rotation pivot: the table's centre.
        center: Point,
        /// Angle from centre to pointer at gesture start, in degrees.
        start_angle: f64,
        /// Table rotation at gesture start, in degrees.
        orig_rotation: f64,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The table this gesture manipulates, if any.
    #[must_use]
    pub fn target(&self) -> Option<ShapeId> {
        match *self {
            Self::Dragging { id, .. } | Self::Resizing { id, .. } | Self::Rotating { id, .. } => Some(id),
            Self::Idle | Self::Panning { .. } => None,
        }
    }
}
