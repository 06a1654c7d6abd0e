//! Top-level editor engine.
//!
//! [`EngineCore`] holds every piece of editor state and all editing logic
//! without touching the browser, so it is tested natively. [`Engine`] wraps
//! it together with the canvas element and its 2D context.
//!
//! Every handler returns a list of [`Action`]s for the host to act on.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashSet;

use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::config::{EditorConfig, ResizePolicy};
use crate::consts::{CASCADE_STEP, DEFAULT_PLACEMENT, NUDGE_LARGE, NUDGE_SMALL, ROTATION_SNAP_DEG};
use crate::geometry::{self, angle_deg, normalize_degrees, rotate_vec, snap, snap_degrees};
use crate::hit::{self, HandleMetrics, Hit, HitPart};
use crate::history::{History, Snapshot};
use crate::input::{Button, InputState, Key, KeyCommand, Modifiers, UiState, WheelDelta, key_command};
use crate::notice::Notice;
use crate::render;
use crate::scene::{Scene, Shape, ShapeEdit, ShapeId, ShapeKind, new_local_id};
use crate::sync::{self, PersistedShape, SaveOutcome, SaveReport, SyncError, SyncPlan};

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShapeCreated(ShapeId),
    ShapeUpdated(ShapeId),
    ShapeDeleted(ShapeId),
    SelectionChanged(Option<ShapeId>),
    SetCursor(String),
    Notify(Notice),
    RenderNeeded,
}

/// Fatal engine construction failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The canvas element would not hand out a 2D context.
    #[error("2D canvas context unavailable")]
    ContextUnavailable,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
pub struct EngineCore {
    pub config: EditorConfig,
    pub scene: Scene,
    pub history: History,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    /// Pre-gesture state, pushed to history on the gesture's first real change.
    gesture_snapshot: Option<Snapshot>,
    /// Last server-confirmed tables.
    baseline: Vec<PersistedShape>,
    save_in_flight: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(mut config: EditorConfig) -> Self {
        config.sanitize();
        Self {
            scene: Scene::new(config.grid_size, config.snap_to_grid, config.show_grid),
            history: History::new(config.history_depth),
            config,
            ui: UiState { cursor: "default".to_owned(), ..UiState::default() },
            input: InputState::Idle,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            gesture_snapshot: None,
            baseline: Vec::new(),
            save_in_flight: false,
        }
    }

    // --- Data inputs ---

    /// Replace the scene with the tables persisted on the server. Clears
    /// history and selection.
    pub fn load_baseline(&mut self, rows: Vec<PersistedShape>) -> Vec<Action> {
        self.scene.replace_shapes(rows.iter().map(PersistedShape::to_shape).collect());
        self.baseline = rows;
        self.history.clear();
        self.input = InputState::Idle;
        self.gesture_snapshot = None;
        self.ui.hovered_id = None;
        let mut actions = self.set_selection(None);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// A table was removed by some other code path. Aborts a gesture that
    /// targets it instead of mutating a table that no longer exists.
    pub fn apply_delete(&mut self, id: &ShapeId) -> Vec<Action> {
        if self.scene.remove(id).is_none() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.input.target() == Some(*id) {
            actions.extend(self.end_gesture());
        }
        if self.ui.hovered_id == Some(*id) {
            self.ui.hovered_id = None;
        }
        if self.ui.selected_id == Some(*id) {
            actions.extend(self.set_selection(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    }

    /// Mark whether keyboard focus is inside a text input.
    pub fn set_text_focus(&mut self, focused: bool) {
        self.ui.text_focus = focused;
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<ShapeId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.scene.camera
    }

    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.scene.get(id)
    }

    #[must_use]
    pub fn baseline(&self) -> &[PersistedShape] {
        &self.baseline
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    /// The operations a save would dispatch against the last known baseline.
    #[must_use]
    pub fn sync_plan(&self) -> SyncPlan {
        sync::diff(self.scene.shapes(), &self.baseline)
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        !self.sync_plan().is_empty()
    }

    // --- Editing ---

    /// Add a table of `kind` with default geometry near the viewport centre.
    #[allow(clippy::float_cmp)]
    pub fn add_shape(&mut self, kind: ShapeKind) -> Vec<Action> {
        if let Some(refused) = self.refuse_while_saving() {
            return refused;
        }
        let (w, h) = kind.default_size();
        let origin = self.placement_origin(w, h);
        let (grid, snap_on) = (self.scene.grid_size, self.scene.snap_to_grid);
        let mut x = snap(origin.x, grid, snap_on);
        let mut y = snap(origin.y, grid, snap_on);
        while self.scene.shapes().iter().any(|s| s.x == x && s.y == y) {
            x += CASCADE_STEP;
            y += CASCADE_STEP;
        }

        let mut shape = Shape::new(kind, x, y);
        shape.label = self.scene.next_label();
        shape.z_index = self.scene.max_z().map_or(0, |z| z + 1);
        self.insert_new(shape)
    }

    /// Copy the selected table at an offset, as a new unsaved table on top.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        if let Some(refused) = self.refuse_while_saving() {
            return refused;
        }
        let Some(source) = self.selected_shape().cloned() else {
            return vec![Action::Notify(Notice::NoTableSelected)];
        };
        let mut copy = source;
        copy.id = new_local_id();
        copy.durable_id = None;
        copy.x += CASCADE_STEP;
        copy.y += CASCADE_STEP;
        copy.label = self.scene.next_label();
        copy.z_index = self.scene.max_z().map_or(0, |z| z + 1);
        self.insert_new(copy)
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        if let Some(refused) = self.refuse_while_saving() {
            return refused;
        }
        let Some(id) = self.ui.selected_id.filter(|id| self.scene.contains(id)) else {
            return vec![Action::Notify(Notice::NoTableSelected)];
        };
        self.record();
        self.scene.remove(&id);
        if self.ui.hovered_id == Some(id) {
            self.ui.hovered_id = None;
        }
        let mut actions = vec![Action::ShapeDeleted(id)];
        actions.extend(self.set_selection(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply a property edit to the selected table. An edit that changes
    /// nothing leaves history untouched.
    pub fn apply_edit(&mut self, edit: &ShapeEdit) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.filter(|id| self.scene.contains(id)) else {
            return vec![Action::Notify(Notice::NoTableSelected)];
        };
        let before = self.snapshot();
        if !self.scene.apply_edit(&id, edit) {
            return Vec::new();
        }
        self.history.push(before);
        vec![Action::ShapeUpdated(id), Action::RenderNeeded]
    }

    pub fn bring_to_front(&mut self) -> Vec<Action> {
        self.restack(true)
    }

    pub fn send_to_back(&mut self) -> Vec<Action> {
        self.restack(false)
    }

    /// Move the selected table one step in direction `(dx, dy)`. A large step
    /// is the grid size while snapping, otherwise a fixed distance.
    pub fn nudge(&mut self, dx: f64, dy: f64, large: bool) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.filter(|id| self.scene.contains(id)) else {
            return vec![Action::Notify(Notice::NoTableSelected)];
        };
        let step = match (large, self.scene.snap_to_grid) {
            (false, _) => NUDGE_SMALL,
            (true, true) => self.scene.grid_size,
            (true, false) => NUDGE_LARGE,
        };
        self.record();
        if let Some(shape) = self.scene.get_mut(&id) {
            shape.x += dx * step;
            shape.y += dy * step;
        }
        vec![Action::ShapeUpdated(id), Action::RenderNeeded]
    }

    pub fn undo(&mut self) -> Vec<Action> {
        if let Some(refused) = self.refuse_while_saving() {
            return refused;
        }
        if !self.input.is_idle() {
            return Vec::new();
        }
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(restored) => self.restore(restored),
            None => vec![Action::Notify(Notice::NothingToUndo)],
        }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        if let Some(refused) = self.refuse_while_saving() {
            return refused;
        }
        if !self.input.is_idle() {
            return Vec::new();
        }
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(restored) => self.restore(restored),
            None => vec![Action::Notify(Notice::NothingToRedo)],
        }
    }

    pub fn toggle_grid(&mut self) -> Vec<Action> {
        self.scene.show_grid = !self.scene.show_grid;
        vec![Action::RenderNeeded]
    }

    pub fn toggle_snap(&mut self) -> Vec<Action> {
        self.scene.snap_to_grid = !self.scene.snap_to_grid;
        vec![Action::RenderNeeded]
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        self.scene.camera = Camera::default();
        vec![Action::RenderNeeded]
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        let mut actions = self.set_selection(None);
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Pointer input ---

    /// Resolve what is under the pointer and begin the matching gesture:
    /// the selection's resize handles, then its rotate handle, then the
    /// topmost table body, whatever the button. An empty spot pans the view
    /// when the pan key is held or a non-primary button is pressed, and
    /// otherwise clears selection.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }

        let scene_pt = self.scene.camera.screen_to_scene(screen_pt);
        let hit = hit::hit_scene(scene_pt, &self.scene, self.ui.selected_id, self.handle_metrics());
        let Some(Hit { shape_id: id, part }) = hit else {
            if self.ui.pan_key_held || button != Button::Primary {
                return self.begin_pan(screen_pt);
            }
            return self.clear_selection();
        };
        let Some(shape) = self.scene.get(&id) else {
            return Vec::new();
        };

        let center = shape.center();
        let (state, cursor) = match part {
            HitPart::ResizeHandle(anchor) => (
                InputState::Resizing { id, anchor, last_scene: scene_pt, start_center: center },
                anchor.cursor(shape.rotation),
            ),
            HitPart::RotateHandle => (
                InputState::Rotating {
                    id,
                    center,
                    start_angle: angle_deg(center, scene_pt),
                    orig_rotation: shape.rotation,
                },
                "grabbing",
            ),
            HitPart::Body => (
                InputState::Dragging { id, grab_offset: scene_pt.sub(Point::new(shape.x, shape.y)) },
                "move",
            ),
        };
        debug!(?state, "gesture started");
        self.input = state;
        self.gesture_snapshot = Some(self.snapshot());

        let mut actions = self.set_selection(Some(id));
        actions.extend(self.set_cursor(cursor));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Advance the active gesture, or update hover feedback while idle.
    /// Hover updates are throttled by `timestamp_ms`; gestures never are.
    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers, timestamp_ms: f64) -> Vec<Action> {
        let scene_pt = self.scene.camera.screen_to_scene(screen_pt);
        match self.input {
            InputState::Idle => self.hover(scene_pt, timestamp_ms),
            InputState::Panning { last_screen } => {
                let delta = screen_pt.sub(last_screen);
                self.scene.camera.pan_by(delta.x, delta.y);
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::RenderNeeded]
            }
            InputState::Dragging { id, grab_offset } => self.drag_frame(id, grab_offset, scene_pt),
            InputState::Resizing { id, anchor, last_scene, start_center } => {
                self.input = InputState::Resizing { id, anchor, last_scene: scene_pt, start_center };
                self.resize_frame(id, anchor, scene_pt.sub(last_scene), start_center)
            }
            InputState::Rotating { id, center, start_angle, orig_rotation } => {
                let delta = angle_deg(center, scene_pt) - start_angle;
                self.rotate_frame(id, orig_rotation + delta, modifiers.shift)
            }
        }
    }

    /// End any gesture. The committed state is whatever the last move produced.
    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        self.end_gesture()
    }

    /// Zoom anchored at the pointer: the scene point under the cursor stays
    /// under the cursor.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if !delta.dy.is_finite() || delta.dy == 0.0 {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { self.config.zoom_step } else { 1.0 / self.config.zoom_step };
        let before = self.scene.camera;
        let target = before.zoom * factor;
        self.scene
            .camera
            .zoom_at(screen_pt, target, self.config.min_zoom, self.config.max_zoom);
        if self.scene.camera == before {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    // --- Keyboard input ---

    /// Handle a key press. Shortcuts run only while idle and never while a
    /// text input has focus.
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        if self.ui.text_focus {
            return Vec::new();
        }
        if key.is_pan_modifier() {
            if self.ui.pan_key_held {
                return Vec::new();
            }
            self.ui.pan_key_held = true;
            if !self.input.is_idle() {
                return Vec::new();
            }
            return self.set_cursor("grab").into_iter().collect();
        }
        if !self.input.is_idle() {
            return Vec::new();
        }
        match key_command(&key, modifiers) {
            Some(command) => self.run_command(command),
            None => Vec::new(),
        }
    }

    pub fn on_key_up(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if !key.is_pan_modifier() || !self.ui.pan_key_held {
            return Vec::new();
        }
        self.ui.pan_key_held = false;
        if !self.input.is_idle() {
            return Vec::new();
        }
        self.set_cursor("default").into_iter().collect()
    }

    fn run_command(&mut self, command: KeyCommand) -> Vec<Action> {
        match command {
            KeyCommand::Nudge { dx, dy, large } => self.nudge(dx, dy, large),
            KeyCommand::Delete => self.delete_selected(),
            KeyCommand::Duplicate => self.duplicate_selected(),
            KeyCommand::Undo => self.undo(),
            KeyCommand::Redo => self.redo(),
            KeyCommand::ToggleGrid => self.toggle_grid(),
            KeyCommand::ToggleSnap => self.toggle_snap(),
            KeyCommand::ResetView => self.reset_view(),
            KeyCommand::BringToFront => self.bring_to_front(),
            KeyCommand::SendToBack => self.send_to_back(),
            KeyCommand::ClearSelection => self.clear_selection(),
        }
    }

    // --- Save ---

    /// Start a save: returns the tables to reconcile, or a notice when a
    /// save is already running. Destructive edits are refused until
    /// [`EngineCore::finish_save`].
    ///
    /// # Errors
    ///
    /// Returns [`Notice::SaveInProgress`] if a save has not finished yet.
    pub fn begin_save(&mut self) -> Result<Vec<Shape>, Notice> {
        if self.save_in_flight {
            return Err(Notice::SaveInProgress);
        }
        self.save_in_flight = true;
        Ok(self.snapshot())
    }

    /// Fold the result of [`sync::save`] back into the scene: durable ids go
    /// onto the live tables and every history snapshot, and the re-fetched
    /// baseline replaces the old one.
    pub fn finish_save(&mut self, result: Result<SaveReport, SyncError>) -> Vec<Action> {
        self.save_in_flight = false;
        let notice = match result {
            Ok(report) => {
                self.scene.assign_durable_ids(&report.assigned);
                self.history.assign_durable_ids(&report.assigned);
                // A failed re-fetch keeps the previous baseline.
                if let Some(rows) = report.baseline {
                    let live: HashSet<_> = rows.iter().map(|row| row.id).collect();
                    let stale =
                        self.scene.clear_stale_durable_ids(&live) + self.history.clear_stale_durable_ids(&live);
                    if stale > 0 {
                        debug!(stale, "cleared durable ids missing from the refreshed baseline");
                    }
                    self.baseline = rows;
                }
                match report.outcome {
                    SaveOutcome::NoChanges => Notice::NoChanges,
                    SaveOutcome::Saved { .. } => Notice::Saved,
                    SaveOutcome::Partial { failed, total } => Notice::SavePartiallyFailed { failed, total },
                    SaveOutcome::Failed { total } => {
                        Notice::SaveFailed { reason: format!("none of {total} changes were saved") }
                    }
                }
            }
            Err(e) => Notice::SaveFailed { reason: e.to_string() },
        };
        vec![Action::Notify(notice), Action::RenderNeeded]
    }

    // --- Gesture frames ---

    fn drag_frame(&mut self, id: ShapeId, grab_offset: Point, scene_pt: Point) -> Vec<Action> {
        let Some(mut shape) = self.scene.get(&id).cloned() else {
            return self.end_gesture();
        };
        let (grid, snap_on) = (self.scene.grid_size, self.scene.snap_to_grid);
        shape.x = snap(scene_pt.x - grab_offset.x, grid, snap_on);
        shape.y = snap(scene_pt.y - grab_offset.y, grid, snap_on);
        self.commit_frame(shape)
    }

    fn resize_frame(&mut self, id: ShapeId, anchor: hit::ResizeAnchor, delta_scene: Point, start_center: Point) -> Vec<Action> {
        let Some(mut shape) = self.scene.get(&id).cloned() else {
            return self.end_gesture();
        };
        let delta_local = rotate_vec(delta_scene, -shape.rotation);
        let mut bounds = geometry::resize(&shape, anchor, delta_local, self.config.resize_policy);
        if self.config.resize_policy == ResizePolicy::FixedCenter {
            // Re-anchor on the gesture's starting centre so rounding never drifts it.
            bounds.x = start_center.x - bounds.width / 2.0;
            bounds.y = start_center.y - bounds.height / 2.0;
        }
        let (grid, snap_on) = (self.scene.grid_size, self.scene.snap_to_grid);
        shape.x = snap(bounds.x, grid, snap_on);
        shape.y = snap(bounds.y, grid, snap_on);
        shape.width = bounds.width;
        shape.height = bounds.height;
        self.commit_frame(shape)
    }

    fn rotate_frame(&mut self, id: ShapeId, rotation: f64, snap_angle: bool) -> Vec<Action> {
        let Some(mut shape) = self.scene.get(&id).cloned() else {
            return self.end_gesture();
        };
        shape.rotation = if snap_angle {
            snap_degrees(rotation, ROTATION_SNAP_DEG)
        } else {
            normalize_degrees(rotation)
        };
        self.commit_frame(shape)
    }

    /// Store a gesture's new table state. The first frame that changes
    /// anything pushes the pre-gesture snapshot.
    fn commit_frame(&mut self, next: Shape) -> Vec<Action> {
        if self.scene.get(&next.id) == Some(&next) {
            return Vec::new();
        }
        if let Some(before) = self.gesture_snapshot.take() {
            self.history.push(before);
        }
        let id = next.id;
        self.scene.insert(next);
        vec![Action::ShapeUpdated(id), Action::RenderNeeded]
    }

    fn end_gesture(&mut self) -> Vec<Action> {
        debug!(state = ?self.input, "gesture ended");
        self.input = InputState::Idle;
        self.gesture_snapshot = None;
        let cursor = if self.ui.pan_key_held { "grab" } else { "default" };
        let mut actions: Vec<Action> = self.set_cursor(cursor).into_iter().collect();
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_pan(&mut self, screen_pt: Point) -> Vec<Action> {
        self.input = InputState::Panning { last_screen: screen_pt };
        self.set_cursor("grabbing").into_iter().collect()
    }

    fn hover(&mut self, scene_pt: Point, timestamp_ms: f64) -> Vec<Action> {
        if let Some(last) = self.ui.last_hover_ms {
            if timestamp_ms >= last && timestamp_ms - last < self.config.hover_throttle_ms {
                return Vec::new();
            }
        }
        self.ui.last_hover_ms = Some(timestamp_ms);

        let hit = hit::hit_scene(scene_pt, &self.scene, self.ui.selected_id, self.handle_metrics());
        let cursor = match hit {
            Some(Hit { shape_id, part: HitPart::ResizeHandle(anchor) }) => {
                anchor.cursor(self.scene.get(&shape_id).map_or(0.0, |s| s.rotation))
            }
            Some(Hit { part: HitPart::RotateHandle, .. }) => "grab",
            Some(Hit { part: HitPart::Body, .. }) => "move",
            None if self.ui.pan_key_held => "grab",
            None => "default",
        };

        let mut actions = Vec::new();
        let hovered = hit.map(|h| h.shape_id);
        if hovered != self.ui.hovered_id {
            self.ui.hovered_id = hovered;
            actions.push(Action::RenderNeeded);
        }
        actions.extend(self.set_cursor(cursor));
        actions
    }

    // --- Helpers ---

    fn handle_metrics(&self) -> HandleMetrics {
        HandleMetrics { size_px: self.config.handle_size_px, rotate_offset_px: self.config.rotate_handle_offset_px }
    }

    fn selected_shape(&self) -> Option<&Shape> {
        self.ui.selected_id.and_then(|id| self.scene.get(&id))
    }

    fn snapshot(&self) -> Snapshot {
        self.scene.shapes().to_vec()
    }

    fn record(&mut self) {
        let before = self.snapshot();
        self.history.push(before);
    }

    fn refuse_while_saving(&self) -> Option<Vec<Action>> {
        self.save_in_flight.then(|| vec![Action::Notify(Notice::SaveInProgress)])
    }

    fn set_selection(&mut self, id: Option<ShapeId>) -> Vec<Action> {
        if self.ui.selected_id == id {
            return Vec::new();
        }
        self.ui.selected_id = id;
        vec![Action::SelectionChanged(id)]
    }

    fn set_cursor(&mut self, cursor: &str) -> Option<Action> {
        if self.ui.cursor == cursor {
            return None;
        }
        cursor.clone_into(&mut self.ui.cursor);
        Some(Action::SetCursor(cursor.to_owned()))
    }

    /// Top-left for a new table: centred under the viewport centre, or a
    /// fixed origin before the host has reported a viewport.
    fn placement_origin(&self, width: f64, height: f64) -> Point {
        if self.viewport_width > 0.0 && self.viewport_height > 0.0 {
            let center = self
                .scene
                .camera
                .screen_to_scene(Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0));
            Point::new(center.x - width / 2.0, center.y - height / 2.0)
        } else {
            Point::new(DEFAULT_PLACEMENT, DEFAULT_PLACEMENT)
        }
    }

    fn insert_new(&mut self, shape: Shape) -> Vec<Action> {
        let id = shape.id;
        self.record();
        self.scene.insert(shape);
        let mut actions = vec![Action::ShapeCreated(id)];
        actions.extend(self.set_selection(Some(id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn restack(&mut self, to_front: bool) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.filter(|id| self.scene.contains(id)) else {
            return vec![Action::Notify(Notice::NoTableSelected)];
        };
        let order = self.scene.draw_order();
        let edge = if to_front { order.last() } else { order.first() };
        if edge.map(|s| s.id) == Some(id) {
            return Vec::new();
        }
        let z = if to_front {
            self.scene.max_z().map_or(0, |z| z + 1)
        } else {
            self.scene.min_z().map_or(0, |z| z - 1)
        };
        self.record();
        if let Some(shape) = self.scene.get_mut(&id) {
            shape.z_index = z;
        }
        vec![Action::ShapeUpdated(id), Action::RenderNeeded]
    }

    fn restore(&mut self, shapes: Snapshot) -> Vec<Action> {
        self.scene.replace_shapes(shapes);
        if self.ui.hovered_id.is_some_and(|id| !self.scene.contains(&id)) {
            self.ui.hovered_id = None;
        }
        let mut actions = Vec::new();
        if self.ui.selected_id.is_some_and(|id| !self.scene.contains(&id)) {
            actions.extend(self.set_selection(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ContextUnavailable`] if the canvas cannot
    /// provide a 2D rendering context. The host shows a static message with
    /// a manual retry.
    pub fn new(canvas: HtmlCanvasElement, config: EditorConfig) -> Result<Self, EngineError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| EngineError::ContextUnavailable)?
            .ok_or(EngineError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::ContextUnavailable)?;
        Ok(Self { canvas, ctx, core: EngineCore::new(config) })
    }

    // --- Delegated data inputs ---

    pub fn load_baseline(&mut self, rows: Vec<PersistedShape>) -> Vec<Action> {
        self.core.load_baseline(rows)
    }

    pub fn apply_delete(&mut self, id: &ShapeId) -> Vec<Action> {
        self.core.apply_delete(id)
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the
    /// canvas backing store to match.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        let core = &self.core;
        self.canvas.set_width((core.viewport_width * core.dpr).round() as u32);
        self.canvas.set_height((core.viewport_height * core.dpr).round() as u32);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers, timestamp_ms: f64) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers, timestamp_ms)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn on_key_up(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_up(key, modifiers)
    }

    // --- Save ---

    /// # Errors
    ///
    /// Returns [`Notice::SaveInProgress`] if a save has not finished yet.
    pub fn begin_save(&mut self) -> Result<Vec<Shape>, Notice> {
        self.core.begin_save()
    }

    pub fn finish_save(&mut self, result: Result<SaveReport, SyncError>) -> Vec<Action> {
        self.core.finish_save(result)
    }

    // --- Render ---

    /// Draw the current state to the canvas. The host calls this once per
    /// animation frame.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let core = &self.core;
        render::draw(
            &self.ctx,
            &core.scene,
            &core.ui,
            &core.config,
            core.viewport_width,
            core.viewport_height,
            core.dpr,
        )
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<ShapeId> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.core.shape(id)
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.core.has_unsaved_changes()
    }
}
