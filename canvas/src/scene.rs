//! Scene model: tables, their kinds and statuses, and the scene that owns them.
//!
//! A [`Shape`] is one placed table. Every shape has a local [`ShapeId`] that is
//! stable for its whole in-memory lifetime, and an optional durable id issued by
//! the persistence service on first save. Selection and history always refer to
//! the local id, so assigning a durable id mid-gesture never dangles anything.
//!
//! [`Scene`] keeps shapes in insertion order. Draw order is `z_index`
//! ascending with ties broken by that insertion order.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Camera, Point};
use crate::consts::{MAX_LABEL_CHARS, MAX_SEATS, MIN_SHAPE_SIZE};
use crate::geometry;

/// Local identifier for a table. Time-ordered (UUIDv7) and otherwise opaque.
pub type ShapeId = Uuid;

/// Durable identifier issued by the persistence service.
pub type DurableId = Uuid;

/// Generate a fresh local identifier.
#[must_use]
pub fn new_local_id() -> ShapeId {
    Uuid::now_v7()
}

/// The outline of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Round table; `width` is the diameter and always equals `height`.
    Circle,
    /// Free rectangle.
    Rectangle,
    /// Square table; `width` always equals `height`.
    Square,
}

impl ShapeKind {
    /// Whether resizes must keep `width == height`.
    #[must_use]
    pub fn is_aspect_locked(self) -> bool {
        matches!(self, Self::Circle | Self::Square)
    }

    /// Default `(width, height)` for a newly added table.
    #[must_use]
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::Circle | Self::Square => (80.0, 80.0),
            Self::Rectangle => (120.0, 80.0),
        }
    }

    /// Default seat count for a newly added table.
    #[must_use]
    pub fn default_seats(self) -> u32 {
        match self {
            Self::Circle | Self::Square => 4,
            Self::Rectangle => 6,
        }
    }

    /// Wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Square => "square",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "circle" => Some(Self::Circle),
            "rectangle" => Some(Self::Rectangle),
            "square" => Some(Self::Square),
            _ => None,
        }
    }
}

/// Occupancy status of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    /// Wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "occupied" => Some(Self::Occupied),
            "reserved" => Some(Self::Reserved),
            _ => None,
        }
    }
}

/// A placed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Local identifier, stable for the shape's in-memory lifetime.
    #[serde(default = "new_local_id")]
    pub id: ShapeId,
    /// Identifier issued by the persistence service, once saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durable_id: Option<DurableId>,
    pub kind: ShapeKind,
    /// Left edge of the unrotated bounding box in scene units.
    pub x: f64,
    /// Top edge of the unrotated bounding box in scene units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the centre, in `[0, 360)`.
    pub rotation: f64,
    pub seats: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: TableStatus,
    /// Stacking order; lower values are drawn beneath higher values.
    #[serde(default)]
    pub z_index: i64,
}

impl Shape {
    /// A new, unsaved table of `kind` with default size and seats at `(x, y)`.
    #[must_use]
    pub fn new(kind: ShapeKind, x: f64, y: f64) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: new_local_id(),
            durable_id: None,
            kind,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            seats: kind.default_seats(),
            label: String::new(),
            status: TableStatus::Available,
            z_index: 0,
        }
    }

    /// Centre of the bounding box in scene units.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move the shape so its centre lands on `center`, keeping its size.
    pub fn set_center(&mut self, center: Point) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }

    /// Enforce the shape invariants: minimum size, square aspect for locked
    /// kinds (growing to the larger side about the centre), a normalized
    /// rotation, and the seat and label limits the persistence service accepts.
    pub fn normalize(&mut self) {
        let center = self.center();
        self.width = sanitize_size(self.width);
        self.height = sanitize_size(self.height);
        if self.kind.is_aspect_locked() && self.width != self.height {
            let side = self.width.max(self.height);
            self.width = side;
            self.height = side;
        }
        self.set_center(center);
        self.rotation = geometry::normalize_degrees(self.rotation);
        self.seats = self.seats.min(MAX_SEATS);
        if self.label.chars().count() > MAX_LABEL_CHARS {
            self.label = self.label.chars().take(MAX_LABEL_CHARS).collect();
        }
    }
}

fn sanitize_size(value: f64) -> f64 {
    if value.is_finite() { value.max(MIN_SHAPE_SIZE) } else { MIN_SHAPE_SIZE }
}

/// Sparse property edit for a table. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
}

impl ShapeEdit {
    /// Apply the edit to `shape` and re-normalize it.
    pub fn apply_to(&self, shape: &mut Shape) {
        if let Some(kind) = self.kind {
            shape.kind = kind;
        }
        if let Some(x) = self.x {
            shape.x = x;
        }
        if let Some(y) = self.y {
            shape.y = y;
        }
        // Size edits keep the centre where it was.
        if self.width.is_some() || self.height.is_some() {
            let center = shape.center();
            if let Some(w) = self.width {
                shape.width = w;
            }
            if let Some(h) = self.height {
                shape.height = h;
            }
            shape.set_center(center);
        }
        if let Some(r) = self.rotation {
            shape.rotation = r;
        }
        if let Some(seats) = self.seats {
            shape.seats = seats;
        }
        if let Some(ref label) = self.label {
            shape.label.clone_from(label);
        }
        if let Some(status) = self.status {
            shape.status = status;
        }
        shape.normalize();
    }
}

/// The floor plan being edited: tables in insertion order plus view state.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<Shape>,
    /// Current pan offset and zoom factor.
    pub camera: Camera,
    /// Grid spacing in scene units.
    pub grid_size: f64,
    /// Whether drags, resizes and nudges snap to the grid.
    pub snap_to_grid: bool,
    /// Whether the grid is drawn.
    pub show_grid: bool,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new(grid_size: f64, snap_to_grid: bool, show_grid: bool) -> Self {
        Self { shapes: Vec::new(), camera: Camera::default(), grid_size, snap_to_grid, show_grid }
    }

    /// Append a shape. If a shape with the same `id` already exists it is
    /// replaced in place, keeping its insertion slot.
    pub fn insert(&mut self, shape: Shape) {
        if let Some(existing) = self.get_mut(&shape.id) {
            *existing = shape;
        } else {
            self.shapes.push(shape);
        }
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        let idx = self.shapes.iter().position(|s| s.id == *id)?;
        Some(self.shapes.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == *id)
    }

    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.get(id).is_some()
    }

    /// All shapes in insertion order.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Replace every shape (used by undo/redo and hydration).
    pub fn replace_shapes(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
    }

    /// Shapes sorted for drawing: `z_index` ascending, ties by insertion order.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&Shape> {
        let mut ordered: Vec<&Shape> = self.shapes.iter().collect();
        ordered.sort_by_key(|s| s.z_index);
        ordered
    }

    /// Highest `z_index` in the scene, or `None` when empty.
    #[must_use]
    pub fn max_z(&self) -> Option<i64> {
        self.shapes.iter().map(|s| s.z_index).max()
    }

    /// Lowest `z_index` in the scene, or `None` when empty.
    #[must_use]
    pub fn min_z(&self) -> Option<i64> {
        self.shapes.iter().map(|s| s.z_index).min()
    }

    /// The smallest positive integer not already used as a label.
    #[must_use]
    pub fn next_label(&self) -> String {
        let mut n: u32 = 1;
        loop {
            let candidate = n.to_string();
            if !self.shapes.iter().any(|s| s.label == candidate) {
                return candidate;
            }
            n = n.saturating_add(1);
        }
    }

    /// Apply a sparse edit. Returns `true` if the shape exists and changed.
    pub fn apply_edit(&mut self, id: &ShapeId, edit: &ShapeEdit) -> bool {
        let Some(shape) = self.get_mut(id) else {
            return false;
        };
        let before = shape.clone();
        edit.apply_to(shape);
        *shape != before
    }

    /// Write durable ids issued by the persistence service onto local shapes.
    /// Returns how many shapes were updated.
    pub fn assign_durable_ids(&mut self, assigned: &HashMap<ShapeId, DurableId>) -> usize {
        assign_durable_ids(&mut self.shapes, assigned)
    }

    /// Forget durable ids that `live` no longer contains. Returns how many
    /// shapes were cleared.
    pub fn clear_stale_durable_ids(&mut self, live: &HashSet<DurableId>) -> usize {
        clear_stale_durable_ids(&mut self.shapes, live)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Write durable ids onto any shape list (live scene or history snapshot).
pub fn assign_durable_ids(shapes: &mut [Shape], assigned: &HashMap<ShapeId, DurableId>) -> usize {
    let mut count = 0;
    for shape in shapes.iter_mut() {
        if let Some(durable) = assigned.get(&shape.id) {
            shape.durable_id = Some(*durable);
            count += 1;
        }
    }
    count
}

/// Drop durable ids that are not in `live`, so the tables they were on are
/// planned as creates again.
pub fn clear_stale_durable_ids(shapes: &mut [Shape], live: &HashSet<DurableId>) -> usize {
    let mut count = 0;
    for shape in shapes.iter_mut() {
        if shape.durable_id.is_some_and(|id| !live.contains(&id)) {
            shape.durable_id = None;
            count += 1;
        }
    }
    count
}
