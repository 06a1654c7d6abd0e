//! Hit-testing against tables, their resize handles and the rotate handle.
//!
//! Every test counter-rotates the query point into the shape's local frame
//! and compares against unrotated geometry, so results are symmetric under
//! rotation: rotating a shape and a query point by the same angle about the
//! shape's centre never changes the answer.
//!
//! Handle hit boxes are a fixed screen-space size divided by zoom, so they
//! keep a constant visual size at every zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::geometry::{self, rotate_vec, to_local};
use crate::scene::{Scene, Shape, ShapeId, ShapeKind};

/// Which part of a table was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Anchor position for resize handles, named by their unrotated direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// Handles offered on rectangles and squares: four corners and four edge centres.
    pub const ALL: [ResizeAnchor; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// Handles offered on circles: the four cardinal points.
    pub const CARDINAL: [ResizeAnchor; 4] = [Self::N, Self::E, Self::S, Self::W];

    /// Unit direction `(sx, sy)` of the handle from the centre; `0` on an
    /// axis the handle does not affect.
    #[must_use]
    pub fn direction(self) -> (f64, f64) {
        match self {
            Self::N => (0.0, -1.0),
            Self::Ne => (1.0, -1.0),
            Self::E => (1.0, 0.0),
            Self::Se => (1.0, 1.0),
            Self::S => (0.0, 1.0),
            Self::Sw => (-1.0, 1.0),
            Self::W => (-1.0, 0.0),
            Self::Nw => (-1.0, -1.0),
        }
    }

    /// Compass bearing of the unrotated handle (N = 0, clockwise).
    #[must_use]
    pub fn bearing(self) -> f64 {
        match self {
            Self::N => 0.0,
            Self::Ne => 45.0,
            Self::E => 90.0,
            Self::Se => 135.0,
            Self::S => 180.0,
            Self::Sw => 225.0,
            Self::W => 270.0,
            Self::Nw => 315.0,
        }
    }

    /// CSS resize cursor for this handle once the shape is rotated by
    /// `rotation` degrees, so the cursor follows the handle's visual
    /// orientation rather than its nominal one.
    #[must_use]
    pub fn cursor(self, rotation: f64) -> &'static str {
        let visual = geometry::normalize_degrees(self.bearing() + rotation);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let octant = ((visual / 45.0).round() as u32) % 4;
        match octant {
            0 => "ns-resize",
            1 => "nesw-resize",
            2 => "ew-resize",
            _ => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub shape_id: ShapeId,
    pub part: HitPart,
}

/// Screen-space sizing for handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    /// Side length of a handle's hit box, in screen pixels.
    pub size_px: f64,
    /// Distance from the top edge to the rotate handle, in screen pixels.
    pub rotate_offset_px: f64,
}

/// Whether `p` (scene space) lies inside `shape`.
#[must_use]
pub fn hit_test(p: Point, shape: &Shape) -> bool {
    let local = to_local(p, shape);
    match shape.kind {
        ShapeKind::Circle => {
            let r = shape.width / 2.0;
            local.x * local.x + local.y * local.y <= r * r
        }
        ShapeKind::Rectangle | ShapeKind::Square => {
            local.x.abs() <= shape.width / 2.0 && local.y.abs() <= shape.height / 2.0
        }
    }
}

/// Handles offered by a shape's kind.
#[must_use]
pub fn handles_for(kind: ShapeKind) -> &'static [ResizeAnchor] {
    match kind {
        ShapeKind::Circle => &ResizeAnchor::CARDINAL,
        ShapeKind::Rectangle | ShapeKind::Square => &ResizeAnchor::ALL,
    }
}

/// Handle centre in the shape's local frame.
#[must_use]
pub fn handle_local_position(shape: &Shape, anchor: ResizeAnchor) -> Point {
    let (sx, sy) = anchor.direction();
    Point::new(sx * shape.width / 2.0, sy * shape.height / 2.0)
}

/// Handle centres in scene space, for drawing.
#[must_use]
pub fn handle_positions(shape: &Shape) -> Vec<(ResizeAnchor, Point)> {
    let center = shape.center();
    handles_for(shape.kind)
        .iter()
        .map(|&a| (a, center.add(rotate_vec(handle_local_position(shape, a), shape.rotation))))
        .collect()
}

/// The resize handle of `shape` under `p` (scene space), if any.
#[must_use]
pub fn find_handle(p: Point, shape: &Shape, zoom: f64, metrics: HandleMetrics) -> Option<ResizeAnchor> {
    let half = metrics.size_px / zoom / 2.0;
    let local = to_local(p, shape);
    handles_for(shape.kind).iter().copied().find(|&a| {
        let h = handle_local_position(shape, a);
        (local.x - h.x).abs() <= half && (local.y - h.y).abs() <= half
    })
}

/// Rotate handle centre in the shape's local frame.
fn rotate_handle_local(shape: &Shape, zoom: f64, metrics: HandleMetrics) -> Point {
    Point::new(0.0, -(shape.height / 2.0 + metrics.rotate_offset_px / zoom))
}

/// Rotate handle centre in scene space: a fixed offset beyond the top edge,
/// along the shape's rotated orientation.
#[must_use]
pub fn rotate_handle_position(shape: &Shape, zoom: f64, metrics: HandleMetrics) -> Point {
    shape
        .center()
        .add(rotate_vec(rotate_handle_local(shape, zoom, metrics), shape.rotation))
}

/// Whether `p` (scene space) is on the rotate handle of `shape`.
#[must_use]
pub fn find_rotation_handle(p: Point, shape: &Shape, zoom: f64, metrics: HandleMetrics) -> bool {
    let half = metrics.size_px / zoom / 2.0;
    let local = to_local(p, shape);
    let h = rotate_handle_local(shape, zoom, metrics);
    (local.x - h.x).abs() <= half && (local.y - h.y).abs() <= half
}

/// The topmost shape containing `p`, if any.
#[must_use]
pub fn shape_at(p: Point, scene: &Scene) -> Option<ShapeId> {
    scene
        .draw_order()
        .into_iter()
        .rev()
        .find(|s| hit_test(p, s))
        .map(|s| s.id)
}

/// Resolve what is under `p`: the selected shape's resize handles first, then
/// its rotate handle, then every shape topmost-first.
#[must_use]
pub fn hit_scene(p: Point, scene: &Scene, selected: Option<ShapeId>, metrics: HandleMetrics) -> Option<Hit> {
    let zoom = scene.camera.zoom;
    if let Some(shape) = selected.and_then(|id| scene.get(&id)) {
        if let Some(anchor) = find_handle(p, shape, zoom, metrics) {
            return Some(Hit { shape_id: shape.id, part: HitPart::ResizeHandle(anchor) });
        }
        if find_rotation_handle(p, shape, zoom, metrics) {
            return Some(Hit { shape_id: shape.id, part: HitPart::RotateHandle });
        }
    }
    shape_at(p, scene).map(|shape_id| Hit { shape_id, part: HitPart::Body })
}
