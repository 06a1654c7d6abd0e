//! Geometry engine: pure, stateless math shared by input, hit-testing and rendering.
//!
//! Rotations are clockwise in degrees on a y-down screen, matching
//! `CanvasRenderingContext2d::rotate`. A shape rotates about its centre; its
//! `x`/`y` always describe the unrotated bounding box.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::camera::Point;
use crate::config::ResizePolicy;
use crate::consts::{MIN_SHAPE_SIZE, SEAT_OFFSET};
use crate::hit::ResizeAnchor;
use crate::scene::{Shape, ShapeKind};

/// An axis-aligned box in the shape's unrotated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Rotate a vector clockwise by `degrees`.
#[must_use]
pub fn rotate_vec(v: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotate `p` clockwise by `degrees` around `center`.
#[must_use]
pub fn rotate_about(p: Point, center: Point, degrees: f64) -> Point {
    center.add(rotate_vec(p.sub(center), degrees))
}

/// Express a scene point in the shape's local frame: origin at the centre,
/// axes aligned with the unrotated shape.
#[must_use]
pub fn to_local(p: Point, shape: &Shape) -> Point {
    rotate_vec(p.sub(shape.center()), -shape.rotation)
}

/// Normalize an angle into `[0, 360)`. Non-finite input maps to `0`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

/// Snap an angle to the nearest multiple of `step` degrees, normalized.
#[must_use]
pub fn snap_degrees(degrees: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return normalize_degrees(degrees);
    }
    normalize_degrees((degrees / step).round() * step)
}

/// Direction from `from` to `to`, in degrees.
#[must_use]
pub fn angle_deg(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Round `value` to the nearest multiple of `grid` when `enabled`.
#[must_use]
pub fn snap(value: f64, grid: f64, enabled: bool) -> f64 {
    if !enabled || grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Seat centres around a table, in scene space.
///
/// Circles place seats evenly on a ring `SEAT_OFFSET` outside the rim,
/// starting at the top. Rectangles and squares walk the perimeter clockwise
/// from the top-left corner and drop a seat every `perimeter / seats` units,
/// starting half a step in, pushed `SEAT_OFFSET` outward from the edge.
#[must_use]
pub fn seat_positions(shape: &Shape) -> Vec<Point> {
    if shape.seats == 0 {
        return Vec::new();
    }
    let count = f64::from(shape.seats);
    let center = shape.center();

    let local: Vec<Point> = match shape.kind {
        ShapeKind::Circle => {
            let r = shape.width / 2.0 + SEAT_OFFSET;
            (0..shape.seats)
                .map(|i| {
                    let a = -FRAC_PI_2 + TAU * f64::from(i) / count;
                    Point::new(r * a.cos(), r * a.sin())
                })
                .collect()
        }
        ShapeKind::Rectangle | ShapeKind::Square => {
            let perimeter = 2.0 * (shape.width + shape.height);
            if perimeter <= 0.0 {
                return Vec::new();
            }
            let step = perimeter / count;
            (0..shape.seats)
                .map(|i| perimeter_point(shape.width, shape.height, step / 2.0 + step * f64::from(i)))
                .collect()
        }
    };

    local
        .into_iter()
        .map(|p| center.add(rotate_vec(p, shape.rotation)))
        .collect()
}

/// Point at arc length `d` along the perimeter (clockwise from the top-left
/// corner), offset outward by `SEAT_OFFSET`, in the centred local frame.
fn perimeter_point(w: f64, h: f64, d: f64) -> Point {
    let hw = w / 2.0;
    let hh = h / 2.0;
    if d < w {
        Point::new(-hw + d, -hh - SEAT_OFFSET)
    } else if d < w + h {
        Point::new(hw + SEAT_OFFSET, -hh + (d - w))
    } else if d < 2.0 * w + h {
        Point::new(hw - (d - w - h), hh + SEAT_OFFSET)
    } else {
        Point::new(-hw - SEAT_OFFSET, hh - (d - 2.0 * w - h))
    }
}

/// Resize keeping the shape's centre fixed. See [`resize`].
#[must_use]
pub fn resize_with_fixed_center(shape: &Shape, anchor: ResizeAnchor, delta_local: Point) -> Bounds {
    resize(shape, anchor, delta_local, ResizePolicy::FixedCenter)
}

/// Compute new bounds from dragging `anchor` by `delta_local` (a pointer
/// delta already rotated into the shape's local frame).
///
/// Each dimension is clamped to `MIN_SHAPE_SIZE`. Aspect-locked kinds then
/// take the dimension with the larger change for both sides.
///
/// Under [`ResizePolicy::FixedCenter`] the grabbed handle sits half a
/// dimension from the fixed centre, so keeping it under the pointer means the
/// dimension changes by twice the pointer's travel along that axis (gain 2).
/// Under [`ResizePolicy::OppositeAnchor`] the dimension changes by the travel
/// itself (gain 1) and the centre shifts by half the net growth, rotated back
/// into scene space, so the opposite handle stays put.
#[must_use]
pub fn resize(shape: &Shape, anchor: ResizeAnchor, delta_local: Point, policy: ResizePolicy) -> Bounds {
    let (sx, sy) = anchor.direction();
    let dx = if delta_local.x.is_finite() { delta_local.x } else { 0.0 };
    let dy = if delta_local.y.is_finite() { delta_local.y } else { 0.0 };
    let gain = match policy {
        ResizePolicy::FixedCenter => 2.0,
        ResizePolicy::OppositeAnchor => 1.0,
    };
    let dw = sx * dx * gain;
    let dh = sy * dy * gain;

    let mut width = (shape.width + dw).max(MIN_SHAPE_SIZE);
    let mut height = (shape.height + dh).max(MIN_SHAPE_SIZE);
    if shape.kind.is_aspect_locked() {
        let side = if dw.abs() >= dh.abs() { width } else { height };
        width = side;
        height = side;
    }

    let center = shape.center();
    let new_center = match policy {
        ResizePolicy::FixedCenter => center,
        ResizePolicy::OppositeAnchor => {
            let shift = Point::new(sx * (width - shape.width) / 2.0, sy * (height - shape.height) / 2.0);
            center.add(rotate_vec(shift, shape.rotation))
        }
    };

    Bounds { x: new_center.x - width / 2.0, y: new_center.y - height / 2.0, width, height }
}
