//! Rendering: draws the floor plan to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of scene and UI state and produces pixels. It
//! never mutates editor state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point};
use crate::config::EditorConfig;
use crate::geometry::{Bounds, seat_positions};
use crate::hit::{self, HandleMetrics};
use crate::input::UiState;
use crate::scene::{Scene, Shape, ShapeKind, TableStatus};

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Grid lines closer than this on screen are not drawn.
const MIN_GRID_SPACING_PX: f64 = 4.0;

const SELECTION_COLOR: &str = "#1E90FF";
const HOVER_COLOR: &str = "rgba(30, 144, 255, 0.5)";
const GRID_COLOR: &str = "#E6E2DC";
const OUTLINE_COLOR: &str = "#4A4037";
const SEAT_COLOR: &str = "#8C7B6B";
const LABEL_COLOR: &str = "#1F1A17";

/// Draw the full scene: grid, tables, hover outline and selection UI.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    ui: &UiState,
    config: &EditorConfig,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    let camera = scene.camera;

    // Layer 1: clear and set up transforms.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    // Layer 2: grid over the visible scene rectangle.
    if scene.show_grid {
        draw_grid(ctx, &camera, scene.grid_size, visible_scene_rect(&camera, viewport_w, viewport_h));
    }

    // Layer 3: tables in draw order (bottom first).
    for shape in scene.draw_order() {
        draw_table(ctx, shape)?;
    }

    // Layer 4: hover and selection UI.
    if let Some(shape) = ui.hovered_id.filter(|id| ui.selected_id != Some(*id)).and_then(|id| scene.get(&id)) {
        draw_hover(ctx, shape, camera.zoom)?;
    }
    if let Some(shape) = ui.selected_id.and_then(|id| scene.get(&id)) {
        let metrics = HandleMetrics { size_px: config.handle_size_px, rotate_offset_px: config.rotate_handle_offset_px };
        draw_selection(ctx, shape, camera.zoom, metrics)?;
    }

    Ok(())
}

// =============================================================
// Grid
// =============================================================

/// The scene-space rectangle covered by the viewport.
#[must_use]
pub fn visible_scene_rect(camera: &Camera, viewport_w: f64, viewport_h: f64) -> Bounds {
    let top_left = camera.screen_to_scene(Point::new(0.0, 0.0));
    let bottom_right = camera.screen_to_scene(Point::new(viewport_w, viewport_h));
    Bounds {
        x: top_left.x,
        y: top_left.y,
        width: bottom_right.x - top_left.x,
        height: bottom_right.y - top_left.y,
    }
}

/// Multiples of `step` within `[start, end]`. Empty for a degenerate step or range.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn grid_lines(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0 && start.is_finite() && end.is_finite()) || end < start {
        return Vec::new();
    }
    let first = (start / step).ceil() as i64;
    let last = (end / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn draw_grid(ctx: &CanvasRenderingContext2d, camera: &Camera, grid: f64, view: Bounds) {
    if grid * camera.zoom < MIN_GRID_SPACING_PX {
        return;
    }
    ctx.save();
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0 / camera.zoom);
    ctx.begin_path();
    for x in grid_lines(view.x, view.x + view.width, grid) {
        ctx.move_to(x, view.y);
        ctx.line_to(x, view.y + view.height);
    }
    for y in grid_lines(view.y, view.y + view.height, grid) {
        ctx.move_to(view.x, y);
        ctx.line_to(view.x + view.width, y);
    }
    ctx.stroke();
    ctx.restore();
}

// =============================================================
// Tables
// =============================================================

/// Fill colour for a table's status.
#[must_use]
pub fn status_fill(status: TableStatus) -> &'static str {
    match status {
        TableStatus::Available => "#D8EFD3",
        TableStatus::Occupied => "#F4C7C3",
        TableStatus::Reserved => "#FCE8B2",
    }
}

fn draw_table(ctx: &CanvasRenderingContext2d, shape: &Shape) -> Result<(), JsValue> {
    // Seats sit outside the outline and are drawn first.
    ctx.save();
    ctx.set_fill_style_str(SEAT_COLOR);
    for seat in seat_positions(shape) {
        ctx.begin_path();
        ctx.arc(seat.x, seat.y, crate::consts::SEAT_RADIUS, 0.0, 2.0 * PI)?;
        ctx.fill();
    }
    ctx.restore();

    ctx.save();
    translate_and_rotate(ctx, shape)?;
    outline_path(ctx, shape)?;
    ctx.set_fill_style_str(status_fill(shape.status));
    ctx.fill();
    ctx.set_stroke_style_str(OUTLINE_COLOR);
    ctx.set_line_width(2.0);
    ctx.stroke();
    draw_label(ctx, shape)?;
    ctx.restore();
    Ok(())
}

fn draw_label(ctx: &CanvasRenderingContext2d, shape: &Shape) -> Result<(), JsValue> {
    let label = shape.label.trim();
    if label.is_empty() {
        return Ok(());
    }
    let font_size = (shape.width.min(shape.height) * 0.3).clamp(10.0, 24.0);
    ctx.set_fill_style_str(LABEL_COLOR);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font(&format!("{font_size:.0}px sans-serif"));
    ctx.fill_text(label, 0.0, 0.0)
}

fn draw_hover(ctx: &CanvasRenderingContext2d, shape: &Shape, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    translate_and_rotate(ctx, shape)?;
    outline_path(ctx, shape)?;
    ctx.set_stroke_style_str(HOVER_COLOR);
    ctx.set_line_width(2.0 / zoom);
    ctx.stroke();
    ctx.restore();
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(
    ctx: &CanvasRenderingContext2d,
    shape: &Shape,
    zoom: f64,
    metrics: HandleMetrics,
) -> Result<(), JsValue> {
    ctx.save();

    // Dashed bounding box (rotated with the table).
    translate_and_rotate(ctx, shape)?;

    let dash_world = SELECTION_DASH_PX / zoom;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;

    ctx.stroke_rect(-shape.width / 2.0, -shape.height / 2.0, shape.width, shape.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    ctx.restore();

    // Handles are drawn in scene coordinates, not the rotated context.
    let half = metrics.size_px / zoom / 2.0;
    let rh = hit::rotate_handle_position(shape, zoom, metrics);
    let top = shape.center().add(crate::geometry::rotate_vec(Point::new(0.0, -shape.height / 2.0), shape.rotation));

    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);

    // Stem from the top edge to the rotate handle.
    ctx.begin_path();
    ctx.move_to(top.x, top.y);
    ctx.line_to(rh.x, rh.y);
    ctx.stroke();

    for (_, pos) in hit::handle_positions(shape) {
        ctx.fill_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
        ctx.stroke_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
    }

    ctx.begin_path();
    ctx.arc(rh.x, rh.y, half, 0.0, 2.0 * PI)?;
    ctx.fill();
    ctx.stroke();

    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Translate to the table's centre and rotate by its rotation angle.
fn translate_and_rotate(ctx: &CanvasRenderingContext2d, shape: &Shape) -> Result<(), JsValue> {
    let center = shape.center();
    ctx.translate(center.x, center.y)?;
    ctx.rotate(shape.rotation.to_radians())?;
    Ok(())
}

/// Trace the table outline in its local (centred, unrotated) frame.
fn outline_path(ctx: &CanvasRenderingContext2d, shape: &Shape) -> Result<(), JsValue> {
    ctx.begin_path();
    match shape.kind {
        ShapeKind::Circle => ctx.arc(0.0, 0.0, shape.width / 2.0, 0.0, 2.0 * PI)?,
        ShapeKind::Rectangle | ShapeKind::Square => {
            ctx.rect(-shape.width / 2.0, -shape.height / 2.0, shape.width, shape.height);
        }
    }
    Ok(())
}
