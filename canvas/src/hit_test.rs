#![allow(clippy::float_cmp)]

use super::*;
use crate::camera::Camera;
use crate::geometry::rotate_about;

const METRICS: HandleMetrics = HandleMetrics { size_px: 10.0, rotate_offset_px: 30.0 };

fn make_shape(kind: ShapeKind, x: f64, y: f64, w: f64, h: f64) -> Shape {
    let mut shape = Shape::new(kind, x, y);
    shape.width = w;
    shape.height = h;
    shape
}

fn scene_with(shapes: Vec<Shape>) -> Scene {
    let mut scene = Scene::new(20.0, false, true);
    for s in shapes {
        scene.insert(s);
    }
    scene
}

// =============================================================
// ResizeAnchor
// =============================================================

#[test]
fn anchor_directions_are_unit_steps() {
    for a in ResizeAnchor::ALL {
        let (sx, sy) = a.direction();
        assert!(sx.abs() <= 1.0 && sy.abs() <= 1.0);
        assert!(sx != 0.0 || sy != 0.0);
    }
}

#[test]
fn cursor_unrotated() {
    assert_eq!(ResizeAnchor::N.cursor(0.0), "ns-resize");
    assert_eq!(ResizeAnchor::S.cursor(0.0), "ns-resize");
    assert_eq!(ResizeAnchor::E.cursor(0.0), "ew-resize");
    assert_eq!(ResizeAnchor::Ne.cursor(0.0), "nesw-resize");
    assert_eq!(ResizeAnchor::Sw.cursor(0.0), "nesw-resize");
    assert_eq!(ResizeAnchor::Nw.cursor(0.0), "nwse-resize");
    assert_eq!(ResizeAnchor::Se.cursor(0.0), "nwse-resize");
}

#[test]
fn cursor_follows_visual_orientation() {
    // Top-centre rotated a quarter turn sits on the east side.
    assert_eq!(ResizeAnchor::N.cursor(90.0), "ew-resize");
    assert_eq!(ResizeAnchor::E.cursor(90.0), "ns-resize");
    assert_eq!(ResizeAnchor::N.cursor(45.0), "nesw-resize");
    assert_eq!(ResizeAnchor::Ne.cursor(45.0), "ew-resize");
    assert_eq!(ResizeAnchor::N.cursor(-45.0), "nwse-resize");
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn hit_test_rectangle_inside_and_outside() {
    let shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    assert!(hit_test(Point::new(50.0, 25.0), &shape));
    assert!(hit_test(Point::new(99.0, 49.0), &shape));
    assert!(!hit_test(Point::new(101.0, 25.0), &shape));
    assert!(!hit_test(Point::new(50.0, -1.0), &shape));
}

#[test]
fn hit_test_circle_excludes_bounding_box_corners() {
    let shape = make_shape(ShapeKind::Circle, 0.0, 0.0, 80.0, 80.0);
    assert!(hit_test(Point::new(40.0, 40.0), &shape));
    assert!(hit_test(Point::new(40.0, 1.0), &shape));
    assert!(!hit_test(Point::new(2.0, 2.0), &shape));
}

#[test]
fn hit_test_respects_rotation() {
    // 100 x 20 bar centred at (50, 10); rotated 90° it becomes vertical.
    let mut shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 20.0);
    assert!(hit_test(Point::new(95.0, 10.0), &shape));
    shape.rotation = 90.0;
    assert!(!hit_test(Point::new(95.0, 10.0), &shape));
    assert!(hit_test(Point::new(50.0, 55.0), &shape));
}

#[test]
fn hit_tests_are_rotation_symmetric() {
    let samples = [
        Point::new(5.0, 5.0),
        Point::new(60.0, 20.0),
        Point::new(110.0, 40.0),
        Point::new(100.5, 0.5),
        Point::new(50.0, -30.0),
        Point::new(50.0, -20.0),
        Point::new(1.0, 49.0),
    ];
    for kind in [ShapeKind::Rectangle, ShapeKind::Square, ShapeKind::Circle] {
        let base = make_shape(kind, 0.0, 0.0, 100.0, 50.0);
        let c = base.center();
        for theta in [17.0, 90.0, 181.0, 333.0] {
            let mut rotated = base.clone();
            rotated.rotation = theta;
            for p in samples {
                let q = rotate_about(p, c, theta);
                assert_eq!(hit_test(p, &base), hit_test(q, &rotated), "{kind:?} θ={theta} p={p:?}");
                assert_eq!(
                    find_handle(p, &base, 1.5, METRICS),
                    find_handle(q, &rotated, 1.5, METRICS),
                    "{kind:?} θ={theta} p={p:?}"
                );
                assert_eq!(
                    find_rotation_handle(p, &base, 1.5, METRICS),
                    find_rotation_handle(q, &rotated, 1.5, METRICS),
                );
            }
        }
    }
}

// =============================================================
// find_handle
// =============================================================

#[test]
fn rectangle_offers_eight_handles_circle_four() {
    let rect = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    let circle = make_shape(ShapeKind::Circle, 0.0, 0.0, 80.0, 80.0);
    assert_eq!(handle_positions(&rect).len(), 8);
    assert_eq!(handle_positions(&circle).len(), 4);
}

#[test]
fn find_handle_corners_and_edges() {
    let shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    assert_eq!(find_handle(Point::new(0.0, 0.0), &shape, 1.0, METRICS), Some(ResizeAnchor::Nw));
    assert_eq!(find_handle(Point::new(100.0, 50.0), &shape, 1.0, METRICS), Some(ResizeAnchor::Se));
    assert_eq!(find_handle(Point::new(50.0, 0.0), &shape, 1.0, METRICS), Some(ResizeAnchor::N));
    assert_eq!(find_handle(Point::new(0.0, 25.0), &shape, 1.0, METRICS), Some(ResizeAnchor::W));
    assert_eq!(find_handle(Point::new(50.0, 25.0), &shape, 1.0, METRICS), None);
}

#[test]
fn find_handle_circle_has_no_corners() {
    let shape = make_shape(ShapeKind::Circle, 0.0, 0.0, 80.0, 80.0);
    assert_eq!(find_handle(Point::new(0.0, 0.0), &shape, 1.0, METRICS), None);
    assert_eq!(find_handle(Point::new(80.0, 40.0), &shape, 1.0, METRICS), Some(ResizeAnchor::E));
}

#[test]
fn find_handle_hitbox_scales_with_zoom() {
    let shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    // 10px box => half-size 5 scene units at zoom 1, 1.25 at zoom 4.
    assert!(find_handle(Point::new(104.0, 50.0), &shape, 1.0, METRICS).is_some());
    assert!(find_handle(Point::new(104.0, 50.0), &shape, 4.0, METRICS).is_none());
    assert!(find_handle(Point::new(101.0, 50.0), &shape, 4.0, METRICS).is_some());
}

#[test]
fn rotated_top_center_handle_found_on_east_side() {
    let mut shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    shape.rotation = 90.0;
    let camera = Camera { pan_x: 40.0, pan_y: 60.0, zoom: 2.0 };
    // Centre (50, 25); the top-centre handle sits h/2 = 25 to the east after the turn.
    let east = camera.scene_to_screen(Point::new(75.0, 25.0));
    let scene_pt = camera.screen_to_scene(east);
    assert_eq!(find_handle(scene_pt, &shape, camera.zoom, METRICS), Some(ResizeAnchor::N));
    assert_eq!(ResizeAnchor::N.cursor(shape.rotation), "ew-resize");
}

// =============================================================
// Rotate handle
// =============================================================

#[test]
fn rotate_handle_sits_above_top_edge() {
    let shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    let p = rotate_handle_position(&shape, 1.0, METRICS);
    assert_eq!(p, Point::new(50.0, -30.0));
    assert!(find_rotation_handle(p, &shape, 1.0, METRICS));
    assert!(!find_rotation_handle(Point::new(50.0, 0.0), &shape, 1.0, METRICS));
}

#[test]
fn rotate_handle_follows_rotation() {
    let mut shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    shape.rotation = 90.0;
    let p = rotate_handle_position(&shape, 1.0, METRICS);
    // Centre (50, 25); offset 25 + 30 = 55 now points east.
    assert!((p.x - 105.0).abs() < 1e-9);
    assert!((p.y - 25.0).abs() < 1e-9);
    assert!(find_rotation_handle(p, &shape, 1.0, METRICS));
}

#[test]
fn rotate_handle_offset_is_screen_constant() {
    let shape = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    let p = rotate_handle_position(&shape, 2.0, METRICS);
    assert_eq!(p, Point::new(50.0, -15.0));
}

// =============================================================
// Scene-level hits
// =============================================================

#[test]
fn shape_at_prefers_topmost() {
    let a = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0);
    let b = make_shape(ShapeKind::Rectangle, 50.0, 50.0, 100.0, 100.0);
    let (id_a, id_b) = (a.id, b.id);
    let scene = scene_with(vec![a, b]);
    // Same z: later insertion wins.
    assert_eq!(shape_at(Point::new(75.0, 75.0), &scene), Some(id_b));
    assert_eq!(shape_at(Point::new(25.0, 25.0), &scene), Some(id_a));
    assert_eq!(shape_at(Point::new(500.0, 500.0), &scene), None);
}

#[test]
fn shape_at_respects_z_index_over_insertion() {
    let mut a = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0);
    a.z_index = 5;
    let b = make_shape(ShapeKind::Rectangle, 50.0, 50.0, 100.0, 100.0);
    let id_a = a.id;
    let scene = scene_with(vec![a, b]);
    assert_eq!(shape_at(Point::new(75.0, 75.0), &scene), Some(id_a));
}

#[test]
fn hit_scene_checks_selected_handles_first() {
    let a = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0);
    // b covers a's SE corner and sits on top.
    let b = make_shape(ShapeKind::Rectangle, 90.0, 90.0, 50.0, 50.0);
    let (id_a, id_b) = (a.id, b.id);
    let scene = scene_with(vec![a, b]);

    let corner = Point::new(100.0, 100.0);
    let unselected = hit_scene(corner, &scene, None, METRICS);
    assert_eq!(unselected, Some(Hit { shape_id: id_b, part: HitPart::Body }));

    let selected = hit_scene(corner, &scene, Some(id_a), METRICS);
    assert_eq!(selected, Some(Hit { shape_id: id_a, part: HitPart::ResizeHandle(ResizeAnchor::Se) }));
}

#[test]
fn hit_scene_rotate_handle_of_selection() {
    let a = make_shape(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
    let id = a.id;
    let scene = scene_with(vec![a]);
    let hit = hit_scene(Point::new(50.0, -30.0), &scene, Some(id), METRICS);
    assert_eq!(hit, Some(Hit { shape_id: id, part: HitPart::RotateHandle }));
    assert_eq!(hit_scene(Point::new(50.0, -30.0), &scene, None, METRICS), None);
}
