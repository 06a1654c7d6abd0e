use canvas::consts::MIN_SHAPE_SIZE;
use canvas::scene::{ShapeKind, TableStatus};

use super::*;
use crate::state::test_helpers::{self, fields};

// =============================================================================
// validate
// =============================================================================

#[test]
fn validate_rejects_non_finite_numbers() {
    let mut f = fields(ShapeKind::Rectangle, 0.0, 0.0);
    f.rotation = f64::NAN;
    assert!(matches!(validate_fields(&f), Err(TableError::Invalid(msg)) if msg.contains("rotation")));
}

#[test]
fn validate_rejects_too_many_seats_and_long_labels() {
    let mut f = fields(ShapeKind::Rectangle, 0.0, 0.0);
    f.seats = MAX_SEATS + 1;
    assert!(validate_fields(&f).is_err());

    let patch = ShapePatch { label: Some("x".repeat(MAX_LABEL_CHARS + 1)), ..ShapePatch::default() };
    assert!(validate_patch(&patch).is_err());

    let ok = ShapePatch { label: Some("x".repeat(MAX_LABEL_CHARS)), seats: Some(MAX_SEATS), ..ShapePatch::default() };
    assert!(validate_patch(&ok).is_ok());
}

#[test]
fn normalized_enforces_shape_invariants() {
    let mut f = fields(ShapeKind::Square, 0.0, 0.0);
    f.width = 120.0;
    f.height = 80.0;
    f.rotation = -90.0;
    let n = normalized(Uuid::new_v4(), f);
    assert!((n.width - 120.0).abs() < 1e-9);
    assert!((n.height - 120.0).abs() < 1e-9);
    assert!((n.rotation - 270.0).abs() < 1e-9);
    // Grows about the centre: centre was (60, 40).
    assert!((n.y - -20.0).abs() < 1e-9);

    let mut tiny = fields(ShapeKind::Rectangle, 0.0, 0.0);
    tiny.width = 1.0;
    assert!((normalized(Uuid::new_v4(), tiny).width - MIN_SHAPE_SIZE).abs() < 1e-9);
}

// =============================================================================
// create / list / get
// =============================================================================

#[tokio::test]
async fn create_assigns_id_and_marks_dirty() {
    let state = test_helpers::test_app_state();
    let floor_id = Uuid::new_v4();

    let record = create_table(&state, floor_id, fields(ShapeKind::Circle, 10.0, 20.0))
        .await
        .unwrap();

    assert_eq!(record.floor_id, floor_id);
    assert_eq!(record.version, 1);
    assert_eq!(record.fields.kind, ShapeKind::Circle);

    let floors = state.floors.read().await;
    let floor = floors.get(&floor_id).unwrap();
    assert!(floor.tables.contains_key(&record.id));
    assert!(floor.dirty.contains(&record.id));
}

#[tokio::test]
async fn create_invalid_leaves_floor_untouched() {
    let state = test_helpers::test_app_state();
    let (floor_id, _) = test_helpers::seed_floor(&state, Vec::new()).await;
    let mut f = fields(ShapeKind::Circle, 0.0, 0.0);
    f.x = f64::INFINITY;

    assert!(matches!(create_table(&state, floor_id, f).await, Err(TableError::Invalid(_))));
    assert!(list_tables(&state, floor_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_unknown_floor_is_empty() {
    let state = test_helpers::test_app_state();
    assert!(list_tables(&state, Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_stacking_order() {
    let state = test_helpers::test_app_state();
    let mut top = fields(ShapeKind::Square, 0.0, 0.0);
    top.z_index = 5;
    let bottom = fields(ShapeKind::Rectangle, 0.0, 0.0);
    let (floor_id, ids) = test_helpers::seed_floor(&state, vec![top, bottom]).await;

    let listed: Vec<Uuid> = list_tables(&state, floor_id).await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(listed, vec![ids[1], ids[0]]);
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let state = test_helpers::test_app_state();
    let (floor_id, _) = test_helpers::seed_floor(&state, Vec::new()).await;
    let missing = Uuid::new_v4();
    assert!(matches!(get_table(&state, floor_id, missing).await, Err(TableError::NotFound(id)) if id == missing));
}

#[tokio::test]
async fn tables_are_scoped_to_their_floor() {
    let state = test_helpers::test_app_state();
    let (floor_a, ids) = test_helpers::seed_floor(&state, vec![fields(ShapeKind::Circle, 0.0, 0.0)]).await;
    let (floor_b, _) = test_helpers::seed_floor(&state, Vec::new()).await;

    assert!(get_table(&state, floor_a, ids[0]).await.is_ok());
    assert!(matches!(get_table(&state, floor_b, ids[0]).await, Err(TableError::NotFound(_))));
}

// =============================================================================
// update
// =============================================================================

#[tokio::test]
async fn update_applies_patch_and_bumps_version() {
    let state = test_helpers::test_app_state();
    let (floor_id, ids) = test_helpers::seed_floor(&state, vec![fields(ShapeKind::Rectangle, 0.0, 0.0)]).await;

    let patch = ShapePatch {
        x: Some(50.0),
        status: Some(TableStatus::Reserved),
        label: Some("T1".into()),
        ..ShapePatch::default()
    };
    let updated = update_table(&state, floor_id, ids[0], &patch).await.unwrap();

    assert!((updated.fields.x - 50.0).abs() < f64::EPSILON);
    assert!(updated.fields.y.abs() < f64::EPSILON);
    assert_eq!(updated.fields.status, TableStatus::Reserved);
    assert_eq!(updated.fields.label, "T1");
    assert_eq!(updated.version, 2);
    assert!(state.floors.read().await[&floor_id].dirty.contains(&ids[0]));
}

#[tokio::test]
async fn update_kind_to_circle_squares_the_table() {
    let state = test_helpers::test_app_state();
    let (floor_id, ids) = test_helpers::seed_floor(&state, vec![fields(ShapeKind::Rectangle, 0.0, 0.0)]).await;

    let patch = ShapePatch { kind: Some(ShapeKind::Circle), ..ShapePatch::default() };
    let updated = update_table(&state, floor_id, ids[0], &patch).await.unwrap();

    assert!((updated.fields.width - updated.fields.height).abs() < f64::EPSILON);
}

#[tokio::test]
async fn update_missing_is_not_found() {
    let state = test_helpers::test_app_state();
    let (floor_id, _) = test_helpers::seed_floor(&state, Vec::new()).await;
    let result = update_table(&state, floor_id, Uuid::new_v4(), &ShapePatch::default()).await;
    assert!(matches!(result, Err(TableError::NotFound(_))));
}

// =============================================================================
// delete
// =============================================================================

#[tokio::test]
async fn delete_removes_table_and_dirty_flag() {
    let state = test_helpers::test_app_state();
    let floor_id = Uuid::new_v4();
    let record = create_table(&state, floor_id, fields(ShapeKind::Square, 0.0, 0.0))
        .await
        .unwrap();

    delete_table(&state, floor_id, record.id).await.unwrap();

    let floors = state.floors.read().await;
    let floor = floors.get(&floor_id).unwrap();
    assert!(floor.tables.is_empty());
    assert!(floor.dirty.is_empty());
}

#[tokio::test]
async fn delete_twice_is_not_found() {
    let state = test_helpers::test_app_state();
    let (floor_id, ids) = test_helpers::seed_floor(&state, vec![fields(ShapeKind::Square, 0.0, 0.0)]).await;
    delete_table(&state, floor_id, ids[0]).await.unwrap();
    assert!(matches!(delete_table(&state, floor_id, ids[0]).await, Err(TableError::NotFound(_))));
}
