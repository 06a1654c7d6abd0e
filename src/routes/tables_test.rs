use canvas::scene::{ShapeKind, TableStatus};

use super::*;
use crate::state::test_helpers::{self, fields};

// =============================================================================
// table_error_to_status
// =============================================================================

#[test]
fn table_error_to_status_maps_not_found() {
    let err = TableError::NotFound(Uuid::nil());
    assert_eq!(table_error_to_status(err), StatusCode::NOT_FOUND);
}

#[test]
fn table_error_to_status_maps_invalid() {
    let err = TableError::Invalid("seats".into());
    assert_eq!(table_error_to_status(err), StatusCode::BAD_REQUEST);
}

#[test]
fn table_error_to_status_maps_database() {
    let err = TableError::Database(sqlx::Error::PoolTimedOut);
    assert_eq!(table_error_to_status(err), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// handlers
// =============================================================================

#[tokio::test]
async fn create_returns_created_record() {
    let state = test_helpers::test_app_state();
    let floor_id = Uuid::new_v4();

    let (status, Json(record)) = create_table(
        State(state.clone()),
        Path(floor_id),
        Json(fields(ShapeKind::Rectangle, 40.0, 60.0)),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record.floor_id, floor_id);

    let Json(listed) = list_tables(State(state), Path(floor_id)).await.unwrap();
    assert_eq!(listed, vec![record]);
}

#[tokio::test]
async fn create_rejects_invalid_body() {
    let state = test_helpers::test_app_state();
    let mut body = fields(ShapeKind::Circle, 0.0, 0.0);
    body.seats = 10_000;

    let result = create_table(State(state), Path(Uuid::new_v4()), Json(body)).await;
    assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_then_get_reflects_change() {
    let state = test_helpers::test_app_state();
    let (floor_id, ids) = test_helpers::seed_floor(&state, vec![fields(ShapeKind::Square, 0.0, 0.0)]).await;

    let patch = ShapePatch { status: Some(TableStatus::Occupied), ..ShapePatch::default() };
    let Json(patched) = patch_table(State(state.clone()), Path((floor_id, ids[0])), Json(patch))
        .await
        .unwrap();
    assert_eq!(patched.fields.status, TableStatus::Occupied);

    let Json(read) = get_table(State(state), Path((floor_id, ids[0]))).await.unwrap();
    assert_eq!(read, patched);
}

#[tokio::test]
async fn patch_unknown_is_404() {
    let state = test_helpers::test_app_state();
    let result = patch_table(State(state), Path((Uuid::new_v4(), Uuid::new_v4())), Json(ShapePatch::default())).await;
    assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_ok_then_404() {
    let state = test_helpers::test_app_state();
    let (floor_id, ids) = test_helpers::seed_floor(&state, vec![fields(ShapeKind::Circle, 0.0, 0.0)]).await;

    let Json(body) = delete_table(State(state.clone()), Path((floor_id, ids[0]))).await.unwrap();
    assert_eq!(body, serde_json::json!({ "ok": true }));

    let again = delete_table(State(state), Path((floor_id, ids[0]))).await;
    assert_eq!(again.unwrap_err(), StatusCode::NOT_FOUND);
}
