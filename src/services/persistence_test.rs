use canvas::scene::ShapeKind;
use canvas::sync::ShapePatch;

use super::*;
use crate::services::table;
use crate::state::test_helpers::{self, fields};

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__TEST_NONEXISTENT_KEY_12345__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TEST_EP_VALID__", "99") };
    let val: usize = env_parse("__TEST_EP_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__TEST_EP_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_EP_INVALID__", "notanumber") };
    let val: usize = env_parse("__TEST_EP_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_EP_INVALID__") };
}

// =============================================================================
// snapshot / clear
// =============================================================================

#[tokio::test]
async fn snapshot_collects_only_dirty_tables() {
    let state = test_helpers::test_app_state();
    let (floor_id, _) = test_helpers::seed_floor(&state, vec![fields(ShapeKind::Circle, 0.0, 0.0)]).await;
    let created = table::create_table(&state, floor_id, fields(ShapeKind::Square, 0.0, 0.0))
        .await
        .unwrap();

    let batches = snapshot_dirty(&state).await;

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].floor_id, floor_id);
    assert_eq!(batches[0].flushed_versions, vec![(created.id, 1)]);
}

#[tokio::test]
async fn snapshot_skips_clean_floors() {
    let state = test_helpers::test_app_state();
    test_helpers::seed_floor(&state, vec![fields(ShapeKind::Circle, 0.0, 0.0)]).await;
    assert!(snapshot_dirty(&state).await.is_empty());
}

#[tokio::test]
async fn clear_removes_flushed_versions() {
    let state = test_helpers::test_app_state();
    let floor_id = Uuid::new_v4();
    let created = table::create_table(&state, floor_id, fields(ShapeKind::Square, 0.0, 0.0))
        .await
        .unwrap();

    clear_flushed_dirty_ids(&state, floor_id, &[(created.id, created.version)]).await;

    assert!(state.floors.read().await[&floor_id].dirty.is_empty());
}

#[tokio::test]
async fn clear_keeps_tables_changed_after_snapshot() {
    let state = test_helpers::test_app_state();
    let floor_id = Uuid::new_v4();
    let created = table::create_table(&state, floor_id, fields(ShapeKind::Square, 0.0, 0.0))
        .await
        .unwrap();
    let batches = snapshot_dirty(&state).await;

    let patch = ShapePatch { x: Some(40.0), ..ShapePatch::default() };
    table::update_table(&state, floor_id, created.id, &patch).await.unwrap();
    clear_flushed_dirty_ids(&state, floor_id, &batches[0].flushed_versions).await;

    assert!(state.floors.read().await[&floor_id].dirty.contains(&created.id));
}

#[tokio::test]
async fn clear_on_unknown_floor_is_noop() {
    let state = test_helpers::test_app_state();
    clear_flushed_dirty_ids(&state, Uuid::new_v4(), &[(Uuid::new_v4(), 1)]).await;
    assert!(state.floors.read().await.is_empty());
}
