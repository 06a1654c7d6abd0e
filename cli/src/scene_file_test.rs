use std::collections::HashMap;
use std::path::PathBuf;

use canvas::scene::{ShapeKind, TableStatus};
use canvas::sync::{OperationKind, SaveOutcome, StoreError};
use uuid::Uuid;

use super::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("floorplan-cli-{name}-{}.json", Uuid::new_v4()))
}

fn report(outcome: SaveOutcome) -> SaveReport {
    SaveReport { outcome, assigned: HashMap::new(), baseline: None, errors: Vec::new() }
}

// =============================================================
// load / store
// =============================================================

#[test]
fn load_fills_missing_ids_and_normalizes() {
    let path = temp_path("load");
    std::fs::write(
        &path,
        r#"[{"kind":"circle","x":0,"y":0,"width":60,"height":100,"rotation":-45,"seats":4}]"#,
    )
    .unwrap();

    let shapes = load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(shapes.len(), 1);
    let shape = &shapes[0];
    assert!(!shape.id.is_nil());
    assert!(shape.durable_id.is_none());
    assert_eq!(shape.kind, ShapeKind::Circle);
    assert_eq!(shape.status, TableStatus::Available);
    assert!((shape.width - 100.0).abs() < 1e-9);
    assert!((shape.rotation - 315.0).abs() < 1e-9);
}

#[test]
fn load_rejects_non_array() {
    let path = temp_path("bad");
    std::fs::write(&path, r#"{"kind":"circle"}"#).unwrap();
    let result = load(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(CliError::InvalidJson(_))));
}

#[test]
fn load_missing_file_is_io_error() {
    assert!(matches!(load(&temp_path("missing")), Err(CliError::Io(_))));
}

#[test]
fn store_then_load_keeps_ids() {
    let path = temp_path("store");
    let mut shape = Shape::new(ShapeKind::Rectangle, 20.0, 40.0);
    shape.durable_id = Some(Uuid::new_v4());

    store(&path, std::slice::from_ref(&shape)).unwrap();
    let loaded = load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, vec![shape]);
}

// =============================================================
// Reports
// =============================================================

#[test]
fn apply_report_assigns_created_ids() {
    let mut shapes = vec![Shape::new(ShapeKind::Square, 0.0, 0.0), Shape::new(ShapeKind::Circle, 0.0, 0.0)];
    let durable = Uuid::new_v4();
    let mut saved = report(SaveOutcome::Saved { total: 1 });
    saved.assigned.insert(shapes[0].id, durable);

    assert_eq!(apply_report(&mut shapes, &saved), 1);
    assert_eq!(shapes[0].durable_id, Some(durable));
    assert_eq!(shapes[1].durable_id, None);
}

#[test]
fn report_json_flattens_outcome_and_errors() {
    let target = Uuid::new_v4();
    let mut partial = report(SaveOutcome::Partial { failed: 1, total: 3 });
    partial.errors.push(OperationError {
        kind: OperationKind::Update,
        target,
        error: StoreError::Status { code: 500, message: "boom".into() },
    });

    let json = report_json(&partial);

    assert_eq!(json["outcome"], "partial");
    assert_eq!(json["failed"], 1);
    assert_eq!(json["total"], 3);
    assert_eq!(json["baseline_refreshed"], false);
    assert_eq!(json["errors"][0]["kind"], "update");
    assert_eq!(json["errors"][0]["target"], target.to_string());
    assert_eq!(json["errors"][0]["retryable"], true);
}

#[test]
fn report_json_no_changes() {
    let json = report_json(&report(SaveOutcome::NoChanges));
    assert_eq!(json["outcome"], "no_changes");
    assert_eq!(json["errors"], serde_json::json!([]));
}
