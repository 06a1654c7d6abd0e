//! Local scene files: a JSON array of tables as the editor holds them.

use std::path::Path;

use canvas::scene::{Shape, assign_durable_ids};
use canvas::sync::{OperationError, SaveReport};
use serde_json::{Map, Value, json};

use crate::CliError;

/// Read and normalize a scene file. Tables without an `id` get a fresh one.
///
/// # Errors
///
/// Returns `Io` if the file can't be read, `InvalidJson` if it isn't a
/// table array.
pub fn load(path: &Path) -> Result<Vec<Shape>, CliError> {
    let text = std::fs::read_to_string(path)?;
    let mut shapes: Vec<Shape> = serde_json::from_str(&text)?;
    for shape in &mut shapes {
        shape.normalize();
    }
    Ok(shapes)
}

/// Write `shapes` back as pretty JSON.
///
/// # Errors
///
/// Returns `Io` if the file can't be written.
pub fn store(path: &Path, shapes: &[Shape]) -> Result<(), CliError> {
    let mut text = serde_json::to_string_pretty(shapes)?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}

/// Fold a save's id assignments into the scene. Returns how many tables
/// received a durable id.
pub fn apply_report(shapes: &mut [Shape], report: &SaveReport) -> usize {
    assign_durable_ids(shapes, &report.assigned)
}

fn error_json(err: &OperationError) -> Value {
    json!({
        "kind": err.kind,
        "target": err.target,
        "error": err.error.to_string(),
        "retryable": err.error.retryable(),
    })
}

/// Printable summary of a save.
#[must_use]
pub fn report_json(report: &SaveReport) -> Value {
    let mut out = match serde_json::to_value(report.outcome) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let assigned: Map<String, Value> = report
        .assigned
        .iter()
        .map(|(local, durable)| (local.to_string(), Value::String(durable.to_string())))
        .collect();
    out.insert("assigned".to_owned(), Value::Object(assigned));
    out.insert("errors".to_owned(), report.errors.iter().map(error_json).collect());
    out.insert("baseline_refreshed".to_owned(), Value::Bool(report.baseline.is_some()));
    Value::Object(out)
}

#[cfg(test)]
#[path = "scene_file_test.rs"]
mod scene_file_test;
