//! Table REST routes for one floor.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::sync::{ShapeFields, ShapePatch};
use tracing::error;
use uuid::Uuid;

use crate::services::table::{self, TableError};
use crate::state::{AppState, TableRecord};

pub(crate) fn table_error_to_status(err: TableError) -> StatusCode {
    match err {
        TableError::NotFound(_) => StatusCode::NOT_FOUND,
        TableError::Invalid(_) => StatusCode::BAD_REQUEST,
        TableError::Database(e) => {
            error!(error = %e, "table query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /api/floors/:floor_id/tables`: list tables in stacking order.
pub async fn list_tables(
    State(state): State<AppState>,
    Path(floor_id): Path<Uuid>,
) -> Result<Json<Vec<TableRecord>>, StatusCode> {
    let tables = table::list_tables(&state, floor_id)
        .await
        .map_err(table_error_to_status)?;
    Ok(Json(tables))
}

/// `POST /api/floors/:floor_id/tables`: create one table.
pub async fn create_table(
    State(state): State<AppState>,
    Path(floor_id): Path<Uuid>,
    Json(body): Json<ShapeFields>,
) -> Result<(StatusCode, Json<TableRecord>), StatusCode> {
    let record = table::create_table(&state, floor_id, body)
        .await
        .map_err(table_error_to_status)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/floors/:floor_id/tables/:table_id`: read one table.
pub async fn get_table(
    State(state): State<AppState>,
    Path((floor_id, table_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TableRecord>, StatusCode> {
    let record = table::get_table(&state, floor_id, table_id)
        .await
        .map_err(table_error_to_status)?;
    Ok(Json(record))
}

/// `PATCH|PUT /api/floors/:floor_id/tables/:table_id`: partial update.
pub async fn patch_table(
    State(state): State<AppState>,
    Path((floor_id, table_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<ShapePatch>,
) -> Result<Json<TableRecord>, StatusCode> {
    let record = table::update_table(&state, floor_id, table_id, &body)
        .await
        .map_err(table_error_to_status)?;
    Ok(Json(record))
}

/// `DELETE /api/floors/:floor_id/tables/:table_id`: delete one table.
pub async fn delete_table(
    State(state): State<AppState>,
    Path((floor_id, table_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    table::delete_table(&state, floor_id, table_id)
        .await
        .map_err(table_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tests;
