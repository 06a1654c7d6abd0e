//! Table service: list, create, update, delete tables on a floor.
//!
//! DESIGN
//! ======
//! Mutations update in-memory state immediately, mark the table dirty for
//! write-behind persistence, and return the stored record. Deletes are
//! written through to Postgres at once. Floors are loaded lazily on first
//! touch: from Postgres when a pool is configured, otherwise empty.
//!
//! Stored geometry always satisfies the editor's invariants: sizes are
//! clamped to the minimum, circles and squares stay square, rotation is
//! normalized.

use std::collections::{HashMap, HashSet};

pub use canvas::consts::{MAX_LABEL_CHARS, MAX_SEATS};
use canvas::scene::{ShapeKind, TableStatus};
use canvas::sync::{PersistedShape, ShapeFields, ShapePatch};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::{AppState, FloorState, TableRecord};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table not found: {0}")]
    NotFound(Uuid),
    #[error("invalid table: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// VALIDATION
// =============================================================================

fn check_number(name: &str, value: f64) -> Result<(), TableError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TableError::Invalid(format!("{name} must be a finite number")))
    }
}

fn check_seats(seats: u32) -> Result<(), TableError> {
    if seats > MAX_SEATS {
        return Err(TableError::Invalid(format!("seats must be at most {MAX_SEATS}")));
    }
    Ok(())
}

fn check_label(label: &str) -> Result<(), TableError> {
    if label.chars().count() > MAX_LABEL_CHARS {
        return Err(TableError::Invalid(format!("label must be at most {MAX_LABEL_CHARS} characters")));
    }
    Ok(())
}

/// Reject a create payload the editor could never have produced.
///
/// # Errors
///
/// Returns [`TableError::Invalid`] naming the first bad field.
pub fn validate_fields(fields: &ShapeFields) -> Result<(), TableError> {
    for (name, value) in [
        ("x", fields.x),
        ("y", fields.y),
        ("width", fields.width),
        ("height", fields.height),
        ("rotation", fields.rotation),
    ] {
        check_number(name, value)?;
    }
    check_seats(fields.seats)?;
    check_label(&fields.label)
}

/// Reject a patch carrying any bad field.
///
/// # Errors
///
/// Returns [`TableError::Invalid`] naming the first bad field.
pub fn validate_patch(patch: &ShapePatch) -> Result<(), TableError> {
    for (name, value) in [
        ("x", patch.x),
        ("y", patch.y),
        ("width", patch.width),
        ("height", patch.height),
        ("rotation", patch.rotation),
    ] {
        if let Some(v) = value {
            check_number(name, v)?;
        }
    }
    if let Some(seats) = patch.seats {
        check_seats(seats)?;
    }
    if let Some(label) = &patch.label {
        check_label(label)?;
    }
    Ok(())
}

/// Fields after the editor's shape invariants have been applied.
#[must_use]
pub fn normalized(id: Uuid, fields: ShapeFields) -> ShapeFields {
    ShapeFields::from_shape(&PersistedShape { id, fields }.to_shape())
}

// =============================================================================
// FLOOR LOADING
// =============================================================================

/// Make sure `floor_id` is resident in memory.
///
/// # Errors
///
/// Returns `Database` if loading from Postgres fails.
pub async fn ensure_floor(state: &AppState, floor_id: Uuid) -> Result<(), TableError> {
    if state.floors.read().await.contains_key(&floor_id) {
        return Ok(());
    }

    let tables = match &state.pool {
        Some(pool) => load_tables(pool, floor_id).await?,
        None => HashMap::new(),
    };

    let mut floors = state.floors.write().await;
    floors.entry(floor_id).or_insert_with(|| {
        info!(%floor_id, count = tables.len(), "floor loaded");
        FloorState { tables, dirty: HashSet::new() }
    });
    Ok(())
}

// =============================================================================
// READ
// =============================================================================

/// All tables on a floor in stacking order.
///
/// # Errors
///
/// Returns `Database` if the floor cannot be loaded.
pub async fn list_tables(state: &AppState, floor_id: Uuid) -> Result<Vec<TableRecord>, TableError> {
    ensure_floor(state, floor_id).await?;
    let floors = state.floors.read().await;
    Ok(floors.get(&floor_id).map(FloorState::ordered).unwrap_or_default())
}

/// One table.
///
/// # Errors
///
/// Returns `NotFound` if the table doesn't exist on this floor.
pub async fn get_table(state: &AppState, floor_id: Uuid, table_id: Uuid) -> Result<TableRecord, TableError> {
    ensure_floor(state, floor_id).await?;
    let floors = state.floors.read().await;
    floors
        .get(&floor_id)
        .and_then(|floor| floor.tables.get(&table_id))
        .cloned()
        .ok_or(TableError::NotFound(table_id))
}

// =============================================================================
// CREATE
// =============================================================================

/// Create a table. The service assigns its id.
///
/// # Errors
///
/// Returns `Invalid` for a bad payload, `Database` if the floor cannot be loaded.
pub async fn create_table(state: &AppState, floor_id: Uuid, fields: ShapeFields) -> Result<TableRecord, TableError> {
    validate_fields(&fields)?;
    ensure_floor(state, floor_id).await?;

    let id = Uuid::new_v4();
    let record = TableRecord { id, floor_id, fields: normalized(id, fields), version: 1 };

    let mut floors = state.floors.write().await;
    let floor = floors.entry(floor_id).or_default();
    floor.dirty.insert(id);
    floor.tables.insert(id, record.clone());
    Ok(record)
}

// =============================================================================
// UPDATE
// =============================================================================

/// Apply a partial update.
///
/// # Errors
///
/// Returns `Invalid` for a bad patch, `NotFound` if the table doesn't exist.
pub async fn update_table(
    state: &AppState,
    floor_id: Uuid,
    table_id: Uuid,
    patch: &ShapePatch,
) -> Result<TableRecord, TableError> {
    validate_patch(patch)?;
    ensure_floor(state, floor_id).await?;

    let mut floors = state.floors.write().await;
    let floor = floors.get_mut(&floor_id).ok_or(TableError::NotFound(table_id))?;
    let record = floor
        .tables
        .get_mut(&table_id)
        .ok_or(TableError::NotFound(table_id))?;

    let mut fields = record.fields.clone();
    patch.apply_to(&mut fields);
    record.fields = normalized(table_id, fields);
    record.version += 1;
    let result = record.clone();
    floor.dirty.insert(table_id);

    Ok(result)
}

// =============================================================================
// DELETE
// =============================================================================

/// Delete a table. Removes from memory and Postgres immediately.
///
/// # Errors
///
/// Returns `NotFound` if the table doesn't exist, `Database` if the delete fails.
pub async fn delete_table(state: &AppState, floor_id: Uuid, table_id: Uuid) -> Result<(), TableError> {
    ensure_floor(state, floor_id).await?;
    {
        let mut floors = state.floors.write().await;
        let floor = floors.get_mut(&floor_id).ok_or(TableError::NotFound(table_id))?;
        if floor.tables.remove(&table_id).is_none() {
            return Err(TableError::NotFound(table_id));
        }
        floor.dirty.remove(&table_id);
    }

    if let Some(pool) = &state.pool {
        sqlx::query("DELETE FROM floor_tables WHERE floor_id = $1 AND id = $2")
            .bind(floor_id)
            .bind(table_id)
            .execute(pool)
            .await?;
    }
    Ok(())
}

// =============================================================================
// POSTGRES
// =============================================================================

type TableRow = (Uuid, Uuid, String, f64, f64, f64, f64, f64, i32, String, String, i64, i32);

async fn load_tables(pool: &PgPool, floor_id: Uuid) -> Result<HashMap<Uuid, TableRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TableRow>(
        "SELECT id, floor_id, kind, x, y, width, height, rotation, seats, label, status, z_index, version \
         FROM floor_tables WHERE floor_id = $1",
    )
    .bind(floor_id)
    .fetch_all(pool)
    .await?;

    let mut tables = HashMap::new();
    for (id, floor_id, kind, x, y, width, height, rotation, seats, label, status, z_index, version) in rows {
        let (Some(kind), Some(status)) = (ShapeKind::parse(&kind), TableStatus::parse(&status)) else {
            warn!(%id, %kind, %status, "unrecognized table row; skipping");
            continue;
        };
        let fields = ShapeFields {
            kind,
            x,
            y,
            width,
            height,
            rotation,
            seats: u32::try_from(seats).unwrap_or(0),
            label,
            status,
            z_index,
        };
        tables.insert(id, TableRecord { id, floor_id, fields, version });
    }
    Ok(tables)
}

/// Upsert tables to Postgres.
///
/// # Errors
///
/// Returns the first database error; earlier rows stay written.
pub async fn flush_tables(pool: &PgPool, tables: &[TableRecord]) -> Result<(), sqlx::Error> {
    for table in tables {
        let f = &table.fields;
        sqlx::query(
            "INSERT INTO floor_tables (id, floor_id, kind, x, y, width, height, rotation, seats, label, status, z_index, version, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, now()) \
             ON CONFLICT (id) DO UPDATE SET \
                 kind = EXCLUDED.kind, x = EXCLUDED.x, y = EXCLUDED.y, width = EXCLUDED.width, \
                 height = EXCLUDED.height, rotation = EXCLUDED.rotation, seats = EXCLUDED.seats, \
                 label = EXCLUDED.label, status = EXCLUDED.status, z_index = EXCLUDED.z_index, \
                 version = EXCLUDED.version, updated_at = now()",
        )
        .bind(table.id)
        .bind(table.floor_id)
        .bind(f.kind.as_str())
        .bind(f.x)
        .bind(f.y)
        .bind(f.width)
        .bind(f.height)
        .bind(f.rotation)
        .bind(i32::try_from(f.seats).unwrap_or(i32::MAX))
        .bind(&f.label)
        .bind(f.status.as_str())
        .bind(f.z_index)
        .bind(table.version)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
