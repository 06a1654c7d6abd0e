//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the optional database pool and a map of live floor states. Each
//! floor keeps its tables in memory plus a dirty set for write-behind
//! persistence. Without a pool the service is purely in-memory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use canvas::sync::ShapeFields;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

// =============================================================================
// TABLE RECORD
// =============================================================================

/// In-memory representation of a table. Mirrors the `floor_tables` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub id: Uuid,
    pub floor_id: Uuid,
    #[serde(flatten)]
    pub fields: ShapeFields,
    /// Bumped on every mutation; a flush only clears the dirty flag of the
    /// version it wrote.
    pub version: i32,
}

// =============================================================================
// FLOOR STATE
// =============================================================================

/// Per-floor live state. Flushed to Postgres by the persistence task.
#[derive(Debug, Default)]
pub struct FloorState {
    /// Current tables keyed by id.
    pub tables: HashMap<Uuid, TableRecord>,
    /// Table ids modified since last flush.
    pub dirty: HashSet<Uuid>,
}

impl FloorState {
    /// Tables in stacking order, ties broken by id.
    #[must_use]
    pub fn ordered(&self) -> Vec<TableRecord> {
        let mut tables: Vec<TableRecord> = self.tables.values().cloned().collect();
        tables.sort_by_key(|t| (t.fields.z_index, t.id));
        tables
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum; inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub pool: Option<PgPool>,
    pub floors: Arc<RwLock<HashMap<Uuid, FloorState>>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool, floors: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use canvas::scene::{ShapeKind, TableStatus};

    use super::*;

    /// In-memory `AppState` with no database.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(None)
    }

    /// Default create payload for `kind` at `(x, y)`.
    #[must_use]
    pub fn fields(kind: ShapeKind, x: f64, y: f64) -> ShapeFields {
        let (width, height) = kind.default_size();
        ShapeFields {
            kind,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            seats: kind.default_seats(),
            label: String::new(),
            status: TableStatus::Available,
            z_index: 0,
        }
    }

    /// Seed a floor with tables and return its id.
    pub async fn seed_floor(state: &AppState, tables: Vec<ShapeFields>) -> (Uuid, Vec<Uuid>) {
        let floor_id = Uuid::new_v4();
        let mut floor = FloorState::default();
        let mut ids = Vec::new();
        for fields in tables {
            let id = Uuid::new_v4();
            floor.tables.insert(id, TableRecord { id, floor_id, fields, version: 1 });
            ids.push(id);
        }
        state.floors.write().await.insert(floor_id, floor);
        (floor_id, ids)
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
