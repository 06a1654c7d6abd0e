//! Persistence service: background flush for dirty tables.
//!
//! DESIGN
//! ======
//! A background task flushes dirty tables, then sleeps before the next
//! cycle. Table mutations only touch memory, so request handling never
//! blocks on Postgres I/O.
//!
//! ERROR HANDLING
//! ==============
//! Dirty flags are cleared only after successful writes, and only for the
//! version that was written. Repeated upserts are acceptable, silent data
//! loss is not.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::state::{AppState, TableRecord};

const DEFAULT_TABLE_FLUSH_INTERVAL_MS: u64 = 100;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Spawn the background persistence task. Returns a handle for shutdown.
pub fn spawn_persistence_task(state: AppState, pool: PgPool) -> JoinHandle<()> {
    let flush_interval_ms = env_parse("TABLE_FLUSH_INTERVAL_MS", DEFAULT_TABLE_FLUSH_INTERVAL_MS);
    info!(flush_interval_ms, "table persistence flush configured");
    tokio::spawn(async move {
        loop {
            flush_all_dirty(&state, &pool).await;
            tokio::time::sleep(Duration::from_millis(flush_interval_ms)).await;
        }
    })
}

#[derive(Debug)]
struct DirtyFlushBatch {
    floor_id: Uuid,
    tables: Vec<TableRecord>,
    flushed_versions: Vec<(Uuid, i32)>,
}

/// Clone every floor's dirty tables under the lock.
async fn snapshot_dirty(state: &AppState) -> Vec<DirtyFlushBatch> {
    let floors = state.floors.read().await;
    let mut collected = Vec::new();

    for (floor_id, floor) in floors.iter() {
        let tables = floor
            .dirty
            .iter()
            .filter_map(|id| floor.tables.get(id).cloned())
            .collect::<Vec<_>>();
        if tables.is_empty() {
            continue;
        }
        let flushed_versions = tables.iter().map(|t| (t.id, t.version)).collect();
        collected.push(DirtyFlushBatch { floor_id: *floor_id, tables, flushed_versions });
    }

    collected
}

async fn flush_all_dirty(state: &AppState, pool: &PgPool) {
    let batches = snapshot_dirty(state).await;

    for batch in batches {
        match crate::services::table::flush_tables(pool, &batch.tables).await {
            Ok(()) => clear_flushed_dirty_ids(state, batch.floor_id, &batch.flushed_versions).await,
            Err(e) => {
                error!(error = %e, count = batch.tables.len(), floor_id = %batch.floor_id, "persistence flush failed");
            }
        }
    }
}

async fn clear_flushed_dirty_ids(state: &AppState, floor_id: Uuid, flushed_versions: &[(Uuid, i32)]) {
    let mut floors = state.floors.write().await;
    let Some(floor) = floors.get_mut(&floor_id) else {
        return;
    };

    for (table_id, flushed_version) in flushed_versions {
        // Keep the flag if the table changed again after the snapshot.
        let can_clear = match floor.tables.get(table_id) {
            Some(current) => current.version == *flushed_version,
            None => true,
        };
        if can_clear {
            floor.dirty.remove(table_id);
        }
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
