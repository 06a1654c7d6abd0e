//! Reconciliation of the local scene against the persistence service.
//!
//! [`diff`] is pure: it partitions local tables against the persisted
//! baseline into creates, partial updates and deletes. [`save`] fetches the
//! baseline, dispatches the plan concurrently through a [`ShapeStore`],
//! collects every result without short-circuiting, and re-fetches the
//! baseline so later diffs start from server-confirmed state.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::consts::SYNC_COMPARE_DECIMALS;
use crate::scene::{DurableId, Shape, ShapeId, ShapeKind, TableStatus};

// =============================================================
// Wire types
// =============================================================

/// Every persisted field of a table, without an identifier. Used as the
/// create payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeFields {
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub seats: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: TableStatus,
    #[serde(default)]
    pub z_index: i64,
}

impl ShapeFields {
    #[must_use]
    pub fn from_shape(shape: &Shape) -> Self {
        Self {
            kind: shape.kind,
            x: shape.x,
            y: shape.y,
            width: shape.width,
            height: shape.height,
            rotation: shape.rotation,
            seats: shape.seats,
            label: shape.label.clone(),
            status: shape.status,
            z_index: shape.z_index,
        }
    }
}

/// A table as the persistence service stores it, keyed by durable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedShape {
    pub id: DurableId,
    #[serde(flatten)]
    pub fields: ShapeFields,
}

impl PersistedShape {
    /// Hydrate into a scene shape. The durable id doubles as the local id.
    #[must_use]
    pub fn to_shape(&self) -> Shape {
        let f = &self.fields;
        let mut shape = Shape {
            id: self.id,
            durable_id: Some(self.id),
            kind: f.kind,
            x: f.x,
            y: f.y,
            width: f.width,
            height: f.height,
            rotation: f.rotation,
            seats: f.seats,
            label: f.label.clone(),
            status: f.status,
            z_index: f.z_index,
        };
        shape.normalize();
        shape
    }
}

/// Partial update payload. Absent fields are left untouched by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
}

impl ShapePatch {
    /// The fields of `local` that differ from `base`. Numeric fields compare
    /// after rounding so floating-point noise never schedules an update.
    #[must_use]
    pub fn between(local: &ShapeFields, base: &ShapeFields) -> Self {
        let num = |a: f64, b: f64| (!same_number(a, b)).then_some(a);
        Self {
            kind: (local.kind != base.kind).then_some(local.kind),
            x: num(local.x, base.x),
            y: num(local.y, base.y),
            width: num(local.width, base.width),
            height: num(local.height, base.height),
            rotation: num(local.rotation, base.rotation),
            seats: (local.seats != base.seats).then_some(local.seats),
            label: (local.label != base.label).then(|| local.label.clone()),
            status: (local.status != base.status).then_some(local.status),
            z_index: (local.z_index != base.z_index).then_some(local.z_index),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields present in this patch.
    pub fn apply_to(&self, fields: &mut ShapeFields) {
        if let Some(kind) = self.kind {
            fields.kind = kind;
        }
        if let Some(x) = self.x {
            fields.x = x;
        }
        if let Some(y) = self.y {
            fields.y = y;
        }
        if let Some(width) = self.width {
            fields.width = width;
        }
        if let Some(height) = self.height {
            fields.height = height;
        }
        if let Some(rotation) = self.rotation {
            fields.rotation = rotation;
        }
        if let Some(seats) = self.seats {
            fields.seats = seats;
        }
        if let Some(label) = &self.label {
            fields.label.clone_from(label);
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(z_index) = self.z_index {
            fields.z_index = z_index;
        }
    }
}

#[allow(clippy::float_cmp)]
fn same_number(a: f64, b: f64) -> bool {
    let scale = 10_f64.powi(SYNC_COMPARE_DECIMALS);
    (a * scale).round() == (b * scale).round()
}

// =============================================================
// Plan
// =============================================================

/// A table to create, remembered by the local id that will receive the
/// durable id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedCreate {
    pub local_id: ShapeId,
    pub fields: ShapeFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedUpdate {
    pub id: DurableId,
    pub patch: ShapePatch,
}

/// The operations needed to bring the baseline in line with the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncPlan {
    pub creates: Vec<PlannedCreate>,
    pub updates: Vec<PlannedUpdate>,
    pub deletes: Vec<DurableId>,
}

impl SyncPlan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `local` against `baseline`.
///
/// Tables without a durable id are created. Tables whose durable id is in
/// the baseline get a partial update when any field differs. Baseline rows
/// with no local counterpart are deleted. A local durable id that is absent
/// from the baseline, or claimed by two local tables, is logged and skipped.
#[must_use]
pub fn diff(local: &[Shape], baseline: &[PersistedShape]) -> SyncPlan {
    let by_id: HashMap<DurableId, &PersistedShape> = baseline.iter().map(|p| (p.id, p)).collect();
    let mut seen: HashSet<DurableId> = HashSet::new();
    let mut plan = SyncPlan::default();

    for shape in local {
        let fields = ShapeFields::from_shape(shape);
        let Some(durable_id) = shape.durable_id else {
            plan.creates.push(PlannedCreate { local_id: shape.id, fields });
            continue;
        };
        let Some(base) = by_id.get(&durable_id) else {
            warn!(%durable_id, local_id = %shape.id, "local table not in baseline; skipping");
            continue;
        };
        if !seen.insert(durable_id) {
            warn!(%durable_id, local_id = %shape.id, "durable id claimed twice; skipping");
            continue;
        }
        let patch = ShapePatch::between(&fields, &base.fields);
        if !patch.is_empty() {
            plan.updates.push(PlannedUpdate { id: durable_id, patch });
        }
    }

    plan.deletes = baseline.iter().map(|p| p.id).filter(|id| !seen.contains(id)).collect();
    plan
}

// =============================================================
// Store seam
// =============================================================

/// Errors from a single persistence call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned {code}: {message}")]
    Status { code: u16, message: String },

    /// The target row does not exist.
    #[error("table not found: {0}")]
    NotFound(DurableId),

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether retrying the same call could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { code: 429 | 500..=599, .. })
    }
}

/// Errors that fail a save before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("could not fetch saved tables: {0}")]
    Baseline(#[source] StoreError),
}

/// The persistence boundary for one floor's tables.
#[async_trait::async_trait]
pub trait ShapeStore: Send + Sync {
    /// Every table currently persisted for `floor_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the service cannot be reached or answers badly.
    async fn list(&self, floor_id: Uuid) -> Result<Vec<PersistedShape>, StoreError>;

    /// Create a table; the service assigns its durable id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the create is rejected or cannot be sent.
    async fn create(&self, floor_id: Uuid, fields: &ShapeFields) -> Result<PersistedShape, StoreError>;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or another
    /// [`StoreError`] on failure.
    async fn update(&self, floor_id: Uuid, id: DurableId, patch: &ShapePatch) -> Result<PersistedShape, StoreError>;

    /// Delete a table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or another
    /// [`StoreError`] on failure.
    async fn delete(&self, floor_id: Uuid, id: DurableId) -> Result<(), StoreError>;
}

// =============================================================
// Save
// =============================================================

/// Which kind of operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

/// One failed operation of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub kind: OperationKind,
    /// Local id for creates, durable id otherwise.
    pub target: Uuid,
    pub error: StoreError,
}

/// Overall result of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Nothing differed from the baseline; nothing was sent.
    NoChanges,
    /// Every operation succeeded.
    Saved { total: usize },
    /// Some operations failed.
    Partial { failed: usize, total: usize },
    /// Every operation failed.
    Failed { total: usize },
}

impl SaveOutcome {
    fn from_counts(failed: usize, total: usize) -> Self {
        if total == 0 {
            Self::NoChanges
        } else if failed == 0 {
            Self::Saved { total }
        } else if failed == total {
            Self::Failed { total }
        } else {
            Self::Partial { failed, total }
        }
    }
}

/// Everything a caller needs to fold a save back into local state.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    /// Durable ids issued for successfully created tables, by local id.
    pub assigned: HashMap<ShapeId, DurableId>,
    /// The baseline re-fetched after dispatch; `None` if that fetch failed.
    pub baseline: Option<Vec<PersistedShape>>,
    pub errors: Vec<OperationError>,
}

/// Reconcile `local` against the persisted tables of `floor_id`.
///
/// # Errors
///
/// Returns [`SyncError::Baseline`] if the initial baseline fetch fails.
/// Per-operation failures never fail the save; they are reported in
/// [`SaveReport::errors`] and reflected in [`SaveReport::outcome`].
pub async fn save<S>(store: &S, floor_id: Uuid, local: &[Shape]) -> Result<SaveReport, SyncError>
where
    S: ShapeStore + ?Sized,
{
    let baseline = store.list(floor_id).await.map_err(SyncError::Baseline)?;
    let plan = diff(local, &baseline);
    info!(
        %floor_id,
        creates = plan.creates.len(),
        updates = plan.updates.len(),
        deletes = plan.deletes.len(),
        "reconciliation plan"
    );

    if plan.is_empty() {
        return Ok(SaveReport {
            outcome: SaveOutcome::NoChanges,
            assigned: HashMap::new(),
            baseline: Some(baseline),
            errors: Vec::new(),
        });
    }

    let total = plan.len();
    let creates = join_all(
        plan.creates
            .iter()
            .map(|c| async move { (c.local_id, store.create(floor_id, &c.fields).await) }),
    );
    let updates = join_all(
        plan.updates
            .iter()
            .map(|u| async move { (u.id, store.update(floor_id, u.id, &u.patch).await) }),
    );
    let deletes = join_all(
        plan.deletes
            .iter()
            .map(|&id| async move { (id, store.delete(floor_id, id).await) }),
    );
    let (created, updated, deleted) = futures::join!(creates, updates, deletes);

    let mut assigned = HashMap::new();
    let mut errors = Vec::new();
    for (local_id, result) in created {
        match result {
            Ok(row) => {
                assigned.insert(local_id, row.id);
            }
            Err(error) => errors.push(OperationError { kind: OperationKind::Create, target: local_id, error }),
        }
    }
    for (id, result) in updated {
        if let Err(error) = result {
            errors.push(OperationError { kind: OperationKind::Update, target: id, error });
        }
    }
    for (id, result) in deleted {
        if let Err(error) = result {
            errors.push(OperationError { kind: OperationKind::Delete, target: id, error });
        }
    }
    for e in &errors {
        warn!(kind = ?e.kind, target = %e.target, error = %e.error, "sync operation failed");
    }

    let refreshed = match store.list(floor_id).await {
        Ok(rows) => Some(rows),
        Err(e) => {
            warn!(%floor_id, error = %e, "baseline re-fetch failed");
            None
        }
    };

    let outcome = SaveOutcome::from_counts(errors.len(), total);
    info!(%floor_id, ?outcome, "save finished");
    Ok(SaveReport { outcome, assigned, baseline: refreshed, errors })
}
