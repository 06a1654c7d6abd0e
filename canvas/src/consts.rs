//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height a table may be resized to, in scene units.
pub const MIN_SHAPE_SIZE: f64 = 20.0;

/// Gap between a table's outline and the centre of its seats, in scene units.
pub const SEAT_OFFSET: f64 = 14.0;

/// Radius of a drawn seat, in scene units.
pub const SEAT_RADIUS: f64 = 8.0;

/// Largest seat count a table may carry.
pub const MAX_SEATS: u32 = 100;

/// Longest table label, in characters.
pub const MAX_LABEL_CHARS: usize = 64;

/// Rotation increment used while the snap modifier is held, in degrees.
pub const ROTATION_SNAP_DEG: f64 = 15.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Default side length of a resize handle's hit box, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 10.0;

/// Default distance from the top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 30.0;

// ── Camera ──────────────────────────────────────────────────────

/// Default lower zoom bound.
pub const MIN_ZOOM: f64 = 0.25;

/// Default upper zoom bound.
pub const MAX_ZOOM: f64 = 4.0;

/// Default multiplicative zoom factor per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

// ── Editing ─────────────────────────────────────────────────────

/// Default grid spacing in scene units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Arrow-key nudge without a modifier, in scene units.
pub const NUDGE_SMALL: f64 = 1.0;

/// Arrow-key nudge with Shift held while snapping is off, in scene units.
pub const NUDGE_LARGE: f64 = 10.0;

/// Offset applied when cascading new tables or duplicating, in scene units.
pub const CASCADE_STEP: f64 = 20.0;

/// Placement origin for new tables when the viewport size is unknown.
pub const DEFAULT_PLACEMENT: f64 = 100.0;

/// Default undo depth.
pub const HISTORY_DEPTH: usize = 50;

/// Minimum interval between processed hover updates, in milliseconds (~60 Hz).
pub const HOVER_THROTTLE_MS: f64 = 16.0;

// ── Sync ────────────────────────────────────────────────────────

/// Decimal places kept when comparing numeric fields against the baseline.
pub const SYNC_COMPARE_DECIMALS: i32 = 2;
