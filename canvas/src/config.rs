//! Editor configuration.
//!
//! The host may pass a partial JSON object; every missing field falls back to
//! the defaults in [`crate::consts`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_GRID_SIZE, HANDLE_SIZE_PX, HISTORY_DEPTH, HOVER_THROTTLE_MS, MAX_ZOOM, MIN_ZOOM, ROTATE_HANDLE_OFFSET_PX,
    ZOOM_STEP,
};

/// How a resize treats the point that stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// The table's centre stays fixed; both opposite edges move.
    #[default]
    FixedCenter,
    /// The edge or corner opposite the grabbed handle stays fixed in scene space.
    OppositeAnchor,
}

/// Tunable editor settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid spacing in scene units.
    pub grid_size: f64,
    /// Whether drags and resizes snap to the grid initially.
    pub snap_to_grid: bool,
    /// Whether the grid is drawn initially.
    pub show_grid: bool,
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Multiplicative zoom factor per wheel notch.
    pub zoom_step: f64,
    /// Maximum number of undo snapshots kept.
    pub history_depth: usize,
    /// Minimum interval between processed hover updates, in milliseconds.
    pub hover_throttle_ms: f64,
    /// Side length of a resize handle's hit box, in screen pixels.
    pub handle_size_px: f64,
    /// Distance from a table's top edge to its rotate handle, in screen pixels.
    pub rotate_handle_offset_px: f64,
    /// Anchor policy for resizes.
    pub resize_policy: ResizePolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: true,
            show_grid: true,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            history_depth: HISTORY_DEPTH,
            hover_throttle_ms: HOVER_THROTTLE_MS,
            handle_size_px: HANDLE_SIZE_PX,
            rotate_handle_offset_px: ROTATE_HANDLE_OFFSET_PX,
            resize_policy: ResizePolicy::FixedCenter,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration object.
    ///
    /// # Errors
    ///
    /// Returns the serde error if `json` is not a valid configuration object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    /// Repair values that would make the editor misbehave: inverted zoom
    /// bounds, a non-positive grid, or a zero-depth history.
    pub fn sanitize(&mut self) {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            self.grid_size = DEFAULT_GRID_SIZE;
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            self.min_zoom = MIN_ZOOM;
        }
        if !(self.max_zoom.is_finite() && self.max_zoom >= self.min_zoom) {
            self.max_zoom = self.min_zoom.max(MAX_ZOOM);
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            self.zoom_step = ZOOM_STEP;
        }
        self.history_depth = self.history_depth.max(1);
        self.hover_throttle_ms = self.hover_throttle_ms.max(0.0);
    }
}
