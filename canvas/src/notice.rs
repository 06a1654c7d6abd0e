//! User-facing notifications.
//!
//! The engine never presents these itself; it hands them to the host through
//! [`crate::engine::Action::Notify`] and the host shows a toast.

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use serde::Serialize;

/// How the host should style a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    NothingToUndo,
    NothingToRedo,
    NoTableSelected,
    /// A save was requested while another was still running.
    SaveInProgress,
    /// A save found nothing to send.
    NoChanges,
    Saved,
    /// Some, but not all, operations of a save failed.
    SavePartiallyFailed { failed: usize, total: usize },
    /// Every operation failed, or the baseline could not be fetched.
    SaveFailed { reason: String },
}

impl Notice {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Saved => Severity::Success,
            Self::NoChanges | Self::NothingToUndo | Self::NothingToRedo => Severity::Info,
            Self::NoTableSelected | Self::SaveInProgress | Self::SavePartiallyFailed { .. } => Severity::Warning,
            Self::SaveFailed { .. } => Severity::Error,
        }
    }

    /// Short human-readable text for a toast.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NothingToUndo => "Nothing to undo".to_owned(),
            Self::NothingToRedo => "Nothing to redo".to_owned(),
            Self::NoTableSelected => "No table selected".to_owned(),
            Self::SaveInProgress => "A save is already in progress".to_owned(),
            Self::NoChanges => "No changes to save".to_owned(),
            Self::Saved => "Floor plan saved".to_owned(),
            Self::SavePartiallyFailed { failed, total } => {
                format!("Save partially failed: {failed} of {total} changes were not saved")
            }
            Self::SaveFailed { reason } => format!("Save failed: {reason}"),
        }
    }
}
