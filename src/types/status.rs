//! Scan session lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a scan session.
///
/// Transitions only go forward: `Idle -> Scanning -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Created, not yet accepting frames
    Idle,
    /// Accepting frames
    Scanning,
    /// Terminal; a new session is required to scan again
    Stopped,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Idle => "idle",
            ScanStatus::Scanning => "scanning",
            ScanStatus::Stopped => "stopped",
        }
    }

    /// Whether frames are accepted in this state
    pub fn accepts_frames(self) -> bool {
        matches!(self, ScanStatus::Scanning)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
