//! Editor configuration
//!
//! Values a host may tune. Layout spacing is deliberately absent; see
//! `constants::layout`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{focus, history, selection, storage};

/// Tunables for an `Editor` session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo snapshots
    pub history_capacity: usize,
    /// Key the persistence adapter stores the workflow under
    pub storage_key: String,
    /// Duration of the focus flash, in milliseconds
    pub highlight_duration_ms: u64,
    /// Offset applied to duplicated nodes on both axes
    pub duplicate_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: history::CAPACITY,
            storage_key: storage::KEY.to_string(),
            highlight_duration_ms: focus::HIGHLIGHT_MS,
            duplicate_offset: selection::DUPLICATE_OFFSET,
        }
    }
}

impl EditorConfig {
    /// Focus flash duration
    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_duration_ms)
    }
}
