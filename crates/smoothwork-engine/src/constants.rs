//! Engine-wide constants
//!
//! Fixed design values for history, layout, selection transforms and
//! focus highlighting. Host-tunable values are mirrored in `EditorConfig`.

/// Undo/redo history
pub mod history {
    /// Maximum number of undo snapshots kept before the oldest is evicted
    pub const CAPACITY: usize = 60;
    /// zstd level used for snapshot compression
    pub const COMPRESSION_LEVEL: i32 = 3;
}

/// Auto-layout geometry (not configurable)
pub mod layout {
    /// Horizontal distance between slots within a level
    pub const HORIZONTAL_SPACING: f64 = 220.0;
    /// Vertical distance between levels
    pub const VERTICAL_SPACING: f64 = 140.0;
    /// Left margin of the first slot
    pub const X_OFFSET: f64 = 100.0;
    /// Top margin of level 0
    pub const Y_OFFSET: f64 = 80.0;
}

/// Selection transforms
pub mod selection {
    /// Offset applied on both axes to duplicated nodes
    pub const DUPLICATE_OFFSET: f64 = 24.0;
}

/// Node focus and flash highlight
pub mod focus {
    /// How long a focused node stays highlighted
    pub const HIGHLIGHT_MS: u64 = 700;
    /// Zoom requested from cameras that can re-center
    pub const CAMERA_ZOOM: f64 = 1.35;
    /// Animation hint passed to cameras
    pub const CAMERA_ANIMATION_MS: u64 = 450;
}

/// Persistence and import/export
pub mod storage {
    /// Namespaced key the workflow is saved under
    pub const KEY: &str = "smoothwork-workflow";
    /// File name offered for exported workflows
    pub const EXPORT_FILE_NAME: &str = "workflow.json";
}
