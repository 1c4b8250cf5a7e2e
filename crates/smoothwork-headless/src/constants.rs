//! Host-level constants

/// Filesystem locations
pub mod paths {
    /// Default directory for the persisted workflow and host config
    pub const DATA_DIR: &str = "data";
    /// Optional `EditorConfig` file inside the data directory
    pub const CONFIG_FILE: &str = "editor.json";
}

/// Environment variables
pub mod env {
    /// Overrides `paths::DATA_DIR`
    pub const DATA_DIR: &str = "SMOOTHWORK_DATA_DIR";
}
