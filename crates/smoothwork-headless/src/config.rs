//! Host configuration loading
//!
//! The editor tunables live in an optional JSON file in the data directory.
//! Missing keys fall back to their defaults; an unreadable file is logged
//! and ignored.

use std::path::Path;

use smoothwork_engine::EditorConfig;

use crate::constants::paths;

/// Load `EditorConfig` from `<dir>/editor.json`, or defaults
pub fn load_editor_config(dir: &Path) -> EditorConfig {
    let path = dir.join(paths::CONFIG_FILE);
    if !path.exists() {
        return EditorConfig::default();
    }

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            log::info!("Loaded editor config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("Ignoring editor config {:?}: {}", path, e);
            EditorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(load_editor_config(temp_dir.path()), EditorConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(paths::CONFIG_FILE),
            r#"{"storageKey": "team-flow", "duplicateOffset": 40}"#,
        )
        .unwrap();

        let config = load_editor_config(temp_dir.path());
        assert_eq!(config.storage_key, "team-flow");
        assert_eq!(config.duplicate_offset, 40.0);
        assert_eq!(config.history_capacity, 60);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(paths::CONFIG_FILE), "{").unwrap();
        assert_eq!(load_editor_config(temp_dir.path()), EditorConfig::default());
    }
}
