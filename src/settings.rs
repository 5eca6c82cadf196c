use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::{read_json, write_json, StoreError};

/// Default `tracing` filter when neither the environment nor the settings name one.
pub const DEFAULT_LOG_FILTER: &str = "warn";

const SETTINGS_VERSION: u32 = 1;

/// Engine settings stored in the OS config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineSettings {
    pub version: u32,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// World file used when the CLI is not given one.
    #[serde(default)]
    pub world: Option<PathBuf>,
    /// Print results as JSON instead of text.
    #[serde(default)]
    pub json_output: bool,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            log_filter: default_log_filter(),
            world: None,
            json_output: false,
        }
    }
}

/// Load settings from the config directory. Returns None if no settings file
/// exists or it cannot be read.
pub fn load_settings(app_config_dir: &Path) -> Option<EngineSettings> {
    let path = crate::paths::settings_path(app_config_dir);
    if !path.exists() {
        return None;
    }
    match read_json::<EngineSettings>(&path) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            None
        }
    }
}

pub fn save_settings(app_config_dir: &Path, settings: &EngineSettings) -> Result<(), StoreError> {
    std::fs::create_dir_all(app_config_dir)?;
    write_json(&crate::paths::settings_path(app_config_dir), settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let dir = std::env::temp_dir().join("blockctl_test_settings");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let settings = EngineSettings {
            log_filter: "blockctl=debug".into(),
            world: Some(PathBuf::from("/some/world.json")),
            json_output: true,
            ..EngineSettings::default()
        };
        save_settings(&dir, &settings).unwrap();

        let loaded = load_settings(&dir).expect("should load");
        assert_eq!(loaded, settings);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = std::env::temp_dir().join("blockctl_test_settings_defaults");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(crate::paths::settings_path(&dir), r#"{ "version": 1 }"#).unwrap();

        let loaded = load_settings(&dir).expect("should load");
        assert_eq!(loaded.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(loaded.world, None);
        assert!(!loaded.json_output);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = std::env::temp_dir().join("blockctl_test_no_settings");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(load_settings(&dir).is_none());
    }
}
