//! Shell settings storage

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistent defaults for the preview shell
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ShellSettings {
    /// Custom bridge configuration used when `--config` is not given
    #[serde(default)]
    pub bridge_config: Option<Value>,
    /// External data file used when `--external` is not given
    #[serde(default)]
    pub last_external_path: Option<PathBuf>,
    #[serde(default)]
    pub compact_output: bool,
}

impl ShellSettings {
    /// Get the settings file path
    pub fn settings_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".blockpost").join("shell").join("settings.json")
    }

    /// Load settings from the default path
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    /// Load settings from `path`, or defaults if missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<ShellSettings>(&content) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("Failed to parse settings {:?}: {}", path, e),
            },
            Err(e) => log::warn!("Failed to read settings {:?}: {}", path, e),
        }

        Self::default()
    }

    /// Save settings to the default path
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::debug!("Saved settings to {:?}", path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ShellSettings::load_from(&dir.path().join("settings.json"));
        assert_eq!(settings, ShellSettings::default());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shell").join("settings.json");

        let settings = ShellSettings {
            bridge_config: Some(json!({"debugMode": true})),
            last_external_path: Some(PathBuf::from("/data/external.yml")),
            compact_output: true,
        };
        settings.save_to(&path).unwrap();

        assert_eq!(ShellSettings::load_from(&path), settings);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(ShellSettings::load_from(&path), ShellSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"compact_output": true}"#).unwrap();

        let settings = ShellSettings::load_from(&path);
        assert!(settings.compact_output);
        assert!(settings.bridge_config.is_none());
    }

    #[test]
    fn test_settings_path_location() {
        let path = ShellSettings::settings_path();
        assert!(path.ends_with(".blockpost/shell/settings.json"));
    }
}
