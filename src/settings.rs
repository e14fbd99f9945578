//! Persisted app settings.
//!
//! A single JSON record holding the destination folder, the always-on-top window flag and the
//! organization options. Keys are camelCase so files written by earlier versions still load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::organize::OrganizationConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    /// Empty when no destination has been selected yet.
    pub destination_folder: String,
    pub always_on_top: bool,
    pub organization: OrganizationConfig,
}

impl AppSettings {
    /// Load settings from the default per-user location.
    ///
    /// Returns `None` if no settings have been saved yet.
    ///
    /// # Errors
    /// Returns an error if the settings file exists but cannot be read or parsed.
    pub fn load() -> Result<Option<Self>> {
        match crate::config::SETTINGS_PATH.as_deref() {
            Some(path) => Self::load_from(path),
            None => Ok(None),
        }
    }

    /// Save settings to the default per-user location.
    ///
    /// # Errors
    /// Returns an error if the location cannot be determined or the file cannot be written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = crate::config::SETTINGS_PATH
            .as_deref()
            .context("Failed to determine settings location")?;
        self.save_to(path)?;
        Ok(path.to_path_buf())
    }

    /// Load settings from the given file. Missing keys use default values.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_json_str(&content)
                .with_context(|| format!("Failed to parse settings file {}", path.display()))
                .map(Some),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error).with_context(|| format!("Failed to read settings file {}", path.display())),
        }
    }

    /// Write settings as pretty-printed JSON, creating the parent directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).with_context(|| format!("Failed to write settings file {}", path.display()))
    }

    /// Parse settings from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON string is invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }

    /// Destination folder, `None` when unset.
    #[must_use]
    pub fn destination(&self) -> Option<PathBuf> {
        let folder = self.destination_folder.trim();
        (!folder.is_empty()).then(|| dunce::simplified(Path::new(folder)).to_path_buf())
    }
}

#[cfg(test)]
mod app_settings_tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn empty_object_uses_defaults() {
        let settings = AppSettings::from_json_str("{}").expect("should parse");
        assert_eq!(settings, AppSettings::default());
        assert!(settings.destination().is_none());
        assert!(!settings.organization.enabled);
    }

    #[test]
    fn parses_camel_case_keys() {
        let json = r#"{
            "destinationFolder": "/data/clients",
            "alwaysOnTop": true,
            "organization": {"enabled": true, "product": true, "year": false, "month": true, "extension": false}
        }"#;
        let settings = AppSettings::from_json_str(json).expect("should parse");
        assert_eq!(settings.destination(), Some(PathBuf::from("/data/clients")));
        assert!(settings.always_on_top);
        assert!(settings.organization.enabled);
        assert!(!settings.organization.include_year);
        assert!(!settings.organization.include_extension);
    }

    #[test]
    fn blank_destination_is_unset() {
        let settings = AppSettings::from_json_str(r#"{"destinationFolder": "   "}"#).expect("should parse");
        assert!(settings.destination().is_none());
    }

    #[test]
    fn invalid_json_returns_error() {
        assert!(AppSettings::from_json_str("{not json").is_err());
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempdir().expect("Failed to create temp dir");
        let loaded = AppSettings::load_from(&dir.path().join("settings.json")).expect("should not fail");
        assert!(loaded.is_none());
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            destination_folder: "/data/out".to_string(),
            always_on_top: true,
            organization: OrganizationConfig::all_enabled(),
        };

        settings.save_to(&path).expect("should save");
        let content = fs::read_to_string(&path).expect("should read");
        assert!(content.contains("\"destinationFolder\""));
        assert!(content.contains("\"alwaysOnTop\""));

        let loaded = AppSettings::load_from(&path).expect("should load");
        assert_eq!(loaded, Some(settings));
    }
}
