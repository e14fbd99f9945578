//! Integration tests for config and settings loading from fixture files.

use std::fs;
use std::path::{Path, PathBuf};

use dropmove::{AppSettings, organize};

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn dropmove_section_has_expected_structure() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let section = value.get("dropmove").expect("should have dropmove section");

    for key in ["copy_suffix", "debug", "dryrun", "log", "on_conflict", "verbose"] {
        assert!(section.get(key).is_some(), "dropmove section should have {key}");
    }
    assert!(section.get("log").expect("log").is_bool());
    assert!(section.get("on_conflict").expect("on_conflict").is_str());
    assert_eq!(section.get("copy_suffix").and_then(toml::Value::as_str), Some("Cópia"));
}

#[test]
fn sample_settings_load() {
    let settings = AppSettings::load_from(Path::new("tests/fixtures/sample_settings.json"))
        .expect("should load")
        .expect("file should exist");

    assert_eq!(settings.destination(), Some(PathBuf::from("/srv/clients")));
    assert!(!settings.always_on_top);
    assert!(settings.organization.enabled);
    assert!(settings.organization.include_product);
    assert!(!settings.organization.include_month);
}

#[test]
fn sample_settings_drive_organization() {
    let settings = AppSettings::load_from(Path::new("tests/fixtures/sample_settings.json"))
        .expect("should load")
        .expect("file should exist");

    assert_eq!(
        organize("ACME_Report_20250906.pdf", &settings.organization),
        "ACME/2025/PDFs/ACME_Report_20250906.pdf"
    );
    assert_eq!(organize("notes.txt", &settings.organization), "notes.txt");
}

#[test]
fn saved_settings_round_trip_through_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("settings.json");
    let original = AppSettings::load_from(Path::new("tests/fixtures/sample_settings.json"))
        .expect("should load")
        .expect("file should exist");

    original.save_to(&path).expect("should save");
    let loaded = AppSettings::load_from(&path).expect("should load").expect("file should exist");
    assert_eq!(loaded, original);
}
