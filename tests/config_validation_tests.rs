//! Config Validation Tests
//!
//! Typo detection on raw TOML, file loading through the two-pass loader, and
//! layout/sizing validation, exercised independently from the pipeline.

use phasewatch::config::validation::{
    known_config_keys, suggest_correction, validate_layout, validate_unknown_keys,
};
use phasewatch::config::{ConfigError, MonitorConfig};
use phasewatch::{Channel, ChannelLayout, ChannelSlot, LayoutProfile};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_window_section_warns_with_suggestion() {
    let toml_str = r#"
[window]
cadense_ms = 2000
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("cadense_ms"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("window.cadence_ms"));
}

#[test]
fn typo_in_engine_section_warns() {
    let toml_str = r#"
[engine]
profil = "basic"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("engine.profile"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[engine]
profile = "extended"
track_windowed_extrema = true
track_extremum_timestamps = false
prefer_explicit_total = true

[[engine.slots]]
channel = "u1"

[history]
capacity = 30
label_format = "%H:%M"
local_time_labels = false

[window]
cadence_ms = 5000
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(
        warnings.is_empty(),
        "Valid config should produce 0 warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );
}

#[test]
fn unknown_section_warns() {
    let toml_str = r#"
[display]
theme = "dark"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field.contains("display")));
}

#[test]
fn multiple_typos_all_warned() {
    let toml_str = r#"
[history]
capacty = 10

[window]
cadense_ms = 100
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2, "Expected 2 warnings for 2 typos");
}

#[test]
fn empty_toml_produces_zero_warnings() {
    assert!(validate_unknown_keys("").is_empty());
}

#[test]
fn known_keys_set_is_complete() {
    let mut config = MonitorConfig::default();
    config.engine.slots = vec![ChannelSlot::new(Channel::U1)];
    let toml_str = config.to_toml().expect("Default config should serialize");
    let warnings = validate_unknown_keys(&toml_str);
    assert!(
        warnings.is_empty(),
        "Serialized config should produce 0 unknown-key warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );
}

#[test]
fn suggest_correction_returns_none_for_garbage() {
    let known = known_config_keys();
    assert!(suggest_correction("zzz_completely_invalid_xyz_12345", &known).is_none());
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_applies_overrides() {
    let file = write_config(
        r#"
[engine]
profile = "basic"

[history]
capacity = 5
"#,
    );
    let config = MonitorConfig::load_from_file(file.path()).expect("config should load");
    assert_eq!(config.engine.profile, LayoutProfile::Basic);
    assert_eq!(config.history.capacity, 5);
    assert_eq!(config.window.cadence_ms, 5000);
}

#[test]
fn load_from_file_rejects_zero_capacity() {
    let file = write_config("[history]\ncapacity = 0\n");
    match MonitorConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("history.capacity")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn load_from_file_reports_parse_errors() {
    let file = write_config("[engine]\nprofile = \"triangular\"\n");
    assert!(matches!(
        MonitorConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        MonitorConfig::load_from_file(&missing),
        Err(ConfigError::Io(..))
    ));
}

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("phasewatch.toml");

    let mut config = MonitorConfig::default();
    config.engine.profile = LayoutProfile::Extended;
    config.engine.prefer_explicit_total = true;
    config.history.label_format = "%H:%M".to_string();
    config.save_to_file(&path).expect("save");

    let loaded = MonitorConfig::load_from_file(&path).expect("load");
    assert_eq!(loaded.engine.profile, LayoutProfile::Extended);
    assert!(loaded.engine.prefer_explicit_total);
    assert_eq!(loaded.history.label_format, "%H:%M");
}

// ============================================================================
// Layout Validation
// ============================================================================

#[test]
fn duplicate_layout_slots_are_errors() {
    let layout = ChannelLayout::new(vec![
        ChannelSlot::new(Channel::U1),
        ChannelSlot::new(Channel::I1),
        ChannelSlot::new(Channel::U1),
    ]);
    let (errors, _) = validate_layout(&layout);
    assert!(!errors.is_empty(), "Duplicate u1 should be rejected");
}

#[test]
fn partial_layout_is_valid_but_warned() {
    let mut config = MonitorConfig::default();
    config.engine.slots = vec![ChannelSlot::new(Channel::U1), ChannelSlot::new(Channel::P1)];
    assert!(config.validate().is_ok(), "Missing channels only read as defaults");

    let (errors, warnings) = validate_layout(&config.engine.layout());
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 3);
}
