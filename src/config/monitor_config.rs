//! Monitor Configuration - engine features, channel layout and buffer sizing as TOML
//!
//! Every struct implements `Default` with the values the engine ships with,
//! so a missing or empty config file behaves exactly like the built-ins.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{
    CONFIG_ENV_VAR, CONFIG_FILE_NAME, HISTORY_CAPACITY, TIME_LABEL_FORMAT, WINDOW_CADENCE_MS,
};
use crate::types::{ChannelLayout, ChannelSlot, LayoutProfile};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one meter deployment.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$PHASEWATCH_CONFIG` env var
/// 2. `./phasewatch.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Channel layout and feature switches
    #[serde(default)]
    pub engine: EngineConfig,

    /// Rolling history sizing and labelling
    #[serde(default)]
    pub history: HistoryConfig,

    /// Windowed extremum cadence
    #[serde(default)]
    pub window: WindowConfig,
}

impl MonitorConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), profile = %config.engine.profile, "Loaded monitor config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./phasewatch.toml
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(profile = %config.engine.profile, "Loaded monitor config from ./{}", CONFIG_FILE_NAME);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", CONFIG_FILE_NAME);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", CONFIG_FILE_NAME);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: check for unknown keys first (warnings only)
        for w in &super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write the effective config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Monitor config saved");
        Ok(())
    }

    /// Validate sizing and layout for internal consistency.
    ///
    /// Rules:
    /// - History capacity and window cadence must be > 0
    /// - A custom layout must not carry the same channel twice
    /// - The label format must be a valid strftime pattern
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.history.capacity == 0 {
            errors.push("history.capacity must be > 0".to_string());
        }
        if self.window.cadence_ms == 0 {
            errors.push("window.cadence_ms must be > 0".to_string());
        }

        let (layout_errors, layout_warnings) =
            super::validation::validate_layout(&self.engine.layout());
        errors.extend(layout_errors);
        for w in &layout_warnings {
            warn!("{}", w);
        }

        if let Err(e) = super::validation::validate_label_format(&self.history.label_format) {
            errors.push(e);
        }

        for slot in &self.engine.slots {
            if !slot.default.is_finite() {
                errors.push(format!(
                    "engine.slots: default for {} must be a finite number",
                    slot.channel
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Config validation failed:")?;
                for e in errors {
                    write!(f, "\n  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Engine Config
// ============================================================================

/// Channel layout and the feature switches distinguishing deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Built-in positional layout used when `slots` is empty.
    #[serde(default)]
    pub profile: LayoutProfile,

    /// Custom layout: slot `i` names the channel at configuration index `i`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<ChannelSlot>,

    /// Maintain the 5-second windowed phase-power max/min.
    #[serde(default = "default_true")]
    pub track_windowed_extrema: bool,

    /// Record the first-occurrence time of each running extremum.
    #[serde(default = "default_true")]
    pub track_extremum_timestamps: bool,

    /// Prefer a configured meter-reported total over the phase sum.
    #[serde(default)]
    pub prefer_explicit_total: bool,
}

fn default_true() -> bool { true }

impl EngineConfig {
    /// Effective layout: custom slots if given, otherwise the profile.
    pub fn layout(&self) -> ChannelLayout {
        if self.slots.is_empty() {
            ChannelLayout::from_profile(self.profile)
        } else {
            ChannelLayout::new(self.slots.clone())
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: LayoutProfile::default(),
            slots: Vec::new(),
            track_windowed_extrema: default_true(),
            track_extremum_timestamps: default_true(),
            prefer_explicit_total: false,
        }
    }
}

// ============================================================================
// History Config
// ============================================================================

/// Rolling history parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Points kept per series.
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,

    /// strftime pattern for point labels.
    #[serde(default = "default_label_format")]
    pub label_format: String,

    /// Label in local time (true) or UTC (false).
    #[serde(default = "default_true")]
    pub local_time_labels: bool,
}

fn default_history_capacity() -> usize { HISTORY_CAPACITY }
fn default_label_format() -> String { TIME_LABEL_FORMAT.to_string() }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            label_format: default_label_format(),
            local_time_labels: default_true(),
        }
    }
}

// ============================================================================
// Window Config
// ============================================================================

/// Windowed extremum cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Minimum spacing between windowed updates (ms).
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,
}

fn default_cadence_ms() -> u64 { WINDOW_CADENCE_MS }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            cadence_ms: default_cadence_ms(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
