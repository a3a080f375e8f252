//! Config validation: unknown-key detection with Levenshtein suggestions,
//! layout sanity checks and label format checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use chrono::format::{Item, StrftimeItems};

use crate::types::{Channel, ChannelLayout};

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for MonitorConfig.
///
/// Maintained by hand to match the struct hierarchy in monitor_config.rs.
/// Array-of-table entries (`[[engine.slots]]`) are not descended into.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [engine]
        "engine",
        "engine.profile",
        "engine.slots",
        "engine.track_windowed_extrema",
        "engine.track_extremum_timestamps",
        "engine.prefer_explicit_total",
        // [history]
        "history",
        "history.capacity",
        "history.label_format",
        "history.local_time_labels",
        // [window]
        "window",
        "window.cadence_ms",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    let mut keys = Vec::new();
    for (k, v) in table {
        let path = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        if v.is_table() {
            keys.extend(walk_toml_keys(v, &path));
        }
        keys.push(path);
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Edit distance between two strings, over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(ca != cb);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, d)| d <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are reported by serde later
    };

    let known = known_config_keys();
    let mut found = walk_toml_keys(&value, "");
    found.sort();

    found
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Layout Validation
// ============================================================================

/// Check a channel layout.
///
/// Returns (errors, warnings). Duplicated channels are errors: a reading
/// could otherwise come from two positions. Missing phase triples are only
/// warnings since those channels then simply read as the default.
pub fn validate_layout(layout: &ChannelLayout) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if layout.is_empty() {
        errors.push("engine layout has no slots".to_string());
    }

    for channel in layout.duplicate_channels() {
        errors.push(format!(
            "engine.slots: channel '{}' appears more than once",
            channel
        ));
    }

    let triples: [(&str, [Channel; 3]); 3] = [
        ("phase voltages", Channel::PHASE_VOLTAGES),
        ("phase currents", Channel::PHASE_CURRENTS),
        ("phase powers", Channel::PHASE_POWERS),
    ];
    for (name, channels) in triples {
        let missing: Vec<String> = channels
            .iter()
            .filter(|c| !layout.contains(**c))
            .map(ToString::to_string)
            .collect();
        if !layout.is_empty() && !missing.is_empty() {
            warnings.push(ValidationWarning {
                field: "engine.slots".to_string(),
                message: format!(
                    "layout is missing {} ({}); they will always read as the default",
                    name,
                    missing.join(", ")
                ),
                suggestion: None,
            });
        }
    }

    (errors, warnings)
}

/// Check that `format` is a usable strftime pattern.
pub fn validate_label_format(format: &str) -> Result<(), String> {
    if format.is_empty() {
        return Err("history.label_format must not be empty".to_string());
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!(
            "history.label_format '{format}' is not a valid strftime pattern"
        ));
    }
    Ok(())
}
