//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Channel Resolution
// ============================================================================

/// Reading substituted for a channel that is unconfigured, missing or malformed.
pub const DEFAULT_READING: f64 = 0.0;

// ============================================================================
// History
// ============================================================================

/// Points kept per history series (FIFO beyond this).
pub const HISTORY_CAPACITY: usize = 20;

/// strftime pattern for history point labels.
pub const TIME_LABEL_FORMAT: &str = "%H:%M:%S";

// ============================================================================
// Windowed Extrema
// ============================================================================

/// Cadence of the windowed phase-power extrema (milliseconds).
pub const WINDOW_CADENCE_MS: u64 = 5_000;

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PHASEWATCH_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "phasewatch.toml";

// ============================================================================
// Simulation
// ============================================================================

/// Nominal phase-to-neutral voltage (V).
pub const NOMINAL_PHASE_VOLTAGE: f64 = 230.0;

/// Default interval between simulated batches (ms).
pub const SIMULATION_INTERVAL_MS: u64 = 1_000;
