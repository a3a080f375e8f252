//! Monitor Configuration Module
//!
//! Per-deployment configuration loaded from TOML: which positional channel
//! layout the host delivers, which tracking features are enabled, and how the
//! history buffers are sized and labelled.
//!
//! ## Loading Order
//!
//! 1. `PHASEWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `phasewatch.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```toml
//! [engine]
//! profile = "extended"
//! prefer_explicit_total = true
//!
//! [history]
//! capacity = 20
//!
//! [window]
//! cadence_ms = 5000
//! ```

mod monitor_config;
pub mod defaults;
pub mod validation;

pub use monitor_config::*;
