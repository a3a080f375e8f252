//! Derived-Value Calculator
//!
//! Pure arithmetic over already-resolved channel readings:
//!
//! - Phase-power total (sum of P1..P3, or the meter's own total when preferred)
//! - Dominant THD (max of the three current THD figures)
//! - Voltage average and current total for the headline summary
//!
//! Nothing here can fail; the only divisor is the constant phase count.

use serde::{Deserialize, Serialize};

use crate::acquisition::ResolvedReadings;
use crate::types::Channel;

/// Number of phases in every supported layout.
const PHASE_COUNT: f64 = 3.0;

/// Headline figures computed from one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedValues {
    /// Total active power across phases (kW)
    pub phase_power_total: f64,
    /// Worst current THD across phases (%)
    pub dominant_thd: f64,
    /// Mean of the three phase voltages (V)
    pub voltage_average: f64,
    /// Sum of the three phase currents (A)
    pub current_total: f64,
}

/// Compute derived values.
///
/// When `prefer_explicit_total` is set and the layout carries a configured
/// `PTotal` channel, that reading is used instead of the phase sum.
pub fn compute(readings: &ResolvedReadings, prefer_explicit_total: bool) -> DerivedValues {
    let phase_sum = sum(readings, &Channel::PHASE_POWERS);

    let phase_power_total = if prefer_explicit_total && readings.is_configured(Channel::PTotal) {
        readings.value(Channel::PTotal)
    } else {
        phase_sum
    };

    DerivedValues {
        phase_power_total,
        dominant_thd: dominant(readings, &Channel::CURRENT_THD),
        voltage_average: sum(readings, &Channel::PHASE_VOLTAGES) / PHASE_COUNT,
        current_total: sum(readings, &Channel::PHASE_CURRENTS),
    }
}

fn sum(readings: &ResolvedReadings, channels: &[Channel]) -> f64 {
    channels.iter().map(|&c| readings.value(c)).sum()
}

fn dominant(readings: &ResolvedReadings, channels: &[Channel]) -> f64 {
    channels
        .iter()
        .map(|&c| readings.value(c))
        .fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::ChannelResolver;
    use crate::types::{ChannelConfig, ChannelLayout, LayoutProfile, ValueBatch};

    fn extended_readings(total: Option<f64>) -> ResolvedReadings {
        let layout = ChannelLayout::from_profile(LayoutProfile::Extended);
        let ids: Vec<String> = (0..layout.len()).map(|i| format!("id{i}")).collect();
        let mut batch = ValueBatch::new()
            .with("id6", 1.0)
            .with("id7", 2.0)
            .with("id8", 3.0)
            .with("id12", 4.1)
            .with("id13", 2.2)
            .with("id14", 3.3)
            .with("id15", 9.9);
        if let Some(t) = total {
            batch = batch.with("id9", t);
        }
        ChannelResolver::new(layout).resolve_all(&ChannelConfig::new(ids), &batch)
    }

    #[test]
    fn test_sum_policy_ignores_explicit_total() {
        let derived = compute(&extended_readings(Some(10.0)), false);
        assert!((derived.phase_power_total - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_total_preferred_when_configured() {
        let derived = compute(&extended_readings(Some(10.0)), true);
        assert!((derived.phase_power_total - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_total_missing_from_batch_reads_default() {
        // Configured but absent in this batch: the explicit channel still wins.
        let derived = compute(&extended_readings(None), true);
        assert_eq!(derived.phase_power_total, 0.0);
    }

    #[test]
    fn test_explicit_total_unconfigured_falls_back_to_sum() {
        let layout = ChannelLayout::from_profile(LayoutProfile::Basic);
        let ids = ChannelConfig::from(&["a", "b", "c", "d", "e", "f", "p1", "p2", "p3"][..]);
        let batch = ValueBatch::new().with("p1", 1.5).with("p2", 1.5).with("p3", 1.0);
        let readings = ChannelResolver::new(layout).resolve_all(&ids, &batch);
        let derived = compute(&readings, true);
        assert!((derived.phase_power_total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_thd_uses_current_thd_only() {
        let derived = compute(&extended_readings(None), false);
        // THD U1N = 9.9 must not leak into the headline figure
        assert!((derived.dominant_thd - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_thd_without_thd_channels_is_zero() {
        let layout = ChannelLayout::from_profile(LayoutProfile::Basic);
        let readings = ChannelResolver::new(layout).resolve_all(&ChannelConfig::default(), &ValueBatch::new());
        assert_eq!(compute(&readings, false).dominant_thd, 0.0);
    }
}
