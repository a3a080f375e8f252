//! Extremum Tracker
//!
//! Two independent mechanisms:
//!
//! - [`RunningExtrema`]: per-channel all-time min/max with first-occurrence
//!   timestamps. Monotone until an explicit [`ExtremaState::reset`].
//! - [`PhasePowerWindow`]: windowed max/min of the phase powers, resampled at
//!   a fixed cadence (5 s by default) for the headline summary.
//!
//! Both live in [`ExtremaState`], which the frame builder threads through
//! every processing pass as explicit mutable state.

mod running;
mod windowed;

pub use running::*;
pub use windowed::*;

use chrono::{DateTime, Utc};

use crate::acquisition::ResolvedReadings;
use crate::types::Channel;

/// All tracker state carried between processing passes.
#[derive(Debug, Clone)]
pub struct ExtremaState {
    running: RunningExtrema,
    window: Option<PhasePowerWindow>,
}

impl ExtremaState {
    /// `window_cadence_ms` of `None` disables windowed tracking.
    pub fn new(track_timestamps: bool, window_cadence_ms: Option<u64>) -> Self {
        Self {
            running: RunningExtrema::new(track_timestamps),
            window: window_cadence_ms.map(PhasePowerWindow::new),
        }
    }

    /// Fold one batch of readings into both trackers.
    pub fn observe(&mut self, readings: &ResolvedReadings, now: DateTime<Utc>) {
        self.running.observe_all(readings, now);
        if let Some(window) = self.window.as_mut() {
            let powers = Channel::PHASE_POWERS.map(|c| readings.value(c));
            window.offer(&powers, now);
        }
    }

    pub fn running(&self) -> &RunningExtrema {
        &self.running
    }

    /// Windowed summary, or `None` when windowed tracking is disabled.
    pub fn windowed_summary(&self) -> Option<WindowedSummary> {
        self.window.as_ref().map(PhasePowerWindow::summary)
    }

    pub fn reset(&mut self) {
        self.running.reset();
        if let Some(window) = self.window.as_mut() {
            window.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::ChannelResolver;
    use crate::types::{ChannelConfig, ChannelLayout, LayoutProfile, ValueBatch};
    use chrono::TimeZone;

    fn readings(p: [f64; 3]) -> ResolvedReadings {
        let cfg = ChannelConfig::from(&["V1", "V2", "V3", "I1", "I2", "I3", "P1", "P2", "P3"][..]);
        let batch = ValueBatch::new().with("P1", p[0]).with("P2", p[1]).with("P3", p[2]);
        ChannelResolver::new(ChannelLayout::from_profile(LayoutProfile::Basic)).resolve_all(&cfg, &batch)
    }

    fn at_ms(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
    }

    #[test]
    fn test_state_without_window() {
        let mut state = ExtremaState::new(true, None);
        state.observe(&readings([1.0, 2.0, 3.0]), at_ms(0));
        assert!(state.windowed_summary().is_none());
        assert_eq!(state.running().get(Channel::P3).and_then(|r| r.max), Some(3.0));
    }

    #[test]
    fn test_state_reset_clears_everything() {
        let mut state = ExtremaState::new(true, Some(5000));
        state.observe(&readings([1.0, 2.0, 3.0]), at_ms(0));
        state.reset();
        assert!(state.running().records().is_empty());
        let summary = state.windowed_summary().unwrap_or_default();
        assert_eq!(summary.p_max.value, None);
        assert_eq!(summary.p_min.value, None);
    }

    #[test]
    fn test_window_fed_from_phase_powers() {
        let mut state = ExtremaState::new(false, Some(5000));
        state.observe(&readings([1.0, 4.0, 3.0]), at_ms(0));
        let summary = state.windowed_summary().unwrap_or_default();
        assert_eq!(summary.p_max.value, Some(4.0));
        assert_eq!(summary.p_min.value, Some(1.0));
    }
}
