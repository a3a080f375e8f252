//! Windowed extrema resampled at a fixed cadence
//!
//! A windowed tracker only looks at a batch when the cadence boundary has
//! elapsed since its last update; batches arriving in between are dropped for
//! this tracker and the exposed value holds steady.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_READING;

/// Comparison direction of a windowed tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Max,
    Min,
}

impl Direction {
    /// Starting value that every real reading beats.
    pub fn sentinel(&self) -> f64 {
        match self {
            Direction::Max => f64::NEG_INFINITY,
            Direction::Min => f64::INFINITY,
        }
    }

    /// The more extreme of `a` and `b` in this direction.
    pub fn pick(&self, a: f64, b: f64) -> f64 {
        match self {
            Direction::Max => a.max(b),
            Direction::Min => a.min(b),
        }
    }

    /// Most extreme of `values`, or the sentinel for an empty slice.
    pub fn extreme_of(&self, values: &[f64]) -> f64 {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(self.sentinel(), |acc, v| self.pick(acc, v))
    }
}

/// Read-only view of a windowed tracker, as placed in the aggregation frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowedReading {
    /// `None` until the tracker has seen a real value ("no data").
    pub value: Option<f64>,
    /// Time of the last cadence update.
    pub window_start: Option<DateTime<Utc>>,
}

impl WindowedReading {
    /// Value for display, 0 while there is no data.
    pub fn display_value(&self) -> f64 {
        self.value.unwrap_or(DEFAULT_READING)
    }
}

/// Min or max tracker recomputed at most once per cadence interval.
#[derive(Debug, Clone)]
pub struct WindowedExtremum {
    direction: Direction,
    cadence_ms: i64,
    last_update: Option<DateTime<Utc>>,
    current: f64,
}

impl WindowedExtremum {
    pub fn new(direction: Direction, cadence_ms: u64) -> Self {
        Self {
            direction,
            cadence_ms: i64::try_from(cadence_ms).unwrap_or(i64::MAX),
            last_update: None,
            current: direction.sentinel(),
        }
    }

    /// Offer this batch's candidate at time `now`.
    ///
    /// The very first offer always updates. Later offers update only once
    /// `now - last_update >= cadence`. Returns whether the tracker updated.
    pub fn offer(&mut self, candidate: f64, now: DateTime<Utc>) -> bool {
        let due = match self.last_update {
            None => true,
            Some(last) => (now - last).num_milliseconds() >= self.cadence_ms,
        };
        if !due {
            return false;
        }
        if candidate.is_finite() {
            self.current = self.direction.pick(self.current, candidate);
        }
        self.last_update = Some(now);
        true
    }

    /// Current extreme, or `None` while still at the sentinel.
    pub fn value(&self) -> Option<f64> {
        self.current.is_finite().then_some(self.current)
    }

    /// Current extreme for display, substituting 0 for "no data".
    pub fn display_value(&self) -> f64 {
        self.value().unwrap_or(DEFAULT_READING)
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn reading(&self) -> WindowedReading {
        WindowedReading {
            value: self.value(),
            window_start: self.last_update,
        }
    }

    pub fn reset(&mut self) {
        self.last_update = None;
        self.current = self.direction.sentinel();
    }
}

/// Headline windowed figures: peak and minimum phase power.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowedSummary {
    pub p_max: WindowedReading,
    pub p_min: WindowedReading,
}

/// Pair of windowed trackers fed from the three phase powers.
#[derive(Debug, Clone)]
pub struct PhasePowerWindow {
    max: WindowedExtremum,
    min: WindowedExtremum,
}

impl PhasePowerWindow {
    pub fn new(cadence_ms: u64) -> Self {
        Self {
            max: WindowedExtremum::new(Direction::Max, cadence_ms),
            min: WindowedExtremum::new(Direction::Min, cadence_ms),
        }
    }

    /// Offer one batch worth of phase powers.
    pub fn offer(&mut self, phase_powers: &[f64], now: DateTime<Utc>) {
        self.max.offer(Direction::Max.extreme_of(phase_powers), now);
        self.min.offer(Direction::Min.extreme_of(phase_powers), now);
    }

    pub fn summary(&self) -> WindowedSummary {
        WindowedSummary {
            p_max: self.max.reading(),
            p_min: self.min.reading(),
        }
    }

    pub fn reset(&mut self) {
        self.max.reset();
        self.min.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_ms(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
    }

    #[test]
    fn test_cadence_sequence_for_max_tracker() {
        let mut tracker = WindowedExtremum::new(Direction::Max, 5000);
        assert_eq!(tracker.value(), None);
        assert_eq!(tracker.display_value(), 0.0);

        assert!(tracker.offer(5.0, at_ms(0)));
        assert_eq!(tracker.value(), Some(5.0));

        // 2000 ms: boundary not reached, 9 is dropped
        assert!(!tracker.offer(9.0, at_ms(2000)));
        assert_eq!(tracker.value(), Some(5.0));
        assert_eq!(tracker.last_update(), Some(at_ms(0)));

        // 6000 ms: boundary elapsed, 2 compared against 5
        assert!(tracker.offer(2.0, at_ms(6000)));
        assert_eq!(tracker.value(), Some(5.0));
        assert_eq!(tracker.last_update(), Some(at_ms(6000)));
    }

    #[test]
    fn test_min_tracker_tightens_on_boundary() {
        let mut tracker = WindowedExtremum::new(Direction::Min, 5000);
        tracker.offer(4.0, at_ms(1_000));
        tracker.offer(1.0, at_ms(5_999));
        assert_eq!(tracker.value(), Some(4.0));
        tracker.offer(3.0, at_ms(6_000));
        assert_eq!(tracker.value(), Some(3.0));
    }

    #[test]
    fn test_exact_boundary_counts_as_elapsed() {
        let mut tracker = WindowedExtremum::new(Direction::Max, 5000);
        tracker.offer(1.0, at_ms(10_000));
        assert!(tracker.offer(2.0, at_ms(15_000)));
        assert_eq!(tracker.value(), Some(2.0));
    }

    #[test]
    fn test_clock_going_backwards_holds() {
        let mut tracker = WindowedExtremum::new(Direction::Max, 5000);
        tracker.offer(1.0, at_ms(10_000));
        assert!(!tracker.offer(7.0, at_ms(1_000)));
        assert_eq!(tracker.value(), Some(1.0));
    }

    #[test]
    fn test_reset_restores_sentinel() {
        let mut tracker = WindowedExtremum::new(Direction::Min, 5000);
        tracker.offer(3.0, at_ms(0));
        tracker.reset();
        assert_eq!(tracker.value(), None);
        assert_eq!(tracker.last_update(), None);
        assert!(tracker.offer(8.0, at_ms(1)));
        assert_eq!(tracker.value(), Some(8.0));
    }

    #[test]
    fn test_extreme_of_phase_values() {
        assert_eq!(Direction::Max.extreme_of(&[2.2, 2.43, 1.97]), 2.43);
        assert_eq!(Direction::Min.extreme_of(&[2.2, 2.43, 1.97]), 1.97);
        assert_eq!(Direction::Max.extreme_of(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_phase_power_window_summary() {
        let mut window = PhasePowerWindow::new(5000);
        window.offer(&[2.2, 2.43, 1.97], at_ms(0));
        window.offer(&[9.0, 9.0, 0.1], at_ms(1000));
        let summary = window.summary();
        assert_eq!(summary.p_max.value, Some(2.43));
        assert_eq!(summary.p_min.value, Some(1.97));
        assert_eq!(summary.p_max.window_start, Some(at_ms(0)));
    }
}
