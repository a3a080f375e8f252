//! Running all-time extrema with first-occurrence timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::acquisition::ResolvedReadings;
use crate::types::Channel;

/// Monotone min/max accumulator for one channel.
///
/// `min` only decreases and `max` only increases. The time of a bound moves
/// only on a strict improvement, so ties keep the first occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtremumRecord {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_time: Option<DateTime<Utc>>,
    pub max_time: Option<DateTime<Utc>>,
}

impl ExtremumRecord {
    /// Fold one observation into the record.
    ///
    /// `at` is `None` when timestamps are not being tracked. Non-finite values
    /// are ignored and `false` is returned.
    pub fn observe(&mut self, value: f64, at: Option<DateTime<Utc>>) -> bool {
        if !value.is_finite() {
            return false;
        }
        if self.min.map_or(true, |m| value < m) {
            self.min = Some(value);
            self.min_time = at;
        }
        if self.max.map_or(true, |m| value > m) {
            self.max = Some(value);
            self.max_time = at;
        }
        true
    }

    pub fn has_data(&self) -> bool {
        self.min.is_some()
    }
}

/// Per-channel running extrema for every channel of the active layout.
#[derive(Debug, Clone, Default)]
pub struct RunningExtrema {
    records: BTreeMap<Channel, ExtremumRecord>,
    track_timestamps: bool,
}

impl RunningExtrema {
    pub fn new(track_timestamps: bool) -> Self {
        Self {
            records: BTreeMap::new(),
            track_timestamps,
        }
    }

    /// Observe every reading of one batch at time `now`.
    ///
    /// Channels with no configured identifier keep an empty record.
    pub fn observe_all(&mut self, readings: &ResolvedReadings, now: DateTime<Utc>) {
        let at = self.track_timestamps.then_some(now);
        for (channel, value) in readings.iter() {
            let record = self.records.entry(channel).or_default();
            if !readings.is_configured(channel) {
                continue;
            }
            if !record.observe(value, at) {
                debug!(%channel, value, "Ignoring non-finite reading for extremum tracking");
            }
        }
    }

    pub fn get(&self, channel: Channel) -> Option<&ExtremumRecord> {
        self.records.get(&channel)
    }

    pub fn records(&self) -> &BTreeMap<Channel, ExtremumRecord> {
        &self.records
    }

    /// Forget all extrema. The next observation of each channel starts a fresh record.
    pub fn reset(&mut self) {
        self.records.clear();
    }
}
