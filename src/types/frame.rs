//! Aggregation frame: the immutable snapshot handed to the display layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Channel, MonitorStatus};
use crate::config::defaults::DEFAULT_READING;
use crate::derived::DerivedValues;
use crate::extrema::{ExtremumRecord, WindowedSummary};
use crate::history::HistorySet;

/// Everything a renderer needs, consistent as of one processing pass.
///
/// Frames are never mutated after construction; each pass produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationFrame {
    /// Publication counter, incremented for every frame emitted.
    pub sequence: u64,
    pub status: MonitorStatus,
    /// Time of the processing pass that produced the readings.
    pub generated_at: Option<DateTime<Utc>>,

    /// Instantaneous reading per layout channel.
    pub readings: BTreeMap<Channel, f64>,
    /// Channels whose reading was substituted by a default in this pass.
    pub substituted: Vec<Channel>,
    pub derived: DerivedValues,

    /// All-time extrema per channel.
    pub extrema: BTreeMap<Channel, ExtremumRecord>,
    /// Windowed phase-power max/min, `None` when windowed tracking is off.
    pub windowed: Option<WindowedSummary>,

    pub history: HistorySet,
}

impl AggregationFrame {
    /// Frame shown before any batch has been processed.
    pub fn empty(history_capacity: usize) -> Self {
        Self {
            sequence: 0,
            status: MonitorStatus::Unconfigured,
            generated_at: None,
            readings: BTreeMap::new(),
            substituted: Vec::new(),
            derived: DerivedValues::default(),
            extrema: BTreeMap::new(),
            windowed: None,
            history: HistorySet::with_capacity(history_capacity),
        }
    }

    /// Instantaneous reading for display, 0 when absent.
    pub fn reading(&self, channel: Channel) -> f64 {
        self.readings.get(&channel).copied().unwrap_or(DEFAULT_READING)
    }

    pub fn extremum(&self, channel: Channel) -> Option<&ExtremumRecord> {
        self.extrema.get(&channel)
    }

    /// Copy of this frame with a new status and sequence number.
    #[must_use]
    pub fn restamped(&self, status: MonitorStatus, sequence: u64) -> Self {
        Self {
            status,
            sequence,
            ..self.clone()
        }
    }
}

impl Default for AggregationFrame {
    fn default() -> Self {
        Self::empty(crate::config::defaults::HISTORY_CAPACITY)
    }
}
