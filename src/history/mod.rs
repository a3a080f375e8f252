//! Rolling History Buffer
//!
//! Fixed-capacity, FIFO-evicting series of timestamped triples that drive the
//! time-series charts. Appends are pure: a new series is returned and the
//! previous one is left untouched, so a frame already handed to a renderer
//! never changes underneath it.

use serde::{Deserialize, Serialize};

use crate::acquisition::ResolvedReadings;
use crate::config::defaults::HISTORY_CAPACITY;
use crate::types::Channel;

/// One chart sample: wall-clock label plus three phase values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub time: String,
    pub value1: f64,
    pub value2: f64,
    pub value3: f64,
}

impl HistoryPoint {
    pub fn new(time: impl Into<String>, values: [f64; 3]) -> Self {
        let [value1, value2, value3] = values;
        Self {
            time: time.into(),
            value1,
            value2,
            value3,
        }
    }

    pub fn values(&self) -> [f64; 3] {
        [self.value1, self.value2, self.value3]
    }
}

/// Ordered, bounded sequence of [`HistoryPoint`]s (oldest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    capacity: usize,
    points: Vec<HistoryPoint>,
}

impl HistorySeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            points: Vec::with_capacity(capacity),
        }
    }

    /// `(self ++ [point])` keeping only the last `capacity` points.
    #[must_use]
    pub fn append(&self, point: HistoryPoint) -> Self {
        let keep = self.capacity.saturating_sub(1);
        let skip = self.points.len().saturating_sub(keep);

        let mut points = Vec::with_capacity(self.capacity);
        points.extend(self.points.iter().skip(skip).cloned());
        if self.capacity > 0 {
            points.push(point);
        }
        Self {
            capacity: self.capacity,
            points,
        }
    }

    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistorySeries {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

/// Metric groups that each keep one history series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryGroup {
    Voltage,
    Current,
    Power,
    PowerFactor,
    Thd,
}

impl HistoryGroup {
    pub const ALL: [HistoryGroup; 5] = [
        HistoryGroup::Voltage,
        HistoryGroup::Current,
        HistoryGroup::Power,
        HistoryGroup::PowerFactor,
        HistoryGroup::Thd,
    ];

    /// Channels supplying `value1..value3` of this group.
    pub fn channels(&self) -> [Channel; 3] {
        match self {
            HistoryGroup::Voltage => Channel::PHASE_VOLTAGES,
            HistoryGroup::Current => Channel::PHASE_CURRENTS,
            HistoryGroup::Power => Channel::PHASE_POWERS,
            HistoryGroup::PowerFactor => Channel::PHASE_POWER_FACTORS,
            HistoryGroup::Thd => Channel::CURRENT_THD,
        }
    }
}

/// The five history series, always advanced together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySet {
    pub voltage: HistorySeries,
    pub current: HistorySeries,
    pub power: HistorySeries,
    pub power_factor: HistorySeries,
    pub thd: HistorySeries,
}

impl HistorySet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            voltage: HistorySeries::with_capacity(capacity),
            current: HistorySeries::with_capacity(capacity),
            power: HistorySeries::with_capacity(capacity),
            power_factor: HistorySeries::with_capacity(capacity),
            thd: HistorySeries::with_capacity(capacity),
        }
    }

    pub fn series(&self, group: HistoryGroup) -> &HistorySeries {
        match group {
            HistoryGroup::Voltage => &self.voltage,
            HistoryGroup::Current => &self.current,
            HistoryGroup::Power => &self.power,
            HistoryGroup::PowerFactor => &self.power_factor,
            HistoryGroup::Thd => &self.thd,
        }
    }

    /// Append one point per group, all labelled with `time`.
    #[must_use]
    pub fn append_all(&self, time: &str, readings: &ResolvedReadings) -> Self {
        let point = |group: HistoryGroup| {
            HistoryPoint::new(time, group.channels().map(|c| readings.value(c)))
        };
        Self {
            voltage: self.voltage.append(point(HistoryGroup::Voltage)),
            current: self.current.append(point(HistoryGroup::Current)),
            power: self.power.append(point(HistoryGroup::Power)),
            power_factor: self.power_factor.append(point(HistoryGroup::PowerFactor)),
            thd: self.thd.append(point(HistoryGroup::Thd)),
        }
    }
}

impl Default for HistorySet {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}
