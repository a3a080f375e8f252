//! Channel Resolver
//!
//! Maps the host's positional identifier list plus one value batch onto the
//! named channels of the active [`ChannelLayout`]. Resolution never fails:
//! anything absent degrades to the slot default and is reported at debug level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::defaults::DEFAULT_READING;
use crate::types::{Channel, ChannelConfig, ChannelLayout, ValueBatch};

/// How a channel reading was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Numeric value found in the batch.
    Present,
    /// Configuration has no identifier at the slot position.
    Unconfigured,
    /// Identifier configured but absent from the batch.
    Missing,
    /// Identifier present in the batch without a numeric payload.
    Malformed,
}

impl Resolution {
    pub fn is_substitution(&self) -> bool {
        !matches!(self, Resolution::Present)
    }
}

/// Resolve one position, reporting how the value was obtained.
pub fn resolve_with_outcome(
    config: &ChannelConfig,
    batch: &ValueBatch,
    index: usize,
    default: f64,
) -> (f64, Resolution) {
    let Some(id) = config.id_at(index) else {
        return (default, Resolution::Unconfigured);
    };
    match batch.get(id) {
        None => (default, Resolution::Missing),
        Some(sample) => match sample.reading() {
            Some(v) => (v, Resolution::Present),
            None => (default, Resolution::Malformed),
        },
    }
}

/// `batch[config[index]].value`, or `default` when any link in that chain is absent.
pub fn resolve(config: &ChannelConfig, batch: &ValueBatch, index: usize, default: f64) -> f64 {
    resolve_with_outcome(config, batch, index, default).0
}

/// A resolved channel value together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedReading {
    pub value: f64,
    pub resolution: Resolution,
}

/// All channel readings of one batch, keyed by channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedReadings {
    entries: BTreeMap<Channel, ResolvedReading>,
}

impl ResolvedReadings {
    /// Reading for `channel`, or `None` if the layout does not carry it.
    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.entries.get(&channel).map(|r| r.value)
    }

    /// Reading for `channel`, defaulting channels outside the layout.
    pub fn value(&self, channel: Channel) -> f64 {
        self.get(channel).unwrap_or(DEFAULT_READING)
    }

    pub fn resolution(&self, channel: Channel) -> Option<Resolution> {
        self.entries.get(&channel).map(|r| r.resolution)
    }

    /// Whether the layout carries `channel` and the configuration assigns it an identifier.
    pub fn is_configured(&self, channel: Channel) -> bool {
        matches!(
            self.resolution(channel),
            Some(r) if r != Resolution::Unconfigured
        )
    }

    /// Channels whose reading was substituted by a default in this batch.
    pub fn substituted(&self) -> Vec<Channel> {
        self.entries
            .iter()
            .filter(|(_, r)| r.resolution.is_substitution())
            .map(|(&c, _)| c)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        self.entries.iter().map(|(&c, r)| (c, r.value))
    }

    /// Plain channel → value map for the aggregation frame.
    pub fn to_values(&self) -> BTreeMap<Channel, f64> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves every slot of a layout against a configuration and a batch.
#[derive(Debug, Clone)]
pub struct ChannelResolver {
    layout: ChannelLayout,
}

impl ChannelResolver {
    pub fn new(layout: ChannelLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    pub fn resolve_all(&self, config: &ChannelConfig, batch: &ValueBatch) -> ResolvedReadings {
        let mut entries = BTreeMap::new();

        for (index, slot) in self.layout.slots().iter().enumerate() {
            if entries.contains_key(&slot.channel) {
                // First slot wins for a duplicated channel
                continue;
            }
            let (value, resolution) = resolve_with_outcome(config, batch, index, slot.default);
            if resolution.is_substitution() {
                debug!(
                    channel = %slot.channel,
                    index,
                    id = config.id_at(index).unwrap_or("<none>"),
                    ?resolution,
                    default = slot.default,
                    "Channel reading substituted with default"
                );
            }
            entries.insert(slot.channel, ResolvedReading { value, resolution });
        }

        ResolvedReadings { entries }
    }
}
