//! Inbound host data: channel configuration, value batches and host events

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered list of opaque identifier tokens delivered by the host.
///
/// Position `i` carries the channel of slot `i` of the active layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelConfig {
    ids: Vec<String>,
}

impl ChannelConfig {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    /// Identifier at `index`, or `None` when the configuration is shorter.
    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<Vec<String>> for ChannelConfig {
    fn from(ids: Vec<String>) -> Self {
        Self::new(ids)
    }
}

impl From<&[&str]> for ChannelConfig {
    fn from(ids: &[&str]) -> Self {
        Self::new(ids.iter().map(|s| (*s).to_string()).collect())
    }
}

/// One batch entry as delivered by the host.
///
/// Kept as raw JSON so that a malformed entry (no `value`, `null`, a string)
/// degrades to a missing reading instead of rejecting the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleValue(serde_json::Value);

impl SampleValue {
    /// Well-formed `{"value": <number>}` entry.
    pub fn new(value: f64) -> Self {
        Self(serde_json::json!({ "value": value }))
    }

    /// Entry present in the batch but lacking a numeric payload.
    pub fn malformed() -> Self {
        Self(serde_json::json!({}))
    }

    /// Numeric payload, if the entry carries one. Bare numbers are accepted too.
    pub fn reading(&self) -> Option<f64> {
        match &self.0 {
            serde_json::Value::Object(map) => map.get("value").and_then(serde_json::Value::as_f64),
            serde_json::Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

/// Mapping from identifier token to sample, consumed by one processing pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueBatch {
    samples: HashMap<String, SampleValue>,
}

impl ValueBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a well-formed reading.
    pub fn with(mut self, id: impl Into<String>, value: f64) -> Self {
        self.insert(id, SampleValue::new(value));
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, sample: SampleValue) {
        self.samples.insert(id.into(), sample);
    }

    pub fn get(&self, id: &str) -> Option<&SampleValue> {
        self.samples.get(id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ValueBatch {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut batch = Self::new();
        for (id, value) in iter {
            batch.insert(id, SampleValue::new(value));
        }
        batch
    }
}

/// The two inbound event kinds, as one JSON-lines record.
///
/// ```json
/// {"event":"configuration","ids":["V1","V2","V3"]}
/// {"event":"values","batch":{"V1":{"value":220.1}}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Configuration { ids: Vec<String> },
    Values { batch: ValueBatch },
}

impl HostEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::Configuration { .. } => "configuration",
            HostEvent::Values { .. } => "values",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_reading_shapes() {
        let batch: ValueBatch = serde_json::from_str(
            r#"{"a":{"value":1.5},"b":{},"c":{"value":null},"d":{"value":"x"},"e":7}"#,
        )
        .expect("batch should parse");
        assert_eq!(batch.get("a").and_then(SampleValue::reading), Some(1.5));
        assert_eq!(batch.get("b").and_then(SampleValue::reading), None);
        assert_eq!(batch.get("c").and_then(SampleValue::reading), None);
        assert_eq!(batch.get("d").and_then(SampleValue::reading), None);
        assert_eq!(batch.get("e").and_then(SampleValue::reading), Some(7.0));
    }

    #[test]
    fn test_host_event_parsing() {
        let cfg: HostEvent =
            serde_json::from_str(r#"{"event":"configuration","ids":["V1","V2"]}"#).expect("parse");
        assert_eq!(
            cfg,
            HostEvent::Configuration {
                ids: vec!["V1".to_string(), "V2".to_string()]
            }
        );

        let values: HostEvent =
            serde_json::from_str(r#"{"event":"values","batch":{"V1":{"value":220}}}"#)
                .expect("parse");
        match values {
            HostEvent::Values { batch } => {
                assert_eq!(batch.get("V1").and_then(SampleValue::reading), Some(220.0));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_config_id_at_tolerates_short_list() {
        let cfg = ChannelConfig::from(&["V1", "V2"][..]);
        assert_eq!(cfg.id_at(1), Some("V2"));
        assert_eq!(cfg.id_at(2), None);
    }
}
