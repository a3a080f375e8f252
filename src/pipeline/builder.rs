//! Aggregation Frame Builder
//!
//! One processing pass over one batch:
//!
//! ```text
//! Resolver → Derived-Value Calculator → Extremum Tracker → History Buffer → Frame
//! ```
//!
//! The builder itself is stateless. Tracker state is threaded through as an
//! explicit `&mut ExtremaState` and history is carried forward from the
//! previous frame, so the result depends only on the arguments.

use chrono::{DateTime, Local, Utc};
use tracing::warn;

use crate::acquisition::ChannelResolver;
use crate::config::defaults::TIME_LABEL_FORMAT;
use crate::config::validation::validate_label_format;
use crate::config::MonitorConfig;
use crate::derived;
use crate::extrema::ExtremaState;
use crate::types::{AggregationFrame, ChannelConfig, ChannelLayout, MonitorStatus, ValueBatch};

/// Builds a new [`AggregationFrame`] per batch according to one engine configuration.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    resolver: ChannelResolver,
    prefer_explicit_total: bool,
    track_extremum_timestamps: bool,
    window_cadence_ms: Option<u64>,
    history_capacity: usize,
    label_format: String,
    local_time_labels: bool,
}

impl FrameBuilder {
    pub fn new(config: &MonitorConfig) -> Self {
        let label_format = match validate_label_format(&config.history.label_format) {
            Ok(()) => config.history.label_format.clone(),
            Err(e) => {
                warn!(error = %e, "Falling back to default history label format");
                TIME_LABEL_FORMAT.to_string()
            }
        };

        Self {
            resolver: ChannelResolver::new(config.engine.layout()),
            prefer_explicit_total: config.engine.prefer_explicit_total,
            track_extremum_timestamps: config.engine.track_extremum_timestamps,
            window_cadence_ms: config
                .engine
                .track_windowed_extrema
                .then_some(config.window.cadence_ms),
            history_capacity: config.history.capacity,
            label_format,
            local_time_labels: config.history.local_time_labels,
        }
    }

    pub fn layout(&self) -> &ChannelLayout {
        self.resolver.layout()
    }

    /// Frame published before the first pass.
    pub fn empty_frame(&self) -> AggregationFrame {
        AggregationFrame::empty(self.history_capacity)
    }

    /// Fresh tracker state matching this builder's feature switches.
    pub fn new_extrema_state(&self) -> ExtremaState {
        ExtremaState::new(self.track_extremum_timestamps, self.window_cadence_ms)
    }

    /// Run one processing pass.
    pub fn build(
        &self,
        previous: &AggregationFrame,
        config: &ChannelConfig,
        batch: &ValueBatch,
        now: DateTime<Utc>,
        extrema: &mut ExtremaState,
    ) -> AggregationFrame {
        let readings = self.resolver.resolve_all(config, batch);
        let derived = derived::compute(&readings, self.prefer_explicit_total);

        extrema.observe(&readings, now);

        let label = self.time_label(now);
        let history = previous.history.append_all(&label, &readings);

        AggregationFrame {
            sequence: previous.sequence + 1,
            status: MonitorStatus::Live,
            generated_at: Some(now),
            readings: readings.to_values(),
            substituted: readings.substituted(),
            derived,
            extrema: extrema.running().records().clone(),
            windowed: extrema.windowed_summary(),
            history,
        }
    }

    /// Wall-clock label for history points.
    pub fn time_label(&self, now: DateTime<Utc>) -> String {
        if self.local_time_labels {
            now.with_timezone(&Local).format(&self.label_format).to_string()
        } else {
            now.format(&self.label_format).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, LayoutProfile};
    use chrono::TimeZone;

    fn utc_config(profile: LayoutProfile) -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.engine.profile = profile;
        config.history.local_time_labels = false;
        config
    }

    fn basic_ids() -> ChannelConfig {
        ChannelConfig::from(&["V1", "V2", "V3", "I1", "I2", "I3", "P1", "P2", "P3"][..])
    }

    fn at_ms(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
    }

    #[test]
    fn test_build_end_to_end_readings() {
        let builder = FrameBuilder::new(&utc_config(LayoutProfile::Basic));
        let mut extrema = builder.new_extrema_state();
        let batch: ValueBatch = [
            ("V1", 220.0), ("V2", 221.0), ("V3", 219.0),
            ("I1", 10.0), ("I2", 11.0), ("I3", 9.0),
            ("P1", 2.2), ("P2", 2.43), ("P3", 1.97),
        ]
        .into_iter()
        .collect();

        let frame = builder.build(&builder.empty_frame(), &basic_ids(), &batch, at_ms(0), &mut extrema);

        assert_eq!(frame.status, MonitorStatus::Live);
        assert_eq!(frame.sequence, 1);
        assert_eq!(frame.reading(Channel::U2), 221.0);
        assert!((frame.derived.phase_power_total - 6.6).abs() < 1e-9);
        assert!((frame.derived.voltage_average - 220.0).abs() < 1e-9);
        assert!((frame.derived.current_total - 30.0).abs() < 1e-9);
        assert!(frame.substituted.is_empty());
        assert_eq!(frame.history.voltage.points()[0].time, "00:00:00");
    }

    #[test]
    fn test_build_carries_history_forward() {
        let builder = FrameBuilder::new(&utc_config(LayoutProfile::Basic));
        let mut extrema = builder.new_extrema_state();
        let batch = ValueBatch::new().with("V1", 1.0);

        let first = builder.build(&builder.empty_frame(), &basic_ids(), &batch, at_ms(0), &mut extrema);
        let second = builder.build(&first, &basic_ids(), &batch, at_ms(1000), &mut extrema);

        assert_eq!(first.history.voltage.len(), 1);
        assert_eq!(second.history.voltage.len(), 2);
        assert_eq!(second.history.voltage.points()[1].time, "00:00:01");
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn test_feature_switches() {
        let mut config = utc_config(LayoutProfile::Basic);
        config.engine.track_windowed_extrema = false;
        config.engine.track_extremum_timestamps = false;
        let builder = FrameBuilder::new(&config);
        let mut extrema = builder.new_extrema_state();
        let batch = ValueBatch::new().with("P1", 3.0);

        let frame = builder.build(&builder.empty_frame(), &basic_ids(), &batch, at_ms(0), &mut extrema);
        assert!(frame.windowed.is_none());
        let rec = frame.extremum(Channel::P1).copied().unwrap_or_default();
        assert_eq!(rec.max, Some(3.0));
        assert_eq!(rec.max_time, None);
    }

    #[test]
    fn test_invalid_label_format_falls_back() {
        let mut config = utc_config(LayoutProfile::Basic);
        config.history.label_format = "%Q".to_string();
        let builder = FrameBuilder::new(&config);
        assert_eq!(builder.time_label(at_ms(3_723_000)), "01:02:03");
    }
}
