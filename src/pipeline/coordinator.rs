//! Monitor Coordinator - event state machine for three-phase meter aggregation
//!
//! ```text
//! UNCONFIGURED ──configuration──▶ CONFIGURED_NO_DATA ──batch──▶ LIVE
//!      │                                ▲
//!      └──batch──▶ pending slot ────────┘ (drained once on configuration)
//! ```
//!
//! Events are handled strictly in arrival order; every handler takes
//! `&mut self` and never awaits. Each handled event that changes what a
//! renderer would show publishes a new [`AggregationFrame`].

use std::sync::Arc;
use tracing::{debug, info};

use super::builder::FrameBuilder;
use super::clock::{Clock, SystemClock};
use super::publisher::{FrameHandle, FrameObserver, FramePublisher};
use super::state::PipelineStats;
use crate::config::MonitorConfig;
use crate::types::{AggregationFrame, ChannelConfig, ChannelLayout, HostEvent, MonitorStatus, ValueBatch};

/// Owns tracker state, the channel configuration and the latest frame.
pub struct MonitorCoordinator<C: Clock = SystemClock> {
    builder: FrameBuilder,
    clock: C,
    channel_config: Option<ChannelConfig>,
    /// Most recent batch received before configuration (last-write-wins)
    pending: Option<ValueBatch>,
    extrema: crate::extrema::ExtremaState,
    status: MonitorStatus,
    publisher: FramePublisher,
    stats: PipelineStats,
}

impl MonitorCoordinator<SystemClock> {
    pub fn with_system_clock(config: &MonitorConfig) -> Self {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> MonitorCoordinator<C> {
    pub fn new(config: &MonitorConfig, clock: C) -> Self {
        let builder = FrameBuilder::new(config);
        info!(
            profile = %config.engine.profile,
            channels = builder.layout().len(),
            windowed = config.engine.track_windowed_extrema,
            "Initializing monitor coordinator"
        );

        Self {
            extrema: builder.new_extrema_state(),
            publisher: FramePublisher::new(builder.empty_frame()),
            builder,
            clock,
            channel_config: None,
            pending: None,
            status: MonitorStatus::Unconfigured,
            stats: PipelineStats::default(),
        }
    }

    // ========================================================================
    // Inbound events
    // ========================================================================

    /// Store the identifier list, leave `Unconfigured`, and drain the pending
    /// batch if one was parked.
    ///
    /// A re-delivered configuration replaces the previous one; a `Live`
    /// monitor stays `Live`.
    pub fn on_configuration_delivered(&mut self, ids: impl Into<ChannelConfig>) -> Arc<AggregationFrame> {
        let ids = ids.into();
        self.stats.configurations_received += 1;

        let layout_len = self.builder.layout().len();
        if ids.len() < layout_len {
            debug!(
                delivered = ids.len(),
                expected = layout_len,
                "Configuration shorter than layout; trailing channels will read defaults"
            );
        }
        info!(ids = ids.len(), "Configuration delivered");

        self.channel_config = Some(ids);
        if self.status == MonitorStatus::Unconfigured {
            self.status = MonitorStatus::ConfiguredNoData;
        }

        if let Some(batch) = self.pending.take() {
            info!(entries = batch.len(), "Draining pending batch");
            self.stats.pending_drained += 1;
            if let Some(frame) = self.process(&batch) {
                return frame;
            }
        }

        self.republish()
    }

    /// Process a batch, or park it when no configuration has arrived yet.
    ///
    /// Returns `None` when the batch was parked.
    pub fn on_value_batch_delivered(&mut self, batch: ValueBatch) -> Option<Arc<AggregationFrame>> {
        self.stats.batches_received += 1;

        if self.channel_config.is_none() {
            if self.pending.replace(batch).is_some() {
                self.stats.batches_superseded += 1;
                debug!("Pending batch superseded before configuration");
            } else {
                debug!("Batch parked until configuration arrives");
            }
            return None;
        }

        self.process(&batch)
    }

    /// Dispatch a host event. Returns the published frame, if any.
    pub fn handle(&mut self, event: HostEvent) -> Option<Arc<AggregationFrame>> {
        match event {
            HostEvent::Configuration { ids } => Some(self.on_configuration_delivered(ids)),
            HostEvent::Values { batch } => self.on_value_batch_delivered(batch),
        }
    }

    /// Clear running and windowed extrema and republish.
    pub fn reset_extrema(&mut self) -> Arc<AggregationFrame> {
        self.extrema.reset();
        self.stats.extrema_resets += 1;
        info!("Extrema reset");

        let latest = self.publisher.latest();
        let mut frame = latest.restamped(self.status, latest.sequence + 1);
        frame.extrema = self.extrema.running().records().clone();
        frame.windowed = self.extrema.windowed_summary();
        self.publish(frame)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn latest(&self) -> Arc<AggregationFrame> {
        self.publisher.latest()
    }

    pub fn status(&self) -> MonitorStatus {
        self.status
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn subscribe(&mut self, observer: Box<dyn FrameObserver>) {
        self.publisher.subscribe(observer);
    }

    /// Lock-free read handle for renderer threads.
    pub fn frame_handle(&self) -> FrameHandle {
        self.publisher.handle()
    }

    pub fn channel_config(&self) -> Option<&ChannelConfig> {
        self.channel_config.as_ref()
    }

    pub fn layout(&self) -> &ChannelLayout {
        self.builder.layout()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            status: self.status,
            ..self.stats
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn process(&mut self, batch: &ValueBatch) -> Option<Arc<AggregationFrame>> {
        let config = self.channel_config.as_ref()?;
        let now = self.clock.now();
        let previous = self.publisher.latest();

        let frame = self
            .builder
            .build(&previous, config, batch, now, &mut self.extrema);

        if !frame.substituted.is_empty() {
            debug!(count = frame.substituted.len(), "Readings substituted with defaults");
        }

        self.status = MonitorStatus::Live;
        self.stats.batches_processed += 1;
        Some(self.publish(frame))
    }

    fn republish(&mut self) -> Arc<AggregationFrame> {
        let latest = self.publisher.latest();
        let frame = latest.restamped(self.status, latest.sequence + 1);
        self.publish(frame)
    }

    fn publish(&mut self, frame: AggregationFrame) -> Arc<AggregationFrame> {
        self.stats.frames_published += 1;
        self.publisher.publish(frame)
    }
}
