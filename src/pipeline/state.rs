//! Pipeline counters

use serde::{Deserialize, Serialize};

use crate::types::MonitorStatus;

/// Coordinator-level counters, readable at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub status: MonitorStatus,
    pub configurations_received: u64,
    pub batches_received: u64,
    pub batches_processed: u64,
    /// Batches parked before configuration and later overwritten
    pub batches_superseded: u64,
    pub pending_drained: u64,
    pub extrema_resets: u64,
    pub frames_published: u64,
}

impl std::fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pipeline [{}]: {} configurations, {} batches ({} processed, {} superseded, {} drained), {} frames",
            self.status,
            self.configurations_received,
            self.batches_received,
            self.batches_processed,
            self.batches_superseded,
            self.pending_drained,
            self.frames_published
        )
    }
}

/// Result of a [`ProcessingLoop`](super::ProcessingLoop) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStats {
    pub events_received: u64,
    pub frames_emitted: u64,
    /// Whether the loop ended through cancellation rather than end of input
    pub cancelled: bool,
    pub pipeline: PipelineStats,
}

impl std::fmt::Display for LoopStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} events, {} frames emitted{} | {}",
            self.events_received,
            self.frames_emitted,
            if self.cancelled { " (cancelled)" } else { "" },
            self.pipeline
        )
    }
}
