//! Host event loop shared across all input modes.
//!
//! Drives an [`EventSource`] into a [`MonitorCoordinator`] until the source is
//! exhausted or the cancellation token fires.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::coordinator::MonitorCoordinator;
use super::source::{EventSource, SourceEvent};
use super::state::LoopStats;

/// Progress is logged every this many events.
const PROGRESS_INTERVAL: u64 = 100;

/// Owns the coordinator for the duration of a run.
pub struct ProcessingLoop<C: Clock> {
    coordinator: MonitorCoordinator<C>,
    cancel_token: CancellationToken,
}

impl<C: Clock> ProcessingLoop<C> {
    pub fn new(coordinator: MonitorCoordinator<C>, cancel_token: CancellationToken) -> Self {
        Self {
            coordinator,
            cancel_token,
        }
    }

    pub fn coordinator(&self) -> &MonitorCoordinator<C> {
        &self.coordinator
    }

    pub fn into_coordinator(self) -> MonitorCoordinator<C> {
        self.coordinator
    }

    /// Run until the source is exhausted, fails, or cancellation.
    ///
    /// Returns final loop statistics.
    pub async fn run<S: EventSource>(&mut self, source: &mut S) -> LoopStats {
        let mut stats = LoopStats::default();

        info!("Processing host events from {}", source.source_name());

        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    info!("[ProcessingLoop] Shutdown signal received");
                    stats.cancelled = true;
                    break;
                }
                result = source.next_event() => {
                    match result {
                        Ok(ev) => ev,
                        Err(e) => {
                            warn!("[ProcessingLoop] Source error: {}", e);
                            break;
                        }
                    }
                }
            };

            let event = match event {
                SourceEvent::Event(event) => event,
                SourceEvent::Eof => {
                    info!(
                        "[ProcessingLoop] Source reached end ({} events received)",
                        stats.events_received
                    );
                    break;
                }
            };

            stats.events_received += 1;
            let kind = event.kind();

            match self.coordinator.handle(event) {
                Some(frame) => {
                    stats.frames_emitted += 1;
                    debug!(kind, sequence = frame.sequence, status = %frame.status, "Frame published");
                }
                None => debug!(kind, "Event produced no frame"),
            }

            if stats.events_received % PROGRESS_INTERVAL == 0 {
                info!("Progress: {}", self.coordinator.stats());
            }
        }

        stats.pipeline = self.coordinator.stats();
        info!("Final statistics: {}", stats);
        stats
    }
}
