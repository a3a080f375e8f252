//! Processing Pipeline Module
//!
//! ## Per-batch pass
//!
//! ```text
//! STAGE 1: Channel resolution (positional ids → named channels)
//! STAGE 2: Derived values (phase total, dominant THD, averages)
//! STAGE 3: Extremum tracking (running + windowed)
//! STAGE 4: History append (five lockstep series)
//! STAGE 5: Frame publication (atomic swap + observers)
//! ```
//!
//! The [`MonitorCoordinator`] owns the event state machine and runs the pass;
//! the [`ProcessingLoop`] feeds it from an [`EventSource`] on the async side.

mod builder;
mod clock;
mod coordinator;
mod publisher;
mod state;
pub mod source;
pub mod processing_loop;

pub use builder::FrameBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::MonitorCoordinator;
pub use processing_loop::ProcessingLoop;
pub use publisher::{FrameHandle, FrameObserver, FramePublisher};
pub use source::{EventSource, JsonLinesSource, ReplaySource, SourceError, SourceEvent, StdinSource};
pub use state::{LoopStats, PipelineStats};
