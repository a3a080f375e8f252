//! phasewatch: Three-phase power meter aggregation
//!
//! Turns a host's positional channel configuration plus a stream of value
//! batches into immutable display snapshots.
//!
//! ## Architecture
//!
//! - **Channel Resolver**: positional identifiers → named channels via a layout descriptor
//! - **Derived Values**: phase power total, dominant THD, voltage average, current total
//! - **Extremum Tracker**: running min/max with timestamps plus windowed phase-power peaks
//! - **History Buffer**: five bounded, lockstep series for trend charts
//! - **Pipeline**: event state machine, frame publication and host event sources

pub mod acquisition;
pub mod config;
pub mod derived;
pub mod extrema;
pub mod history;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, MonitorConfig};

// Re-export commonly used types
pub use types::{
    AggregationFrame, Channel, ChannelConfig, ChannelLayout, ChannelSlot, HostEvent,
    LayoutProfile, MonitorStatus, SampleValue, ValueBatch,
};

// Re-export engine components
pub use acquisition::{ChannelResolver, Resolution, ResolvedReadings};
pub use derived::DerivedValues;
pub use extrema::{ExtremaState, ExtremumRecord, WindowedSummary};
pub use history::{HistoryGroup, HistoryPoint, HistorySeries, HistorySet};
pub use pipeline::{Clock, FrameHandle, FrameObserver, ManualClock, MonitorCoordinator, SystemClock};
