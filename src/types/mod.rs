//! Shared data structures for three-phase meter aggregation
//!
//! - Channel, ChannelSlot, ChannelLayout (positional layout descriptors)
//! - ChannelConfig, ValueBatch, HostEvent (inbound host data)
//! - MonitorStatus (data availability state machine)
//! - AggregationFrame (outbound snapshot)

mod channel;
mod batch;
mod state;
mod frame;

pub use channel::*;
pub use batch::*;
pub use state::*;
pub use frame::*;
