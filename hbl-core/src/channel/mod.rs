//! Motor channel
//!
//! A channel is split in two halves:
//! - [`ChannelInputs`]: shared atomics written by ingestion from any context
//! - [`Channel`]: tick-owned state plus the injected filter, regulator
//!   and trajectory generator
//!
//! The tick takes `&mut Channel` and `&ChannelInputs`, so ingestion never
//! contends with the tick for a lock.

pub mod cycle;
pub mod inputs;
pub mod state;

pub use cycle::{thrust_from_setpoint, Channel};
pub use inputs::ChannelInputs;
pub use state::ChannelState;
