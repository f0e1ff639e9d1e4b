//! Board-agnostic control cycle for one Roboteq HBL motor channel
//!
//! This crate contains all control logic that does not depend on a
//! specific board or serial driver:
//!
//! - Shared sample and command inputs (lock-free, written from any context)
//! - The layered safety interlock
//! - The regulation pipeline (velocity and position modes)
//! - Emergency stop and stop release
//! - Link health tracking and command freshness
//! - Telemetry records
//! - Configuration types and loaders
//!
//! # Control cycle
//!
//! ```text
//! samples/commands ──► ChannelInputs ──┐
//!                                      ▼
//! LinkStatus ──► interlock ──► regulate | stop ──► CommandLink
//!                                      │
//!                                      └──► TickReport (feedback, status)
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod logging;

pub mod channel;
pub mod config;
pub mod safety;
pub mod telemetry;
pub mod traits;

pub use channel::{Channel, ChannelInputs, ChannelState};
pub use config::{ChannelConfig, ConfigError, ControlMode, PositionSource};
pub use safety::{Freshness, Layer, LinkMonitor, LinkStatus};
pub use telemetry::{Feedback, SampleEcho, SampleKind, Status, TickOutcome, TickReport};
pub use traits::{CommandLink, FeedbackFilter, Regulator, TrajectoryGenerator};
