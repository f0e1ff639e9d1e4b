//! Upstream liveness flags derived from ingestion timestamps

use crate::channel::ChannelInputs;
use crate::config::TimeoutConfig;

/// Age bounds for velocity commands and operator presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Freshness {
    pub command_timeout_ms: u32,
    pub deadman_timeout_ms: u32,
}

impl Freshness {
    pub fn from_config(timeouts: &TimeoutConfig) -> Self {
        Self {
            command_timeout_ms: timeouts.command_ms,
            deadman_timeout_ms: timeouts.deadman_ms,
        }
    }

    /// Velocity commands are still arriving
    pub fn command_fresh(&self, inputs: &ChannelInputs, now_ms: u64) -> bool {
        younger_than(inputs.last_command_ms(), now_ms, self.command_timeout_ms)
    }

    /// Operator presence was asserted recently
    pub fn operator_present(&self, inputs: &ChannelInputs, now_ms: u64) -> bool {
        younger_than(inputs.last_presence_ms(), now_ms, self.deadman_timeout_ms)
    }
}

fn younger_than(stamp: Option<u64>, now_ms: u64, timeout_ms: u32) -> bool {
    stamp.is_some_and(|t| now_ms.saturating_sub(t) < u64::from(timeout_ms))
}
