//! Controller link health
//!
//! Tracks the controller-side interlock flags from serial traffic:
//! - online: the controller answered a presence query (`FID=`)
//! - initialised: the node finished its controller init sequence
//! - responding: some line arrived within the response timeout

use hbl_protocol::Reply;

use super::freshness::Freshness;
use super::interlock::LinkStatus;
use crate::channel::ChannelInputs;
use crate::config::ChannelConfig;

/// Link health tracker for one controller
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    /// Identity reply received since the last reset
    online: bool,
    /// Init sequence completed while online
    initialised: bool,
    /// Time of the last line from the controller
    last_traffic_ms: Option<u64>,
    /// Silence longer than this means not responding
    response_timeout_ms: u32,
}

impl LinkMonitor {
    /// Create a monitor for a link that has not spoken yet
    pub const fn new(response_timeout_ms: u32) -> Self {
        Self {
            online: false,
            initialised: false,
            last_traffic_ms: None,
            response_timeout_ms,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.timeouts.response_ms)
    }

    /// Record any line from the controller, parsed or not
    pub fn on_traffic(&mut self, now_ms: u64) {
        self.last_traffic_ms = Some(now_ms);
    }

    /// Record a parsed reply
    pub fn on_reply(&mut self, reply: &Reply, now_ms: u64) {
        self.on_traffic(now_ms);
        if let Reply::Identity(identity) = reply {
            if !self.online {
                log_info!("controller online: {=str}", identity.as_str());
            }
            self.online = true;
        }
    }

    /// Controller init sequence completed
    ///
    /// Ignored while offline; initialisation only counts against a
    /// controller that has identified itself.
    pub fn mark_initialised(&mut self) {
        if self.online {
            self.initialised = true;
        }
    }

    /// Drop back to offline, e.g. after the port was reopened
    pub fn mark_offline(&mut self) {
        self.online = false;
        self.initialised = false;
        self.last_traffic_ms = None;
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Controller spoke within the response timeout
    pub fn responding(&self, now_ms: u64) -> bool {
        self.last_traffic_ms
            .is_some_and(|t| now_ms.saturating_sub(t) <= u64::from(self.response_timeout_ms))
    }

    /// Interlock snapshot combining link health and upstream freshness
    pub fn status(&self, now_ms: u64, inputs: &ChannelInputs, freshness: &Freshness) -> LinkStatus {
        LinkStatus {
            online: self.online,
            initialised: self.initialised,
            responding: self.responding(now_ms),
            cmd_vel_publishing: freshness.command_fresh(inputs, now_ms),
            deadman_pressed: freshness.operator_present(inputs, now_ms),
        }
    }
}
