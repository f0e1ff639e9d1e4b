//! Shared channel inputs
//!
//! Written from the I/O context (serial reader, command subscriber) and
//! read by the control tick. Every field is a lone atomic, so ingestion
//! never blocks and needs no lock around the tick.
//!
//! Encoder accumulation is relative: each sample adds its delta from the
//! previous raw reading, and the tick takes the whole sum with a single
//! swap. A delta that lands after the swap is counted in the next tick,
//! so no delta is lost or counted twice.

use hbl_protocol::{Query, Reply};
use portable_atomic::{AtomicF32, AtomicI32, AtomicU64, Ordering};

use crate::config::ChannelConfig;
use crate::telemetry::{SampleEcho, SampleKind};

/// Timestamp slot value for "never received"
const NEVER: u64 = u64::MAX;

/// Sample and command inputs shared between ingestion and the tick
#[derive(Debug)]
pub struct ChannelInputs {
    /// Wrapping sum of encoder deltas since the last take
    accumulated_ticks: AtomicI32,
    /// Last raw encoder reading
    last_encoder_value: AtomicI32,
    /// Clamped velocity command in m/s
    commanded_velocity: AtomicF32,
    /// Last velocity command time, or NEVER
    last_command_ms: AtomicU64,
    /// Last asserted operator presence time, or NEVER
    last_presence_ms: AtomicU64,
    /// Velocity command limit
    max_velocity_mps: f32,
}

impl ChannelInputs {
    /// Create inputs with no samples or commands received
    ///
    /// Usable in a `static`.
    pub const fn new(max_velocity_mps: f32) -> Self {
        Self {
            accumulated_ticks: AtomicI32::new(0),
            last_encoder_value: AtomicI32::new(0),
            commanded_velocity: AtomicF32::new(0.0),
            last_command_ms: AtomicU64::new(NEVER),
            last_presence_ms: AtomicU64::new(NEVER),
            max_velocity_mps,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.max_velocity_mps)
    }

    /// Ingest a raw encoder (hall counter) reading
    ///
    /// The delta from the previous reading is computed with wrapping
    /// arithmetic, so a counter rolling over the 32-bit range still adds
    /// the true small step.
    pub fn on_encoder_sample(&self, stamp_ms: u64, raw: i32) -> SampleEcho {
        let previous = self.last_encoder_value.swap(raw, Ordering::AcqRel);
        self.accumulated_ticks
            .fetch_add(raw.wrapping_sub(previous), Ordering::AcqRel);

        SampleEcho {
            kind: SampleKind::Encoder,
            stamp_ms,
            value: raw,
        }
    }

    /// Ingest a motor power reading (telemetry only)
    pub fn on_power_sample(&self, stamp_ms: u64, value: i32) -> SampleEcho {
        SampleEcho {
            kind: SampleKind::Power,
            stamp_ms,
            value,
        }
    }

    /// Ingest a temperature reading (telemetry only)
    pub fn on_temperature_sample(&self, stamp_ms: u64, value: i32) -> SampleEcho {
        SampleEcho {
            kind: SampleKind::Temperature,
            stamp_ms,
            value,
        }
    }

    /// Store a velocity command, clamped to the velocity limit
    ///
    /// Non-finite commands are stored as 0.
    pub fn on_velocity_command(&self, velocity_mps: f32, now_ms: u64) {
        let max = self.max_velocity_mps;
        let velocity = if !velocity_mps.is_finite() {
            0.0
        } else if velocity_mps > max {
            max
        } else if velocity_mps < -max {
            -max
        } else {
            velocity_mps
        };

        self.commanded_velocity.store(velocity, Ordering::Release);
        self.last_command_ms.store(stamp(now_ms), Ordering::Release);
    }

    /// Record an operator presence signal
    ///
    /// Only an asserted signal refreshes the timestamp; a released
    /// deadman is detected by the timestamp going stale.
    pub fn on_operator_presence(&self, present: bool, now_ms: u64) {
        if present {
            self.last_presence_ms.store(stamp(now_ms), Ordering::Release);
        }
    }

    /// Route a parsed controller reply to the matching ingestion call
    ///
    /// `channel` is the 1-based controller channel this instance drives.
    /// Returns `None` for replies that carry no sample for it.
    pub fn apply_reply(&self, reply: &Reply, channel: u8, stamp_ms: u64) -> Option<SampleEcho> {
        let value = reply.value_for_channel(channel)?;
        match reply.query()? {
            Query::HallCount => Some(self.on_encoder_sample(stamp_ms, value)),
            Query::MotorPower => Some(self.on_power_sample(stamp_ms, value)),
            Query::Temperature => Some(self.on_temperature_sample(stamp_ms, value)),
            Query::Identity => None,
        }
    }

    /// Take the accumulated ticks, leaving zero
    pub(crate) fn take_accumulated_ticks(&self) -> i32 {
        self.accumulated_ticks.swap(0, Ordering::AcqRel)
    }

    /// Zero the stored velocity command (emergency stop)
    pub(crate) fn clear_command(&self) {
        self.commanded_velocity.store(0.0, Ordering::Release);
    }

    /// Ticks accumulated since the last regulation tick
    pub fn accumulated_ticks(&self) -> i32 {
        self.accumulated_ticks.load(Ordering::Acquire)
    }

    pub fn last_encoder_value(&self) -> i32 {
        self.last_encoder_value.load(Ordering::Acquire)
    }

    pub fn commanded_velocity(&self) -> f32 {
        self.commanded_velocity.load(Ordering::Acquire)
    }

    pub fn max_velocity_mps(&self) -> f32 {
        self.max_velocity_mps
    }

    /// Time of the last velocity command
    pub fn last_command_ms(&self) -> Option<u64> {
        received(self.last_command_ms.load(Ordering::Acquire))
    }

    /// Time of the last asserted operator presence
    pub fn last_presence_ms(&self) -> Option<u64> {
        received(self.last_presence_ms.load(Ordering::Acquire))
    }
}

fn stamp(now_ms: u64) -> u64 {
    now_ms.min(NEVER - 1)
}

fn received(stamp: u64) -> Option<u64> {
    (stamp != NEVER).then_some(stamp)
}
