//! Telemetry records
//!
//! Pure views derived after ingestion and after each tick. Publishing them
//! is the caller's concern.

use core::fmt::Write;

use heapless::String;

use crate::safety::Layer;

/// Capacity of the status line (all layer names plus separators)
pub const MAX_STATUS_LEN: usize = 128;

/// Which raw sample an echo carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleKind {
    Encoder,
    Power,
    Temperature,
}

/// Timestamped raw sample, echoed at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleEcho {
    pub kind: SampleKind,
    pub stamp_ms: u64,
    pub value: i32,
}

/// Feedback record emitted after every tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Feedback {
    pub stamp_ms: u64,
    /// Filtered velocity in m/s
    pub velocity: f32,
    /// Commanded velocity in m/s
    pub velocity_setpoint: f32,
    /// Last computed setpoint
    pub setpoint: f32,
    /// Thrust as a percentage of the controller's full scale
    pub thrust_percent: i32,
}

/// Status record: names of the interlock layers that passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub stamp_ms: u64,
    pub text: String<MAX_STATUS_LEN>,
}

impl Status {
    /// Each passing layer name followed by one space, in table order
    pub fn from_layers(stamp_ms: u64, layers: &[Layer]) -> Self {
        let mut text = String::new();
        for layer in layers {
            // Capacity covers all five names
            let _ = write!(text, "{} ", layer.name());
        }
        Self { stamp_ms, text }
    }
}

/// Branch taken by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Link not online or not initialised; presence query sent
    Requery(Layer),
    /// Controller silent; watchdog counting
    WatchdogWait,
    /// Watchdog threshold exceeded; presence query sent
    WatchdogRequery,
    /// Command or presence failed; controller halted
    EmergencyStop(Layer),
    /// Period baseline established, no regulation step
    Primed,
    /// Regulation step ran and a drive command was sent
    Regulated { thrust: i32 },
}

/// Everything a tick produces for observers
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub feedback: Feedback,
    pub status: Status,
    pub outcome: TickOutcome,
}

/// Thrust as an integer percentage of `full_scale`, truncated toward zero
pub fn thrust_percent(thrust: i32, full_scale: i32) -> i32 {
    if full_scale == 0 {
        return 0;
    }
    let percent = i64::from(thrust) * 100 / i64::from(full_scale);
    percent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
