//! Tick-owned channel state

/// Control outputs and supervisory state owned by the tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    /// Last computed setpoint
    pub current_setpoint: f32,
    /// Last thrust sent, in controller units
    pub current_thrust: i32,
    /// Last feedback filter output in m/s
    pub filtered_velocity: f32,
    /// Last position-mode target in meters
    pub desired_position: f32,
    /// Consecutive online-but-silent ticks
    pub watchdog_counter: u8,
    /// Controller halted by the interlock
    pub emergency_stop_active: bool,
    /// Time of the last regulation or priming tick
    pub last_regulation_ms: Option<u64>,
    /// Transmit errors reported by the link
    pub transmit_failures: u32,
}
