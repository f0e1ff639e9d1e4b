//! Configuration type definitions
//!
//! Calibration constants and limits for one channel. Fixed at construction;
//! the control cycle never mutates its configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest channel number on a Roboteq controller
pub const MAX_CONTROLLER_CHANNELS: u8 = 3;

/// Regulation mode, fixed for the channel's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlMode {
    /// Feed-forward commanded velocity plus regulator correction
    #[default]
    Velocity,
    /// Trajectory target position tracked by the regulator
    Position,
}

/// Where the position-mode target comes from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionSource {
    /// Target produced by the trajectory generator
    #[default]
    Trajectory,
    /// Target advances at a fixed speed from the current position,
    /// ignoring the commanded velocity (bench testing only)
    FixedRamp { speed_mps: f32 },
}

/// Regulator gains and limits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegulatorConfig {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain (per second)
    pub ki: f32,
    /// Anti-windup clamp on the integral term
    pub integral_limit: f32,
    /// Clamp on the total correction
    pub output_limit: f32,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            kp: 0.5,
            ki: 0.2,
            integral_limit: 0.5,
            output_limit: 1.0,
        }
    }
}

/// Trajectory generator limits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryConfig {
    /// Maximum acceleration in m/s²
    pub max_acceleration_mps2: f32,
    /// Maximum jerk in m/s³
    pub max_jerk_mps3: f32,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            max_acceleration_mps2: 0.5,
            max_jerk_mps3: 2.0,
        }
    }
}

/// Age bounds for the link and upstream liveness signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeoutConfig {
    /// Velocity commands older than this are stale
    pub command_ms: u32,
    /// Operator presence older than this counts as released
    pub deadman_ms: u32,
    /// Controller silent for longer than this is not responding
    pub response_ms: u32,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_ms: 500,
            deadman_ms: 500,
            response_ms: 1000,
        }
    }
}

/// Complete configuration for one motor channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelConfig {
    /// Controller channel driven by this instance (1-based)
    pub channel: u8,
    /// Channels on the controller, all zeroed by an emergency stop
    pub controller_channels: u8,
    /// Regulation mode
    pub mode: ControlMode,
    /// Position-mode target policy
    pub position_source: PositionSource,
    /// Encoder ticks per meter of travel
    pub ticks_per_meter: f32,
    /// Controller thrust units per m/s
    pub mps_to_thrust: f32,
    /// Velocity command limit in m/s
    pub max_velocity_mps: f32,
    /// Thrust limit sent to the controller
    pub max_output: i32,
    /// Controller full-scale thrust, used for the percentage in telemetry
    pub roboteq_max: i32,
    /// Longest period handed to the regulator and trajectory; longer gaps are clamped
    pub max_period_ms: u32,
    /// Non-responding ticks tolerated before a presence re-query
    pub watchdog_threshold: u8,
    /// Minimum interval between repeated link diagnostics
    pub log_throttle_ms: u32,
    /// Regulator gains
    pub regulator: RegulatorConfig,
    /// Trajectory limits
    pub trajectory: TrajectoryConfig,
    /// Liveness timeouts
    pub timeouts: TimeoutConfig,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel: 1,
            controller_channels: 2,
            mode: ControlMode::Velocity,
            position_source: PositionSource::Trajectory,
            ticks_per_meter: 1000.0,
            mps_to_thrust: 1000.0,
            max_velocity_mps: 1.0,
            max_output: 1000,
            roboteq_max: 1000,
            max_period_ms: 500,
            watchdog_threshold: 10,
            log_throttle_ms: 5000,
            regulator: RegulatorConfig::default(),
            trajectory: TrajectoryConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel number is zero or beyond the controller's channels
    InvalidChannel,
    /// Ticks-per-meter or thrust scale is not a positive finite number
    InvalidCalibration,
    /// Velocity or thrust limit is not positive
    InvalidLimit,
    /// A period or timeout is zero
    InvalidTiming,
    /// A regulator or trajectory parameter is negative or not finite
    InvalidGain,
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

impl ChannelConfig {
    /// Meters of travel per encoder tick
    pub fn distance_per_tick(&self) -> f32 {
        1.0 / self.ticks_per_meter
    }

    /// Check the configuration for values the control cycle cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel == 0
            || self.controller_channels == 0
            || self.controller_channels > MAX_CONTROLLER_CHANNELS
            || self.channel > self.controller_channels
        {
            return Err(ConfigError::InvalidChannel);
        }

        if !positive(self.ticks_per_meter) || !positive(self.mps_to_thrust) {
            return Err(ConfigError::InvalidCalibration);
        }

        if !positive(self.max_velocity_mps) || self.max_output <= 0 || self.roboteq_max <= 0 {
            return Err(ConfigError::InvalidLimit);
        }

        if self.max_period_ms == 0
            || self.timeouts.command_ms == 0
            || self.timeouts.deadman_ms == 0
            || self.timeouts.response_ms == 0
        {
            return Err(ConfigError::InvalidTiming);
        }

        let regulator = &self.regulator;
        let trajectory = &self.trajectory;
        if !non_negative(regulator.kp)
            || !non_negative(regulator.ki)
            || !non_negative(regulator.integral_limit)
            || !positive(regulator.output_limit)
            || !positive(trajectory.max_acceleration_mps2)
            || !positive(trajectory.max_jerk_mps3)
        {
            return Err(ConfigError::InvalidGain);
        }

        if let PositionSource::FixedRamp { speed_mps } = self.position_source {
            if !speed_mps.is_finite() {
                return Err(ConfigError::InvalidGain);
            }
        }

        Ok(())
    }
}
