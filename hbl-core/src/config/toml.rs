//! Minimal TOML parser for channel configuration
//!
//! Handles only the subset the node config uses. The `toml` crate needs
//! `alloc::sync::Arc`, which thumbv6m lacks, so this stays hand-written
//! and allocation free.
//!
//! Supported features:
//! - `[section]` headers: `channel`, `regulator`, `trajectory`, `timeouts`
//! - Key = value pairs (string, integer, float)
//! - Comments (# ...), including trailing comments
//!
//! Unknown keys are rejected so a typo cannot silently fall back to a
//! default calibration.
//!
//! ```toml
//! [channel]
//! number = 1
//! mode = "velocity"
//! ticks_per_meter = 1000.0
//! mps_to_thrust = 1000.0
//!
//! [regulator]
//! kp = 0.5
//! ki = 0.2
//! ```

use super::types::{ChannelConfig, ConfigError, ControlMode, PositionSource};

/// Default speed for `position_source = "fixed_ramp"` without an explicit speed
pub const DEFAULT_RAMP_SPEED_MPS: f32 = 0.25;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is not `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Parsed configuration failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Channel,
    Regulator,
    Trajectory,
    Timeouts,
}

/// Position source as written in the file, resolved after all keys are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Trajectory,
    FixedRamp,
}

/// Parse TOML configuration into a validated [`ChannelConfig`]
///
/// Keys not present keep their [`ChannelConfig::default`] values.
pub fn parse_channel_config(input: &str) -> Result<ChannelConfig, ParseError> {
    let mut config = ChannelConfig::default();
    let mut section = Section::Root;
    let mut source = SourceKind::Trajectory;
    let mut ramp_speed = DEFAULT_RAMP_SPEED_MPS;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = line
                .strip_prefix('[')
                .and_then(|rest| rest.split_once(']'))
                .map(|(header, _)| header)
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;

        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Channel => match key {
                "number" => config.channel = parse_number(value)?,
                "controller_channels" => config.controller_channels = parse_number(value)?,
                "mode" => config.mode = parse_mode(value)?,
                "position_source" => source = parse_source(value)?,
                "ramp_speed_mps" => ramp_speed = parse_number(value)?,
                "ticks_per_meter" => config.ticks_per_meter = parse_number(value)?,
                "mps_to_thrust" => config.mps_to_thrust = parse_number(value)?,
                "max_velocity_mps" => config.max_velocity_mps = parse_number(value)?,
                "max_output" => config.max_output = parse_number(value)?,
                "roboteq_max" => config.roboteq_max = parse_number(value)?,
                "max_period_ms" => config.max_period_ms = parse_number(value)?,
                "watchdog_threshold" => config.watchdog_threshold = parse_number(value)?,
                "log_throttle_ms" => config.log_throttle_ms = parse_number(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
            Section::Regulator => match key {
                "kp" => config.regulator.kp = parse_number(value)?,
                "ki" => config.regulator.ki = parse_number(value)?,
                "integral_limit" => config.regulator.integral_limit = parse_number(value)?,
                "output_limit" => config.regulator.output_limit = parse_number(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
            Section::Trajectory => match key {
                "max_acceleration_mps2" => {
                    config.trajectory.max_acceleration_mps2 = parse_number(value)?
                }
                "max_jerk_mps3" => config.trajectory.max_jerk_mps3 = parse_number(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
            Section::Timeouts => match key {
                "command_ms" => config.timeouts.command_ms = parse_number(value)?,
                "deadman_ms" => config.timeouts.deadman_ms = parse_number(value)?,
                "response_ms" => config.timeouts.response_ms = parse_number(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
        }
    }

    config.position_source = match source {
        SourceKind::Trajectory => PositionSource::Trajectory,
        SourceKind::FixedRamp => PositionSource::FixedRamp {
            speed_mps: ramp_speed,
        },
    };

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "channel" => Ok(Section::Channel),
        "regulator" => Ok(Section::Regulator),
        "trajectory" => Ok(Section::Trajectory),
        "timeouts" => Ok(Section::Timeouts),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    // Remove inline comments; a # inside a string does not start one
    let value = value
        .match_indices('#')
        .map(|(pos, _)| pos)
        .find(|&pos| value[..pos].matches('"').count() % 2 == 0)
        .map_or(value, |pos| value[..pos].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_number<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_mode(value: &str) -> Result<ControlMode, ParseError> {
    match parse_string(value) {
        "velocity" => Ok(ControlMode::Velocity),
        "position" => Ok(ControlMode::Position),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_source(value: &str) -> Result<SourceKind, ParseError> {
    match parse_string(value) {
        "trajectory" => Ok(SourceKind::Trajectory),
        "fixed_ramp" => Ok(SourceKind::FixedRamp),
        _ => Err(ParseError::InvalidValue),
    }
}
