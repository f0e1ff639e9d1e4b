//! Host-to-controller commands
//!
//! Command strings must match the controller firmware byte for byte:
//! - `!G <channel> <thrust>`: set motor command (-1000..=1000 on stock firmware)
//! - `!EX`: emergency stop
//! - `!MG`: release emergency stop
//! - `?FID`: firmware identity, used as the presence probe

use core::fmt::{self, Write};

use heapless::String;

/// Line terminator expected by the controller
pub const TERMINATOR: char = '\r';

/// Longest encoded command without terminator (`!G 255 -2147483648`)
pub const MAX_COMMAND_LEN: usize = 24;

/// Encoded command buffer
pub type CommandString = String<MAX_COMMAND_LEN>;

/// Runtime queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Query {
    /// `?FID` firmware identity string
    Identity,
    /// `?CB` absolute brushless (hall) counter per channel
    HallCount,
    /// `?P` applied motor power per channel
    MotorPower,
    /// `?T` temperature per sensor
    Temperature,
}

impl Query {
    /// Mnemonic used both in the query and the reply key
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Query::Identity => "FID",
            Query::HallCount => "CB",
            Query::MotorPower => "P",
            Query::Temperature => "T",
        }
    }

    /// Look up a query by its reply key
    pub fn from_mnemonic(key: &str) -> Option<Self> {
        match key {
            "FID" => Some(Query::Identity),
            "CB" => Some(Query::HallCount),
            "P" => Some(Query::MotorPower),
            "T" => Some(Query::Temperature),
            _ => None,
        }
    }
}

/// A command sent to the motor controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Drive one channel with a thrust value in controller units
    Drive { channel: u8, thrust: i32 },
    /// Halt all channels immediately
    EmergencyStop,
    /// Clear a previous emergency stop
    ReleaseStop,
    /// Read a runtime value
    Query(Query),
}

impl Command {
    /// Presence probe issued while the link is down
    pub const PRESENCE_QUERY: Command = Command::Query(Query::Identity);

    /// Zero-thrust drive command for a channel
    pub const fn stop_channel(channel: u8) -> Self {
        Command::Drive {
            channel,
            thrust: 0,
        }
    }

    /// Encode without line terminator
    pub fn encode(&self) -> CommandString {
        let mut out = CommandString::new();
        // Capacity covers the longest command, see MAX_COMMAND_LEN
        let _ = write!(out, "{}", self);
        out
    }

    /// Encode with the trailing carriage return, ready for the wire
    pub fn encode_line(&self) -> String<{ MAX_COMMAND_LEN + 1 }> {
        let mut out = String::new();
        let _ = write!(out, "{}{}", self, TERMINATOR);
        out
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Drive { channel, thrust } => write!(f, "!G {} {}", channel, thrust),
            Command::EmergencyStop => f.write_str("!EX"),
            Command::ReleaseStop => f.write_str("!MG"),
            Command::Query(query) => write!(f, "?{}", query.mnemonic()),
        }
    }
}
