//! Controller-to-host replies
//!
//! Query replies have the form `KEY=v1:v2:...` with one value per
//! channel or sensor. Commands are answered with `+` (accepted) or `-`
//! (rejected). With echo enabled, the controller also repeats every line
//! it receives.

use heapless::{String, Vec};

use crate::command::Query;

/// Maximum values in one reply (two motor channels plus spares)
pub const MAX_REPLY_VALUES: usize = 4;

/// Maximum stored identity banner length
pub const MAX_IDENTITY_LEN: usize = 48;

/// Errors that can occur while parsing a reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// Line was empty or whitespace only
    Empty,
    /// Line is neither an ack, an echo nor a `KEY=` reply
    Malformed,
    /// Reply key is not one we query
    UnknownKey,
    /// A value field is not a decimal integer
    InvalidNumber,
    /// More values than [`MAX_REPLY_VALUES`]
    TooManyValues,
}

/// A parsed reply line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `FID=` firmware identity; proves the controller is present
    Identity(String<MAX_IDENTITY_LEN>),
    /// Numeric query reply
    Values {
        query: Query,
        values: Vec<i32, MAX_REPLY_VALUES>,
    },
    /// `+` command accepted
    Ack,
    /// `-` command rejected
    Nak,
    /// Echo of a command we sent
    Echo,
}

impl Reply {
    /// Parse one line (without terminator)
    pub fn parse(line: &str) -> Result<Self, ReplyError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ReplyError::Empty);
        }

        match line {
            "+" => return Ok(Reply::Ack),
            "-" => return Ok(Reply::Nak),
            _ => {}
        }

        if line.starts_with('!') || line.starts_with('?') || line.starts_with('^') {
            return Ok(Reply::Echo);
        }

        let (key, body) = line.split_once('=').ok_or(ReplyError::Malformed)?;
        let query = Query::from_mnemonic(key.trim()).ok_or(ReplyError::UnknownKey)?;

        if query == Query::Identity {
            let mut identity = String::new();
            for c in body.trim().chars() {
                if identity.push(c).is_err() {
                    break;
                }
            }
            return Ok(Reply::Identity(identity));
        }

        let mut values = Vec::new();
        for field in body.split(':') {
            let value = field
                .trim()
                .parse::<i32>()
                .map_err(|_| ReplyError::InvalidNumber)?;
            values
                .push(value)
                .map_err(|_| ReplyError::TooManyValues)?;
        }

        Ok(Reply::Values { query, values })
    }

    /// Value reported for a 1-based channel number
    pub fn value_for_channel(&self, channel: u8) -> Option<i32> {
        match self {
            Reply::Values { values, .. } => {
                let index = (channel as usize).checked_sub(1)?;
                values.get(index).copied()
            }
            _ => None,
        }
    }

    /// Query this reply answers, if it is a query reply
    pub fn query(&self) -> Option<Query> {
        match self {
            Reply::Identity(_) => Some(Query::Identity),
            Reply::Values { query, .. } => Some(*query),
            _ => None,
        }
    }
}
