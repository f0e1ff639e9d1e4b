//! Roboteq Serial Protocol
//!
//! This crate defines the ASCII protocol spoken between the channel
//! controller and a Roboteq HBL motor controller over UART.
//!
//! # Protocol Overview
//!
//! Every message is one line terminated by a carriage return:
//! ```text
//! host → controller     controller → host
//! ─────────────────     ─────────────────
//! !G 1 550\r            +\r               (drive channel 1, ack)
//! !EX\r                 +\r               (emergency stop)
//! !MG\r                 +\r               (release emergency stop)
//! ?FID\r                FID=Roboteq v1.3 HBL1650 ...\r
//! ?CB\r                 CB=1204:-88\r     (one value per channel)
//! ```
//!
//! The controller echoes each received command before answering, so a
//! reader sees `!G 1 550` followed by `+`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod reply;

pub use command::{Command, CommandString, Query, MAX_COMMAND_LEN, TERMINATOR};
pub use line::{Line, LineAssembler, LineError, MAX_LINE_LEN};
pub use reply::{Reply, ReplyError, MAX_IDENTITY_LEN, MAX_REPLY_VALUES};
