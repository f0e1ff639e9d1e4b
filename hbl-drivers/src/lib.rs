//! Driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in hbl-core:
//!
//! - Feedback filters (moving average, first-order low-pass)
//! - PI regulator with anti-windup
//! - S-curve trajectory generator
//! - UART-backed command link and reply reader

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod filter;
pub mod link;
pub mod regulator;
pub mod trajectory;

pub use filter::{LowPass, MovingAverage};
pub use link::{SerialCommandLink, SerialReplyReader};
pub use regulator::PiRegulator;
pub use trajectory::SCurveGenerator;
