//! HBL Drive Hardware Abstraction Layer
//!
//! Serial-port traits implemented by chip-specific HALs. The motor
//! controller is reached over a plain UART running the Roboteq ASCII
//! protocol, so that is the only peripheral the control stack needs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  hbl-core (control cycle)               │
//! └─────────────────────────────────────────┘
//!                     │ CommandLink
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hbl-drivers (SerialCommandLink)        │
//! └─────────────────────────────────────────┘
//!                     │ UartTx / UartRx
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hbl-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{Uart, UartConfig, UartRx, UartTx};
