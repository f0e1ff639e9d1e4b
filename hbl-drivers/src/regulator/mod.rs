//! Regulators

pub mod pi;

pub use pi::PiRegulator;
