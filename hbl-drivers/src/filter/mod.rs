//! Feedback filters
//!
//! Smoothing for the per-tick velocity estimate. Encoder counts arrive in
//! coarse steps, so the raw estimate jumps by one tick per period even at
//! constant speed.

pub mod low_pass;
pub mod moving_average;

pub use low_pass::LowPass;
pub use moving_average::{MovingAverage, DEFAULT_WINDOW};
