//! PI regulator
//!
//! Proportional-integral correction with anti-windup. The integral is
//! accumulated in output units (`ki * error * dt`) and clamped there.

use hbl_core::config::RegulatorConfig;
use hbl_core::traits::Regulator;

/// PI regulator with clamped integral and output
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PiRegulator {
    /// Proportional gain
    kp: f32,
    /// Integral gain (per second)
    ki: f32,
    /// Integral clamp, symmetric
    integral_limit: f32,
    /// Output clamp, symmetric
    output_limit: f32,
    /// Accumulated integral term
    integral: f32,
}

impl PiRegulator {
    /// Create a regulator with unbounded integral and output
    pub fn new(kp: f32, ki: f32) -> Self {
        Self {
            kp,
            ki,
            integral_limit: f32::INFINITY,
            output_limit: f32::INFINITY,
            integral: 0.0,
        }
    }

    pub fn from_config(config: &RegulatorConfig) -> Self {
        Self::new(config.kp, config.ki)
            .with_integral_limit(config.integral_limit)
            .with_output_limit(config.output_limit)
    }

    /// Set the anti-windup clamp on the integral term
    pub fn with_integral_limit(mut self, limit: f32) -> Self {
        self.integral_limit = limit.abs();
        self
    }

    /// Set the clamp on the total correction
    pub fn with_output_limit(mut self, limit: f32) -> Self {
        self.output_limit = limit.abs();
        self
    }

    /// Current integral term
    pub fn integral(&self) -> f32 {
        self.integral
    }
}

fn clamp_symmetric(value: f32, limit: f32) -> f32 {
    if value > limit {
        limit
    } else if value < -limit {
        -limit
    } else {
        value
    }
}

impl Regulator for PiRegulator {
    fn correction(&mut self, target: f32, measured: f32, period_s: f32) -> f32 {
        let error = target - measured;
        if !error.is_finite() || !period_s.is_finite() || period_s <= 0.0 {
            return 0.0;
        }

        let p = self.kp * error;

        self.integral = clamp_symmetric(
            self.integral + self.ki * error * period_s,
            self.integral_limit,
        );

        clamp_symmetric(p + self.integral, self.output_limit)
    }

    fn reset(&mut self) {
        self.integral = 0.0;
    }
}
