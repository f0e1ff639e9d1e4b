//! S-curve trajectory generator
//!
//! Follows the commanded velocity with jerk- and acceleration-limited
//! ramps and integrates the profile velocity into a position target. The
//! profile is anchored on the measured position at the first call after
//! construction or reset, starting from rest.
//!
//! ```text
//! accel  ┌──┐                velocity       ┌────
//!       ╱    ╲                            ╱
//!  ────┘      └───          ────────────╯
//! ```

use hbl_core::config::TrajectoryConfig;
use hbl_core::traits::TrajectoryGenerator;

/// Jerk-limited velocity profile integrated into a position target
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SCurveGenerator {
    /// Acceleration limit in m/s²
    max_acceleration: f32,
    /// Jerk limit in m/s³
    max_jerk: f32,
    /// Profile position, `None` until anchored
    position: Option<f32>,
    /// Profile velocity in m/s
    velocity: f32,
    /// Profile acceleration in m/s²
    acceleration: f32,
}

impl SCurveGenerator {
    pub fn new(max_acceleration: f32, max_jerk: f32) -> Self {
        Self {
            max_acceleration: max_acceleration.abs(),
            max_jerk: max_jerk.abs(),
            position: None,
            velocity: 0.0,
            acceleration: 0.0,
        }
    }

    pub fn from_config(config: &TrajectoryConfig) -> Self {
        Self::new(config.max_acceleration_mps2, config.max_jerk_mps3)
    }

    /// Profile velocity in m/s
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Profile acceleration in m/s²
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Advance the velocity profile toward `target` by `dt` seconds
    fn step_velocity(&mut self, target: f32, dt: f32) {
        let dv = target - self.velocity;
        if dv == 0.0 {
            self.acceleration = 0.0;
            return;
        }
        let direction = if dv > 0.0 { 1.0 } else { -1.0 };

        // Velocity gained while ramping the current acceleration to zero
        let ramp_down = self.acceleration * self.acceleration / (2.0 * self.max_jerk);
        let desired = if self.acceleration * direction > 0.0 && dv.abs() <= ramp_down {
            0.0
        } else {
            direction * self.max_acceleration
        };

        let jerk_step = self.max_jerk * dt;
        self.acceleration = if desired > self.acceleration {
            (self.acceleration + jerk_step).min(desired)
        } else {
            (self.acceleration - jerk_step).max(desired)
        };

        let next = self.velocity + self.acceleration * dt;
        if (target - next) * direction <= 0.0 {
            // Reached or crossed the target
            self.velocity = target;
            self.acceleration = 0.0;
        } else {
            self.velocity = next;
        }
    }
}

impl TrajectoryGenerator for SCurveGenerator {
    fn next(&mut self, period_s: f32, current_position_m: f32, velocity_input_mps: f32) -> f32 {
        let position = *self.position.get_or_insert(current_position_m);
        if !period_s.is_finite() || period_s <= 0.0 || !velocity_input_mps.is_finite() {
            return position;
        }

        self.step_velocity(velocity_input_mps, period_s);
        let position = position + self.velocity * period_s;
        self.position = Some(position);
        position
    }

    fn reset(&mut self) {
        self.position = None;
        self.velocity = 0.0;
        self.acceleration = 0.0;
    }
}
