//! Feedback filter, regulator and trajectory generator contracts

/// Smooths per-tick velocity estimates
pub trait FeedbackFilter {
    /// Feed one raw sample and return the new smoothed value
    fn update(&mut self, sample: f32) -> f32;

    /// Current smoothed value without feeding a sample
    fn value(&self) -> f32;

    /// Forget all history
    fn reset(&mut self);
}

/// Closed-loop correction term with integrator state
pub trait Regulator {
    /// Correction for `target` given `measured` over `period_s` seconds
    ///
    /// `period_s` is always positive; the cycle never steps a regulator
    /// on a zero or undefined period.
    fn correction(&mut self, target: f32, measured: f32, period_s: f32) -> f32;

    /// Clear the integrator
    fn reset(&mut self);
}

/// Position target source for position mode
pub trait TrajectoryGenerator {
    /// Next target position in meters
    ///
    /// # Arguments
    /// - `period_s`: time since the previous call
    /// - `current_position_m`: measured absolute position
    /// - `velocity_input_mps`: commanded velocity the profile follows
    fn next(&mut self, period_s: f32, current_position_m: f32, velocity_input_mps: f32) -> f32;

    /// Drop the profile state; the next call re-anchors on the measured position
    fn reset(&mut self);
}
