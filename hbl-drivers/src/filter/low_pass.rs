//! First-order low-pass (exponential moving average)

use hbl_core::traits::FeedbackFilter;

/// `y += alpha * (x - y)`, seeded with the first sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    alpha: f32,
    value: Option<f32>,
}

impl LowPass {
    /// Create a filter with smoothing factor `alpha`, clamped to `0.0..=1.0`
    ///
    /// 1.0 passes samples through unchanged; smaller values smooth more.
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self { alpha, value: None }
    }

    /// Filter equivalent to an `n`-sample moving average in lag
    pub fn with_window(n: u16) -> Self {
        Self::new(2.0 / (f32::from(n.max(1)) + 1.0))
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl FeedbackFilter for LowPass {
    fn update(&mut self, sample: f32) -> f32 {
        if !sample.is_finite() {
            return self.value();
        }

        let next = match self.value {
            None => sample,
            Some(previous) => previous + self.alpha * (sample - previous),
        };
        self.value = Some(next);
        next
    }

    fn value(&self) -> f32 {
        self.value.unwrap_or(0.0)
    }

    fn reset(&mut self) {
        self.value = None;
    }
}
