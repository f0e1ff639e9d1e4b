//! Fixed-window moving average

use hbl_core::traits::FeedbackFilter;
use heapless::HistoryBuffer;

/// Window used by the reference controller node
pub const DEFAULT_WINDOW: usize = 8;

/// Mean of the last `N` samples
///
/// Until `N` samples have arrived the mean covers the samples seen so far.
#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize = DEFAULT_WINDOW> {
    window: HistoryBuffer<f32, N>,
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MovingAverage<N> {
    pub const fn new() -> Self {
        Self {
            window: HistoryBuffer::new(),
        }
    }

    /// Samples currently in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.len() == 0
    }

    fn average(&self) -> f32 {
        match self.window.len() {
            0 => 0.0,
            n => self.window.as_slice().iter().sum::<f32>() / n as f32,
        }
    }
}

impl<const N: usize> FeedbackFilter for MovingAverage<N> {
    fn update(&mut self, sample: f32) -> f32 {
        // A non-finite sample would poison the window for N ticks
        let sample = if sample.is_finite() { sample } else { 0.0 };

        self.window.write(sample);
        self.average()
    }

    fn value(&self) -> f32 {
        self.average()
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}
