//! Rate limiting for repeated diagnostics

/// Lets an event through at most once per period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    period_ms: u32,
    last_ms: Option<u64>,
}

impl Throttle {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: None,
        }
    }

    /// Returns true (and arms the next period) if the event may fire now
    pub fn ready(&mut self, now_ms: u64) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(self.period_ms),
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }
}
