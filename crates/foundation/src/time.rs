use serde::{Deserialize, Serialize};

/// Engine time in seconds on a deterministic, caller-driven clock.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn after(self, seconds: f64) -> Self {
        Time(self.0 + seconds)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    /// Span starting at `start` and lasting `seconds`.
    pub fn starting_at(start: Time, seconds: f64) -> Self {
        Self::new(start, start.after(seconds))
    }

    /// Half-open: `start <= t < end`.
    pub fn contains(&self, t: Time) -> bool {
        t >= self.start && t < self.end
    }
}
