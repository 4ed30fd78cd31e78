//! Repeating frame-driven timer
//!
//! Polled from the frame loop; cancelling is just dropping it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    period: f32,
    elapsed: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt`; true at most once per call. Whole periods missed in a
    /// long frame collapse into that one firing.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.period {
            self.elapsed %= self.period;
            true
        } else {
            false
        }
    }
}
