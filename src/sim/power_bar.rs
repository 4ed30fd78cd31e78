//! Power bar oscillator
//!
//! Sweeps 0 -> 100 -> 0 while the swing key is held; the value at release
//! becomes the stroke power.

use serde::{Deserialize, Serialize};

/// Top of the sweep
pub const POWER_BAR_MAX: f32 = 100.0;

/// Ping-pong power bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerBar {
    /// Current value. May overshoot [0, 100] by up to one tick before turning.
    pub value: f32,
    /// +1 rising, -1 falling
    pub direction: f32,
    /// Aimed power when the sweep started (readout only)
    pub marker: f32,
}

impl Default for PowerBar {
    fn default() -> Self {
        Self {
            value: 0.0,
            direction: 1.0,
            marker: 0.0,
        }
    }
}

impl PowerBar {
    /// Restart the sweep from zero, rising
    pub fn reset(&mut self, marker: f32) {
        self.value = 0.0;
        self.direction = 1.0;
        self.marker = marker;
    }

    /// Advance by one frame at `rate` percent per second
    pub fn tick(&mut self, dt: f32, rate: f32) {
        self.value += self.direction * dt * rate;

        if self.direction > 0.0 && self.value >= POWER_BAR_MAX {
            self.direction = -1.0;
        } else if self.direction < 0.0 && self.value <= 0.0 {
            self.direction = 1.0;
        }
    }

    /// Stroke power at release
    pub fn sample(&self, min_power: f32) -> f32 {
        (self.value / POWER_BAR_MAX).clamp(min_power, 1.0)
    }

    /// Bar fill in [0, 1]
    pub fn fill_fraction(&self) -> f32 {
        crate::clamp01(self.value / POWER_BAR_MAX)
    }

    /// Marker position along the bar in [0, 1]
    pub fn marker_fraction(&self, min_power: f32) -> f32 {
        crate::clamp01((self.marker - min_power) / (1.0 - min_power))
    }
}
