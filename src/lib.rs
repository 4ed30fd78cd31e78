//! Putt Sim - miniature-golf ball physics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trajectory prediction, integration, shot phases)
//! - `settings`: Externally tuned physics numbers and difficulty tiers
//! - `scorecard`: Finished-hole results for the score display
//! - `error`: Settings parsing and validation errors

pub mod error;
pub mod scorecard;
pub mod settings;
pub mod sim;

pub use error::SettingsError;
pub use scorecard::Scorecard;
pub use settings::{Difficulty, Settings};

use glam::{Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (200 Hz)
    pub const PHY_TIMESTEP: f32 = 0.005;
    /// Maximum physics ticks per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Lowest stroke power the player can select
    pub const MIN_POWER: f32 = 0.1;
    /// Stroke power at the start of a round
    pub const DEFAULT_POWER: f32 = 0.4;

    /// How far ahead a single prediction probe looks
    pub const PROBE_DISTANCE: f32 = 10.0;
    /// Share of the incoming heading blended into a bounce
    pub const REFLECT_BLEND: f32 = 0.4;
    /// Upper bound on bounces in one prediction
    pub const MAX_PREDICTED_BOUNCES: usize = 256;

    /// Aim rotation per frame (degrees)
    pub const AIM_STEP_DEG: f32 = 0.1;
    /// Power change per frame
    pub const POWER_STEP: f32 = 0.01;
    /// Step multiplier while fine adjustment is held
    pub const FINE_MODIFIER: f32 = 1.0 / 8.0;
    /// Step multiplier while coarse adjustment is held
    pub const COARSE_MODIFIER: f32 = 8.0;

    /// Obstacle hit volume at full speed
    pub const HIT_VOLUME_SCALE: f32 = 0.6;
    /// Rolling sound volume at full speed
    pub const ROLL_VOLUME_SCALE: f32 = 0.4;

    /// The floor probe uses radius / this, so it starts clear of the surface
    pub const GROUND_PROBE_SHRINK: f32 = 1.2;

    /// Club head distance behind the ball
    pub const CLUB_OFFSET: f32 = 0.05;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Rotate a vector about world up. Positive angles turn clockwise seen from above.
#[inline]
pub fn rotate_about_up(v: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(-degrees.to_radians()) * v
}

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_about_up_turns_clockwise() {
        let v = rotate_about_up(Vec3::NEG_Z, 90.0);
        assert!(v.abs_diff_eq(Vec3::X, 1e-6), "got {v:?}");

        let back = rotate_about_up(v, -90.0);
        assert!(back.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(3.0), 1.0);
    }

    #[test]
    fn test_flatten() {
        assert_eq!(flatten(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 0.0, 3.0));
    }
}
