//! Settings errors
//!
//! The physics core itself never fails; only externally supplied tunables can.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("{field} must be a finite positive number, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("min_speed ({min}) must be below max_speed ({max})")]
    SpeedRange { min: f32, max: f32 },

    #[error("min_power must lie in (0, 1], got {0}")]
    PowerFloor(f32),

    #[error("settings JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
