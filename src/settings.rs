//! Physics tunables and difficulty tiers
//!
//! Loaded once by the host (JSON or the legacy `Key=Value` file) and handed to
//! the session by value. The simulation never reads ambient globals.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::LayerMask;

/// Difficulty tier; selects how fast the power bar sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Overkill,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Overkill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Overkill => "Overkill",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "overkill" => Some(Difficulty::Overkill),
            _ => None,
        }
    }

    /// Tier index into `Settings::tier_speeds`
    pub fn index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
            Difficulty::Overkill => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Physics and input tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Speed lost per tick while rolling (scaled units)
    pub brake_acc: f32,
    /// Top stroke speed (units/s)
    pub max_speed: f32,
    /// Below this speed the ball stops (units/s)
    pub min_speed: f32,
    /// Power bar sweep rate per difficulty tier (percent/s)
    pub tier_speeds: [f32; 4],
    pub ball_radius: f32,
    /// Lowest selectable stroke power
    pub min_power: f32,
    /// Reach of one prediction probe
    pub probe_distance: f32,
    /// Fixed physics tick (s)
    pub timestep: f32,
    /// Period of the drift-correcting re-prediction while aiming (s)
    pub repredict_interval: f32,
    /// Layers the ball bounces off
    pub obstacle_mask: LayerMask,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brake_acc: 0.00003,
            max_speed: 4.0,
            min_speed: 0.05,
            tier_speeds: [80.0, 110.0, 200.0, 400.0],
            ball_radius: 0.03,
            min_power: MIN_POWER,
            probe_distance: PROBE_DISTANCE,
            timestep: PHY_TIMESTEP,
            repredict_interval: 1.0,
            obstacle_mask: LayerMask::OBSTACLE,
        }
    }
}

impl Settings {
    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse the legacy `Key=Value` settings file.
    ///
    /// Recognised keys: `BreakAcc`, `MaxSpeed`, `MinSpeed`, `LvlVal0`..`LvlVal3`.
    /// Values that do not parse keep their defaults.
    pub fn from_key_values(text: &str) -> Self {
        let mut settings = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Skipping settings line without '=': {line:?}");
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            let slot = match key {
                "BreakAcc" => &mut settings.brake_acc,
                "MaxSpeed" => &mut settings.max_speed,
                "MinSpeed" => &mut settings.min_speed,
                "LvlVal0" => &mut settings.tier_speeds[0],
                "LvlVal1" => &mut settings.tier_speeds[1],
                "LvlVal2" => &mut settings.tier_speeds[2],
                "LvlVal3" => &mut settings.tier_speeds[3],
                _ => {
                    log::debug!("Ignoring settings key {key}");
                    continue;
                }
            };

            match value.parse::<f32>() {
                Ok(parsed) => *slot = parsed,
                Err(_) => log::warn!("Unparseable value for {key}: {value:?}, keeping {slot}"),
            }
        }

        settings
    }

    /// Check that every physical number is usable
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("brake_acc", self.brake_acc),
            ("max_speed", self.max_speed),
            ("min_speed", self.min_speed),
            ("ball_radius", self.ball_radius),
            ("probe_distance", self.probe_distance),
            ("timestep", self.timestep),
            ("repredict_interval", self.repredict_interval),
            ("tier_speeds[0]", self.tier_speeds[0]),
            ("tier_speeds[1]", self.tier_speeds[1]),
            ("tier_speeds[2]", self.tier_speeds[2]),
            ("tier_speeds[3]", self.tier_speeds[3]),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::NonPositive { field, value });
            }
        }

        if self.min_speed >= self.max_speed {
            return Err(SettingsError::SpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }

        if !(self.min_power > 0.0 && self.min_power <= 1.0) {
            return Err(SettingsError::PowerFloor(self.min_power));
        }

        Ok(())
    }

    /// Top speed as distance per tick
    #[inline]
    pub fn max_speed_scaled(&self) -> f32 {
        self.max_speed * self.timestep
    }

    /// Stop threshold as distance per tick
    #[inline]
    pub fn min_speed_scaled(&self) -> f32 {
        self.min_speed * self.timestep
    }

    /// Power bar sweep rate for a tier
    #[inline]
    pub fn tier_speed(&self, difficulty: Difficulty) -> f32 {
        self.tier_speeds[difficulty.index()]
    }

    /// Map a scaled speed onto [0, 1] between the stop and top speeds
    pub fn speed_fraction(&self, scaled_speed: f32) -> f32 {
        let min = self.min_speed_scaled();
        crate::clamp01((scaled_speed - min) / (self.max_speed_scaled() - min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert!((settings.max_speed_scaled() - 0.02).abs() < 1e-7);
        assert!((settings.min_speed_scaled() - 0.00025).abs() < 1e-9);
    }

    #[test]
    fn test_key_values() {
        let text = "BreakAcc=0.00005\nMaxSpeed= 5\nLvlVal2=250\nShowIntro=true\nLevel0=Leicht\n";
        let settings = Settings::from_key_values(text);
        assert_eq!(settings.brake_acc, 0.00005);
        assert_eq!(settings.max_speed, 5.0);
        assert_eq!(settings.tier_speeds, [80.0, 110.0, 250.0, 400.0]);
        assert_eq!(settings.min_speed, 0.05);
    }

    #[test]
    fn test_key_values_keeps_default_on_garbage() {
        let settings = Settings::from_key_values("MinSpeed=fast\nno equals sign\r\nLvlVal0=90\r\n");
        assert_eq!(settings.min_speed, 0.05);
        assert_eq!(settings.tier_speeds[0], 90.0);
    }

    #[test]
    fn test_json_partial() {
        let settings = Settings::from_json(r#"{ "max_speed": 6.0, "ball_radius": 0.05 }"#).unwrap();
        assert_eq!(settings.max_speed, 6.0);
        assert_eq!(settings.ball_radius, 0.05);
        assert_eq!(settings.brake_acc, 0.00003);
    }

    #[test]
    fn test_json_malformed() {
        assert!(matches!(
            Settings::from_json("{ max_speed: }"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_decel() {
        let settings = Settings {
            brake_acc: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NonPositive { field: "brake_acc", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan_and_inverted_speeds() {
        let nan = Settings {
            ball_radius: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let inverted = Settings {
            min_speed: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(SettingsError::SpeedRange { .. })
        ));

        let floor = Settings {
            min_power: 1.5,
            ..Default::default()
        };
        assert!(matches!(floor.validate(), Err(SettingsError::PowerFloor(_))));
    }

    #[test]
    fn test_difficulty_lookup() {
        let settings = Settings::default();
        assert_eq!(settings.tier_speed(Difficulty::Easy), 80.0);
        assert_eq!(settings.tier_speed(Difficulty::Overkill), 400.0);
        assert_eq!(Difficulty::from_str("MED"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_index(2), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_index(4), None);
        assert_eq!(Difficulty::Hard.as_str(), "Hard");
    }

    #[test]
    fn test_speed_fraction() {
        let settings = Settings::default();
        assert_eq!(settings.speed_fraction(settings.max_speed_scaled()), 1.0);
        assert_eq!(settings.speed_fraction(0.0), 0.0);
        assert_eq!(settings.speed_fraction(1.0), 1.0);
    }
}
