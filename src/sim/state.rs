//! Simulation state types
//!
//! Everything a shot needs between frames lives here.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Phase of the current shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShotPhase {
    /// No round in progress
    #[default]
    Inactive,
    /// Round just started; becomes `Aiming` on the next frame
    AimingFirst,
    /// Player adjusts direction and power
    Aiming,
    /// Power bar sweeping, waiting for release
    PowerSelect,
    /// Club swing playing, waiting for impact
    SwingAnimation,
    /// Ball in motion, driven by the fixed tick
    Rolling,
}

impl ShotPhase {
    /// Phases where aim and power input is accepted
    pub fn is_aiming(&self) -> bool {
        matches!(self, ShotPhase::AimingFirst | ShotPhase::Aiming)
    }
}

/// One predicted bounce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Heading after the bounce
    pub direction: Vec3,
    /// Scaled speed after the bounce (0 for the resting point)
    pub speed: f32,
    /// Ball centre at the bounce
    pub position: Vec3,
}

impl Waypoint {
    /// Velocity the ball leaves this waypoint with
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.direction.normalize_or_zero() * self.speed
    }
}

/// Where a hole starts and where a holed ball comes to rest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub tee: Vec3,
    pub cup_rest: Vec3,
}

/// The simulated ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec3,
    /// Heading scaled by speed (distance per tick)
    pub velocity: Vec3,
    pub rotation: Quat,
    pub radius: f32,
    /// Current stroke number, starting at 1
    pub shots: u32,
    pub difficulty: Difficulty,
    /// Rollback anchor for lane-boundary violations
    pub last_valid_position: Vec3,
}

impl Ball {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            radius,
            shots: 1,
            difficulty: Difficulty::default(),
            last_valid_position: position,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Spin about world up (aiming turns the ball with the club)
    pub fn turn(&mut self, degrees: f32) {
        self.rotation = (Quat::from_rotation_y(-degrees.to_radians()) * self.rotation).normalize();
    }

    /// Roll forward by `revolutions` about the lateral axis of travel
    pub fn roll(&mut self, revolutions: f32) {
        let axis = Vec3::Y.cross(self.velocity).normalize_or_zero();
        if axis == Vec3::ZERO || revolutions == 0.0 {
            return;
        }
        let angle = (revolutions * 360.0).to_radians();
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }
}
