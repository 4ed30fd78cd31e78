//! Trajectory prediction
//!
//! Forward-simulates a stroke bounce by bounce so the path can be drawn while
//! aiming and replayed during the roll. Distance is budgeted with the stopping
//! distance of a constant deceleration: `v² / (2a)`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::GeometryQuery;
use super::state::Waypoint;
use crate::consts::*;
use crate::flatten;
use crate::settings::Settings;

/// Why a prediction stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathEnd {
    /// Distance budget spent; the last waypoint is the resting point
    Stopped,
    /// A probe found nothing, so the path leaves the playable area
    OffCourse,
    /// Gave up after `MAX_PREDICTED_BOUNCES`
    BounceCap,
}

/// Predicted path of one stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Bounces in order, ending at the resting point when `end == Stopped`
    pub waypoints: Vec<Waypoint>,
    pub end: PathEnd,
}

impl Trajectory {
    /// Where the path ends, if it has any points
    pub fn target(&self) -> Option<Vec3> {
        self.waypoints.last().map(|wp| wp.position)
    }
}

/// Reflect a vector off a surface with the given normal
#[inline]
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Bounce heading: the mirror image pulled back toward the incoming heading.
///
/// Keeps caroms shallower than a pure mirror. Returns a unit vector (or zero).
#[inline]
pub fn bounce_direction(forward: Vec3, normal: Vec3) -> Vec3 {
    (reflect(forward, normal) + forward * REFLECT_BLEND).normalize_or_zero()
}

/// Speed left after decelerating over `distance`.
///
/// Clamped at zero so an exactly spent budget never produces NaN.
#[inline]
pub fn speed_after(speed: f32, brake_acc: f32, distance: f32) -> f32 {
    (speed * speed - 2.0 * brake_acc * distance).max(0.0).sqrt()
}

/// Stopping distance from `speed` under constant deceleration
#[inline]
pub fn stopping_distance(speed: f32, brake_acc: f32) -> f32 {
    speed * speed / (2.0 * brake_acc)
}

/// Predict the path of a stroke from `origin` along `forward` at `power`.
///
/// `power` must already be clamped by the caller. Only the direction of
/// `forward` matters. A zero direction or zero power gives an empty path.
pub fn predict<G: GeometryQuery + ?Sized>(
    world: &G,
    settings: &Settings,
    radius: f32,
    origin: Vec3,
    forward: Vec3,
    power: f32,
) -> Trajectory {
    let speed = settings.max_speed_scaled() * power;
    let mut budget = stopping_distance(speed, settings.brake_acc);

    let mut position = origin;
    let mut velocity = forward.normalize_or_zero() * speed;
    let mut waypoints = Vec::new();

    let mut end = PathEnd::Stopped;
    while budget > 0.0 {
        if waypoints.len() >= MAX_PREDICTED_BOUNCES {
            log::warn!("Prediction hit the bounce cap with {budget} distance left");
            end = PathEnd::BounceCap;
            break;
        }

        let Some(hit) = world.spherecast(
            position,
            radius,
            velocity,
            settings.probe_distance,
            settings.obstacle_mask,
        ) else {
            end = PathEnd::OffCourse;
            break;
        };

        if budget > hit.distance {
            let bounce_speed = speed_after(velocity.length(), settings.brake_acc, hit.distance);
            velocity = flatten(bounce_direction(velocity, hit.normal) * bounce_speed);
            position = hit.point + flatten(hit.normal) * radius;

            waypoints.push(Waypoint {
                direction: velocity,
                speed: bounce_speed,
                position,
            });
            budget -= hit.distance;
        } else {
            // Comes to rest before the obstacle. The resting point records no speed.
            position += velocity.normalize_or_zero() * budget;
            waypoints.push(Waypoint {
                direction: velocity,
                speed: 0.0,
                position,
            });
            break;
        }
    }

    log::debug!(
        "Predicted {} waypoints ({:?}) from {origin} at power {power:.2}",
        waypoints.len(),
        end
    );

    Trajectory { waypoints, end }
}
