//! Fixed timestep ball integration
//!
//! Advances a rolling ball by one physics tick. Speeds are scaled (distance
//! per tick), so the tick length never appears in the motion itself.
//!
//! Per tick, in order: floor contact, lane containment, forward sweep and
//! bounce, roll, deceleration.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec3;

use super::geometry::{GeometryQuery, LayerMask, SurfaceTag};
use super::predict::bounce_direction;
use super::state::{Ball, Waypoint};
use crate::consts::*;
use crate::flatten;
use crate::settings::Settings;

/// How a tick ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still moving
    Rolling,
    /// Slowed below the stop threshold
    Stalled,
    /// Over the cup
    Holed,
}

/// Obstacle contact during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Point struck on the obstacle
    pub point: Vec3,
    /// Hit sound volume
    pub volume: f32,
    /// Whether a predicted waypoint supplied the response
    pub replayed: bool,
    /// Ball centre right after the response
    pub position: Vec3,
    /// Velocity right after the response
    pub velocity: Vec3,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub outcome: StepOutcome,
    pub contact: Option<Contact>,
    /// Rolling sound level, while still rolling
    pub roll_volume: Option<f32>,
}

impl StepReport {
    fn new(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            contact: None,
            roll_volume: None,
        }
    }
}

/// Advance the ball by one fixed tick.
///
/// Collisions replay the next predicted waypoint when one is pending, so the
/// ball follows the path that was drawn. Only when the queue is empty is the
/// bounce derived on the spot.
pub fn step<G: GeometryQuery + ?Sized>(
    ball: &mut Ball,
    waypoints: &mut VecDeque<Waypoint>,
    world: &G,
    settings: &Settings,
) -> StepReport {
    // Floor contact
    if let Some(floor) = world.spherecast(
        ball.position,
        ball.radius / GROUND_PROBE_SHRINK,
        Vec3::NEG_Y,
        f32::INFINITY,
        LayerMask::ALL,
    ) {
        match floor.tag {
            SurfaceTag::Goal => return StepReport::new(StepOutcome::Holed),
            SurfaceTag::RollableGround => {
                ball.position.y = floor.point.y + ball.radius;
                ball.last_valid_position = ball.position;
            }
            // No floor under the ball this tick; leave the height alone
            _ => {}
        }
    }

    // Lane containment
    let in_lane = world
        .raycast(ball.position, Vec3::NEG_Y)
        .is_some_and(|hit| hit.tag != SurfaceTag::OutOfBounds);
    if !in_lane {
        ball.position = ball.last_valid_position;
    }

    let mut report = StepReport::new(StepOutcome::Rolling);

    // Forward sweep
    let speed = ball.speed();
    let mut travel = 1.0;
    if let Some(hit) = world.spherecast(
        ball.position,
        ball.radius,
        ball.velocity,
        speed,
        settings.obstacle_mask,
    ) {
        let volume = settings.speed_fraction(speed) * HIT_VOLUME_SCALE;

        let replayed = match waypoints.pop_front() {
            Some(wp) => {
                ball.position = wp.position;
                ball.velocity = wp.velocity();
                true
            }
            None => {
                let heading = flatten(bounce_direction(ball.velocity, hit.normal)).normalize_or_zero();
                ball.velocity = heading * speed;
                false
            }
        };

        let new_speed = ball.speed();
        travel = if new_speed > 0.0 {
            ((new_speed - hit.distance) / new_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };

        log::debug!(
            "Obstacle at {} (replayed: {replayed}), travel left {travel:.3}",
            hit.point
        );

        report.contact = Some(Contact {
            point: hit.point,
            volume,
            replayed,
            position: ball.position,
            velocity: ball.velocity,
        });
    }

    // Roll: arc length over circumference = revolutions
    let speed = ball.speed();
    let revolutions = speed * travel / (TAU * ball.radius);
    ball.position += ball.velocity * travel;
    ball.roll(revolutions);

    // Decelerate
    let new_speed = speed - settings.brake_acc;
    if new_speed < settings.min_speed_scaled() {
        report.outcome = StepOutcome::Stalled;
    } else {
        report.roll_volume = Some(settings.speed_fraction(speed) * ROLL_VOLUME_SCALE);
        ball.velocity = ball.velocity.normalize_or_zero() * new_speed;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::SurfaceHit;
    use crate::sim::scene::Scene;

    const R: f32 = 0.03;

    fn resting_ball(position: Vec3, velocity: Vec3) -> Ball {
        let mut ball = Ball::new(position, R);
        ball.velocity = velocity;
        ball
    }

    #[test]
    fn test_stall_tick_count() {
        let settings = Settings::default();
        let (lane, _) = Scene::practice_lane(2.0, 12.0, None);
        let mut ball = resting_ball(Vec3::new(0.0, R, 0.0), Vec3::NEG_Z * 0.02);
        let mut queue = VecDeque::new();

        let expected = ((0.02f64 - 0.00025) / 0.00003).ceil() as u32;
        let mut ticks = 0;
        loop {
            ticks += 1;
            let report = step(&mut ball, &mut queue, &lane, &settings);
            if report.outcome == StepOutcome::Stalled {
                break;
            }
            assert_eq!(report.outcome, StepOutcome::Rolling);
            assert!(ticks < 10_000, "never stalled");
        }

        assert_eq!(ticks, expected);
        // Stopping distance of the discrete decay, close to v^2 / 2a
        assert!((ball.position.z + 6.67).abs() < 0.05, "z = {}", ball.position.z);
        assert!((ball.position.y - R).abs() < 1e-5);
    }

    #[test]
    fn test_snaps_to_floor() {
        let settings = Settings::default();
        let (lane, _) = Scene::practice_lane(2.0, 12.0, None);
        let mut ball = resting_ball(Vec3::new(0.0, 0.1, 0.0), Vec3::NEG_Z * 0.01);
        let mut queue = VecDeque::new();

        let report = step(&mut ball, &mut queue, &lane, &settings);
        assert_eq!(report.outcome, StepOutcome::Rolling);
        assert!((ball.position.y - R).abs() < 1e-6);
        assert!((ball.last_valid_position.y - R).abs() < 1e-6);
        assert!((ball.position.z + 0.01).abs() < 1e-6);

        let expected = (0.01 - 0.00025) / (0.02 - 0.00025) * ROLL_VOLUME_SCALE;
        let volume = report.roll_volume.expect("still rolling");
        assert!((volume - expected).abs() < 1e-5, "volume = {volume}");
    }

    /// Flat ground that simply ends at z = -1: nothing below past the edge
    struct Cliff;

    impl GeometryQuery for Cliff {
        fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<SurfaceHit> {
            self.spherecast(origin, 0.0, direction, f32::INFINITY, LayerMask::ALL)
        }

        fn spherecast(
            &self,
            origin: Vec3,
            radius: f32,
            direction: Vec3,
            max_distance: f32,
            mask: LayerMask,
        ) -> Option<SurfaceHit> {
            let dir = direction.normalize_or_zero();
            if origin.z < -1.0 || !mask.intersects(LayerMask::GROUND) || dir.y >= 0.0 {
                return None;
            }
            let distance = (origin.y - radius) / -dir.y;
            (distance >= 0.0 && distance <= max_distance).then(|| SurfaceHit {
                point: origin + dir * distance - Vec3::Y * radius,
                normal: Vec3::Y,
                tag: SurfaceTag::RollableGround,
                distance,
            })
        }
    }

    #[test]
    fn test_rolls_back_when_nothing_below() {
        let settings = Settings::default();
        let mut ball = resting_ball(Vec3::new(0.0, R, -1.2), Vec3::NEG_Z * 0.01);
        ball.last_valid_position = Vec3::new(0.0, R, -0.5);
        let mut queue = VecDeque::new();

        let report = step(&mut ball, &mut queue, &Cliff, &settings);
        assert_eq!(report.outcome, StepOutcome::Rolling);
        assert!(
            ball.position.abs_diff_eq(Vec3::new(0.0, R, -0.51), 1e-6),
            "pos = {}",
            ball.position
        );
    }

    #[test]
    fn test_never_rolls_far_past_an_edge() {
        let settings = Settings::default();
        let mut ball = resting_ball(Vec3::new(0.0, R, 0.0), Vec3::NEG_Z * 0.02);
        let mut queue = VecDeque::new();

        let mut ticks = 0;
        while step(&mut ball, &mut queue, &Cliff, &settings).outcome == StepOutcome::Rolling {
            ticks += 1;
            assert!(ticks < 10_000, "never stalled");
            assert!(ball.position.z >= -1.0 - 0.02 - 1e-4, "z = {}", ball.position.z);
        }
        assert!(ball.last_valid_position.z >= -1.0);
    }

    #[test]
    fn test_holed_over_cup() {
        let settings = Settings::default();
        let (lane, _) = Scene::practice_lane(2.0, 12.0, Some(4.0));
        let start = Vec3::new(0.0, R, -4.0);
        let mut ball = resting_ball(start, Vec3::NEG_Z * 0.01);
        let mut queue = VecDeque::new();

        let report = step(&mut ball, &mut queue, &lane, &settings);
        assert_eq!(report.outcome, StepOutcome::Holed);
        assert_eq!(ball.position, start);
    }

    #[test]
    fn test_rolls_back_from_out_of_bounds() {
        let settings = Settings::default();
        let (lane, _) = Scene::practice_lane(2.0, 12.0, None);
        let mut ball = resting_ball(Vec3::new(1.5, R, -1.0), Vec3::NEG_Z * 0.01);
        ball.last_valid_position = Vec3::new(0.0, R, 0.0);
        let mut queue = VecDeque::new();

        let report = step(&mut ball, &mut queue, &lane, &settings);
        assert_eq!(report.outcome, StepOutcome::Rolling);
        assert!(
            ball.position.abs_diff_eq(Vec3::new(0.0, R, -0.01), 1e-6),
            "pos = {}",
            ball.position
        );
    }

    #[test]
    fn test_collision_replays_waypoint() {
        let settings = Settings::default();
        let (lane, _) = Scene::practice_lane(2.0, 3.0, None);
        let mut ball = resting_ball(Vec3::new(0.0, R, -2.96), Vec3::NEG_Z * 0.02);

        let replay = Waypoint {
            direction: Vec3::new(0.3, 0.0, 0.9),
            speed: 0.015,
            position: Vec3::new(0.1, R, -2.5),
        };
        let later = Waypoint {
            direction: Vec3::Z,
            speed: 0.0,
            position: Vec3::new(0.2, R, -1.0),
        };
        let mut queue = VecDeque::from([replay, later]);

        let report = step(&mut ball, &mut queue, &lane, &settings);
        let contact = report.contact.expect("should hit the end wall");

        assert!(contact.replayed);
        assert_eq!(contact.position, replay.position);
        assert_eq!(contact.velocity, replay.direction.normalize() * replay.speed);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0], later);

        let heading = ball.velocity.normalize();
        assert!(heading.abs_diff_eq(replay.direction.normalize(), 1e-5));
        assert!((ball.speed() - (0.015 - 0.00003)).abs() < 1e-6);
        assert!((contact.volume - HIT_VOLUME_SCALE).abs() < 1e-3);
    }

    #[test]
    fn test_collision_without_waypoints_reflects() {
        let settings = Settings::default();
        let (lane, _) = Scene::practice_lane(2.0, 3.0, None);
        let mut ball = resting_ball(Vec3::new(0.0, R, -2.96), Vec3::NEG_Z * 0.02);
        let mut queue = VecDeque::new();

        let report = step(&mut ball, &mut queue, &lane, &settings);
        let contact = report.contact.expect("should hit the end wall");

        assert!(!contact.replayed);
        assert!(contact.velocity.normalize().abs_diff_eq(Vec3::Z, 1e-5));
        assert!((contact.velocity.length() - 0.02).abs() < 1e-6);
        // Half the tick was spent reaching the wall
        assert!((ball.position.z + 2.95).abs() < 1e-5, "z = {}", ball.position.z);
        assert!(ball.velocity.z > 0.0);
        assert!((ball.speed() - (0.02 - 0.00003)).abs() < 1e-6);
    }

    #[test]
    fn test_replaying_resting_point_stalls() {
        let settings = Settings::default();
        let (lane, _) = Scene::practice_lane(2.0, 3.0, None);
        let mut ball = resting_ball(Vec3::new(0.0, R, -2.96), Vec3::NEG_Z * 0.02);
        let rest = Waypoint {
            direction: Vec3::NEG_Z,
            speed: 0.0,
            position: Vec3::new(0.0, R, -2.97),
        };
        let mut queue = VecDeque::from([rest]);

        let report = step(&mut ball, &mut queue, &lane, &settings);
        assert_eq!(report.outcome, StepOutcome::Stalled);
        assert_eq!(ball.position, rest.position);
        assert!(ball.position.is_finite());
    }
}
