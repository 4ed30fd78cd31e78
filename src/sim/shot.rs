//! Shot state machine
//!
//! Owns the one live ball of a round and sequences its phases:
//! `Inactive -> AimingFirst -> Aiming -> PowerSelect -> SwingAnimation -> Rolling`,
//! looping back to `Aiming` when the ball stalls and dropping to `Inactive`
//! when it is holed.
//!
//! The host drives it with two cadences that never overlap:
//! - `update` once per rendered frame (input, power bar, re-prediction timer)
//! - `fixed_update` once per physics tick (integration while rolling)
//!
//! Presentation is fed through `ShotEvent`s drained with `take_events`.

use std::collections::VecDeque;

use glam::Vec3;

use super::events::ShotEvent;
use super::geometry::GeometryQuery;
use super::power_bar::PowerBar;
use super::predict::{PathEnd, predict};
use super::state::{Ball, Hole, ShotPhase, Waypoint};
use super::tick::{self, StepOutcome};
use super::timer::Interval;
use crate::consts::*;
use crate::error::SettingsError;
use crate::settings::{Difficulty, Settings};
use crate::{flatten, rotate_about_up};

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Turn the aim counter-clockwise (held)
    pub aim_left: bool,
    /// Turn the aim clockwise (held)
    pub aim_right: bool,
    /// Raise power (held)
    pub power_up: bool,
    /// Lower power (held)
    pub power_down: bool,
    /// Fine adjustment modifier
    pub fine: bool,
    /// Coarse adjustment modifier, wins over `fine`
    pub coarse: bool,
    /// Swing key went down this frame
    pub swing_pressed: bool,
    /// Swing key went up this frame
    pub swing_released: bool,
}

impl FrameInput {
    /// Step multiplier from the modifier keys
    fn step_scale(&self) -> f32 {
        if self.coarse {
            COARSE_MODIFIER
        } else if self.fine {
            FINE_MODIFIER
        } else {
            1.0
        }
    }
}

/// One round on one hole
pub struct ShotSession<G: GeometryQuery> {
    settings: Settings,
    world: G,
    hole: Hole,
    ball: Ball,
    phase: ShotPhase,
    /// Aimed power, kept across shots
    power: f32,
    /// Flat unit aim direction
    aim: Vec3,
    power_bar: PowerBar,
    /// Pending predicted bounces, drained by the integrator
    waypoints: VecDeque<Waypoint>,
    path_end: PathEnd,
    /// Drift-correcting re-prediction, armed only while aiming
    repredict: Option<Interval>,
    events: Vec<ShotEvent>,
}

impl<G: GeometryQuery> ShotSession<G> {
    /// Create an idle session with the ball resting on the tee.
    ///
    /// Fails if `settings` do not validate.
    pub fn new(settings: Settings, world: G, hole: Hole) -> Result<Self, SettingsError> {
        settings.validate()?;

        let ball = Ball::new(hole.tee, settings.ball_radius);
        let mut session = Self {
            settings,
            world,
            hole,
            ball,
            phase: ShotPhase::Inactive,
            power: DEFAULT_POWER,
            aim: Vec3::NEG_Z,
            power_bar: PowerBar::default(),
            waypoints: VecDeque::new(),
            path_end: PathEnd::Stopped,
            repredict: None,
            events: Vec::new(),
        };
        session.place_on_tee();
        Ok(session)
    }

    /// Begin a round: first stroke, default power, ball on the tee
    pub fn start_round(&mut self, difficulty: Difficulty) {
        self.place_on_tee();
        self.ball.shots = 1;
        self.ball.difficulty = difficulty;
        self.power = DEFAULT_POWER;
        self.phase = ShotPhase::AimingFirst;
        self.events.clear();

        log::info!("Round started on {} at {}", difficulty.as_str(), self.ball.position);
        self.begin_aiming();
    }

    /// Per-frame update
    pub fn update(&mut self, dt: f32, input: &FrameInput) {
        if self.phase.is_aiming() {
            self.update_aiming(dt, input);
        }
        // Committing the aim falls straight through to the first bar tick
        if self.phase == ShotPhase::PowerSelect {
            self.update_power(dt, input);
        }
    }

    /// The swing animation reached the ball; start rolling
    pub fn impact_reached(&mut self) {
        if self.phase != ShotPhase::SwingAnimation {
            log::debug!("Ignoring impact while {:?}", self.phase);
            return;
        }
        self.phase = ShotPhase::Rolling;
        self.events.push(ShotEvent::RollStarted);
        self.events.push(ShotEvent::PathCleared);
    }

    /// Per-physics-tick update; only acts while rolling
    pub fn fixed_update(&mut self) {
        if self.phase != ShotPhase::Rolling {
            return;
        }

        let report = tick::step(&mut self.ball, &mut self.waypoints, &self.world, &self.settings);

        if let Some(contact) = report.contact {
            self.events.push(ShotEvent::ObstacleHit {
                position: contact.point,
                volume: contact.volume,
            });
        }

        match report.outcome {
            StepOutcome::Rolling => {
                if let Some(volume) = report.roll_volume {
                    self.events.push(ShotEvent::RollVolume { volume });
                }
            }
            StepOutcome::Stalled => self.finish_shot(),
            StepOutcome::Holed => self.complete_hole(),
        }
    }

    /// Drain queued events in emission order
    pub fn take_events(&mut self) -> Vec<ShotEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hole(&self) -> &Hole {
        &self.hole
    }

    pub fn world(&self) -> &G {
        &self.world
    }

    pub fn power_bar(&self) -> &PowerBar {
        &self.power_bar
    }

    /// Predicted bounces not yet replayed
    pub fn waypoints(&self) -> &VecDeque<Waypoint> {
        &self.waypoints
    }

    /// Why the latest prediction stopped
    pub fn path_end(&self) -> PathEnd {
        self.path_end
    }

    /// Ball position followed by every pending waypoint
    pub fn path_points(&self) -> Vec<Vec3> {
        std::iter::once(self.ball.position)
            .chain(self.waypoints.iter().map(|wp| wp.position))
            .collect()
    }

    /// Where the club head rests, just behind the ball
    pub fn club_position(&self) -> Vec3 {
        self.ball.position - self.aim * CLUB_OFFSET
    }

    /// Power bar fill in [0, 1]
    pub fn power_fill(&self) -> f32 {
        self.power_bar.fill_fraction()
    }

    /// Aimed-power marker along the power bar in [0, 1]
    pub fn power_marker(&self) -> f32 {
        self.power_bar.marker_fraction(self.settings.min_power)
    }

    fn place_on_tee(&mut self) {
        let radius = self.settings.ball_radius;
        let mut position = self.hole.tee;
        if let Some(ground) = self.world.raycast(self.hole.tee, Vec3::NEG_Y) {
            position = ground.point + Vec3::Y * radius;
        } else {
            log::warn!("No ground under the tee at {}", self.hole.tee);
        }

        self.ball.position = position;
        self.ball.last_valid_position = position;
        self.ball.velocity = Vec3::ZERO;
        self.waypoints.clear();
    }

    fn update_aiming(&mut self, dt: f32, input: &FrameInput) {
        let mut changed = self.apply_aim_input(input);
        if self.phase == ShotPhase::AimingFirst {
            self.phase = ShotPhase::Aiming;
            changed = true;
        }

        if changed {
            self.begin_aiming();
        } else if self.repredict.as_mut().is_some_and(|timer| timer.tick(dt)) {
            self.rebuild_path();
        }

        if input.swing_pressed {
            self.phase = ShotPhase::PowerSelect;
            self.power_bar.reset(self.power);
            self.repredict = None;
        }
    }

    /// Apply held aim and power keys. True if anything was pressed.
    fn apply_aim_input(&mut self, input: &FrameInput) -> bool {
        let scale = input.step_scale();
        let mut changed = false;

        // Right wins when both are held
        let turn = if input.aim_right {
            Some(AIM_STEP_DEG * scale)
        } else if input.aim_left {
            Some(-AIM_STEP_DEG * scale)
        } else {
            None
        };
        if let Some(turn) = turn {
            self.aim = flatten(rotate_about_up(self.aim, turn)).normalize_or_zero();
            self.ball.turn(turn);
            changed = true;
        }

        if input.power_up {
            self.power += POWER_STEP * scale;
            changed = true;
        }
        if input.power_down {
            self.power -= POWER_STEP * scale;
            changed = true;
        }
        self.power = self.power.clamp(self.settings.min_power, 1.0);

        changed
    }

    fn update_power(&mut self, dt: f32, input: &FrameInput) {
        let rate = self.settings.tier_speed(self.ball.difficulty);
        self.power_bar.tick(dt, rate);

        if input.swing_released {
            self.release();
        }
    }

    /// Lock in the sampled power and hand over to the swing animation
    fn release(&mut self) {
        let stroke = self.power_bar.sample(self.settings.min_power);
        log::debug!(
            "Released at bar {:.1}: stroke power {stroke:.2} (aimed {:.2})",
            self.power_bar.value,
            self.power
        );

        // The aimed power stays put for the next shot
        self.predict_stroke(stroke);
        self.phase = ShotPhase::SwingAnimation;
        self.events.push(ShotEvent::SwingStarted);
        self.events.push(ShotEvent::PathCleared);
    }

    fn finish_shot(&mut self) {
        let heading = flatten(self.ball.velocity).normalize_or_zero();
        if heading != Vec3::ZERO {
            self.aim = heading;
        }

        self.ball.shots += 1;
        self.phase = ShotPhase::Aiming;
        log::info!("Ball stopped at {}; stroke {} next", self.ball.position, self.ball.shots);

        self.events.push(ShotEvent::RollStopped);
        self.events.push(ShotEvent::ShotEnded {
            shots: self.ball.shots,
        });
        self.begin_aiming();
    }

    fn complete_hole(&mut self) {
        let shots = self.ball.shots;
        log::info!("Holed in {shots}");

        self.phase = ShotPhase::Inactive;
        self.repredict = None;
        self.waypoints.clear();
        self.ball.velocity = Vec3::ZERO;
        self.ball.position = self.hole.cup_rest;
        self.ball.last_valid_position = self.hole.cup_rest;

        self.events.push(ShotEvent::PathCleared);
        self.events.push(ShotEvent::RollStopped);
        self.events.push(ShotEvent::HoleCompleted { shots });
    }

    /// Re-predict for the aimed power, announce it, and restart the timer
    fn begin_aiming(&mut self) {
        self.rebuild_path();
        self.events.push(ShotEvent::AimChanged {
            origin: self.ball.position,
            direction: self.aim,
            power: self.power,
        });
        self.repredict = Some(Interval::new(self.settings.repredict_interval));
    }

    /// Replace the path for the aimed power and publish it
    fn rebuild_path(&mut self) {
        self.predict_stroke(self.power);
        let points = self.path_points();
        let target = self.waypoints.back().map(|wp| wp.position);
        self.events.push(ShotEvent::PathUpdated { points, target });
    }

    /// Replace the waypoint queue and ball velocity for a stroke at `power`
    fn predict_stroke(&mut self, power: f32) {
        let path = predict(
            &self.world,
            &self.settings,
            self.ball.radius,
            self.ball.position,
            self.aim,
            power,
        );
        self.ball.velocity = self.aim * self.settings.max_speed_scaled() * power;
        self.path_end = path.end;
        self.waypoints = path.waypoints.into();
    }
}
