//! Putt Sim headless demo
//!
//! Plays one round on a practice lane with scripted input and logs every
//! event the session emits. Run with `RUST_LOG=debug` for per-tick detail.
//!
//! Usage: `putt-sim [settings.json | settings.txt] [difficulty]`

use std::error::Error;

use putt_sim::consts::*;
use putt_sim::scorecard::stroke_label;
use putt_sim::sim::{FrameInput, Scene, ShotEvent, ShotPhase, ShotSession};
use putt_sim::{Difficulty, Scorecard, Settings};

/// Rendered frame length (60 fps)
const FRAME_DT: f32 = 1.0 / 60.0;
/// Club swing from start to impact
const SWING_DURATION: f32 = 0.3;
/// Bar value at which the scripted player lets go
const RELEASE_AT: f32 = 80.0;
/// Give up on the round after this many strokes
const MAX_STROKES: u32 = 10;

/// Demo driver holding the session and frame loop state
struct Demo {
    session: ShotSession<Scene>,
    accumulator: f32,
    swing_elapsed: f32,
}

impl Demo {
    fn new(settings: Settings) -> Result<Self, Box<dyn Error>> {
        let (scene, hole) = Scene::practice_lane(1.2, 8.0, Some(4.0));
        Ok(Self {
            session: ShotSession::new(settings, scene, hole)?,
            accumulator: 0.0,
            swing_elapsed: 0.0,
        })
    }

    /// Scripted player input for the current phase
    fn input(&self) -> FrameInput {
        match self.session.phase() {
            ShotPhase::Aiming => FrameInput {
                swing_pressed: true,
                ..Default::default()
            },
            ShotPhase::PowerSelect => FrameInput {
                swing_released: self.session.power_bar().value >= RELEASE_AT,
                ..Default::default()
            },
            _ => FrameInput::default(),
        }
    }

    /// One rendered frame
    fn frame(&mut self, dt: f32) {
        let input = self.input();
        self.session.update(dt, &input);

        match self.session.phase() {
            ShotPhase::SwingAnimation => {
                self.swing_elapsed += dt;
                if self.swing_elapsed >= SWING_DURATION {
                    self.swing_elapsed = 0.0;
                    self.accumulator = 0.0;
                    self.session.impact_reached();
                }
            }
            ShotPhase::Rolling => {
                let timestep = self.session.settings().timestep;
                self.accumulator += dt.min(0.1);

                let mut substeps = 0;
                while self.accumulator >= timestep && substeps < MAX_SUBSTEPS {
                    self.session.fixed_update();
                    self.accumulator -= timestep;
                    substeps += 1;
                    if self.session.phase() != ShotPhase::Rolling {
                        break;
                    }
                }
            }
            _ => {}
        }
    }
}

fn load_settings(path: Option<&str>) -> Result<Settings, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let text = std::fs::read_to_string(path)?;
    let settings = if path.ends_with(".json") {
        Settings::from_json(&text)?
    } else {
        Settings::from_key_values(&text)
    };
    log::info!("Loaded settings from {path}");
    Ok(settings)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Putt Sim (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = load_settings(args.first().map(String::as_str))?;
    let difficulty = args
        .get(1)
        .and_then(|s| Difficulty::from_str(s))
        .unwrap_or_default();

    let mut demo = Demo::new(settings)?;
    let mut scorecard = Scorecard::new();
    demo.session.start_round(difficulty);

    let mut holed = None;
    while holed.is_none() && demo.session.ball().shots <= MAX_STROKES {
        demo.frame(FRAME_DT);

        for event in demo.session.take_events() {
            match event {
                ShotEvent::RollVolume { .. } => log::trace!("{event:?}"),
                ShotEvent::PathUpdated { ref points, .. } => {
                    log::debug!("Path with {} points", points.len())
                }
                ShotEvent::ObstacleHit { position, volume } => {
                    log::info!("Bonk at {position} (volume {volume:.2})")
                }
                ShotEvent::ShotEnded { shots } => log::info!("Stroke {shots} to play"),
                ShotEvent::HoleCompleted { shots } => holed = Some(shots),
                other => log::debug!("{other:?}"),
            }
        }
    }

    match holed {
        Some(shots) => {
            let rank = scorecard.record(difficulty, shots);
            log::info!(
                "Holed in {} on {} (rank {:?})",
                stroke_label(shots),
                difficulty.as_str(),
                rank
            );
        }
        None => log::warn!("Gave up after {MAX_STROKES} strokes"),
    }

    Ok(())
}
