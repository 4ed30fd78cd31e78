//! Deterministic simulation module
//!
//! All ball physics and shot logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only for motion
//! - No randomness
//! - Geometry only through `GeometryQuery`
//! - No rendering, audio or platform dependencies

pub mod events;
pub mod geometry;
pub mod power_bar;
pub mod predict;
pub mod scene;
pub mod shot;
pub mod state;
pub mod tick;
pub mod timer;

pub use events::ShotEvent;
pub use geometry::{GeometryQuery, LayerMask, SurfaceHit, SurfaceTag};
pub use power_bar::{POWER_BAR_MAX, PowerBar};
pub use predict::{PathEnd, Trajectory, bounce_direction, predict, reflect};
pub use scene::{BoxCollider, Scene};
pub use shot::{FrameInput, ShotSession};
pub use state::{Ball, Hole, ShotPhase, Waypoint};
pub use tick::{Contact, StepOutcome, StepReport, step};
pub use timer::Interval;
