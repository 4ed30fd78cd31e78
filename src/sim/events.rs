//! Outbound signals for presentation collaborators
//!
//! The session queues these; the host drains them once per frame and routes
//! them to audio, path drawing, club animation and score text.

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShotEvent {
    /// Aim direction or power changed
    AimChanged {
        origin: Vec3,
        direction: Vec3,
        power: f32,
    },
    /// New predicted path: ball position followed by every waypoint
    PathUpdated {
        points: Vec<Vec3>,
        target: Option<Vec3>,
    },
    /// Hide the path and target marker
    PathCleared,
    /// Start the club swing; answer with `ShotSession::impact_reached`
    SwingStarted,
    /// Ball left the club; start the rolling sound
    RollStarted,
    /// Rolling sound level for this tick
    RollVolume { volume: f32 },
    /// Stop the rolling sound
    RollStopped,
    /// Ball struck an obstacle
    ObstacleHit { position: Vec3, volume: f32 },
    /// Ball came to rest; `shots` is the stroke about to be played
    ShotEnded { shots: u32 },
    /// Ball dropped into the cup after `shots` strokes
    HoleCompleted { shots: u32 },
}
