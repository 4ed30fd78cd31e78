//! Collision query contract
//!
//! The simulation never owns scene geometry. It asks a `GeometryQuery` for the
//! first surface along a ray or a swept sphere and branches on the answer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a surface means to the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceTag {
    /// Lane floor the ball may roll on
    RollableGround,
    /// Terrain beside the lane; the ball is pulled back from it
    OutOfBounds,
    /// The cup
    Goal,
    /// Walls, bumpers and anything else the ball bounces off
    Obstacle,
}

/// Opaque collision layer filter, passed through to the geometry service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);
    /// Floors, terrain and the cup
    pub const GROUND: Self = Self(1 << 0);
    /// Walls and bumpers
    pub const OBSTACLE: Self = Self(1 << 1);

    /// Whether any layer of `other` is selected
    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// First surface struck by a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Contact point on the struck surface
    pub point: Vec3,
    /// Surface normal at the contact
    pub normal: Vec3,
    pub tag: SurfaceTag,
    /// Distance travelled along the query direction before contact
    pub distance: f32,
}

/// Static scene queries.
///
/// Colliders containing the query origin are ignored, and a zero direction
/// never hits. `None` is an ordinary answer, not a failure.
pub trait GeometryQuery {
    /// Unbounded ray against every layer
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<SurfaceHit>;

    /// Sweep a sphere along `direction` for at most `max_distance`
    fn spherecast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SurfaceHit>;
}

impl<G: GeometryQuery + ?Sized> GeometryQuery for &G {
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<SurfaceHit> {
        (**self).raycast(origin, direction)
    }

    fn spherecast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SurfaceHit> {
        (**self).spherecast(origin, radius, direction, max_distance, mask)
    }
}
