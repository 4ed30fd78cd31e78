//! In-memory static collision scene
//!
//! A list of axis-aligned boxes answering `GeometryQuery`. Enough for practice
//! lanes, tests and the headless demo; a real host plugs in its own engine.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::{GeometryQuery, LayerMask, SurfaceHit, SurfaceTag};
use super::state::Hole;

/// Direction components smaller than this count as parallel to a slab
const PARALLEL_EPS: f32 = 1e-8;

/// An axis-aligned box collider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxCollider {
    pub min: Vec3,
    pub max: Vec3,
    pub tag: SurfaceTag,
    pub layer: LayerMask,
}

/// Static collision world
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    colliders: Vec<BoxCollider>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box spanning `min`..`max`
    pub fn add_box(&mut self, min: Vec3, max: Vec3, tag: SurfaceTag, layer: LayerMask) -> &mut Self {
        self.colliders.push(BoxCollider {
            min: min.min(max),
            max: min.max(max),
            tag,
            layer,
        });
        self
    }

    /// Builder form of `add_box`
    pub fn with_box(mut self, min: Vec3, max: Vec3, tag: SurfaceTag, layer: LayerMask) -> Self {
        self.add_box(min, max, tag, layer);
        self
    }

    pub fn colliders(&self) -> &[BoxCollider] {
        &self.colliders
    }

    /// A straight walled lane running from the tee at the origin toward -Z.
    ///
    /// Layout (top view, ball putts "up"):
    /// ```text
    ///  ########      <- end wall at z = -length
    ///  #  o   #      <- optional cup at z = -cup_distance
    ///  #      #
    ///  #  T   #      <- tee at z = 0
    ///  ########      <- back wall
    /// ```
    /// Out-of-bounds terrain lies below and beside the side walls.
    pub fn practice_lane(width: f32, length: f32, cup_distance: Option<f32>) -> (Scene, Hole) {
        const WALL_HEIGHT: f32 = 0.2;
        const WALL_THICKNESS: f32 = 0.1;
        const CUP_HALF: f32 = 0.06;
        const BACK: f32 = 1.0;

        let half = width / 2.0;
        let mut scene = Scene::new();

        // Cup first: it sits a hair above the floor so the floor probe finds it
        if let Some(d) = cup_distance {
            scene.add_box(
                Vec3::new(-CUP_HALF, -0.1, -d - CUP_HALF),
                Vec3::new(CUP_HALF, 0.001, -d + CUP_HALF),
                SurfaceTag::Goal,
                LayerMask::GROUND,
            );
        }

        scene
            .add_box(
                Vec3::new(-half, -0.1, -length),
                Vec3::new(half, 0.0, BACK),
                SurfaceTag::RollableGround,
                LayerMask::GROUND,
            )
            // Side walls
            .add_box(
                Vec3::new(-half - WALL_THICKNESS, 0.0, -length),
                Vec3::new(-half, WALL_HEIGHT, BACK),
                SurfaceTag::Obstacle,
                LayerMask::OBSTACLE,
            )
            .add_box(
                Vec3::new(half, 0.0, -length),
                Vec3::new(half + WALL_THICKNESS, WALL_HEIGHT, BACK),
                SurfaceTag::Obstacle,
                LayerMask::OBSTACLE,
            )
            // End walls
            .add_box(
                Vec3::new(-half, 0.0, -length - WALL_THICKNESS),
                Vec3::new(half, WALL_HEIGHT, -length),
                SurfaceTag::Obstacle,
                LayerMask::OBSTACLE,
            )
            .add_box(
                Vec3::new(-half, 0.0, BACK),
                Vec3::new(half, WALL_HEIGHT, BACK + WALL_THICKNESS),
                SurfaceTag::Obstacle,
                LayerMask::OBSTACLE,
            )
            // Terrain outside the lane
            .add_box(
                Vec3::new(-half - 5.0, -0.4, -length - 5.0),
                Vec3::new(-half - WALL_THICKNESS, -0.2, BACK + 5.0),
                SurfaceTag::OutOfBounds,
                LayerMask::GROUND,
            )
            .add_box(
                Vec3::new(half + WALL_THICKNESS, -0.4, -length - 5.0),
                Vec3::new(half + 5.0, -0.2, BACK + 5.0),
                SurfaceTag::OutOfBounds,
                LayerMask::GROUND,
            );

        let cup_z = -cup_distance.unwrap_or(length);
        let hole = Hole {
            tee: Vec3::new(0.0, 0.5, 0.0),
            cup_rest: Vec3::new(0.0, -0.05, cup_z),
        };

        (scene, hole)
    }

    fn nearest(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SurfaceHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || !(max_distance >= 0.0) {
            return None;
        }

        // Sweeping a sphere = casting a ray against the box grown by the radius.
        // Edges and corners come out square rather than rounded.
        let grow = Vec3::splat(radius);
        self.colliders
            .iter()
            .filter(|c| c.layer.intersects(mask))
            .filter_map(|c| {
                let (t, normal) = ray_box(origin, dir, c.min - grow, c.max + grow)?;
                (t <= max_distance).then(|| SurfaceHit {
                    point: origin + dir * t - normal * radius,
                    normal,
                    tag: c.tag,
                    distance: t,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl GeometryQuery for Scene {
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<SurfaceHit> {
        self.nearest(origin, 0.0, direction, f32::INFINITY, LayerMask::ALL)
    }

    fn spherecast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SurfaceHit> {
        self.nearest(origin, radius.max(0.0), direction, max_distance, mask)
    }
}

/// Slab test of a ray against a box.
///
/// Returns the entry distance and the normal of the entered face. Boxes that
/// contain the origin or lie behind it are misses.
fn ray_box(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let (o, d) = (origin[axis], dir[axis]);
        if d.abs() < PARALLEL_EPS {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 > t_enter {
            t_enter = t0;
            normal = Vec3::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(t1);

        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 {
        return None;
    }
    Some((t_enter, normal))
}
