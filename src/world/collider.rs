//! Axis-aligned box colliders.
//!
//! A collider is fitted once to a model-space vertex cloud and refitted to
//! the owner's translate×scale transform every frame with [`ColliderObject::update`].
//! Queries compare centers and half-extents per axis; the "imminent" phase
//! shifts only the querying box by `moving` and is not swept, so a large
//! enough `moving` can skip over a thin box entirely.

use crate::utils::math::{AffineTransform, Point3};
use crate::world::events::PhysicsReport;
use crate::world::physics::{PhysResult, PhysicsError};
use crate::world::scene::SceneObject;
use glam::Vec3;
use rayon::prelude::*;
use std::sync::Arc;

/// Vertices in the debug wireframe cube (12 triangles)
pub const DEBUG_MESH_VERTICES: usize = 36;

// Corner indices per face, bit 0 = x max, bit 1 = y max, bit 2 = z max
const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 4, 6, 2], // -X
    [1, 3, 7, 5], // +X
    [0, 1, 5, 4], // -Y
    [2, 6, 7, 3], // +Y
    [0, 2, 3, 1], // -Z
    [4, 5, 7, 6], // +Z
];

/// Result of a collision query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contact {
    /// Neither overlapping now nor after the move
    Clear,
    /// Boxes overlap on all three axes
    Colliding,
    /// Boxes would overlap once the querying box is shifted by `moving`
    Imminent,
}

impl Contact {
    /// Legacy integer code: 0 clear, 1 colliding, 2 imminent
    pub fn code(self) -> i32 {
        match self {
            Contact::Clear => 0,
            Contact::Colliding => 1,
            Contact::Imminent => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColliderObject {
    min_point: Point3,
    max_point: Point3,
    original_center: Point3,
    center: Point3,
    /// Half-extent per axis, always `center - transform(min_point)`
    offset: Vec3,
    debug_mesh: [Point3; DEBUG_MESH_VERTICES],
}

impl ColliderObject {
    /// Fit a box to a flat vertex cloud, three floats per point
    pub fn from_vertices(vertices: &[f32]) -> PhysResult<Self> {
        if vertices.len() % 3 != 0 {
            return Err(PhysicsError::InvalidMesh {
                reason: format!("{} floats is not a whole number of points", vertices.len()),
            });
        }

        let mut points = vertices
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]));
        let first = points.next().ok_or_else(|| PhysicsError::InvalidMesh {
            reason: "empty vertex cloud".to_string(),
        })?;

        // Strict comparisons: ties keep the earlier value
        let (mut min, mut max) = (first, first);
        for p in points {
            for axis in 0..3 {
                if p[axis] < min[axis] {
                    min[axis] = p[axis];
                }
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                }
            }
        }

        Ok(Self::from_bounds(min, max))
    }

    fn from_bounds(min: Point3, max: Point3) -> Self {
        let mut center = Vec3::ZERO;
        for axis in 0..3 {
            center[axis] = max[axis] - (max[axis] - min[axis]).abs() / 2.0;
        }

        let mut collider = Self {
            min_point: min,
            max_point: max,
            original_center: center,
            center,
            offset: Vec3::ZERO,
            debug_mesh: cube_mesh(min, max),
        };
        collider.update(&AffineTransform::identity());
        collider
    }

    /// Refit center and half-extents to the owner's current transform
    pub fn update(&mut self, transform: &AffineTransform) {
        self.center = transform.transform_point(self.original_center);
        let min_offset = transform.transform_point(self.min_point);
        self.offset = self.center - min_offset;
    }

    /// Two-phase query: current overlap first, then overlap after shifting
    /// this box by `moving`.
    pub fn collision_with(&self, other: &ColliderObject, moving: Vec3) -> Contact {
        if self.overlaps_at(self.center, other) {
            return Contact::Colliding;
        }
        if self.overlaps_at(self.center + moving, other) {
            return Contact::Imminent;
        }
        Contact::Clear
    }

    fn overlaps_at(&self, center: Point3, other: &ColliderObject) -> bool {
        (0..3)
            .filter(|&axis| {
                let delta = (other.center[axis] - center[axis]).abs();
                let range = self.offset[axis] + other.offset[axis];
                range >= delta
            })
            .count()
            == 3
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Model-space minimum corner
    pub fn min_point(&self) -> Point3 {
        self.min_point
    }

    /// Model-space maximum corner
    pub fn max_point(&self) -> Point3 {
        self.max_point
    }

    /// Model-space wireframe triangles for collider overlays
    pub fn debug_mesh(&self) -> &[Point3; DEBUG_MESH_VERTICES] {
        &self.debug_mesh
    }
}

fn cube_mesh(min: Point3, max: Point3) -> [Point3; DEBUG_MESH_VERTICES] {
    let corner = |i: usize| {
        Vec3::new(
            if i & 1 != 0 { max.x } else { min.x },
            if i & 2 != 0 { max.y } else { min.y },
            if i & 4 != 0 { max.z } else { min.z },
        )
    };

    let mut mesh = [Vec3::ZERO; DEBUG_MESH_VERTICES];
    for (face, quad) in CUBE_FACES.into_iter().enumerate() {
        let [a, b, c, d] = quad.map(corner);
        mesh[face * 6..face * 6 + 6].copy_from_slice(&[a, b, c, a, c, d]);
    }
    mesh
}

/// Query two optional colliders; a missing one is a caller error
pub fn get_collision(
    this: Option<&ColliderObject>,
    other: Option<&ColliderObject>,
    moving: Vec3,
) -> PhysResult<Contact> {
    match (this, other) {
        (Some(this), Some(other)) => Ok(this.collision_with(other, moving)),
        _ => Err(PhysicsError::MissingCollider),
    }
}

/// [`get_collision`] as the legacy integer, -1 for a missing collider
pub fn collision_code(
    this: Option<&ColliderObject>,
    other: Option<&ColliderObject>,
    moving: Vec3,
) -> i32 {
    get_collision(this, other, moving).map_or(-1, Contact::code)
}

/// Pairwise current-overlap test across `objects` on `pool`.
///
/// Colliders are snapshotted first, so callers should refit them beforehand.
/// Returns one report per object with at least one overlap, in input order.
pub fn sweep_collisions(pool: &rayon::ThreadPool, objects: &[Arc<SceneObject>]) -> Vec<PhysicsReport> {
    let colliders: Vec<Option<ColliderObject>> = objects.iter().map(|o| o.collider()).collect();

    pool.install(|| {
        objects
            .par_iter()
            .enumerate()
            .filter_map(|(i, parent)| {
                let this = colliders[i].as_ref()?;
                let collisions: Vec<Arc<SceneObject>> = objects
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .filter_map(|(j, other)| {
                        let that = colliders[j].as_ref()?;
                        (this.collision_with(that, Vec3::ZERO) == Contact::Colliding)
                            .then(|| Arc::clone(other))
                    })
                    .collect();

                (!collisions.is_empty()).then(|| PhysicsReport::new(Arc::clone(parent), collisions))
            })
            .collect()
    })
}
