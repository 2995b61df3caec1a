use crate::world::scene::SceneObject;
use glam::Vec3;
use std::sync::{Arc, Mutex, Weak};

/// Per-tick pipeline phase applied to every tracked object.
///
/// Only `Position` has worker behaviour today. The other three are
/// placeholders for collision response and hand-off to the scene layer;
/// a worker handed one of them reports a [`WorkerFault`](super::WorkerFault).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineStage {
    #[default]
    Position,
    Collision,
    Finalize,
    Submit,
}

/// Registration parameters, copied into a new [`PhysicsObject`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub position: Vec3,
    pub is_kinematic: bool,
    pub obey_gravity: bool,
    pub elasticity: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            is_kinematic: true,
            obey_gravity: false,
            elasticity: 0.0,
        }
    }
}

/// Snapshot of an object's motion
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

/// Physics state for one tracked scene entity
#[derive(Debug, Clone)]
pub struct PhysicsObject {
    /// Owning scene object; the controller never keeps it alive
    pub target: Weak<SceneObject>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub is_kinematic: bool,
    /// Gravity hook; the pipeline itself never adds gravity
    pub obey_gravity: bool,
    /// Reserved for collision response
    pub impulse: Vec3,
    pub elasticity: f32,
    pub mass: f32,
    pub work_type: PipelineStage,
}

pub type SharedObject = Arc<Mutex<PhysicsObject>>;

impl PhysicsObject {
    pub fn new(target: &Arc<SceneObject>, params: &PhysicsParams) -> Self {
        Self {
            target: Arc::downgrade(target),
            position: params.position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            is_kinematic: params.is_kinematic,
            obey_gravity: params.obey_gravity,
            impulse: Vec3::ZERO,
            elasticity: params.elasticity,
            mass: 1.0,
            work_type: PipelineStage::Position,
        }
    }

    /// POSITION stage: position advances by the already-updated velocity.
    /// Touches nothing but `self`, so workers may run it in any order.
    pub fn integrate(&mut self) {
        if !self.is_kinematic {
            return;
        }
        self.velocity += self.acceleration;
        self.position += self.velocity;
    }

    /// Identity comparison against a scene object
    pub fn tracks(&self, target: &Arc<SceneObject>) -> bool {
        std::ptr::eq(self.target.as_ptr(), Arc::as_ptr(target))
    }

    pub fn target_name(&self) -> Option<String> {
        self.target.upgrade().map(|t| t.name().to_string())
    }

    pub fn state(&self) -> KinematicState {
        KinematicState {
            position: self.position,
            velocity: self.velocity,
            acceleration: self.acceleration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_uses_updated_velocity() {
        let target = SceneObject::new("ball");
        let mut object = PhysicsObject::new(&target, &PhysicsParams::default());
        object.velocity = Vec3::new(1.0, 0.0, 0.0);
        object.acceleration = Vec3::new(0.5, -1.0, 0.0);

        object.integrate();

        assert_eq!(object.velocity, Vec3::new(1.5, -1.0, 0.0));
        assert_eq!(object.position, Vec3::new(1.5, -1.0, 0.0));
    }

    #[test]
    fn test_static_object_does_not_move() {
        let target = SceneObject::new("wall");
        let params = PhysicsParams {
            is_kinematic: false,
            ..PhysicsParams::default()
        };
        let mut object = PhysicsObject::new(&target, &params);
        object.velocity = Vec3::ONE;

        object.integrate();

        assert_eq!(object.position, Vec3::ZERO);
        assert_eq!(object.velocity, Vec3::ONE);
    }

    #[test]
    fn test_tracks_by_identity() {
        let a = SceneObject::new("same");
        let b = SceneObject::new("same");
        let object = PhysicsObject::new(&a, &PhysicsParams::default());

        assert!(object.tracks(&a));
        assert!(!object.tracks(&b));
        assert_eq!(object.target_name().as_deref(), Some("same"));
    }
}
