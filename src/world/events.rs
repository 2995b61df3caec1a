use crate::world::scene::SceneObject;
use std::sync::Arc;
use std::time::SystemTime;

/// Collision report delivered to subscribers
#[derive(Debug, Clone)]
pub struct PhysicsReport {
    /// Object the report is about
    pub parent: Arc<SceneObject>,
    /// Objects currently overlapping `parent`
    pub collisions: Vec<Arc<SceneObject>>,
    pub timestamp: SystemTime,
}

impl PhysicsReport {
    /// Create a new report
    pub fn new(parent: Arc<SceneObject>, collisions: Vec<Arc<SceneObject>>) -> Self {
        Self {
            parent,
            collisions,
            timestamp: SystemTime::now(),
        }
    }

    /// Check whether `other` is among the reported collisions
    pub fn involves(&self, other: &Arc<SceneObject>) -> bool {
        self.collisions.iter().any(|c| Arc::ptr_eq(c, other))
    }
}
