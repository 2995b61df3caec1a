pub mod collider;
pub mod events;
pub mod physics;
pub mod scene;

// Re-export the types game code touches every frame
pub use collider::{collision_code, get_collision, ColliderObject, Contact};
pub use events::PhysicsReport;
pub use physics::{PhysicsController, PhysicsError, PhysicsParams, PhysResult};
pub use scene::{SceneObject, SceneTransform};
