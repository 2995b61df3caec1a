// phys-pipeline: threaded per-frame physics scheduling and AABB collision
// One barrier per stage, no stage ever overlaps the next

pub mod utils;
pub mod config;
pub mod world;

// Re-export commonly used types for convenience
pub use config::{
    PerformanceProfile, PhysicsSettings, ThreadPoolConfig, MAX_WORKER_THREADS,
    initialize_physics_settings,
};
pub use world::{
    collision_code, get_collision, ColliderObject, Contact, PhysicsController, PhysicsError,
    PhysicsParams, PhysicsReport, PhysResult, SceneObject,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
