pub mod settings;
pub mod hardware;
pub mod concurrency;

// Re-export commonly used types
pub use settings::{
    PerformanceProfile, PhysicsSettings, LoggingSettings,
    save_physics_settings, load_physics_settings, save_settings_to, load_settings_from,
};
pub use hardware::{detect_hardware, recommend_profile, initialize_physics_settings, HardwareInfo};
pub use concurrency::{ThreadPoolConfig, MAX_WORKER_THREADS};
