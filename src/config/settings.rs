use crate::config::concurrency::ThreadPoolConfig;
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use serde::{Serialize, Deserialize};

const PHYSICS_CONFIG_FILE: &str = "physics.toml";

// =============================================================================
// Physics Configuration System
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PerformanceProfile {
    Low,      // Half the cores, leave room for the render thread
    #[default]
    Balanced, // One worker per core
    High,     // Slight over-subscription
    Custom,   // User-defined pool size
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// EnvFilter directive used when RUST_LOG is unset
    pub level: String,
    /// Session log file, recreated on every start
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    pub profile: PerformanceProfile,
    /// Added to acceleration of gravity-obeying objects by the game layer
    pub gravity: [f32; 3],
    pub pool: ThreadPoolConfig,
    pub logging: LoggingSettings,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            profile: PerformanceProfile::default(),
            gravity: [0.0, -0.0098, 0.0],
            pool: ThreadPoolConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl PhysicsSettings {
    pub fn for_profile(profile: PerformanceProfile, cpu_cores: u32) -> Self {
        Self {
            profile,
            pool: ThreadPoolConfig::for_profile(profile, cpu_cores),
            ..Self::default()
        }
    }

    pub fn gravity(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.gravity)
    }
}

pub fn save_settings_to(settings: &PhysicsSettings, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml = toml::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, toml)
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<PhysicsSettings> {
    let data = fs::read_to_string(path)?;
    let mut settings: PhysicsSettings = toml::from_str(&data)?;
    // Hand-edited files may carry an out-of-range pool size
    settings.pool = settings.pool.clamped();
    Ok(settings)
}

// Physics configuration file management
fn physics_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "phys", "phys-pipeline")
        .map(|proj| proj.config_dir().join(PHYSICS_CONFIG_FILE))
}

pub fn save_physics_settings(settings: &PhysicsSettings) -> std::io::Result<()> {
    if let Some(path) = physics_config_path() {
        save_settings_to(settings, &path)?;
    }
    Ok(())
}

pub fn load_physics_settings() -> Option<PhysicsSettings> {
    let path = physics_config_path()?;
    match load_settings_from(&path) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::debug!("No usable physics settings at {:?}: {}", path, e);
            None
        }
    }
}
