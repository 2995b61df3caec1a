use crate::config::settings::{PerformanceProfile, PhysicsSettings};
use sysinfo::System;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareInfo {
    pub total_memory_gb: u32,
    pub cpu_cores: u32,
}

/// Detect CPU and memory to size the worker pool
pub fn detect_hardware() -> HardwareInfo {
    let mut system = System::new();
    system.refresh_memory();
    system.refresh_cpu_all();

    let total_memory_gb = (system.total_memory() / (1024 * 1024 * 1024)) as u32;

    // sysinfo can report zero CPUs in restricted containers
    let cpu_cores = match system.cpus().len() {
        0 => num_cpus::get() as u32,
        n => n as u32,
    };

    HardwareInfo {
        total_memory_gb,
        cpu_cores,
    }
}

/// Recommend a performance profile based on hardware capabilities
pub fn recommend_profile(hardware: &HardwareInfo) -> PerformanceProfile {
    if hardware.cpu_cores < 4 || hardware.total_memory_gb < 4 {
        return PerformanceProfile::Low;
    }

    if hardware.cpu_cores >= 8 && hardware.total_memory_gb >= 16 {
        return PerformanceProfile::High;
    }

    PerformanceProfile::Balanced
}

/// Load persisted settings, or detect hardware and persist a fresh profile
pub fn initialize_physics_settings() -> PhysicsSettings {
    if let Some(settings) = crate::config::settings::load_physics_settings() {
        tracing::info!("Loaded existing physics settings: {:?}", settings.profile);
        return settings;
    }

    tracing::info!("No existing physics settings found, detecting hardware...");
    let hardware = detect_hardware();
    tracing::info!("  System Memory: {}GB", hardware.total_memory_gb);
    tracing::info!("  CPU Cores: {}", hardware.cpu_cores);

    let recommended_profile = recommend_profile(&hardware);
    tracing::info!("Recommended performance profile: {:?}", recommended_profile);

    let settings = PhysicsSettings::for_profile(recommended_profile, hardware.cpu_cores);

    if let Err(e) = crate::config::settings::save_physics_settings(&settings) {
        tracing::warn!("Failed to save physics settings: {}", e);
    } else {
        tracing::info!("Saved physics settings to disk");
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_detection() {
        let hardware = detect_hardware();
        assert!(hardware.cpu_cores > 0);
    }

    #[test]
    fn test_profile_recommendation() {
        let low_end = HardwareInfo {
            total_memory_gb: 2,
            cpu_cores: 2,
        };
        assert_eq!(recommend_profile(&low_end), PerformanceProfile::Low);

        let high_end = HardwareInfo {
            total_memory_gb: 32,
            cpu_cores: 16,
        };
        assert_eq!(recommend_profile(&high_end), PerformanceProfile::High);

        let balanced = HardwareInfo {
            total_memory_gb: 8,
            cpu_cores: 6,
        };
        assert_eq!(recommend_profile(&balanced), PerformanceProfile::Balanced);
    }
}
