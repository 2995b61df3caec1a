use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use crate::config::settings::PerformanceProfile;

/// Hard cap on persistent physics workers
pub const MAX_WORKER_THREADS: usize = 256;

/// Sizing for the physics worker pool and the collision sweep pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadPoolConfig {
    /// Persistent pipeline workers, `1..=MAX_WORKER_THREADS`
    pub worker_threads: usize,
    /// Threads for the rayon pool used by collision sweeps
    pub sweep_threads: usize,
    pub stack_size: Option<usize>,
    pub thread_name_prefix: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            worker_threads: num_cpus.clamp(1, MAX_WORKER_THREADS),
            sweep_threads: (num_cpus / 2).max(1),
            stack_size: Some(2 * 1024 * 1024), // 2MB stack size
            thread_name_prefix: "phys-worker".to_string(),
        }
    }
}

impl ThreadPoolConfig {
    /// Config with an explicit worker count and defaults for the rest.
    /// The count is not clamped; the controller rejects out-of-range values.
    pub fn with_workers(worker_threads: usize) -> Self {
        Self {
            worker_threads,
            ..Self::default()
        }
    }

    /// Create pool configuration for a performance profile
    pub fn for_profile(profile: PerformanceProfile, cpu_cores: u32) -> Self {
        let cpu_cores = cpu_cores as usize;

        let config = match profile {
            PerformanceProfile::Low => Self {
                worker_threads: cpu_cores / 2,
                sweep_threads: 1,
                stack_size: Some(1024 * 1024), // 1MB stack
                ..Self::default()
            },
            PerformanceProfile::Balanced => Self {
                worker_threads: cpu_cores,
                sweep_threads: cpu_cores / 2,
                stack_size: Some(2 * 1024 * 1024),
                ..Self::default()
            },
            PerformanceProfile::High => Self {
                worker_threads: cpu_cores + (cpu_cores / 4), // Over-subscribe slightly
                sweep_threads: cpu_cores,
                stack_size: Some(4 * 1024 * 1024),
                ..Self::default()
            },
            PerformanceProfile::Custom => Self::default(),
        };

        config.clamped()
    }

    /// Pull thread counts back into their valid ranges
    pub fn clamped(mut self) -> Self {
        self.worker_threads = self.worker_threads.clamp(1, MAX_WORKER_THREADS);
        self.sweep_threads = self.sweep_threads.max(1);
        self
    }

    pub fn worker_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, index)
    }

    /// Build the rayon pool used for parallel collision sweeps
    pub fn build_sweep_pool(&self) -> anyhow::Result<rayon::ThreadPool> {
        let prefix = self.thread_name_prefix.clone();
        let mut builder = ThreadPoolBuilder::new()
            .num_threads(self.sweep_threads.max(1))
            .thread_name(move |index| format!("{}-sweep-{}", prefix, index));

        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create sweep thread pool: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_in_range() {
        let config = ThreadPoolConfig::default();
        assert!(config.worker_threads >= 1);
        assert!(config.worker_threads <= MAX_WORKER_THREADS);
        assert!(config.sweep_threads >= 1);
    }

    #[test]
    fn test_profiles_clamp() {
        let low = ThreadPoolConfig::for_profile(PerformanceProfile::Low, 1);
        assert_eq!(low.worker_threads, 1);

        let high = ThreadPoolConfig::for_profile(PerformanceProfile::High, 512);
        assert_eq!(high.worker_threads, MAX_WORKER_THREADS);

        let balanced = ThreadPoolConfig::for_profile(PerformanceProfile::Balanced, 8);
        assert_eq!(balanced.worker_threads, 8);
        assert_eq!(balanced.sweep_threads, 4);
    }

    #[test]
    fn test_worker_names() {
        let config = ThreadPoolConfig::with_workers(3);
        assert_eq!(config.worker_name(2), "phys-worker-2");
    }

    #[test]
    fn test_sweep_pool_creation() {
        let config = ThreadPoolConfig {
            worker_threads: 2,
            sweep_threads: 2,
            stack_size: None,
            thread_name_prefix: "test".to_string(),
        };
        let pool = config.build_sweep_pool().unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        assert_eq!(pool.install(|| 42), 42);
    }
}
