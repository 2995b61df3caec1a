use super::object::PipelineStage;
use thiserror::Error;

/// A stage a worker was handed but has no behaviour for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerFault {
    pub worker: usize,
    pub stage: PipelineStage,
}

#[derive(Debug, Clone, Error)]
pub enum PhysicsError {
    #[error("Worker thread count {requested} outside 1..={max}")]
    InvalidThreadCount { requested: usize, max: usize },

    #[error("Allocation failed: {reason}")]
    Allocation { reason: String },

    #[error("No tracked object named {name}")]
    ObjectNotFound { name: String },

    #[error("Collision query on an object without a collider")]
    MissingCollider,

    #[error("Invalid mesh: {reason}")]
    InvalidMesh { reason: String },

    #[error("Stage {stage:?} is not implemented ({faults} work items rejected)")]
    StageNotImplemented { stage: PipelineStage, faults: usize },

    #[error("Failed to spawn worker: {reason}")]
    WorkerSpawn { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

pub type PhysResult<T> = Result<T, PhysicsError>;

impl From<std::collections::TryReserveError> for PhysicsError {
    fn from(err: std::collections::TryReserveError) -> Self {
        PhysicsError::Allocation { reason: err.to_string() }
    }
}
