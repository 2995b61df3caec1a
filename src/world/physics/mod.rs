//! Multi-threaded physics pipeline.
//!
//! A [`PhysicsController`] owns a fixed pool of worker threads and drives
//! one pipeline stage per call, blocking until every tracked object has
//! been processed. Only the POSITION stage does work today.

pub mod controller;
pub mod error;
pub mod object;
pub mod pool;
pub mod subscribers;
pub mod work;

pub use controller::{ControllerState, PhysicsController};
pub use error::{PhysResult, PhysicsError, WorkerFault};
pub use object::{KinematicState, PhysicsObject, PhysicsParams, PipelineStage, SharedObject};
pub use pool::WorkerPool;
pub use subscribers::{CollisionSubscriber, SubscriberRegistry};
pub use work::{WorkItem, WorkQueue};
