use super::error::{PhysResult, PhysicsError, WorkerFault};
use super::object::{PipelineStage, SharedObject};
use super::work::{WorkItem, WorkQueue};
use crate::config::concurrency::{ThreadPoolConfig, MAX_WORKER_THREADS};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Fixed set of persistent threads consuming a [`WorkQueue`]
#[derive(Debug)]
pub struct WorkerPool {
    queue: Arc<WorkQueue>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    fault_rx: Receiver<WorkerFault>,
}

impl WorkerPool {
    /// Spawn `config.worker_threads` workers, all initially idle
    pub fn spawn(config: &ThreadPoolConfig) -> PhysResult<Self> {
        let thread_count = config.worker_threads;
        if thread_count == 0 || thread_count > MAX_WORKER_THREADS {
            return Err(PhysicsError::InvalidThreadCount {
                requested: thread_count,
                max: MAX_WORKER_THREADS,
            });
        }

        let queue = Arc::new(WorkQueue::new(thread_count));
        let (fault_tx, fault_rx) = unbounded();
        let pool = Self {
            queue,
            handles: Mutex::new(Vec::with_capacity(thread_count)),
            fault_rx,
        };

        for index in 0..thread_count {
            let mut builder = thread::Builder::new().name(config.worker_name(index));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let queue = Arc::clone(&pool.queue);
            let faults = fault_tx.clone();
            match builder.spawn(move || worker_loop(index, &queue, &faults)) {
                Ok(handle) => pool.lock_handles().push(handle),
                Err(e) => {
                    error!("Failed to spawn physics worker {}: {}", index, e);
                    pool.shutdown_and_join();
                    return Err(PhysicsError::WorkerSpawn { reason: e.to_string() });
                }
            }
        }

        info!("Started physics worker pool with {} threads", thread_count);
        Ok(pool)
    }

    fn lock_handles(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    pub fn thread_count(&self) -> usize {
        self.queue.thread_count()
    }

    /// Threads spawned and not yet joined
    pub fn live_threads(&self) -> usize {
        self.lock_handles().len()
    }

    /// Faults reported since the last drain
    pub fn drain_faults(&self) -> Vec<WorkerFault> {
        self.fault_rx.try_iter().collect()
    }

    /// Send one `Shutdown` per worker and join them all. Safe to call twice.
    pub fn shutdown_and_join(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.lock_handles());
        if handles.is_empty() {
            return;
        }

        self.queue
            .push_batch(handles.iter().map(|_| WorkItem::Shutdown));
        self.queue.close();

        let count = handles.len();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("phys-worker").to_string();
            if handle.join().is_err() {
                error!("Physics worker {} panicked before shutdown", name);
            }
        }
        info!("Joined {} physics workers", count);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

fn worker_loop(index: usize, queue: &WorkQueue, faults: &Sender<WorkerFault>) {
    debug!("Physics worker {} waiting for work", index);

    while let Some(item) = queue.pop_blocking() {
        match item {
            WorkItem::Shutdown => {
                debug!("Physics worker {} received shutdown", index);
                return;
            }
            WorkItem::Stage { stage, object } => {
                run_stage(index, stage, &object, faults);
                queue.complete();
            }
        }
    }

    debug!("Physics worker {} exiting on closed queue", index);
}

fn run_stage(index: usize, stage: PipelineStage, object: &SharedObject, faults: &Sender<WorkerFault>) {
    match stage {
        PipelineStage::Position => {
            object
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .integrate();
        }
        PipelineStage::Collision | PipelineStage::Finalize | PipelineStage::Submit => {
            error!("Physics worker {} has no behaviour for stage {:?}", index, stage);
            // Receiver outlives every worker; a send can only fail during teardown
            let _ = faults.send(WorkerFault { worker: index, stage });
        }
    }
}
