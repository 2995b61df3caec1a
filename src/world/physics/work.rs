use super::object::{PipelineStage, SharedObject};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// One unit of work handed to the pool
#[derive(Debug)]
pub enum WorkItem {
    /// Run `stage` for a single tracked object
    Stage {
        stage: PipelineStage,
        object: SharedObject,
    },
    /// Ends the receiving worker's loop; one is sent per worker at teardown
    Shutdown,
}

#[derive(Debug)]
struct QueueState {
    items: VecDeque<WorkItem>,
    free_workers: usize,
    closing: bool,
}

/// FIFO of work items with a blocking pop and an idle barrier.
///
/// The `free_workers` counter lives under the same lock as the items so the
/// barrier predicate `free_workers == thread_count && items.is_empty()` is
/// always read consistently.
#[derive(Debug)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    work_available: Condvar,
    work_done: Condvar,
    thread_count: usize,
}

impl WorkQueue {
    pub fn new(thread_count: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                free_workers: thread_count,
                closing: false,
            }),
            work_available: Condvar::new(),
            work_done: Condvar::new(),
            thread_count,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, item: WorkItem) {
        self.lock().items.push_back(item);
        self.work_available.notify_one();
    }

    /// Enqueue a whole stage under one lock acquisition, then wake every worker
    pub fn push_batch<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = WorkItem>,
    {
        let pushed = {
            let mut state = self.lock();
            let before = state.items.len();
            state.items.extend(items);
            state.items.len() - before
        };
        self.work_available.notify_all();
        pushed
    }

    /// Block until an item is available and claim it, marking one worker busy.
    /// Returns `None` once the queue is closed and drained.
    pub fn pop_blocking(&self) -> Option<WorkItem> {
        let mut state = self
            .work_available
            .wait_while(self.lock(), |s| s.items.is_empty() && !s.closing)
            .unwrap_or_else(PoisonError::into_inner);

        let item = state.items.pop_front()?;
        debug_assert!(state.free_workers > 0, "free worker counter underflow");
        state.free_workers -= 1;
        Some(item)
    }

    /// Mark one worker idle again and wake the barrier
    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.free_workers += 1;
            debug_assert!(
                state.free_workers <= self.thread_count,
                "free worker counter exceeds pool size"
            );
        }
        self.work_done.notify_all();
    }

    /// Barrier: block until every worker is idle and nothing is queued
    pub fn wait_idle(&self) {
        let _state = self
            .work_done
            .wait_while(self.lock(), |s| {
                s.free_workers != self.thread_count || !s.items.is_empty()
            })
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Stop accepting waits; idle workers return from `pop_blocking`
    pub fn close(&self) {
        self.lock().closing = true;
        self.work_available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn free_workers(&self) -> usize {
        self.lock().free_workers
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_and_counter() {
        let queue = WorkQueue::new(2);
        queue.push(WorkItem::Shutdown);
        queue.push_batch([WorkItem::Shutdown]);
        assert_eq!(queue.len(), 2);

        assert!(matches!(queue.pop_blocking(), Some(WorkItem::Shutdown)));
        assert_eq!(queue.free_workers(), 1);
        assert!(matches!(queue.pop_blocking(), Some(WorkItem::Shutdown)));
        assert_eq!(queue.free_workers(), 0);
        assert!(queue.is_empty());

        queue.complete();
        queue.complete();
        assert_eq!(queue.free_workers(), 2);
        queue.wait_idle();
    }

    #[test]
    fn test_closed_queue_releases_waiters() {
        let queue = WorkQueue::new(1);
        queue.close();
        assert!(queue.pop_blocking().is_none());
        assert_eq!(queue.free_workers(), 1);
    }
}
