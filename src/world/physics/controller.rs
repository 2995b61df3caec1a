use super::error::{PhysResult, PhysicsError};
use super::object::{KinematicState, PhysicsObject, PhysicsParams, PipelineStage, SharedObject};
use super::pool::WorkerPool;
use super::subscribers::{CollisionSubscriber, SubscriberRegistry};
use super::work::WorkItem;
use crate::config::concurrency::ThreadPoolConfig;
use crate::world::collider::sweep_collisions;
use crate::world::events::PhysicsReport;
use crate::world::scene::SceneObject;
use glam::Vec3;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle of a controller. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Workers running, no tick driven yet
    Constructed,
    /// At least one tick has been driven
    Running,
    /// Shutdown requested; ticks are refused
    ShuttingDown,
    /// Workers joined
    Stopped,
}

/// Tracked objects in registration order, indexed by scene object id.
///
/// The index points at the first registration of each id, so lookups by
/// target are constant time. Removal shifts the list and rebuilds the index.
#[derive(Default)]
struct ObjectTable {
    list: Vec<SharedObject>,
    ids: Vec<Uuid>,
    index: HashMap<Uuid, usize>,
}

impl ObjectTable {
    fn push(&mut self, id: Uuid, object: SharedObject) -> PhysResult<()> {
        self.list.try_reserve(1)?;
        self.ids.try_reserve(1)?;
        self.index.try_reserve(1)?;

        self.index.entry(id).or_insert(self.list.len());
        self.list.push(object);
        self.ids.push(id);
        Ok(())
    }

    fn get(&self, id: &Uuid) -> Option<&SharedObject> {
        self.index.get(id).map(|&i| &self.list[i])
    }

    /// Drop the first registration of `id`
    fn remove(&mut self, id: &Uuid) -> bool {
        let Some(index) = self.index.get(id).copied() else {
            return false;
        };
        self.list.remove(index);
        self.ids.remove(index);

        self.index.clear();
        for (i, kept) in self.ids.iter().enumerate() {
            self.index.entry(*kept).or_insert(i);
        }
        true
    }

    fn len(&self) -> usize {
        self.list.len()
    }
}

/// Per-tick physics scheduler.
///
/// Owns the tracked objects and a fixed worker pool. Each tick fans every
/// object out to the workers and blocks until the whole stage is done, so
/// no stage ever overlaps the next. Nothing here times out: a stuck worker
/// stalls `update` indefinitely.
///
/// The rayon pool behind [`PhysicsController::publish_collisions`] is only
/// built on the first sweep. Rayon never joins its threads: once the
/// controller drops the pool they exit on their own.
pub struct PhysicsController {
    /// Held for a whole tick
    objects: Mutex<ObjectTable>,
    subscribers: SubscriberRegistry,
    pool: WorkerPool,
    config: ThreadPoolConfig,
    sweep_pool: OnceLock<rayon::ThreadPool>,
    shutdown: AtomicBool,
    state: Mutex<ControllerState>,
}

impl std::fmt::Debug for PhysicsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsController")
            .field("state", &self.state())
            .field("thread_count", &self.thread_count())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl PhysicsController {
    /// Spawn the worker pool described by `config`
    pub fn new(config: &ThreadPoolConfig) -> PhysResult<Self> {
        let pool = WorkerPool::spawn(config)?;
        info!("Physics controller ready: {} workers", config.worker_threads);

        Ok(Self {
            objects: Mutex::new(ObjectTable::default()),
            subscribers: SubscriberRegistry::new(),
            pool,
            config: config.clone(),
            sweep_pool: OnceLock::new(),
            shutdown: AtomicBool::new(false),
            state: Mutex::new(ControllerState::Constructed),
        })
    }

    /// Controller with `thread_count` workers and default settings otherwise
    pub fn with_threads(thread_count: usize) -> PhysResult<Self> {
        Self::new(&ThreadPoolConfig::with_workers(thread_count))
    }

    fn lock_objects(&self) -> MutexGuard<'_, ObjectTable> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking `target`
    pub fn add_scene_object(&self, target: &Arc<SceneObject>, params: &PhysicsParams) -> PhysResult<()> {
        let object = Arc::new(Mutex::new(PhysicsObject::new(target, params)));

        let mut objects = self.lock_objects();
        objects.push(target.id(), object)?;
        debug!("Tracking {} ({} objects)", target.name(), objects.len());
        Ok(())
    }

    /// Stop tracking `target`. Unknown objects are logged and ignored.
    pub fn remove_scene_object(&self, target: &Arc<SceneObject>) -> PhysResult<()> {
        if self.lock_objects().remove(&target.id()) {
            debug!("Stopped tracking {}", target.name());
        } else {
            warn!("Remove of untracked scene object {}", target.name());
        }
        Ok(())
    }

    pub fn subscribe<S>(&self, name: impl Into<String>, subscriber: S) -> PhysResult<()>
    where
        S: CollisionSubscriber + 'static,
    {
        self.subscribers.subscribe(name, subscriber);
        Ok(())
    }

    /// Unknown names are logged and ignored
    pub fn unsubscribe(&self, name: &str) -> PhysResult<()> {
        self.subscribers.unsubscribe(name);
        Ok(())
    }

    /// Deliver `report` to every subscriber on the calling thread
    pub fn notify_subscribers(&self, report: &PhysicsReport) {
        let notified = self.subscribers.notify(report);
        debug!("Delivered report for {} to {} subscribers", report.parent.name(), notified);
    }

    /// One tick of the POSITION stage
    pub fn update(&self) -> PhysResult<()> {
        self.run_stage(PipelineStage::Position)
    }

    /// Fan `stage` out over every tracked object and wait for all of it.
    ///
    /// Does nothing once shutdown has been requested. The object list stays
    /// locked for the whole stage, so registration blocks until it returns.
    pub fn run_stage(&self, stage: PipelineStage) -> PhysResult<()> {
        let objects = self.lock_objects();

        if self.shutdown.load(Ordering::Acquire) {
            debug!("Skipping {:?} tick: controller is shutting down", stage);
            return Ok(());
        }

        {
            let mut state = self.lock_state();
            if *state == ControllerState::Constructed {
                *state = ControllerState::Running;
            }
        }

        let items = objects.list.iter().map(|object| {
            object.lock().unwrap_or_else(PoisonError::into_inner).work_type = stage;
            WorkItem::Stage {
                stage,
                object: Arc::clone(object),
            }
        });
        let pushed = self.pool.queue().push_batch(items);

        self.pool.queue().wait_idle();
        debug!("{:?} stage completed for {} objects", stage, pushed);

        let faults = self.pool.drain_faults();
        if !faults.is_empty() {
            error!("{:?} stage rejected by workers for {} objects", stage, faults.len());
            return Err(PhysicsError::StageNotImplemented {
                stage,
                faults: faults.len(),
            });
        }
        Ok(())
    }

    /// Overwrite the velocity of the first live object named `name`,
    /// optionally running a tick straight away.
    ///
    /// Names are not indexed, so this scans the tracked objects in order.
    pub fn set_velocity(&self, name: &str, velocity: Vec3, flush_immediately: bool) -> PhysResult<()> {
        {
            let objects = self.lock_objects();
            let mut object = objects
                .list
                .iter()
                .map(|o| o.lock().unwrap_or_else(PoisonError::into_inner))
                .find(|o| o.target_name().as_deref() == Some(name))
                .ok_or_else(|| PhysicsError::ObjectNotFound { name: name.to_string() })?;
            object.velocity = velocity;
        }

        if flush_immediately {
            self.update()?;
        }
        Ok(())
    }

    pub fn set_acceleration(&self, target: &Arc<SceneObject>, acceleration: Vec3) -> PhysResult<()> {
        self.with_object(target, |object| object.acceleration = acceleration)
    }

    /// Gravity hook for the game layer: adds `gravity` to the acceleration
    /// of every object that obeys gravity. Returns how many were affected.
    pub fn apply_gravity(&self, gravity: Vec3) -> usize {
        let objects = self.lock_objects();
        let mut affected = 0;
        for object in objects.list.iter() {
            let mut object = object.lock().unwrap_or_else(PoisonError::into_inner);
            if object.obey_gravity {
                object.acceleration += gravity;
                affected += 1;
            }
        }
        affected
    }

    fn with_object<F>(&self, target: &Arc<SceneObject>, f: F) -> PhysResult<()>
    where
        F: FnOnce(&mut PhysicsObject),
    {
        let objects = self.lock_objects();
        let object = objects
            .get(&target.id())
            .ok_or_else(|| PhysicsError::ObjectNotFound { name: target.name().to_string() })?;
        f(&mut *object.lock().unwrap_or_else(PoisonError::into_inner));
        Ok(())
    }

    pub fn state_of(&self, target: &Arc<SceneObject>) -> Option<KinematicState> {
        let objects = self.lock_objects();
        let state = objects
            .get(&target.id())
            .map(|o| o.lock().unwrap_or_else(PoisonError::into_inner).state());
        state
    }

    /// Copies of the tracked objects in registration order
    pub fn objects(&self) -> Vec<PhysicsObject> {
        self.lock_objects()
            .list
            .iter()
            .map(|o| o.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.lock_objects().len()
    }

    /// Test every pair in `scene` for current overlap and report each object
    /// that touches something. Returns the number of reports delivered.
    pub fn publish_collisions(&self, scene: &[Arc<SceneObject>]) -> PhysResult<usize> {
        let reports = sweep_collisions(self.sweep_pool()?, scene);
        for report in &reports {
            self.notify_subscribers(report);
        }
        Ok(reports.len())
    }

    fn sweep_pool(&self) -> PhysResult<&rayon::ThreadPool> {
        if let Some(pool) = self.sweep_pool.get() {
            return Ok(pool);
        }

        let pool = self
            .config
            .build_sweep_pool()
            .map_err(|e| PhysicsError::WorkerSpawn { reason: e.to_string() })?;
        debug!("Sweep pool ready: {} threads", pool.current_num_threads());
        // A concurrent first sweep may have won; keep its pool
        Ok(self.sweep_pool.get_or_init(|| pool))
    }

    /// Refuse further ticks. A tick already running finishes normally.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            info!("Physics controller shutting down");
        }
        let mut state = self.lock_state();
        if *state != ControllerState::Stopped {
            *state = ControllerState::ShuttingDown;
        }
    }

    /// Shut down and join every worker. Idempotent; also run on drop.
    pub fn stop(&self) {
        self.shutdown();
        // Waits out any tick in flight before the workers go away
        let _objects = self.lock_objects();
        self.pool.shutdown_and_join();
        *self.lock_state() = ControllerState::Stopped;
    }

    pub fn state(&self) -> ControllerState {
        *self.lock_state()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    pub fn thread_count(&self) -> usize {
        self.pool.thread_count()
    }

    pub fn free_workers(&self) -> usize {
        self.pool.queue().free_workers()
    }

    pub fn queue_len(&self) -> usize {
        self.pool.queue().len()
    }

    /// Workers not yet joined
    pub fn live_workers(&self) -> usize {
        self.pool.live_threads()
    }
}

impl Drop for PhysicsController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine() {
        let controller = PhysicsController::with_threads(2).unwrap();
        assert_eq!(controller.state(), ControllerState::Constructed);

        controller.update().unwrap();
        assert_eq!(controller.state(), ControllerState::Running);

        controller.shutdown();
        controller.shutdown();
        assert_eq!(controller.state(), ControllerState::ShuttingDown);

        controller.stop();
        assert_eq!(controller.state(), ControllerState::Stopped);
        assert_eq!(controller.live_workers(), 0);

        // Ticks after stop are accepted and ignored
        controller.update().unwrap();
        controller.shutdown();
        assert_eq!(controller.state(), ControllerState::Stopped);
    }

    #[test]
    fn test_unimplemented_stage_is_reported() {
        let controller = PhysicsController::with_threads(2).unwrap();
        for name in ["a", "b", "c"] {
            controller
                .add_scene_object(&SceneObject::new(name), &PhysicsParams::default())
                .unwrap();
        }

        let result = controller.run_stage(PipelineStage::Collision);
        assert!(matches!(
            result,
            Err(PhysicsError::StageNotImplemented { stage: PipelineStage::Collision, faults: 3 })
        ));
        // The barrier still completed
        assert_eq!(controller.free_workers(), 2);
        assert_eq!(controller.queue_len(), 0);
        // The next tick starts clean
        controller.update().unwrap();
    }

    #[test]
    fn test_sweep_pool_is_built_on_first_sweep() {
        let controller = PhysicsController::with_threads(1).unwrap();
        assert!(controller.sweep_pool.get().is_none());

        controller.update().unwrap();
        assert!(controller.sweep_pool.get().is_none());

        let cube = SceneObject::with_mesh("cube", &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(controller.publish_collisions(&[cube]).unwrap(), 0);
        assert!(controller.sweep_pool.get().is_some());
    }

    #[test]
    fn test_lookups_follow_removal() {
        let controller = PhysicsController::with_threads(2).unwrap();
        let targets: Vec<Arc<SceneObject>> =
            (0..5).map(|i| SceneObject::new(format!("t{}", i))).collect();
        for (i, target) in targets.iter().enumerate() {
            let params = PhysicsParams {
                position: Vec3::new(i as f32, 0.0, 0.0),
                ..PhysicsParams::default()
            };
            controller.add_scene_object(target, &params).unwrap();
        }

        controller.remove_scene_object(&targets[1]).unwrap();
        assert!(controller.state_of(&targets[1]).is_none());
        for i in [0, 2, 3, 4] {
            let state = controller.state_of(&targets[i]).unwrap();
            assert_eq!(state.position, Vec3::new(i as f32, 0.0, 0.0));
        }

        controller.set_acceleration(&targets[4], Vec3::Y).unwrap();
        controller.update().unwrap();
        assert_eq!(controller.state_of(&targets[4]).unwrap().position, Vec3::new(4.0, 1.0, 0.0));
        assert_eq!(controller.state_of(&targets[3]).unwrap().position, Vec3::new(3.0, 0.0, 0.0));
        assert!(matches!(
            controller.set_acceleration(&targets[1], Vec3::Y),
            Err(PhysicsError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn test_double_registration_resolves_to_first() {
        let controller = PhysicsController::with_threads(1).unwrap();
        let target = SceneObject::new("twice");
        let second = PhysicsParams {
            position: Vec3::splat(9.0),
            ..PhysicsParams::default()
        };
        controller.add_scene_object(&target, &PhysicsParams::default()).unwrap();
        controller.add_scene_object(&target, &second).unwrap();
        assert_eq!(controller.state_of(&target).unwrap().position, Vec3::ZERO);

        controller.remove_scene_object(&target).unwrap();
        assert_eq!(controller.object_count(), 1);
        assert_eq!(controller.state_of(&target).unwrap().position, Vec3::splat(9.0));
    }
}
