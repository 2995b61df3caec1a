use crate::world::events::PhysicsReport;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Receiver of collision reports
pub trait CollisionSubscriber: Send + Sync {
    fn on_report(&self, report: &PhysicsReport);
}

impl<F> CollisionSubscriber for F
where
    F: Fn(&PhysicsReport) + Send + Sync,
{
    fn on_report(&self, report: &PhysicsReport) {
        self(report)
    }
}

struct Subscription {
    name: String,
    subscriber: Box<dyn CollisionSubscriber>,
}

/// Named subscribers notified in registration order.
///
/// Names are not deduplicated. Callbacks run with the registry locked, so a
/// callback must not subscribe or unsubscribe on the same registry.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<Vec<Subscription>>,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe<S>(&self, name: impl Into<String>, subscriber: S)
    where
        S: CollisionSubscriber + 'static,
    {
        let name = name.into();
        debug!("Subscribing {} to collision reports", name);
        self.lock().push(Subscription {
            name,
            subscriber: Box::new(subscriber),
        });
    }

    /// Remove the earliest subscription with this name.
    /// Returns false (and logs) when nothing matched.
    pub fn unsubscribe(&self, name: &str) -> bool {
        let mut subscribers = self.lock();
        match subscribers.iter().position(|s| s.name == name) {
            Some(index) => {
                subscribers.remove(index);
                debug!("Unsubscribed {} from collision reports", name);
                true
            }
            None => {
                warn!("Unsubscribe of unknown subscriber {}", name);
                false
            }
        }
    }

    /// Invoke every subscriber once, on the calling thread. Returns how many ran.
    pub fn notify(&self, report: &PhysicsReport) -> usize {
        let subscribers = self.lock();
        for subscription in subscribers.iter() {
            subscription.subscriber.on_report(report);
        }
        subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|s| s.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::scene::SceneObject;
    use std::sync::Arc;

    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
        tag: &'static str,
    }

    impl CollisionSubscriber for Recorder {
        fn on_report(&self, _report: &PhysicsReport) {
            self.seen.lock().unwrap().push(self.tag.to_string());
        }
    }

    #[test]
    fn test_notifies_in_registration_order() {
        let registry = SubscriberRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            registry.subscribe(tag, Recorder { seen: Arc::clone(&seen), tag });
        }

        let report = PhysicsReport::new(SceneObject::new("player"), Vec::new());
        assert_eq!(registry.notify(&report), 3);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_removes_first_match_only() {
        let registry = SubscriberRegistry::new();
        registry.subscribe("dup", |_: &PhysicsReport| {});
        registry.subscribe("other", |_: &PhysicsReport| {});
        registry.subscribe("dup", |_: &PhysicsReport| {});

        assert!(registry.unsubscribe("dup"));
        assert_eq!(registry.names(), vec!["other", "dup"]);
        assert!(!registry.unsubscribe("missing"));
        assert_eq!(registry.len(), 2);
    }
}
