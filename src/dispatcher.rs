//! The Event Dispatcher: a bounded worker pool that delivers
//! [`MappingChangeEvent`]s to every subscribed listener.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::{EngineError, EngineResult};
use crate::event::{MappingChangeEvent, MappingChangeListener};
use crate::id::Id;
use crate::internal::DisposeBag;

/// Default worker pool size, used when [`crate::EngineSettings`] doesn't
/// override it.
pub const DEFAULT_WORKERS: usize = 16;

/// Delivers mapping change events on a fixed pool of worker threads.
///
/// Events for the same [`Id`] are always routed to the same worker (a
/// consistent hash of the id selects the lane), so delivery order for any
/// one mapping matches the order `dispatch()` was called in — across
/// different mappings, no ordering is promised.
pub struct EventDispatcher {
    lanes: Mutex<Vec<Sender<MappingChangeEvent>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    listeners: Arc<Mutex<Vec<Arc<dyn MappingChangeListener>>>>,
    accepting: AtomicBool,
    shutdown_hooks: Mutex<DisposeBag>,
}

impl EventDispatcher {
    /// Spawns `worker_count` threads (minimum 1), each with its own lane.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let listeners: Arc<Mutex<Vec<Arc<dyn MappingChangeListener>>>> = Arc::new(Mutex::new(Vec::new()));
        let mut lanes = Vec::with_capacity(worker_count);
        let mut workers = Vec::with_capacity(worker_count);

        for lane_idx in 0..worker_count {
            let (tx, rx) = mpsc::channel::<MappingChangeEvent>();
            let listeners = listeners.clone();
            let handle = thread::Builder::new()
                .name(format!("confmap-dispatch-{lane_idx}"))
                .spawn(move || {
                    for event in rx {
                        let listeners = listeners.lock().expect("dispatcher listeners poisoned");
                        for listener in listeners.iter() {
                            listener.on_mapping_change(&event);
                        }
                    }
                })
                .expect("failed to spawn event dispatcher worker");
            lanes.push(tx);
            workers.push(handle);
        }

        Self {
            lanes: Mutex::new(lanes),
            workers: Mutex::new(workers),
            listeners,
            accepting: AtomicBool::new(true),
            shutdown_hooks: Mutex::new(DisposeBag::default()),
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn MappingChangeListener>) {
        self.listeners.lock().expect("dispatcher listeners poisoned").push(listener);
    }

    /// Registers a hook to run during `shutdown()`, after every queued event
    /// has drained but before the worker threads are joined. Hooks run in
    /// reverse registration order.
    pub fn on_shutdown(&self, hook: impl FnOnce() + Send + 'static) {
        self.shutdown_hooks.lock().expect("dispatcher shutdown hooks poisoned").push(Box::new(hook));
    }

    /// Enqueues `event` for delivery. Returns [`EngineError::ClosedService`]
    /// if the dispatcher has been shut down.
    pub fn dispatch(&self, event: MappingChangeEvent) -> EngineResult<()> {
        let lanes = self.lanes.lock().expect("dispatcher lanes poisoned");
        if !self.accepting.load(Ordering::Acquire) || lanes.is_empty() {
            return Err(EngineError::ClosedService);
        }
        let lane = lane_for(event.id(), lanes.len());
        lanes[lane].send(event).map_err(|_| EngineError::ClosedService)
    }

    /// Number of active worker lanes; `0` after `shutdown()`.
    pub fn worker_count(&self) -> usize {
        self.lanes.lock().expect("dispatcher lanes poisoned").len()
    }

    /// Stops accepting new events, drains every queued event, joins every
    /// worker thread, then runs registered shutdown hooks. Idempotent:
    /// calling this more than once is a no-op after the first call.
    pub fn shutdown(&self) {
        if !self.accepting.swap(false, Ordering::AcqRel) {
            return;
        }
        // Dropping the lanes closes each channel's sending half; every
        // worker's `for event in rx` loop then exits once drained.
        self.lanes.lock().expect("dispatcher lanes poisoned").clear();

        let mut workers = self.workers.lock().expect("dispatcher workers poisoned");
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
        drop(workers);

        self.shutdown_hooks.lock().expect("dispatcher shutdown hooks poisoned").run_all_reverse();
    }
}

fn lane_for(id: &Id, lane_count: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() as usize) % lane_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MappingChangeKind;
    use crate::resolver::MappingResolver;
    use crate::registry::ProviderRegistry;
    use crate::config::AbstractConfigStore;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct Counting(Arc<AtomicUsize>);
    impl MappingChangeListener for Counting {
        fn on_mapping_change(&self, _event: &MappingChangeEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn dummy_resolver(name: &str) -> Arc<MappingResolver> {
        Arc::new(MappingResolver::new(
            Id::new(name),
            Arc::new(ProviderRegistry::new()),
            Arc::new(AbstractConfigStore::new()),
        ))
    }

    #[test]
    fn dispatched_events_reach_subscribed_listeners() {
        let dispatcher = EventDispatcher::new(2);
        let count = Arc::new(AtomicUsize::new(0));
        dispatcher.subscribe(Arc::new(Counting(count.clone())));

        let event = MappingChangeEvent::new(Id::new("a"), MappingChangeKind::Created, dummy_resolver("a"));
        dispatcher.dispatch(event).unwrap();

        // worker threads are async relative to the caller; give them a beat
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        dispatcher.shutdown();
    }

    #[test]
    fn dispatch_after_shutdown_is_rejected() {
        let dispatcher = EventDispatcher::new(1);
        dispatcher.shutdown();
        let event = MappingChangeEvent::new(Id::new("a"), MappingChangeKind::Created, dummy_resolver("a"));
        assert!(matches!(dispatcher.dispatch(event), Err(EngineError::ClosedService)));
    }

    #[test]
    fn same_id_always_routes_to_same_lane() {
        let dispatcher = EventDispatcher::new(8);
        let lane_a = lane_for(&Id::new("stable-id"), dispatcher.worker_count());
        let lane_b = lane_for(&Id::new("stable-id"), dispatcher.worker_count());
        assert_eq!(lane_a, lane_b);
        dispatcher.shutdown();
    }
}
