//! The Mapping Service: directory routing over resolvers, providers, and the
//! config store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{AbstractConfigStore, ConfigChangeEvent, ConfigChangeListener};
use crate::dispatcher::EventDispatcher;
use crate::error::{EngineError, EngineResult};
use crate::event::{MappingChangeEvent, MappingChangeListener};
use crate::id::Id;
use crate::observer::Observers;
use crate::provider::MappingProvider;
use crate::registry::ProviderRegistry;
use crate::resolver::MappingResolver;

/// Binds the Abstract Config Store, Provider Registry, and Event Dispatcher
/// together behind one directory of live [`MappingResolver`]s.
///
/// This is the engine's main entry point: providers bind and unbind through
/// it, mappings are looked up through it, and config store mutations arrive
/// through it (it registers itself as a [`ConfigChangeListener`]) and get
/// routed to exactly the resolvers that depend on what changed.
pub struct MappingService {
    registry: Arc<ProviderRegistry>,
    store: Arc<AbstractConfigStore>,
    dispatcher: Arc<EventDispatcher>,
    observers: Arc<Observers>,
    resolvers: Mutex<HashMap<Id, Arc<MappingResolver>>>,
    closed: AtomicBool,
}

impl MappingService {
    pub fn new(registry: Arc<ProviderRegistry>, store: Arc<AbstractConfigStore>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self::with_observers(registry, store, dispatcher, Arc::new(Observers::new()))
    }

    /// Like [`MappingService::new`], but attaches `observers` to every
    /// resolver this service creates — the only way to get a
    /// [`crate::observer::LoggingObserver`] or [`crate::metrics::EngineMetrics`]
    /// wired into the running engine rather than exercised only in isolation.
    pub fn with_observers(
        registry: Arc<ProviderRegistry>,
        store: Arc<AbstractConfigStore>,
        dispatcher: Arc<EventDispatcher>,
        observers: Arc<Observers>,
    ) -> Self {
        Self { registry, store, dispatcher, observers, resolvers: Mutex::new(HashMap::new()), closed: AtomicBool::new(false) }
    }

    /// Looks up (creating on first use) the resolver for `id`, running its
    /// initial recomputation and dispatching a `CREATED` event if it
    /// immediately resolves. Returns `None` if the resulting resolver is
    /// `REMOVED` — the id is still tracked internally so a later dependency
    /// change can bring it to life, but there is no mapping to hand back yet.
    pub fn get_mapping(&self, id: &Id) -> EngineResult<Option<Arc<MappingResolver>>> {
        self.ensure_open()?;

        if let Some(existing) = self.resolvers.lock().expect("service resolvers poisoned").get(id) {
            return Ok(existing.has_properties().then(|| existing.clone()));
        }

        let resolver = Arc::new(MappingResolver::with_observers(
            id.clone(),
            self.registry.clone(),
            self.store.clone(),
            self.observers.clone(),
        ));
        self.resolvers.lock().expect("service resolvers poisoned").insert(id.clone(), resolver.clone());

        if let Some(kind) = resolver.recompute() {
            let _ = self.dispatcher.dispatch(MappingChangeEvent::new(id.clone(), kind, resolver.clone()));
        }
        Ok(resolver.has_properties().then(|| resolver))
    }

    /// Drops `id` from the directory without affecting the provider registry.
    /// A subsequent `get_mapping` for the same id starts fresh.
    pub fn forget_mapping(&self, id: &Id) {
        self.resolvers.lock().expect("service resolvers poisoned").remove(id);
    }

    /// Binds a provider and recomputes every tracked mapping, dispatching
    /// whatever transitions result.
    pub fn bind_provider(&self, provider: Arc<dyn MappingProvider>) -> EngineResult<()> {
        self.ensure_open()?;
        self.registry.bind(provider);
        self.recompute_all();
        Ok(())
    }

    /// Unbinds a provider and recomputes every tracked mapping.
    pub fn unbind_provider(&self, provider: &Arc<dyn MappingProvider>) -> EngineResult<bool> {
        self.ensure_open()?;
        let removed = self.registry.unbind(provider);
        if removed {
            self.recompute_all();
        }
        Ok(removed)
    }

    /// Replaces `old` with `new` in a single logical step and recomputes
    /// every tracked mapping.
    pub fn rebind_provider(&self, old: &Arc<dyn MappingProvider>, new: Arc<dyn MappingProvider>) -> EngineResult<()> {
        self.ensure_open()?;
        self.registry.rebind(old, new);
        self.recompute_all();
        Ok(())
    }

    pub fn subscribe(&self, listener: Arc<dyn MappingChangeListener>) {
        self.dispatcher.subscribe(listener);
    }

    /// Dumps every tracked resolver's id, property count, cached error, and
    /// dependency edges, one per line — for operational debugging only.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        self.resolvers
            .lock()
            .expect("service resolvers poisoned")
            .values()
            .map(|r| r.debug_state())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.dispatcher.shutdown();
    }

    fn ensure_open(&self) -> EngineResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(EngineError::ClosedService)
        } else {
            Ok(())
        }
    }

    fn recompute_all(&self) {
        let snapshot: Vec<(Id, Arc<MappingResolver>)> = self
            .resolvers
            .lock()
            .expect("service resolvers poisoned")
            .iter()
            .map(|(id, resolver)| (id.clone(), resolver.clone()))
            .collect();

        for (id, resolver) in snapshot {
            if let Some(kind) = resolver.recompute() {
                let _ = self.dispatcher.dispatch(MappingChangeEvent::new(id, kind, resolver));
            }
        }
    }
}

impl ConfigChangeListener for MappingService {
    fn on_config_change(&self, event: &ConfigChangeEvent) {
        let snapshot: Vec<(Id, Arc<MappingResolver>)> = self
            .resolvers
            .lock()
            .expect("service resolvers poisoned")
            .iter()
            .map(|(id, resolver)| (id.clone(), resolver.clone()))
            .collect();

        for (id, resolver) in snapshot {
            if resolver.is_affected_by(event) {
                if let Some(kind) = resolver.recompute() {
                    let _ = self.dispatcher.dispatch(MappingChangeEvent::new(id, kind, resolver));
                }
            }
        }
    }
}
