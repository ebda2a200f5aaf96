//! The Mapping Resolver: one mapping's state machine.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::{AbstractConfigStore, ConfigAccessor, ConfigChangeEvent};
use crate::dependency::DependencySet;
use crate::error::{EngineError, EngineResult, ProvideError};
use crate::event::MappingChangeKind;
use crate::id::Id;
use crate::observer::Observers;
use crate::registry::ProviderRegistry;
use crate::value::PropertyMap;

struct Inner {
    /// The last successfully merged property set, or `None` if the mapping
    /// has never resolved or is currently `REMOVED`.
    properties: Option<PropertyMap>,
    /// Config edges recorded on the last `recompute()`, regardless of
    /// whether it succeeded — a currently-failing mapping still needs to
    /// notice when its dependencies change, so it can try again.
    dependencies: DependencySet,
    /// The most recent provider failure, surfaced by `resolve()` while the
    /// mapping has no properties.
    cached_error: Option<ProvideError>,
}

/// Tracks one mapping's resolved properties against the providers bound to
/// serve it, recomputing on demand and reporting `CREATED`/`UPDATED`/`REMOVED`
/// transitions to its caller (the [`crate::service::MappingService`]).
///
/// All mutable state lives behind a single mutex — `recompute()` runs the
/// (possibly slow, provider-supplied) merge work outside the lock and only
/// takes it to read the prior value and commit the new one, so one mapping's
/// recompute never blocks another's `resolve()` for any longer than a memcpy.
pub struct MappingResolver {
    id: Id,
    registry: Arc<ProviderRegistry>,
    store: Arc<AbstractConfigStore>,
    state: Mutex<Inner>,
    observers: Arc<Observers>,
}

impl MappingResolver {
    pub fn new(id: Id, registry: Arc<ProviderRegistry>, store: Arc<AbstractConfigStore>) -> Self {
        Self::with_observers(id, registry, store, Arc::new(Observers::new()))
    }

    pub fn with_observers(id: Id, registry: Arc<ProviderRegistry>, store: Arc<AbstractConfigStore>, observers: Arc<Observers>) -> Self {
        Self {
            id,
            registry,
            store,
            state: Mutex::new(Inner { properties: None, dependencies: DependencySet::new(), cached_error: None }),
            observers,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Returns a deep copy of the resolved properties.
    ///
    /// If a failure is cached, `recompute()` runs once more (to produce a
    /// fresh error, in case the underlying cause has since cleared) and the
    /// resulting error is propagated instead of a map. A mapping with no
    /// properties and no cached error (the `REMOVED` state) resolves to an
    /// empty map rather than an error.
    pub fn resolve(&self) -> EngineResult<PropertyMap> {
        let has_cached_error = self.state.lock().expect("resolver poisoned").cached_error.is_some();
        if has_cached_error {
            self.recompute();
        }

        let state = self.state.lock().expect("resolver poisoned");
        match (&state.cached_error, &state.properties) {
            (Some(err), _) => Err(EngineError::MappingError(err.to_string())),
            (None, Some(props)) => Ok(props.clone()),
            (None, None) => Ok(PropertyMap::new()),
        }
    }

    pub fn has_properties(&self) -> bool {
        self.state.lock().expect("resolver poisoned").properties.is_some()
    }

    /// One-line operational summary: id, whether it currently resolves, and
    /// its tracked dependency edges.
    #[cfg(feature = "diagnostics")]
    pub fn debug_state(&self) -> String {
        let state = self.state.lock().expect("resolver poisoned");
        format!(
            "{} properties={} error={:?} deps={:?}",
            self.id,
            state.properties.as_ref().map(|p| p.len()).unwrap_or(0),
            state.cached_error.as_ref().map(|e| e.to_string()),
            state.dependencies,
        )
    }

    /// Whether any entity touched by this mutation was recorded as a
    /// dependency on this resolver's last recomputation.
    pub fn is_affected_by(&self, event: &ConfigChangeEvent) -> bool {
        let state = self.state.lock().expect("resolver poisoned");
        event.touched().any(|entity| state.dependencies.tracks(&entity.ty, entity.instance.as_deref()))
    }

    /// Re-derives this mapping's properties from every currently-bound
    /// provider willing to serve it:
    ///
    /// 1. Snapshot providers accepting this id, ascending by rank.
    /// 2. Call each through a fresh [`ConfigAccessor`], merging successes
    ///    (higher rank overrides on key collision). A non-partial provider
    ///    counts as a "complete" attempt whether it succeeds or raises
    ///    `MappingError`; a non-partial success also clears any
    ///    `MappingError` recorded so far this round. `Unavailable` from any
    ///    provider stops the round immediately and forces the mapping dead.
    /// 3. A mapping is alive only if at least one accepting, non-partial
    ///    provider reached a complete attempt (success or `MappingError`)
    ///    this round.
    /// 4. Replace the resolver's dependency set with what was just recorded
    ///    — this is also how a bind/unbind/rebind's effect on this mapping's
    ///    dependencies gets picked up, since the caller always triggers a
    ///    recompute after changing the registry.
    /// 5. Compare the merged result and error-presence to the previous
    ///    round; identical on both produces no event (no spurious
    ///    notifications).
    /// 6. Cache the round's `MappingError`, if any, for `resolve()` to
    ///    surface ahead of a stale (but alive) property map.
    pub fn recompute(&self) -> Option<MappingChangeKind> {
        self.observers.recomputing(&self.id);
        let started = Instant::now();
        let result = self.recompute_inner();
        self.observers.recomputed(&self.id, started.elapsed());
        if result.is_none() && !self.has_properties() {
            if let Some(err) = &self.state.lock().expect("resolver poisoned").cached_error {
                self.observers.recompute_failed(&self.id, &err.to_string());
            }
        }
        result
    }

    fn recompute_inner(&self) -> Option<MappingChangeKind> {
        let providers = self.registry.providers_for(&self.id);

        let mut merged = PropertyMap::new();
        let mut had_complete_provider = false;
        let mut deps = DependencySet::new();
        let mut last_error: Option<ProvideError> = None;

        for provider in &providers {
            let accessor = ConfigAccessor::new(&self.store);
            let result = provider.provide(&self.id, &accessor);
            deps.merge(accessor.into_dependencies());

            match result {
                Ok(props) => {
                    merged.extend(props);
                    if !provider.is_partial() {
                        had_complete_provider = true;
                        last_error = None;
                    }
                }
                Err(ProvideError::Unavailable) => {
                    had_complete_provider = false;
                    break;
                }
                Err(e) => {
                    if last_error.is_none() {
                        last_error = Some(e);
                    }
                    if !provider.is_partial() {
                        had_complete_provider = true;
                    }
                }
            }
        }

        let mut state = self.state.lock().expect("resolver poisoned");
        state.dependencies = deps;
        let was_removed = state.properties.is_none();

        if !had_complete_provider {
            state.cached_error = None;
            return if state.properties.take().is_some() { Some(MappingChangeKind::Removed) } else { None };
        }

        let had_error_before = state.cached_error.is_some();
        let has_error_now = last_error.is_some();
        let map_unchanged = state.properties.as_ref() == Some(&merged);

        state.cached_error = last_error;
        state.properties = Some(merged);

        if map_unchanged && had_error_before == has_error_now {
            return None;
        }
        Some(if was_removed { MappingChangeKind::Created } else { MappingChangeKind::Updated })
    }
}
