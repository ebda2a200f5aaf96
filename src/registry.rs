//! The Provider Registry: a rank-ordered set of bound [`MappingProvider`]s.

use std::sync::{Arc, Mutex};

use crate::id::Id;
use crate::provider::MappingProvider;

/// Holds every currently-bound provider, kept sorted ascending by
/// [`MappingProvider::rank`]. Providers of equal rank keep their relative
/// bind order — a stable insertion position, not a sort run after the fact.
pub struct ProviderRegistry {
    providers: Mutex<Vec<Arc<dyn MappingProvider>>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { providers: Mutex::new(Vec::new()) }
    }

    /// Binds a provider, inserting it after every existing same-or-lower
    /// rank provider so ties are broken by bind order. Binding the same
    /// provider (by reference identity) a second time is a no-op — the
    /// registry never holds the same instance twice.
    pub fn bind(&self, provider: Arc<dyn MappingProvider>) {
        let mut providers = self.providers.lock().expect("provider registry poisoned");
        if providers.iter().any(|p| Arc::ptr_eq(p, &provider)) {
            return;
        }
        let pos = providers.iter().position(|p| p.rank() > provider.rank()).unwrap_or(providers.len());
        providers.insert(pos, provider);
    }

    /// Unbinds a provider by reference identity. Returns `false` if it was
    /// never bound (or was already unbound).
    pub fn unbind(&self, provider: &Arc<dyn MappingProvider>) -> bool {
        let mut providers = self.providers.lock().expect("provider registry poisoned");
        match providers.iter().position(|p| Arc::ptr_eq(p, provider)) {
            Some(pos) => {
                providers.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Unbinds `old` and binds `new` as a single logical step. `new` is
    /// inserted fresh (bind-order tiebreaks restart for it), which is what
    /// lets callers distinguish an in-place rebind from an unrelated
    /// unbind+bind pair by checking pointer identity before and after.
    pub fn rebind(&self, old: &Arc<dyn MappingProvider>, new: Arc<dyn MappingProvider>) {
        self.unbind(old);
        self.bind(new);
    }

    /// Returns every bound provider willing to serve `id`, in rank order.
    pub fn providers_for(&self, id: &Id) -> Vec<Arc<dyn MappingProvider>> {
        self.providers
            .lock()
            .expect("provider registry poisoned")
            .iter()
            .filter(|p| p.can_provide_for(id))
            .cloned()
            .collect()
    }

    /// Returns every bound provider, in rank order, regardless of what they
    /// accept. Used by the Mapping Service for initial wildcard discovery.
    pub fn snapshot(&self) -> Vec<Arc<dyn MappingProvider>> {
        self.providers.lock().expect("provider registry poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.providers.lock().expect("provider registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigAccessor;
    use crate::error::ProvideError;
    use crate::value::PropertyMap;

    struct Stub { rank: i32, partial: bool }
    impl MappingProvider for Stub {
        fn rank(&self) -> i32 { self.rank }
        fn is_partial(&self) -> bool { self.partial }
        fn can_provide_for(&self, _id: &Id) -> bool { true }
        fn provide(&self, _id: &Id, _config: &ConfigAccessor) -> Result<PropertyMap, ProvideError> {
            Ok(PropertyMap::new())
        }
    }

    #[test]
    fn bind_orders_by_rank_ascending() {
        let registry = ProviderRegistry::new();
        registry.bind(Arc::new(Stub { rank: 20, partial: false }));
        registry.bind(Arc::new(Stub { rank: 5, partial: false }));
        registry.bind(Arc::new(Stub { rank: 10, partial: false }));

        let ranks: Vec<i32> = registry.providers_for(&Id::new("x")).iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![5, 10, 20]);
    }

    #[test]
    fn equal_rank_preserves_bind_order() {
        let registry = ProviderRegistry::new();
        let first = Arc::new(Stub { rank: 10, partial: false });
        let second = Arc::new(Stub { rank: 10, partial: false });
        registry.bind(first.clone() as Arc<dyn MappingProvider>);
        registry.bind(second.clone() as Arc<dyn MappingProvider>);

        let providers = registry.providers_for(&Id::new("x"));
        assert!(Arc::ptr_eq(&providers[0], &(first as Arc<dyn MappingProvider>)));
        assert!(Arc::ptr_eq(&providers[1], &(second as Arc<dyn MappingProvider>)));
    }

    #[test]
    fn binding_the_same_provider_twice_does_not_duplicate_it() {
        let registry = ProviderRegistry::new();
        let provider: Arc<dyn MappingProvider> = Arc::new(Stub { rank: 1, partial: false });
        registry.bind(provider.clone());
        registry.bind(provider.clone());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unbind_removes_exact_instance_only() {
        let registry = ProviderRegistry::new();
        let a: Arc<dyn MappingProvider> = Arc::new(Stub { rank: 1, partial: false });
        let b: Arc<dyn MappingProvider> = Arc::new(Stub { rank: 1, partial: false });
        registry.bind(a.clone());
        registry.bind(b.clone());

        assert!(registry.unbind(&a));
        assert_eq!(registry.len(), 1);
        assert!(!registry.unbind(&a));
    }
}
