//! The Provider Registry's plugin contract: [`MappingProvider`].

use crate::config::ConfigAccessor;
use crate::error::ProvideError;
use crate::id::Id;
use crate::value::PropertyMap;

/// Something that can contribute properties to a mapping.
///
/// A mapping's resolved properties are the merge of every provider that
/// [`MappingProvider::can_provide_for`] accepts for that mapping's [`Id`],
/// ranked lowest-first, with higher-rank providers' properties overriding
/// lower-rank ones on key collision.
///
/// Implementations are registered with a [`crate::registry::ProviderRegistry`]
/// as `Arc<dyn MappingProvider>` and must tolerate being called concurrently
/// from different worker threads for different mappings.
pub trait MappingProvider: Send + Sync {
    /// Ranks this provider relative to others. Lower ranks are applied first;
    /// ties are broken by bind order (earlier bind wins the tie, i.e. is
    /// applied first and so is overridden by a later-bound same-rank peer).
    fn rank(&self) -> i32;

    /// Whether this provider alone is sufficient to keep a mapping alive.
    ///
    /// A mapping with no provider accepting it, or where every accepting
    /// provider is partial and none of them currently succeed, moves to
    /// `REMOVED`. At least one non-partial, successful provider is required
    /// to keep a mapping in `CREATED`/`UPDATED`.
    fn is_partial(&self) -> bool;

    /// Whether this provider is willing to contribute to `id`.
    fn can_provide_for(&self, id: &Id) -> bool;

    /// Computes this provider's contribution to `id`'s properties.
    ///
    /// Config reads must go through `config`, not around it — that's what
    /// lets the calling resolver learn this provider's dependencies without
    /// the provider itself tracking anything.
    fn provide(&self, id: &Id, config: &ConfigAccessor) -> Result<PropertyMap, ProvideError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AbstractConfigStore;

    struct AlwaysOk(i32, bool);
    impl MappingProvider for AlwaysOk {
        fn rank(&self) -> i32 {
            self.0
        }
        fn is_partial(&self) -> bool {
            self.1
        }
        fn can_provide_for(&self, _id: &Id) -> bool {
            true
        }
        fn provide(&self, _id: &Id, _config: &ConfigAccessor) -> Result<PropertyMap, ProvideError> {
            Ok(PropertyMap::new())
        }
    }

    #[test]
    fn trait_object_is_usable_behind_arc() {
        use std::sync::Arc;
        let store = AbstractConfigStore::new();
        let provider: Arc<dyn MappingProvider> = Arc::new(AlwaysOk(10, false));
        let accessor = ConfigAccessor::new(&store);
        assert_eq!(provider.rank(), 10);
        assert!(!provider.is_partial());
        assert!(provider.provide(&Id::new("x"), &accessor).is_ok());
    }
}
