//! Dependency-Tracking Config Proxy.
//!
//! Every read a provider performs during `provide()` goes through a
//! [`ConfigAccessor`] instead of the raw store, so the resolver driving that
//! call can learn exactly which entities the result depends on — without the
//! provider itself ever mentioning dependencies.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::config::entity::ConfigType;
use crate::config::store::AbstractConfigStore;
use crate::dependency::DependencySet;
use crate::value::PropertyMap;

/// A config-store handle that records every read it serves.
///
/// One `ConfigAccessor` is built fresh for each `provide()` call; its
/// recorded [`DependencySet`] is pulled out with [`ConfigAccessor::into_dependencies`]
/// once the provider returns, and becomes the resolver's dependency set for
/// that recomputation (see [`crate::resolver::MappingResolver::recompute`]).
pub struct ConfigAccessor<'store> {
    store: &'store AbstractConfigStore,
    deps: RefCell<DependencySet>,
}

impl<'store> ConfigAccessor<'store> {
    pub fn new(store: &'store AbstractConfigStore) -> Self {
        Self { store, deps: RefCell::new(DependencySet::new()) }
    }

    /// Reads a singleton entity, recording a dependency on *all* of `ty` —
    /// any future mutation to it should trigger recomputation.
    pub fn get_singleton(&self, ty: impl Into<ConfigType>) -> Option<PropertyMap> {
        let ty = ty.into();
        self.deps.borrow_mut().record_all(ty.clone());
        self.store.get_singleton(&ty)
    }

    /// Reads one instance of a group entity, recording a dependency on just
    /// that instance.
    pub fn get_group_instance(&self, ty: impl Into<ConfigType>, instance_id: &str) -> Option<PropertyMap> {
        let ty = ty.into();
        self.deps.borrow_mut().record_instance(ty.clone(), instance_id);
        self.store.get_group_instance(&ty, instance_id)
    }

    /// Enumerates every instance of a group entity, recording a dependency on
    /// *all* instances — including ones created later.
    pub fn all_group_instances(&self, ty: impl Into<ConfigType>) -> BTreeMap<String, PropertyMap> {
        let ty = ty.into();
        self.deps.borrow_mut().record_all(ty.clone());
        self.store.all_group_instances(&ty)
    }

    /// Consumes the accessor, returning the dependency edges recorded across
    /// every read it served.
    pub fn into_dependencies(self) -> DependencySet {
        self.deps.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_read_records_all_dependency() {
        let store = AbstractConfigStore::new();
        let mut props = PropertyMap::new();
        props.insert("host".into(), "mail.example.com".into());
        store.put_singleton(ConfigType::new("Smtp"), props);

        let accessor = ConfigAccessor::new(&store);
        let _ = accessor.get_singleton(ConfigType::new("Smtp"));
        let deps = accessor.into_dependencies();

        assert_eq!(deps.get(&ConfigType::new("Smtp")), Some(&crate::dependency::Instances::All));
    }

    #[test]
    fn group_instance_read_records_single_instance_dependency() {
        let store = AbstractConfigStore::new();
        store.put_group_instance(ConfigType::new("Ldap"), "ldap-1", PropertyMap::new());

        let accessor = ConfigAccessor::new(&store);
        let _ = accessor.get_group_instance(ConfigType::new("Ldap"), "ldap-1");
        let deps = accessor.into_dependencies();

        assert!(deps.tracks(&ConfigType::new("Ldap"), Some("ldap-1")));
        assert!(!deps.tracks(&ConfigType::new("Ldap"), Some("ldap-2")));
    }

    #[test]
    fn enumeration_records_all_sentinel_not_current_member_list() {
        let store = AbstractConfigStore::new();
        store.put_group_instance(ConfigType::new("Ldap"), "ldap-1", PropertyMap::new());

        let accessor = ConfigAccessor::new(&store);
        let _ = accessor.all_group_instances(ConfigType::new("Ldap"));
        let deps = accessor.into_dependencies();

        // A later instance never enumerated at read time is still tracked,
        // because the recorded edge is the ALL sentinel, not {"ldap-1"}.
        assert!(deps.tracks(&ConfigType::new("Ldap"), Some("ldap-2")));
    }
}
