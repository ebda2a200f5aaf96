//! The Abstract Config Store: typed config entities behind a mutation +
//! change-notification API.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::config::entity::{ChangeKind, ConfigChangeEvent, ConfigChangeListener, ConfigType, StoredEntity};
use crate::value::PropertyMap;

/// Holds every known config entity and notifies subscribers when one is
/// added, updated, or removed.
///
/// Reads (`get_singleton`, `get_group_instance`, `all_group_instances`) never
/// allocate a dependency edge themselves — that's the job of
/// [`crate::config::proxy::ConfigAccessor`], which wraps a store reference and
/// is what providers actually see during `provide()`.
pub struct AbstractConfigStore {
    entities: Mutex<HashMap<ConfigType, StoredEntity>>,
    listeners: Mutex<Vec<Arc<dyn ConfigChangeListener>>>,
}

impl Default for AbstractConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AbstractConfigStore {
    pub fn new() -> Self {
        Self {
            entities: Mutex::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn ConfigChangeListener>) {
        self.listeners.lock().expect("config store listeners poisoned").push(listener);
    }

    fn notify(&self, event: ConfigChangeEvent) {
        for listener in self.listeners.lock().expect("config store listeners poisoned").iter() {
            listener.on_config_change(&event);
        }
    }

    pub fn get_singleton(&self, ty: &ConfigType) -> Option<PropertyMap> {
        match self.entities.lock().expect("config store poisoned").get(ty) {
            Some(StoredEntity::Singleton(props)) => Some(props.clone()),
            _ => None,
        }
    }

    pub fn get_group_instance(&self, ty: &ConfigType, instance_id: &str) -> Option<PropertyMap> {
        match self.entities.lock().expect("config store poisoned").get(ty) {
            Some(StoredEntity::Group(instances)) => instances.get(instance_id).cloned(),
            _ => None,
        }
    }

    pub fn all_group_instances(&self, ty: &ConfigType) -> BTreeMap<String, PropertyMap> {
        match self.entities.lock().expect("config store poisoned").get(ty) {
            Some(StoredEntity::Group(instances)) => instances.clone(),
            _ => BTreeMap::new(),
        }
    }

    /// Inserts or replaces a singleton entity, notifying listeners only if
    /// the stored value actually changed.
    pub fn put_singleton(&self, ty: ConfigType, props: PropertyMap) {
        let kind = {
            let mut entities = self.entities.lock().expect("config store poisoned");
            if let Some(StoredEntity::Singleton(existing)) = entities.get(&ty) {
                if existing == &props {
                    return;
                }
            }
            let kind = match entities.get(&ty) {
                Some(StoredEntity::Singleton(_)) => ChangeKind::Updated,
                _ => ChangeKind::Added,
            };
            entities.insert(ty.clone(), StoredEntity::Singleton(props));
            kind
        };
        self.notify(ConfigChangeEvent::one(kind, ty, None));
    }

    pub fn remove_singleton(&self, ty: &ConfigType) {
        let removed = {
            let mut entities = self.entities.lock().expect("config store poisoned");
            matches!(entities.remove(ty), Some(StoredEntity::Singleton(_)))
        };
        if removed {
            self.notify(ConfigChangeEvent::one(ChangeKind::Removed, ty.clone(), None));
        }
    }

    /// Inserts or replaces one keyed instance of a group entity, notifying
    /// listeners only if the stored value actually changed.
    pub fn put_group_instance(&self, ty: ConfigType, instance_id: impl Into<String>, props: PropertyMap) {
        let instance_id = instance_id.into();
        let kind = {
            let mut entities = self.entities.lock().expect("config store poisoned");
            let group = match entities.entry(ty.clone()).or_insert_with(|| StoredEntity::Group(BTreeMap::new())) {
                StoredEntity::Group(map) => map,
                StoredEntity::Singleton(_) => {
                    panic!("config type {} already registered as a singleton", ty);
                }
            };
            if group.get(&instance_id) == Some(&props) {
                return;
            }
            let kind = if group.contains_key(&instance_id) { ChangeKind::Updated } else { ChangeKind::Added };
            group.insert(instance_id.clone(), props);
            kind
        };
        self.notify(ConfigChangeEvent::one(kind, ty, Some(instance_id)));
    }

    pub fn remove_group_instance(&self, ty: &ConfigType, instance_id: &str) {
        let removed = {
            let mut entities = self.entities.lock().expect("config store poisoned");
            match entities.get_mut(ty) {
                Some(StoredEntity::Group(map)) => map.remove(instance_id).is_some(),
                _ => false,
            }
        };
        if removed {
            self.notify(ConfigChangeEvent::one(ChangeKind::Removed, ty.clone(), Some(instance_id.to_string())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener(Arc<AtomicUsize>);
    impl ConfigChangeListener for CountingListener {
        fn on_config_change(&self, _event: &ConfigChangeEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn put_singleton_twice_with_same_value_does_not_notify_again() {
        let store = AbstractConfigStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        store.subscribe(Arc::new(CountingListener(count.clone())));

        let mut props = PropertyMap::new();
        props.insert("host".into(), "mail.example.com".into());

        store.put_singleton(ConfigType::new("Smtp"), props.clone());
        store.put_singleton(ConfigType::new("Smtp"), props);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn group_instance_roundtrip() {
        let store = AbstractConfigStore::new();
        let mut props = PropertyMap::new();
        props.insert("url".into(), "ldap://ldap-1".into());
        store.put_group_instance(ConfigType::new("Ldap"), "ldap-1", props.clone());

        assert_eq!(store.get_group_instance(&ConfigType::new("Ldap"), "ldap-1"), Some(props));
        assert_eq!(store.all_group_instances(&ConfigType::new("Ldap")).len(), 1);

        store.remove_group_instance(&ConfigType::new("Ldap"), "ldap-1");
        assert_eq!(store.get_group_instance(&ConfigType::new("Ldap"), "ldap-1"), None);
    }

    #[test]
    fn removing_unknown_instance_does_not_notify() {
        let store = AbstractConfigStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        store.subscribe(Arc::new(CountingListener(count.clone())));
        store.remove_group_instance(&ConfigType::new("Ldap"), "nope");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
