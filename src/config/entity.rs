//! Typed identity and change events for entities held in the config store.

use std::fmt;

use crate::value::PropertyMap;

/// Identifies a kind of config entity (e.g. `"Ldap"`, `"Smtp"`).
///
/// Distinct from [`crate::Id`], which identifies one *mapping*: a
/// `ConfigType` identifies one *entity type* inside the store that mappings
/// read from and depend on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigType(String);

impl ConfigType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConfigType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The shape a config entity is stored under.
#[derive(Debug, Clone)]
pub(crate) enum StoredEntity {
    /// One unkeyed instance of this type, e.g. global SMTP relay settings.
    Singleton(PropertyMap),
    /// Zero or more keyed instances, e.g. several LDAP servers.
    Group(std::collections::BTreeMap<String, PropertyMap>),
}

/// What kind of mutation touched a [`ConfigEntityRef`] inside a
/// [`ConfigChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

/// One entity touched by a config-store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntityRef {
    pub ty: ConfigType,
    /// `None` for a singleton entity; `Some(instance_id)` for a group member.
    pub instance: Option<String>,
}

impl ConfigEntityRef {
    pub fn new(ty: ConfigType, instance: Option<String>) -> Self {
        Self { ty, instance }
    }
}

/// One mutation to the config store, delivered to every
/// [`ConfigChangeListener`] as three disjoint sequences of affected entities
/// rather than a single before/after diff — this store only ever mutates one
/// entity per call, so exactly one sequence carries exactly one entry and the
/// other two are empty, but the shape leaves room for a future batched
/// mutation to report many entities in a single event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigChangeEvent {
    pub added: Vec<ConfigEntityRef>,
    pub updated: Vec<ConfigEntityRef>,
    pub removed: Vec<ConfigEntityRef>,
}

impl ConfigChangeEvent {
    /// Builds an event reporting a single entity in the list matching `kind`.
    pub fn one(kind: ChangeKind, ty: ConfigType, instance: Option<String>) -> Self {
        let entity = ConfigEntityRef::new(ty, instance);
        let mut event = Self::default();
        match kind {
            ChangeKind::Added => event.added.push(entity),
            ChangeKind::Updated => event.updated.push(entity),
            ChangeKind::Removed => event.removed.push(entity),
        }
        event
    }

    /// Every entity touched by this mutation, regardless of which sequence it
    /// landed in.
    pub fn touched(&self) -> impl Iterator<Item = &ConfigEntityRef> {
        self.added.iter().chain(self.updated.iter()).chain(self.removed.iter())
    }
}

/// Receives notifications of config store mutations.
///
/// Implementations must not block for long: notification happens under the
/// store's mutation path, synchronously, the same way a provider's own
/// `provide()` call happens on the recomputing thread.
pub trait ConfigChangeListener: Send + Sync {
    fn on_config_change(&self, event: &ConfigChangeEvent);
}
