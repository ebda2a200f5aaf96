//! Dependency edges recorded by the config proxy and consulted by resolvers
//! to decide whether a `ConfigChangeEvent` affects them.

use std::collections::{HashMap, HashSet};

use crate::config::ConfigType;

/// The set of instances of a config type a resolver depends on.
///
/// `All` is a sentinel, not "every id currently known" computed structurally —
/// it must never compare equal to an enumerated set, even an empty one, which
/// is why this is a tagged enum rather than e.g. an `Option<HashSet<String>>`
/// where `None` could be conflated with "no ids yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instances {
    /// Depends on every instance (and any future instance) of the type.
    All,
    /// Depends on exactly these group ids of the type.
    Some(HashSet<String>),
}

impl Instances {
    fn insert(&mut self, id: &str) {
        match self {
            Instances::All => {} // already as broad as possible
            Instances::Some(ids) => {
                ids.insert(id.to_string());
            }
        }
    }
}

/// The set of `(ConfigType, Instances)` edges a resolver's last `recompute()`
/// established, via reads performed through the [`crate::config::proxy`].
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    edges: HashMap<ConfigType, Instances>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self { edges: HashMap::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Records a dependency on every instance of `ty` (singleton read, or an
    /// `all()` enumeration).
    pub fn record_all(&mut self, ty: ConfigType) {
        self.edges.insert(ty, Instances::All);
    }

    /// Records a dependency on one group instance of `ty`. If the type is
    /// already tracked as `All`, this is a no-op — `All` never narrows.
    pub fn record_instance(&mut self, ty: ConfigType, instance_id: &str) {
        self.edges
            .entry(ty)
            .or_insert_with(|| Instances::Some(HashSet::new()))
            .insert(instance_id);
    }

    pub fn get(&self, ty: &ConfigType) -> Option<&Instances> {
        self.edges.get(ty)
    }

    /// Folds another resolver's recorded edges into this one, widening on
    /// overlap (an `All` on either side wins; enumerated sets union).
    ///
    /// Used to combine the dependency edges recorded by several providers'
    /// [`crate::config::proxy::ConfigAccessor`] calls into one resolver-wide set.
    pub fn merge(&mut self, other: DependencySet) {
        for (ty, instances) in other.edges {
            match instances {
                Instances::All => {
                    self.edges.insert(ty, Instances::All);
                }
                Instances::Some(ids) => match self.edges.entry(ty).or_insert_with(|| Instances::Some(HashSet::new())) {
                    Instances::All => {}
                    Instances::Some(existing) => existing.extend(ids),
                },
            }
        }
    }

    /// Whether a mutation to `(ty, instance)` should trigger recomputation.
    /// `instance = None` denotes a singleton entity.
    pub fn tracks(&self, ty: &ConfigType, instance: Option<&str>) -> bool {
        match self.edges.get(ty) {
            None => false,
            Some(Instances::All) => true,
            Some(Instances::Some(ids)) => match instance {
                None => true, // singleton entities have no id to filter by
                Some(id) => ids.contains(id),
            },
        }
    }
}
