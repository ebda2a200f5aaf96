//! Mapping change notifications delivered by the Event Dispatcher.

use std::sync::Arc;

use crate::error::EngineResult;
use crate::id::Id;
use crate::resolver::MappingResolver;
use crate::value::PropertyMap;

/// What happened to a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingChangeKind {
    /// The mapping gained its first viable set of properties.
    Created,
    /// The mapping's resolved properties changed.
    Updated,
    /// The mapping lost every non-partial provider and is no longer resolvable.
    Removed,
}

/// One mapping state transition, handed to every bound
/// [`MappingChangeListener`].
///
/// Carries a reference to the resolver rather than a snapshot of its
/// properties, so a slow listener reacting late still sees a consistent
/// `resolve()` — at worst a later state than the one that triggered the
/// event, never a torn one.
pub struct MappingChangeEvent {
    id: Id,
    kind: MappingChangeKind,
    resolver: Arc<MappingResolver>,
}

impl MappingChangeEvent {
    pub fn new(id: Id, kind: MappingChangeKind, resolver: Arc<MappingResolver>) -> Self {
        Self { id, kind, resolver }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn kind(&self) -> MappingChangeKind {
        self.kind
    }

    /// Resolves the mapping's current properties. For a `Removed` event this
    /// is an empty map, not an error — the mapping simply has nothing to
    /// offer right now.
    pub fn resolve(&self) -> EngineResult<PropertyMap> {
        self.resolver.resolve()
    }
}

/// Receives [`MappingChangeEvent`]s from the Event Dispatcher.
///
/// Called on one of the dispatcher's worker threads; implementations must be
/// `Send + Sync` and should not block indefinitely.
pub trait MappingChangeListener: Send + Sync {
    fn on_mapping_change(&self, event: &MappingChangeEvent);
}
