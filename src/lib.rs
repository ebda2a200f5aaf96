//! # confmap-engine
//!
//! A reactive configuration-mapping engine: ranked providers compute a
//! mapping's properties from an Abstract Config Store, and the engine keeps
//! every mapping's resolved view up to date as the store changes underneath
//! it.
//!
//! ## Features
//!
//! - **Ranked providers**: multiple [`MappingProvider`]s can answer for the
//!   same mapping; higher rank wins on key collisions, lower rank fills gaps
//! - **Dependency tracking**: each resolver records exactly which config
//!   reads it performed, so only mappings actually affected by a change
//!   recompute
//! - **No spurious events**: a recomputation that produces the same
//!   properties as before never reaches listeners
//! - **Bounded, ordered dispatch**: a fixed worker pool delivers
//!   [`MappingChangeEvent`]s, with per-mapping delivery order preserved
//! - **Deep-copy isolation**: callers of [`MappingResolver::resolve`] can
//!   never observe or mutate a resolver's cached state
//!
//! ## Quick Start
//!
//! ```rust
//! use confmap_engine::{
//!     AbstractConfigStore, ConfigAccessor, ConfigType, EventDispatcher, Id,
//!     MappingProvider, MappingService, ProvideError, ProviderRegistry,
//! };
//! use std::sync::Arc;
//!
//! struct LdapMapping;
//!
//! impl MappingProvider for LdapMapping {
//!     fn rank(&self) -> i32 {
//!         0
//!     }
//!
//!     fn is_partial(&self) -> bool {
//!         false
//!     }
//!
//!     fn can_provide_for(&self, id: &Id) -> bool {
//!         id.name() == "ldap-connector"
//!     }
//!
//!     fn provide(
//!         &self,
//!         _id: &Id,
//!         config: &ConfigAccessor,
//!     ) -> Result<confmap_engine::PropertyMap, ProvideError> {
//!         config
//!             .get_singleton(ConfigType::new("Ldap"))
//!             .ok_or(ProvideError::Unavailable)
//!     }
//! }
//!
//! let registry = Arc::new(ProviderRegistry::new());
//! let store = Arc::new(AbstractConfigStore::new());
//! let dispatcher = Arc::new(EventDispatcher::new(4));
//! let service = MappingService::new(registry, store.clone(), dispatcher);
//!
//! service.bind_provider(Arc::new(LdapMapping)).unwrap();
//!
//! // No "Ldap" config yet, so the mapping is REMOVED: there is nothing to
//! // hand back yet, even though the id keeps being tracked internally.
//! assert!(service.get_mapping(&Id::new("ldap-connector")).unwrap().is_none());
//!
//! service.shutdown();
//! ```
//!
//! ## Architecture
//!
//! - [`config`] — the Abstract Config Store: typed config entities
//!   (singleton or group-shaped), change notifications, and the
//!   dependency-tracking proxy providers read through
//! - [`provider`] and [`registry`] — the `MappingProvider` trait and the
//!   rank-ordered registry providers bind into
//! - [`resolver`] — the per-mapping state machine that merges provider
//!   output and decides CREATED/UPDATED/REMOVED transitions
//! - [`event`] and [`dispatcher`] — mapping change notifications and the
//!   worker pool that delivers them
//! - [`service`] — the directory that ties providers, config, resolvers,
//!   and dispatch together
//! - [`settings`], [`observer`], [`metrics`] — the ambient stack: engine
//!   configuration, diagnostic hooks, and Prometheus-style metrics

pub mod config;
pub mod dependency;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod id;
mod internal;
pub mod metrics;
pub mod observer;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod settings;
pub mod value;

pub use config::{AbstractConfigStore, ChangeKind, ConfigAccessor, ConfigChangeEvent, ConfigChangeListener, ConfigEntityRef, ConfigType};
pub use dependency::{DependencySet, Instances};
pub use dispatcher::{EventDispatcher, DEFAULT_WORKERS};
pub use error::{EngineError, EngineResult, ProvideError};
pub use event::{MappingChangeEvent, MappingChangeKind, MappingChangeListener};
pub use id::{Id, WILDCARD_INSTANCE};
pub use metrics::{EngineMetrics, TimingStats};
pub use observer::{EngineObserver, LoggingObserver, Observers};
pub use provider::MappingProvider;
pub use registry::ProviderRegistry;
pub use resolver::MappingResolver;
pub use service::MappingService;
pub use settings::{EngineSettings, EnvironmentSettingsSource, SettingsSource, StaticSettingsSource};
pub use value::{PropertyMap, Scalar, ScalarKey, Value};
