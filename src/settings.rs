//! Engine-level configuration: everything that shapes how the engine runs,
//! as distinct from the config entities it resolves mappings against.

use std::collections::HashMap;
use std::env;

use crate::dispatcher::DEFAULT_WORKERS;

/// A source of raw engine settings, checked in the order added to an
/// [`EngineSettings`] builder. Mirrors how most host applications layer
/// environment variables over a static default.
pub trait SettingsSource: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from process environment variables, optionally scoped to
/// a prefix (`CONFMAP_DISPATCHER_WORKERS` with prefix `"confmap"`).
#[derive(Debug, Default)]
pub struct EnvironmentSettingsSource {
    prefix: Option<String>,
}

impl EnvironmentSettingsSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()) }
    }
}

impl SettingsSource for EnvironmentSettingsSource {
    fn get(&self, key: &str) -> Option<String> {
        let env_key = match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key.to_uppercase()),
            None => key.to_uppercase(),
        };
        env::var(env_key).ok()
    }
}

/// An in-memory source, mainly for tests and programmatic overrides.
#[derive(Debug, Default)]
pub struct StaticSettingsSource {
    values: HashMap<String, String>,
}

impl StaticSettingsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SettingsSource for StaticSettingsSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Engine-level configuration: how many dispatcher workers to run, and
/// whether diagnostics logging is enabled.
///
/// Built once at startup and handed to [`crate::dispatcher::EventDispatcher::new`]
/// and friends; unlike [`crate::config::AbstractConfigStore`] entities, these
/// values are not reactive — changing them requires restarting the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub dispatcher_workers: usize,
    pub diagnostics_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { dispatcher_workers: DEFAULT_WORKERS, diagnostics_enabled: false }
    }
}

impl EngineSettings {
    /// Loads settings by checking each source in order for each key,
    /// falling back to [`EngineSettings::default`] values when none supply it.
    pub fn load(sources: &[Box<dyn SettingsSource>]) -> Self {
        let mut settings = Self::default();

        if let Some(raw) = Self::lookup(sources, "dispatcher.workers") {
            if let Ok(n) = raw.parse::<usize>() {
                settings.dispatcher_workers = n.max(1);
            }
        }
        if let Some(raw) = Self::lookup(sources, "diagnostics.enabled") {
            if let Ok(b) = raw.parse::<bool>() {
                settings.diagnostics_enabled = b;
            }
        }

        settings
    }

    fn lookup(sources: &[Box<dyn SettingsSource>], key: &str) -> Option<String> {
        sources.iter().find_map(|s| s.get(key))
    }
}
