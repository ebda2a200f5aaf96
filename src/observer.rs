//! Diagnostic observers for mapping resolution traceability.
//!
//! Mirrors the Mapping Change Listener surface in shape, but is meant for
//! structured tracing/metrics rather than application logic: an
//! [`EngineObserver`] sees every recomputation attempt, including the ones
//! that produce no event because nothing actually changed.

use std::sync::Arc;
use std::time::Duration;

use crate::id::Id;

/// Observes the Mapping Resolver's recomputation lifecycle.
///
/// # Performance
///
/// Calls happen synchronously on whichever thread ran `recompute()`. Keep
/// implementations lightweight; for anything expensive, queue work instead
/// of doing it inline.
///
/// # Examples
///
/// ```
/// use confmap_engine::{EngineObserver, Id};
/// use std::time::Duration;
///
/// struct Tracing;
/// impl EngineObserver for Tracing {
///     fn recomputing(&self, id: &Id) {
///         println!("recomputing {}", id);
///     }
///     fn recomputed(&self, id: &Id, duration: Duration) {
///         println!("recomputed {} in {:?}", id, duration);
///     }
///     fn recompute_failed(&self, id: &Id, message: &str) {
///         println!("recompute failed for {}: {}", id, message);
///     }
/// }
/// ```
pub trait EngineObserver: Send + Sync {
    /// Called just before a resolver's `recompute()` runs.
    fn recomputing(&self, id: &Id);

    /// Called after `recompute()` returns, regardless of whether a
    /// `CREATED`/`UPDATED`/`REMOVED` transition resulted.
    fn recomputed(&self, id: &Id, duration: Duration);

    /// Called when every accepting provider failed or was partial-only this
    /// round, leaving the mapping without resolvable properties.
    fn recompute_failed(&self, id: &Id, message: &str) {
        let _ = (id, message);
    }
}

/// Container for registered observers, with a zero-cost path when none are
/// registered.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Arc<dyn EngineObserver>>,
}

impl Observers {
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub fn add(&mut self, observer: Arc<dyn EngineObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub fn recomputing(&self, id: &Id) {
        for observer in &self.observers {
            observer.recomputing(id);
        }
    }

    #[inline]
    pub fn recomputed(&self, id: &Id, duration: Duration) {
        for observer in &self.observers {
            observer.recomputed(id, duration);
        }
    }

    #[inline]
    pub fn recompute_failed(&self, id: &Id, message: &str) {
        for observer in &self.observers {
            observer.recompute_failed(id, message);
        }
    }
}

/// Built-in observer that logs recomputation events to stdout/stderr.
///
/// # Examples
///
/// ```
/// use confmap_engine::{Observers, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut observers = Observers::new();
/// observers.add(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { prefix: "[confmap-engine]".to_string() }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineObserver for LoggingObserver {
    fn recomputing(&self, id: &Id) {
        println!("{} recomputing: {}", self.prefix, id);
    }

    fn recomputed(&self, id: &Id, duration: Duration) {
        println!("{} recomputed: {} in {:?}", self.prefix, id, duration);
    }

    fn recompute_failed(&self, id: &Id, message: &str) {
        eprintln!("{} recompute failed for {}: {}", self.prefix, id, message);
    }
}
