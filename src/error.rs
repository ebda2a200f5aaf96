//! Error types for the configuration mapping engine.

use std::fmt;

/// Errors a [`crate::provider::MappingProvider`] may raise from `provide()`.
///
/// This is deliberately a smaller, provider-facing enum distinct from
/// [`EngineError`]: the resolver folds every variant here into its own state
/// per spec.md §4.3 and §7 before anything escapes to a caller of
/// [`crate::resolver::MappingResolver::resolve`].
///
/// # Examples
///
/// ```
/// use confmap_engine::ProvideError;
///
/// let unavailable = ProvideError::Unavailable;
/// let recoverable = ProvideError::MappingError("ldap bind failed".to_string());
/// println!("{}", unavailable);
/// println!("{}", recoverable);
/// ```
#[derive(Debug, Clone)]
pub enum ProvideError {
    /// This mapping has no viable providers right now; if no higher-rank
    /// provider succeeds, the mapping should move to (or stay in) `REMOVED`.
    Unavailable,
    /// A recoverable failure. Cached on the resolver until a subsequent
    /// non-partial provider succeeds.
    MappingError(String),
    /// Any other failure raised out of a provider; treated identically to
    /// `MappingError` by the resolver (spec.md §7).
    Unexpected(String),
}

impl fmt::Display for ProvideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvideError::Unavailable => write!(f, "provider unavailable"),
            ProvideError::MappingError(msg) => write!(f, "mapping error: {}", msg),
            ProvideError::Unexpected(msg) => write!(f, "unexpected provider error: {}", msg),
        }
    }
}

impl std::error::Error for ProvideError {}

/// Engine-level errors surfaced to callers of the public API.
///
/// # Examples
///
/// ```
/// use confmap_engine::EngineError;
///
/// let closed = EngineError::ClosedService;
/// assert_eq!(closed.to_string(), "operation rejected: service closed");
/// ```
#[derive(Debug, Clone)]
pub enum EngineError {
    /// A recoverable failure cached on a resolver, surfaced from `resolve()`
    /// for as long as no non-partial provider has since succeeded.
    MappingError(String),
    /// An operation was attempted after the engine (or its dispatcher) was
    /// shut down.
    ClosedService,
    /// A resolver's internal mutex was poisoned by a panicking holder.
    Poisoned(&'static str),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MappingError(msg) => write!(f, "mapping error: {}", msg),
            EngineError::ClosedService => write!(f, "operation rejected: service closed"),
            EngineError::Poisoned(what) => write!(f, "internal lock poisoned: {}", what),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type used throughout the engine's public API.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provide_error_displays_message() {
        let e = ProvideError::MappingError("boom".into());
        assert_eq!(e.to_string(), "mapping error: boom");
    }

    #[test]
    fn engine_error_displays_closed_service() {
        assert_eq!(EngineError::ClosedService.to_string(), "operation rejected: service closed");
    }
}
