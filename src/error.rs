//! Error types for the dependency injection container.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::key::{Key, KeyPath};
use crate::validation::ValidationError;

/// Dependency injection errors
///
/// Represents the error conditions of registration, validation and
/// resolution. Every variant carries the key it concerns so a failure deep in
/// a dependency graph can still be traced to its source.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{DiError, Registry, Resolver};
///
/// let container = Registry::new().build();
/// match container.get::<String>("missing") {
///     Err(DiError::NotFound(key)) => assert_eq!(key.as_str(), "missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use keyed_di::{DiError, Key};
///
/// let circular = DiError::Circular {
///     key: Key::from("a"),
///     path: vec![Key::from("a"), Key::from("b"), Key::from("a")],
/// };
/// assert_eq!(circular.to_string(), "Circular dependency: a -> b -> a");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Key registered under no lifetime
    #[error("Service not found: {0}")]
    NotFound(Key),
    /// Resolved instance is not of the requested type
    #[error("Type mismatch for: {key} (expected {expected})")]
    TypeMismatch {
        key: Key,
        expected: &'static str,
    },
    /// Key requested again while its own instantiation is still running
    #[error("Circular dependency: {}", KeyPath(.path))]
    Circular {
        /// The key whose resolution re-entered itself
        key: Key,
        /// Resolution chain from the outermost request to the repeated key
        path: Vec<Key>,
    },
    /// Resolution chain grew past the configured maximum depth
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Key already present in the registry or repeated within one batch
    #[error("Key already registered: {0}")]
    DuplicateKey(Key),
    /// Key is empty or starts with the reserved prefix
    #[error("Key {0:?} is reserved")]
    ReservedKey(String),
    /// Declared dependency graph failed validation
    #[error("Invalid registrations: {}", Issues(.0))]
    Validation(Vec<ValidationError>),
    /// A factory reported its own failure
    #[error("Factory for {key} failed: {source}")]
    Factory {
        key: Key,
        /// The factory's own error, kept as this error's `source()`
        source: Arc<dyn StdError + Send + Sync>,
    },
}

impl DiError {
    /// Wraps an error raised while building `key`.
    ///
    /// Accepts any `Error + Send + Sync` as well as plain messages. The
    /// wrapped error stays reachable through [`source`](StdError::source).
    ///
    /// ```rust
    /// use keyed_di::DiError;
    /// use std::error::Error;
    ///
    /// let err = DiError::factory("config", "file missing");
    /// assert_eq!(err.to_string(), "Factory for config failed: file missing");
    /// assert_eq!(err.source().unwrap().to_string(), "file missing");
    /// ```
    pub fn factory(key: impl Into<Key>, error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        DiError::Factory {
            key: key.into(),
            source: Arc::from(error.into()),
        }
    }

    /// The key this error is about, when there is exactly one.
    pub fn key(&self) -> Option<&Key> {
        match self {
            DiError::NotFound(key)
            | DiError::TypeMismatch { key, .. }
            | DiError::Circular { key, .. }
            | DiError::DuplicateKey(key)
            | DiError::Factory { key, .. } => Some(key),
            DiError::DepthExceeded(_) | DiError::ReservedKey(_) | DiError::Validation(_) => None,
        }
    }
}

struct Issues<'a>(&'a [ValidationError]);

impl fmt::Display for Issues<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
