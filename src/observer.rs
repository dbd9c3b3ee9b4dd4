//! Diagnostic observers for resolution events.
//!
//! Observers see every instantiation the container performs: cache hits are
//! not reported, only the factory calls that actually build something.

use std::sync::Arc;
use std::time::Duration;

use tracing::Level;

use crate::{DiError, Key, Lifetime};

/// Observer trait for dependency injection resolution events.
///
/// Observer calls are made synchronously on the resolving thread, so keep
/// implementations cheap.
///
/// # Examples
///
/// ```
/// use keyed_di::{DiError, DiObserver, Key, Lifetime, Registration, Registry, Resolver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     built: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, _key: &Key, _lifetime: Lifetime) {}
///
///     fn resolved(&self, key: &Key, _lifetime: Lifetime, _duration: Duration) {
///         self.built.lock().unwrap().push(key.to_string());
///     }
///
///     fn failed(&self, _key: &Key, _error: &DiError) {}
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = Registry::new()
///     .with_observer(recorder.clone())
///     .register([("answer", Registration::from_value(42u32))])
///     .unwrap()
///     .build();
///
/// container.get_required::<u32>("answer");
/// container.get_required::<u32>("answer");
/// assert_eq!(*recorder.built.lock().unwrap(), vec!["answer".to_string()]);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called right before a factory is invoked.
    fn resolving(&self, key: &Key, lifetime: Lifetime);

    /// Called after a factory returned an instance.
    fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration);

    /// Called when a factory, or one of its dependencies, failed.
    fn failed(&self, key: &Key, error: &DiError);
}

/// Collection of observers attached to a registry.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn resolving(&self, key: &Key, lifetime: Lifetime) {
        for observer in &self.observers {
            observer.resolving(key, lifetime);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, lifetime, duration);
        }
    }

    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.failed(key, error);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// Successful resolutions are emitted at the configured level, failures
/// always at `WARN`.
///
/// # Examples
///
/// ```
/// use keyed_di::{Registry, TracingObserver};
/// use std::sync::Arc;
///
/// let registry = Registry::new().with_observer(Arc::new(TracingObserver::new()));
/// let _container = registry.build();
/// ```
pub struct TracingObserver {
    level: Level,
}

impl TracingObserver {
    /// Observer emitting at `DEBUG`.
    pub fn new() -> Self {
        Self { level: Level::DEBUG }
    }

    /// Observer emitting at `level`.
    pub fn with_level(level: Level) -> Self {
        Self { level }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::TRACE => tracing::trace!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            _ => tracing::error!($($arg)+),
        }
    };
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &Key, lifetime: Lifetime) {
        event_at!(self.level, key = %key, lifetime = %lifetime, "resolving service");
    }

    fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration) {
        event_at!(
            self.level,
            key = %key,
            lifetime = %lifetime,
            elapsed_us = duration.as_micros() as u64,
            "resolved service"
        );
    }

    fn failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(key = %key, error = %error, "service resolution failed");
    }
}
