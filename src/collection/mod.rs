//! Registry module for dependency injection.
//!
//! This module contains the Registry type, the persistent builder that maps
//! keys to registrations and builds containers from them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::observer::Observers;
use crate::{Container, DiError, DiObserver, DiResult, Key, Lifetime, Registration};

type Partition = Arc<HashMap<Key, Registration>>;

/// Persistent mapping from keys to registrations, partitioned by lifetime.
///
/// A key lives in at most one partition. Every registering call returns a
/// new `Registry` and leaves `self` untouched, so several containers can be
/// derived from a common base. Partitions are shared between versions until
/// one of them is extended.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{DiError, Lifetime, Registration, Registry};
///
/// let base = Registry::new()
///     .register([("config", Registration::from_value("debug".to_string()))])
///     .unwrap();
///
/// let extended = base
///     .register([("cache", Registration::from_fn(|_| Vec::<u8>::new()).scoped())])
///     .unwrap();
///
/// assert_eq!(base.len(), 1);
/// assert_eq!(extended.len(), 2);
/// assert_eq!(extended.lifetime_of("cache"), Some(Lifetime::Scoped));
///
/// let err = extended.register([("config", Registration::from_value(0u8))]).unwrap_err();
/// assert!(matches!(err, DiError::DuplicateKey(_)));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    singletons: Partition,
    scoped: Partition,
    transients: Partition,
    observers: Observers,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a registry that reports to `observer` in addition to the
    /// observers already attached.
    pub fn with_observer(mut self, observer: Arc<dyn DiObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Returns a new registry extended with `items`.
    ///
    /// Each registration is filed under its own lifetime. The whole batch is
    /// rejected if any key is reserved, already registered, or repeated
    /// within the batch.
    ///
    /// # Errors
    ///
    /// - [`DiError::ReservedKey`] for an empty key or one starting with
    ///   [`RESERVED_PREFIX`](crate::RESERVED_PREFIX)
    /// - [`DiError::DuplicateKey`] for a key that is already taken
    pub fn register<I, K>(&self, items: I) -> DiResult<Registry>
    where
        I: IntoIterator<Item = (K, Registration)>,
        K: Into<Key>,
    {
        let mut batch: Vec<(Key, Registration)> = Vec::new();
        for (key, registration) in items {
            let key = key.into();
            if key.is_reserved() {
                return Err(DiError::ReservedKey(key.to_string()));
            }
            if self.contains(key.as_str()) || batch.iter().any(|(k, _)| *k == key) {
                return Err(DiError::DuplicateKey(key));
            }
            batch.push((key, registration));
        }

        let mut next = self.clone();
        for (key, registration) in batch {
            tracing::trace!(key = %key, lifetime = %registration.lifetime(), "registering service");
            Arc::make_mut(next.partition_mut(registration.lifetime())).insert(key, registration);
        }
        tracing::debug!(services = next.len(), "registry extended");
        Ok(next)
    }

    /// Like [`register`](Self::register), filing every item as a singleton.
    pub fn register_singleton<I, K>(&self, items: I) -> DiResult<Registry>
    where
        I: IntoIterator<Item = (K, Registration)>,
        K: Into<Key>,
    {
        self.register_as(Lifetime::Singleton, items)
    }

    /// Like [`register`](Self::register), filing every item as scoped.
    pub fn register_scoped<I, K>(&self, items: I) -> DiResult<Registry>
    where
        I: IntoIterator<Item = (K, Registration)>,
        K: Into<Key>,
    {
        self.register_as(Lifetime::Scoped, items)
    }

    /// Like [`register`](Self::register), filing every item as transient.
    pub fn register_transient<I, K>(&self, items: I) -> DiResult<Registry>
    where
        I: IntoIterator<Item = (K, Registration)>,
        K: Into<Key>,
    {
        self.register_as(Lifetime::Transient, items)
    }

    fn register_as<I, K>(&self, lifetime: Lifetime, items: I) -> DiResult<Registry>
    where
        I: IntoIterator<Item = (K, Registration)>,
        K: Into<Key>,
    {
        self.register(
            items
                .into_iter()
                .map(|(key, registration)| (key, registration.with_lifetime(lifetime))),
        )
    }

    fn partition(&self, lifetime: Lifetime) -> &HashMap<Key, Registration> {
        match lifetime {
            Lifetime::Singleton => &self.singletons,
            Lifetime::Scoped => &self.scoped,
            Lifetime::Transient => &self.transients,
        }
    }

    fn partition_mut(&mut self, lifetime: Lifetime) -> &mut Partition {
        match lifetime {
            Lifetime::Singleton => &mut self.singletons,
            Lifetime::Scoped => &mut self.scoped,
            Lifetime::Transient => &mut self.transients,
        }
    }

    /// Looks `key` up in the singleton, scoped and transient partitions, in
    /// that order.
    pub fn entry(&self, key: &str) -> Option<(&Key, &Registration)> {
        [Lifetime::Singleton, Lifetime::Scoped, Lifetime::Transient]
            .into_iter()
            .find_map(|lifetime| self.partition(lifetime).get_key_value(key))
    }

    /// Registration filed under `key`.
    pub fn get(&self, key: &str) -> Option<&Registration> {
        self.entry(key).map(|(_, registration)| registration)
    }

    /// Whether `key` is registered under any lifetime.
    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Lifetime `key` is registered under.
    pub fn lifetime_of(&self, key: &str) -> Option<Lifetime> {
        self.get(key).map(Registration::lifetime)
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.iter().map(|(key, _)| key.clone()).collect();
        keys.sort();
        keys
    }

    /// Keys registered under `lifetime`, sorted.
    pub fn keys_of(&self, lifetime: Lifetime) -> Vec<Key> {
        let mut keys: Vec<Key> = self.partition(lifetime).keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Iterates over every registration, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.singletons
            .iter()
            .chain(self.scoped.iter())
            .chain(self.transients.iter())
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.singletons.len() + self.scoped.len() + self.transients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.observers
    }

    /// Builds the root container with default options.
    ///
    /// Construction is lazy: no factory runs until a key is read. Nothing is
    /// checked here; problems surface as resolution errors. Use
    /// [`try_build`](Self::try_build) to validate declared dependencies first.
    pub fn build(&self) -> Container {
        tracing::debug!(services = self.len(), "building container");
        Container::new(self.clone(), ContainerOptions::default())
    }

    /// Builds the root container with `options`.
    ///
    /// # Errors
    ///
    /// [`DiError::Validation`] when `options.validate_on_build` is set and
    /// [`validate`](Self::validate) reports errors.
    pub fn build_with(&self, options: ContainerOptions) -> DiResult<Container> {
        if options.validate_on_build {
            let result = self.validate();
            if !result.is_valid() {
                tracing::warn!(errors = result.errors.len(), "registry failed validation");
                return Err(DiError::Validation(result.errors));
            }
        }
        tracing::debug!(services = self.len(), max_depth = options.max_depth, "building container");
        Ok(Container::new(self.clone(), options))
    }
}

/// Starts a new registry from `items`.
///
/// Shorthand for `Registry::new().register(items)`.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{register, Registration, Resolver};
///
/// let container = register([
///     ("a", Registration::from_value("a".to_string())),
///     ("b", Registration::from_value("b".to_string())),
/// ])
/// .unwrap()
/// .build();
///
/// assert_eq!(*container.get_required::<String>("b"), "b");
/// ```
pub fn register<I, K>(items: I) -> DiResult<Registry>
where
    I: IntoIterator<Item = (K, Registration)>,
    K: Into<Key>,
{
    Registry::new().register(items)
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("singletons", &self.keys_of(Lifetime::Singleton))
            .field("scoped", &self.keys_of(Lifetime::Scoped))
            .field("transients", &self.keys_of(Lifetime::Transient))
            .field("observers", &self.observers.len())
            .finish()
    }
}
