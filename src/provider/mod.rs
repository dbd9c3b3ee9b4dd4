//! Container module for dependency injection.
//!
//! This module contains the Container type, which resolves registered keys
//! lazily according to their lifetimes, and the scope machinery built on it.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;

use crate::collection::Registry;
use crate::config::ContainerOptions;
use crate::internal::{AsyncHook, BoxFutureUnit, CacheId, Claim, DisposeBag, Frame, SlotTable, SyncHook};
use crate::registration::{Instance, Registration};
use crate::traits::{AsyncDispose, Dispose, ResolverCore};
use crate::{DiError, DiResult, Key, Lifetime};

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub(crate) use scope::ScopeInner;

/// Lazily resolving view over a [`Registry`].
///
/// The root container is returned by [`Registry::build`]; every
/// [`scope`](Self::scope) derived from it is a `Container` as well. All of them
/// share the root's singleton cache while each owns its own scoped cache.
/// Nothing is instantiated until a key is first read.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone: clones are handles to the
/// same scope. Concurrent first reads of a singleton or scoped key still run
/// its factory only once; the losing threads wait for the winner's instance.
///
/// # Examples
///
/// ```
/// use keyed_di::{register, Registration, Resolver};
/// use std::sync::{Arc, Mutex};
///
/// struct Context {
///     something: Mutex<String>,
/// }
///
/// struct Service {
///     context: Arc<Context>,
/// }
///
/// impl Service {
///     fn call(&self) -> String {
///         self.context.something.lock().unwrap().clone()
///     }
/// }
///
/// let container = register([
///     (
///         "context",
///         Registration::from_fn(|_| Context { something: Mutex::new("hello".to_string()) }).scoped(),
///     ),
///     (
///         "service",
///         Registration::from_fn(|deps| Service { context: deps.get_required::<Context>("context") })
///             .scoped(),
///     ),
/// ])
/// .unwrap()
/// .build();
///
/// assert_eq!(container.get_required::<Service>("service").call(), "hello");
///
/// let scope = container.scope();
/// *scope.get_required::<Context>("context").something.lock().unwrap() = "world".to_string();
/// assert_eq!(scope.get_required::<Service>("service").call(), "world");
/// assert_eq!(container.get_required::<Service>("service").call(), "hello");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ScopeInner>,
}

pub(crate) struct RootInner {
    pub(crate) registry: Registry,
    pub(crate) options: ContainerOptions,
    pub(crate) slots: SlotTable,
    /// Hooks of singleton instances.
    pub(crate) disposers: Mutex<DisposeBag>,
    /// Hooks of scopes dropped before they were disposed.
    pub(crate) orphaned: Mutex<DisposeBag>,
    /// Scopes derived from this root, oldest first.
    pub(crate) scopes: Mutex<Vec<Weak<ScopeInner>>>,
    pub(crate) next_scope: AtomicU64,
}

impl Container {
    pub(crate) fn new(registry: Registry, options: ContainerOptions) -> Self {
        let root = Arc::new(RootInner {
            registry,
            options,
            slots: SlotTable::new(),
            disposers: Mutex::new(DisposeBag::default()),
            orphaned: Mutex::new(DisposeBag::default()),
            scopes: Mutex::new(Vec::new()),
            next_scope: AtomicU64::new(1),
        });
        Self {
            inner: Arc::new(ScopeInner::root(root)),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ScopeInner>) -> Self {
        Self { inner }
    }

    #[inline]
    pub(crate) fn root(&self) -> &RootInner {
        &self.inner.root
    }

    /// Resolves `key` to its type-erased instance.
    ///
    /// Singleton keys are cached on the root, scoped keys in this container's
    /// own cache, and transient keys are built on every call. A failed
    /// instantiation caches nothing, so a later read tries again.
    ///
    /// # Errors
    ///
    /// - [`DiError::NotFound`] when `key` is registered under no lifetime
    /// - [`DiError::Circular`] when `key` is requested again while its own
    ///   factory is still running
    /// - [`DiError::DepthExceeded`] when a factory would run deeper in the
    ///   resolution chain than [`ContainerOptions::max_depth`]; cached reads
    ///   are not limited
    /// - any error returned by a factory, unchanged
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_di::{register, DiError, Registration};
    ///
    /// let container = register([("zero", Registration::from_value(0u8))]).unwrap().build();
    ///
    /// let zero = container.resolve("zero").unwrap();
    /// assert_eq!(zero.downcast_ref::<u8>(), Some(&0));
    /// assert!(matches!(container.resolve("nope"), Err(DiError::NotFound(_))));
    /// ```
    pub fn resolve(&self, key: &str) -> DiResult<Instance> {
        self.resolve_from(key, None)
    }

    pub(crate) fn resolve_from(&self, key: &str, parent: Option<&Frame<'_>>) -> DiResult<Instance> {
        let root = self.root();
        let (key, registration) = match root.registry.entry(key) {
            Some(entry) => entry,
            None => {
                tracing::debug!(key, "service not registered");
                return Err(DiError::NotFound(Key::from(key)));
            }
        };

        let frame = Frame::new(key, registration.lifetime(), parent);
        match registration.lifetime() {
            Lifetime::Singleton => self.resolve_cached(CacheId::Singletons, &frame, registration),
            Lifetime::Scoped => {
                self.resolve_cached(CacheId::Scope(self.inner.id), &frame, registration)
            }
            Lifetime::Transient => self.instantiate(&frame, registration),
        }
    }

    fn resolve_cached(
        &self,
        cache: CacheId,
        frame: &Frame<'_>,
        registration: &Registration,
    ) -> DiResult<Instance> {
        match self.root().slots.claim(cache, frame.key()) {
            Claim::Cached(instance) => {
                tracing::trace!(key = %frame.key(), lifetime = %frame.lifetime(), "cache hit");
                Ok(instance)
            }
            Claim::Cycle => {
                let path = frame.path();
                tracing::warn!(key = %frame.key(), depth = frame.depth(), "circular dependency detected");
                let error = DiError::Circular {
                    key: frame.key().clone(),
                    path,
                };
                self.root().registry.observers().failed(frame.key(), &error);
                Err(error)
            }
            Claim::Acquired(guard) => {
                let instance = self.instantiate(frame, registration)?;
                guard.fill(instance.clone());
                Ok(instance)
            }
        }
    }

    fn instantiate(&self, frame: &Frame<'_>, registration: &Registration) -> DiResult<Instance> {
        let key = frame.key();
        let lifetime = frame.lifetime();
        let max_depth = self.root().options.max_depth;
        if frame.depth() > max_depth {
            tracing::warn!(key = %key, max_depth, "resolution chain exceeded maximum depth");
            return Err(DiError::DepthExceeded(max_depth));
        }

        let observers = self.root().registry.observers();

        tracing::debug!(key = %key, lifetime = %lifetime, "instantiating service");
        let start = if observers.has_observers() {
            observers.resolving(key, lifetime);
            Some(Instant::now())
        } else {
            None
        };

        let ctx = ResolverContext::new(self, frame);
        let result = registration.instantiate(&ctx);

        match &result {
            Ok(_) => {
                tracing::debug!(key = %key, lifetime = %lifetime, "instantiated service");
                if let Some(start) = start {
                    observers.resolved(key, lifetime, start.elapsed());
                }
            }
            Err(error) => {
                tracing::debug!(key = %key, lifetime = %lifetime, error = %error, "instantiation failed");
                observers.failed(key, error);
            }
        }
        result
    }

    /// Whether `key` is registered under any lifetime.
    pub fn contains(&self, key: &str) -> bool {
        self.root().registry.contains(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<Key> {
        self.root().registry.keys()
    }

    /// Whether this is the container returned by [`Registry::build`].
    pub fn is_root(&self) -> bool {
        self.inner.is_root()
    }

    /// Options this container was built with.
    pub fn options(&self) -> &ContainerOptions {
        &self.root().options
    }

    /// Number of singleton instances built so far.
    pub fn singleton_count(&self) -> usize {
        self.root().slots.resolved_count(CacheId::Singletons)
    }

    /// Number of scoped instances this container has cached.
    pub fn scoped_count(&self) -> usize {
        self.root().slots.resolved_count(CacheId::Scope(self.inner.id))
    }

    /// Files a synchronous disposal hook with this container.
    ///
    /// Useful for instances created outside a factory, such as values passed
    /// to [`Registration::from_value`].
    pub fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.inner
            .disposers
            .lock()
            .push_sync(Box::new(move || service.dispose()));
    }

    /// Files an asynchronous disposal hook with this container.
    pub fn register_async_disposer<T: AsyncDispose>(&self, service: Arc<T>) {
        self.inner.disposers.lock().push_async(Box::new(move || -> BoxFutureUnit {
            Box::pin(async move { service.dispose().await })
        }));
    }

    pub(crate) fn push_sync_disposer(&self, owner: Lifetime, hook: SyncHook) {
        match owner {
            Lifetime::Singleton => self.root().disposers.lock().push_sync(hook),
            Lifetime::Scoped | Lifetime::Transient => self.inner.disposers.lock().push_sync(hook),
        }
    }

    pub(crate) fn push_async_disposer(&self, owner: Lifetime, hook: AsyncHook) {
        match owner {
            Lifetime::Singleton => self.root().disposers.lock().push_async(hook),
            Lifetime::Scoped | Lifetime::Transient => self.inner.disposers.lock().push_async(hook),
        }
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &str) -> DiResult<Instance> {
        self.resolve(key)
    }

    fn contains(&self, key: &str) -> bool {
        Container::contains(self, key)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("scope", &self.inner.id)
            .field("keys", &self.root().registry.len())
            .finish()
    }
}

impl Drop for RootInner {
    fn drop(&mut self) {
        let pending = self.disposers.get_mut().len() + self.orphaned.get_mut().len();
        if pending > 0 {
            tracing::warn!(
                pending,
                "container dropped with undisposed resources; call dispose_all() first"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register;
    use crate::traits::Resolver;

    #[test]
    fn test_container_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Container>();
    }

    #[test]
    fn test_counts_track_caches() {
        let container = register([
            ("one", Registration::from_value(1u8)),
            ("two", Registration::from_fn(|_| 2u8).scoped()),
            ("three", Registration::from_fn(|_| 3u8).transient()),
        ])
        .unwrap()
        .build();

        for key in ["one", "two", "three"] {
            container.resolve(key).unwrap();
        }
        assert_eq!(container.singleton_count(), 1);
        assert_eq!(container.scoped_count(), 1);

        let scope = container.scope();
        assert_eq!(scope.singleton_count(), 1);
        assert_eq!(scope.scoped_count(), 0);
    }

    #[test]
    fn test_factory_sees_frame() {
        let container = register([
            ("inner", Registration::from_fn(|ctx| (ctx.key().to_string(), ctx.depth())).transient()),
            (
                "outer",
                Registration::from_fn(|ctx| ctx.get_required::<(String, usize)>("inner")).transient(),
            ),
        ])
        .unwrap()
        .build();

        let seen = container.get_required::<Arc<(String, usize)>>("outer");
        assert_eq!(seen.0, "inner");
        assert_eq!(seen.1, 2);
    }
}
