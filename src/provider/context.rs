//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies.

use std::sync::Arc;

use crate::internal::{BoxFutureUnit, Frame};
use crate::registration::Instance;
use crate::traits::{AsyncDispose, Dispose, ResolverCore};
use crate::{Container, DiResult, Key, Lifetime};

/// Context passed to factory functions for resolving dependencies.
///
/// The context gives a factory the whole live container: every registered
/// key is reachable through it, not only declared dependencies. Resolving
/// through the context (rather than through [`container`](Self::container))
/// extends the current resolution chain, which is what lets cycles report
/// their full path and keeps the depth guard in effect.
///
/// # Examples
///
/// ```
/// use keyed_di::{register, Registration, Resolver};
///
/// let container = register([
///     ("a", Registration::from_value("a".to_string())),
///     ("b", Registration::from_value("b".to_string())),
///     ("c", Registration::from_fn(|deps| {
///         format!("{}{}", deps.get_required::<String>("a"), deps.get_required::<String>("b"))
///     })),
/// ])
/// .unwrap()
/// .build();
///
/// assert_eq!(*container.get_required::<String>("c"), "ab");
/// ```
pub struct ResolverContext<'a> {
    container: &'a Container,
    frame: &'a Frame<'a>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(container: &'a Container, frame: &'a Frame<'a>) -> Self {
        Self { container, frame }
    }

    /// The container the triggering read was made on.
    ///
    /// For a singleton this may be a scope; scoped keys requested from here
    /// land in that scope's cache.
    pub fn container(&self) -> &'a Container {
        self.container
    }

    /// Creates a new scope derived from the current container.
    pub fn scope(&self) -> Container {
        self.container.scope()
    }

    /// Key being instantiated.
    pub fn key(&self) -> &Key {
        self.frame.key()
    }

    /// Lifetime of the key being instantiated.
    pub fn lifetime(&self) -> Lifetime {
        self.frame.lifetime()
    }

    /// Length of the resolution chain, 1 for a top-level read.
    pub fn depth(&self) -> usize {
        self.frame.depth()
    }

    /// Files a synchronous disposal hook with the owner of the instance
    /// being built: the root for singletons, the current scope otherwise.
    pub fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.container
            .push_sync_disposer(self.lifetime(), Box::new(move || service.dispose()));
    }

    /// Files an asynchronous disposal hook, routed like
    /// [`register_disposer`](Self::register_disposer).
    pub fn register_async_disposer<T: AsyncDispose>(&self, service: Arc<T>) {
        self.container.push_async_disposer(
            self.lifetime(),
            Box::new(move || -> BoxFutureUnit { Box::pin(async move { service.dispose().await }) }),
        );
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &str) -> DiResult<Instance> {
        self.container.resolve_from(key, Some(self.frame))
    }

    fn contains(&self, key: &str) -> bool {
        self.container.contains(key)
    }
}
