//! Resolver traits for service resolution.

use std::any::type_name;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::Instance;

/// Core resolver trait for object-safe service resolution.
///
/// Most users should use the [`Resolver`] trait instead, which provides typed
/// methods built on top of this trait.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` to its type-erased instance.
    ///
    /// Singleton and scoped instances come from their cache once built; a
    /// transient key invokes its factory on every call.
    fn resolve_any(&self, key: &str) -> DiResult<Instance>;

    /// Whether `key` is registered under any lifetime.
    fn contains(&self, key: &str) -> bool;
}

/// Typed resolution on top of [`ResolverCore`].
///
/// Implemented by [`Container`](crate::Container) and by the
/// [`ResolverContext`](crate::ResolverContext) handed to factories, so the
/// same calls work outside and inside a factory.
///
/// # Examples
///
/// ```
/// use keyed_di::{register, Registration, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let container = register([
///     ("port", Registration::from_value(8080u16)),
///     ("greeter", Registration::from_value(Arc::new(English) as Arc<dyn Greeter>)),
/// ])
/// .unwrap()
/// .build();
///
/// assert_eq!(*container.get_required::<u16>("port"), 8080);
/// assert_eq!(container.get_required_trait::<dyn Greeter>("greeter").greet(), "hello");
/// assert!(container.get_optional::<u16>("missing").unwrap().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `key` and downcasts the instance to `T`.
    ///
    /// Fails with [`DiError::TypeMismatch`] when the instance is not a `T`.
    fn get<T: Send + Sync + 'static>(&self, key: &str) -> DiResult<Arc<T>> {
        self.resolve_any(key)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch {
                key: key.into(),
                expected: type_name::<T>(),
            })
    }

    /// Resolves `key`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error's message.
    fn get_required<T: Send + Sync + 'static>(&self, key: &str) -> Arc<T> {
        self.get::<T>(key)
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", key, e))
    }

    /// Resolves `key` if it is registered.
    ///
    /// Returns `Ok(None)` only when `key` itself is unknown. Failures further
    /// down the dependency graph still surface as errors.
    fn get_optional<T: Send + Sync + 'static>(&self, key: &str) -> DiResult<Option<Arc<T>>> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.get::<T>(key).map(Some)
    }

    /// Resolves a trait object registered as `Arc<T>`.
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, key: &str) -> DiResult<Arc<T>> {
        let instance = self.resolve_any(key)?;
        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| DiError::TypeMismatch {
                key: key.into(),
                expected: type_name::<Arc<T>>(),
            })
    }

    /// Resolves a trait object, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error's message.
    fn get_required_trait<T: ?Sized + Send + Sync + 'static>(&self, key: &str) -> Arc<T> {
        self.get_trait::<T>(key)
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", key, e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
