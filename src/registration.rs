//! Service registration types.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::traits::ResolverCore;

/// Type-erased, shareable service instance as stored in the caches.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type Ctor = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<Instance> + Send + Sync>;

/// A type that knows how to construct itself from the container.
///
/// This is the constructor-injection counterpart of [`Registration::from_fn`]:
/// `Registration::from_type::<T>()` calls [`Injectable::inject`] with the live
/// resolver context every time an instance is needed.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{register, DiResult, Injectable, Registration, Resolver, ResolverContext};
/// use std::sync::Arc;
///
/// struct Config { url: String }
///
/// struct Client { config: Arc<Config> }
///
/// impl Injectable for Client {
///     const DEPENDENCIES: &'static [&'static str] = &["config"];
///
///     fn inject(ctx: &ResolverContext<'_>) -> DiResult<Self> {
///         Ok(Client { config: ctx.get::<Config>("config")? })
///     }
/// }
///
/// let container = register([
///     ("config", Registration::from_value(Config { url: "http://localhost".into() })),
///     ("client", Registration::from_type::<Client>()),
/// ])
/// .unwrap()
/// .build();
///
/// assert_eq!(container.get_required::<Client>("client").config.url, "http://localhost");
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Keys this type resolves while being injected. Used only by validation.
    const DEPENDENCIES: &'static [&'static str] = &[];

    /// Builds an instance, resolving dependencies through `ctx`.
    fn inject(ctx: &ResolverContext<'_>) -> DiResult<Self>;
}

/// Description of how to produce one service instance.
///
/// A registration pairs a [`Lifetime`] with a factory. It is immutable:
/// [`singleton`](Self::singleton), [`scoped`](Self::scoped),
/// [`transient`](Self::transient) and [`depends_on`](Self::depends_on) all
/// return a new registration sharing the same factory. Every constructor
/// starts out as a singleton.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{Lifetime, Registration};
///
/// let base = Registration::from_fn(|_| 42u32);
/// let scoped = base.scoped();
///
/// assert_eq!(base.lifetime(), Lifetime::Singleton);
/// assert_eq!(scoped.lifetime(), Lifetime::Scoped);
/// ```
#[derive(Clone)]
pub struct Registration {
    lifetime: Lifetime,
    ctor: Ctor,
    dependencies: Arc<[Key]>,
    type_name: &'static str,
}

impl Registration {
    fn new(ctor: Ctor, type_name: &'static str) -> Self {
        Self {
            lifetime: Lifetime::Singleton,
            ctor,
            dependencies: Arc::from(Vec::<Key>::new()),
            type_name,
        }
    }

    /// A registration that always yields `value`, ignoring its dependencies.
    ///
    /// The value is wrapped in an `Arc` once, so every lifetime hands out the
    /// very same instance.
    pub fn from_value<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let instance: Instance = Arc::new(value);
        Self::new(
            Arc::new(move |_: &ResolverContext<'_>| -> DiResult<Instance> { Ok(instance.clone()) }),
            type_name::<T>(),
        )
    }

    /// A registration whose instances are produced by calling `factory`.
    pub fn from_fn<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> T + Send + Sync + 'static,
    {
        Self::new(
            Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<Instance> {
                Ok(Arc::new(factory(ctx)))
            }),
            type_name::<T>(),
        )
    }

    /// Like [`from_fn`](Self::from_fn) for factories that can fail.
    ///
    /// An error returned by the factory propagates unchanged to whoever
    /// triggered the resolution, and nothing is cached.
    pub fn try_from_fn<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::new(
            Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<Instance> {
                Ok(Arc::new(factory(ctx)?))
            }),
            type_name::<T>(),
        )
    }

    /// A registration that constructs `T` through [`Injectable::inject`].
    ///
    /// Declared dependencies are taken from [`Injectable::DEPENDENCIES`].
    pub fn from_type<T: Injectable>() -> Self {
        let mut reg = Self::new(
            Arc::new(|ctx: &ResolverContext<'_>| -> DiResult<Instance> {
                Ok(Arc::new(T::inject(ctx)?))
            }),
            type_name::<T>(),
        );
        reg.dependencies = T::DEPENDENCIES.iter().map(|&name| Key::from(name)).collect();
        reg
    }

    /// A registration that yields whatever `target` resolves to.
    ///
    /// The alias hands out the target's own `Arc`, so both keys observe the
    /// same instance whenever the target is cached.
    ///
    /// ```rust
    /// use keyed_di::{register, Registration};
    /// use std::sync::Arc;
    ///
    /// let container = register([
    ///     ("primary", Registration::from_fn(|_| String::from("db"))),
    ///     ("fallback", Registration::alias("primary")),
    /// ])
    /// .unwrap()
    /// .build();
    ///
    /// let a = container.resolve("primary").unwrap();
    /// let b = container.resolve("fallback").unwrap();
    /// assert!(Arc::ptr_eq(&a, &b));
    /// ```
    pub fn alias(target: impl Into<Key>) -> Self {
        let target = target.into();
        let dependencies: Arc<[Key]> = Arc::from(vec![target.clone()]);
        let mut reg = Self::new(
            Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<Instance> {
                ctx.resolve_any(target.as_str())
            }),
            "alias",
        );
        reg.dependencies = dependencies;
        reg
    }

    /// Same factory, singleton lifetime.
    pub fn singleton(&self) -> Self {
        self.with_lifetime(Lifetime::Singleton)
    }

    /// Same factory, scoped lifetime.
    pub fn scoped(&self) -> Self {
        self.with_lifetime(Lifetime::Scoped)
    }

    /// Same factory, transient lifetime.
    pub fn transient(&self) -> Self {
        self.with_lifetime(Lifetime::Transient)
    }

    /// Same factory with the given lifetime.
    pub fn with_lifetime(&self, lifetime: Lifetime) -> Self {
        Self {
            lifetime,
            ..self.clone()
        }
    }

    /// Same factory with additional declared dependencies.
    ///
    /// Declarations do not change how resolution behaves; they feed
    /// [`Registry::validate`](crate::Registry::validate) and
    /// [`Registry::unresolved_keys`](crate::Registry::unresolved_keys).
    pub fn depends_on<I, K>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let mut dependencies = self.dependencies.to_vec();
        for key in keys {
            let key = key.into();
            if !dependencies.contains(&key) {
                dependencies.push(key);
            }
        }
        Self {
            dependencies: dependencies.into(),
            ..self.clone()
        }
    }

    /// Lifetime this registration is filed under.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Declared dependency keys.
    pub fn dependencies(&self) -> &[Key] {
        &self.dependencies
    }

    /// Name of the produced type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub(crate) fn instantiate(&self, ctx: &ResolverContext<'_>) -> DiResult<Instance> {
        (self.ctor)(ctx)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("lifetime", &self.lifetime)
            .field("type_name", &self.type_name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
