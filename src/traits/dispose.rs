//! Disposal traits for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Hooks are registered from inside a factory with
/// [`ResolverContext::register_disposer`](crate::ResolverContext::register_disposer)
/// and run in LIFO order when their owner is disposed.
///
/// # Examples
///
/// ```
/// use keyed_di::{register, Dispose, Registration, Resolver};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct Cache {
///     flushed: AtomicBool,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         self.flushed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let container = register([(
///     "cache",
///     Registration::from_fn(|ctx| {
///         let cache = Arc::new(Cache { flushed: AtomicBool::new(false) });
///         ctx.register_disposer(cache.clone());
///         cache
///     })
///     .scoped(),
/// )])
/// .unwrap()
/// .build();
///
/// let scope = container.scope();
/// let cache = scope.get_required::<Arc<Cache>>("cache");
/// scope.dispose();
/// assert!(cache.flushed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for asynchronous resource disposal.
///
/// Async hooks only run through the `*_async` teardown methods, where they
/// run before the sync hooks of the same owner.
///
/// # Examples
///
/// ```
/// use keyed_di::{register, AsyncDispose, Registration, Resolver};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) {
///         println!("Closing database connection: {}", self.connection_id);
///     }
/// }
///
/// # async fn example() {
/// let container = register([(
///     "db",
///     Registration::from_fn(|ctx| {
///         let client = Arc::new(DatabaseClient { connection_id: "conn_123".to_string() });
///         ctx.register_async_disposer(client.clone());
///         client
///     }),
/// )])
/// .unwrap()
/// .build();
///
/// container.get_required::<Arc<DatabaseClient>>("db");
/// container.dispose_all_async().await;
/// # }
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self);
}
