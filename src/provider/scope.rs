//! Scope creation and lifecycle management.
//!
//! A scope is a [`Container`] with its own scoped cache and its own disposal
//! hooks. Singleton resolution is forwarded to the root's shared state.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::{Container, RootInner};
use crate::internal::{DisposeBag, ScopeId, ROOT_SCOPE};

pub(crate) struct ScopeInner {
    pub(crate) id: ScopeId,
    pub(crate) root: Arc<RootInner>,
    /// Hooks of scoped and transient instances built through this scope.
    pub(crate) disposers: Mutex<DisposeBag>,
}

impl ScopeInner {
    pub(crate) fn root(root: Arc<RootInner>) -> Self {
        Self {
            id: ROOT_SCOPE,
            root,
            disposers: Mutex::new(DisposeBag::default()),
        }
    }

    #[inline]
    pub(crate) fn is_root(&self) -> bool {
        self.id == ROOT_SCOPE
    }

    fn run_sync(&self) {
        let mut hooks = self.disposers.lock().take_sync();
        hooks.run_all_sync_reverse();
    }

    async fn run_async(&self) {
        let mut hooks = std::mem::take(&mut *self.disposers.lock());
        hooks.run_all_async_reverse().await;
        hooks.run_all_sync_reverse();
    }
}

impl Container {
    /// Creates a new scope.
    ///
    /// The scope shares the singleton cache of the ultimate root but starts
    /// with an empty scoped cache of its own. Scopes nest: a scope of a scope
    /// is independent from both its parent and its siblings.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_di::{register, Registration, Resolver};
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    ///
    /// let counter = Arc::new(AtomicU32::new(0));
    /// let c = counter.clone();
    ///
    /// let container = register([(
    ///     "request_id",
    ///     Registration::from_fn(move |_| format!("req-{}", c.fetch_add(1, Ordering::SeqCst) + 1)).scoped(),
    /// )])
    /// .unwrap()
    /// .build();
    ///
    /// let scope1 = container.scope();
    /// let scope2 = container.scope();
    ///
    /// let req1a = scope1.get_required::<String>("request_id");
    /// let req1b = scope1.get_required::<String>("request_id");
    /// let req2 = scope2.get_required::<String>("request_id");
    ///
    /// assert!(Arc::ptr_eq(&req1a, &req1b));
    /// assert!(!Arc::ptr_eq(&req1a, &req2));
    /// assert_eq!(counter.load(Ordering::SeqCst), 2);
    /// ```
    pub fn scope(&self) -> Container {
        let root = self.inner.root.clone();
        let id = root.next_scope.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::new(ScopeInner {
            id,
            root,
            disposers: Mutex::new(DisposeBag::default()),
        });

        {
            let mut scopes = inner.root.scopes.lock();
            scopes.retain(|scope| scope.strong_count() > 0);
            scopes.push(Arc::downgrade(&inner));
        }
        tracing::trace!(scope = id, "scope created");

        Container::from_inner(inner)
    }

    /// Runs this container's synchronous disposal hooks in LIFO order.
    ///
    /// Only hooks filed with this container are run: on a scope, those of
    /// its scoped and transient instances. Async hooks stay pending for
    /// [`dispose_async`](Self::dispose_async).
    pub fn dispose(&self) {
        self.inner.run_sync();
    }

    /// Runs this container's async hooks, then its sync hooks, each in LIFO
    /// order.
    pub async fn dispose_async(&self) {
        self.inner.run_async().await;
    }

    /// Tears down everything reachable from the root.
    ///
    /// On the root this disposes every live scope (newest first), then the
    /// hooks left behind by scopes dropped without disposal, then the root's
    /// own scoped hooks, then the singleton hooks. On a scope it is
    /// the same as [`dispose`](Self::dispose).
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_di::{register, Dispose, Registration, Resolver};
    /// use std::sync::{Arc, Mutex};
    ///
    /// struct Tracked(&'static str, Arc<Mutex<Vec<&'static str>>>);
    ///
    /// impl Dispose for Tracked {
    ///     fn dispose(&self) {
    ///         self.1.lock().unwrap().push(self.0);
    ///     }
    /// }
    ///
    /// let log = Arc::new(Mutex::new(Vec::new()));
    /// let (l1, l2) = (log.clone(), log.clone());
    ///
    /// let container = register([
    ///     ("global", Registration::from_fn(move |ctx| {
    ///         let t = Arc::new(Tracked("global", l1.clone()));
    ///         ctx.register_disposer(t.clone());
    ///         t
    ///     })),
    ///     ("local", Registration::from_fn(move |ctx| {
    ///         let t = Arc::new(Tracked("local", l2.clone()));
    ///         ctx.register_disposer(t.clone());
    ///         t
    ///     }).scoped()),
    /// ])
    /// .unwrap()
    /// .build();
    ///
    /// let scope = container.scope();
    /// scope.get_required::<Arc<Tracked>>("global");
    /// scope.get_required::<Arc<Tracked>>("local");
    ///
    /// container.dispose_all();
    /// assert_eq!(*log.lock().unwrap(), vec!["local", "global"]);
    /// ```
    pub fn dispose_all(&self) {
        if !self.is_root() {
            self.dispose();
            return;
        }
        for scope in self.live_scopes() {
            scope.run_sync();
        }
        let mut orphaned = self.root().orphaned.lock().take_sync();
        orphaned.run_all_sync_reverse();
        self.inner.run_sync();
        let mut singletons = self.root().disposers.lock().take_sync();
        singletons.run_all_sync_reverse();
    }

    /// Async counterpart of [`dispose_all`](Self::dispose_all): every owner
    /// runs its async hooks and then its sync hooks.
    pub async fn dispose_all_async(&self) {
        if !self.is_root() {
            self.dispose_async().await;
            return;
        }
        for scope in self.live_scopes() {
            scope.run_async().await;
        }
        let mut orphaned = std::mem::take(&mut *self.root().orphaned.lock());
        orphaned.run_all_async_reverse().await;
        orphaned.run_all_sync_reverse();
        self.inner.run_async().await;
        let mut singletons = std::mem::take(&mut *self.root().disposers.lock());
        singletons.run_all_async_reverse().await;
        singletons.run_all_sync_reverse();
    }

    /// Number of disposal hooks waiting on this container.
    pub fn pending_disposers(&self) -> usize {
        self.inner.disposers.lock().len()
    }

    /// Live scopes of this root, newest first.
    fn live_scopes(&self) -> Vec<Arc<ScopeInner>> {
        let scopes = self.root().scopes.lock();
        scopes.iter().rev().filter_map(Weak::upgrade).collect()
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.root.slots.remove_scope(self.id);

        let pending = self.disposers.get_mut().len();
        if self.is_root() {
            if pending > 0 {
                tracing::warn!(
                    pending,
                    "root container dropped with undisposed scoped resources; call dispose_all() first"
                );
            }
            return;
        }

        // Instances can outlive their scope; the root's teardown still owns their hooks.
        if pending > 0 {
            let hooks = std::mem::take(self.disposers.get_mut());
            self.root.orphaned.lock().append(hooks);
            tracing::debug!(scope = self.id, pending, "scope dropped undisposed; hooks moved to root");
        }
        tracing::trace!(scope = self.id, "scope dropped");
    }
}
