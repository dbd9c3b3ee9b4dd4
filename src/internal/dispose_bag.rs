//! Disposal hooks owned by a container.

use std::future::Future;
use std::pin::Pin;

pub(crate) type BoxFutureUnit = Pin<Box<dyn Future<Output = ()> + Send>>;

pub(crate) type SyncHook = Box<dyn FnOnce() + Send>;

pub(crate) type AsyncHook = Box<dyn FnOnce() -> BoxFutureUnit + Send>;

/// Disposal hooks run in LIFO order.
///
/// Async hooks are run before sync hooks by the async teardown path; the
/// sync path only drains sync hooks.
#[derive(Default)]
pub(crate) struct DisposeBag {
    sync: Vec<SyncHook>,
    asyncs: Vec<AsyncHook>,
}

impl DisposeBag {
    pub(crate) fn push_sync(&mut self, hook: SyncHook) {
        self.sync.push(hook);
    }

    pub(crate) fn push_async(&mut self, hook: AsyncHook) {
        self.asyncs.push(hook);
    }

    /// Moves every hook of `other` on top of this bag, keeping their order.
    pub(crate) fn append(&mut self, mut other: DisposeBag) {
        self.sync.append(&mut other.sync);
        self.asyncs.append(&mut other.asyncs);
    }

    /// Removes and returns the sync hooks, keeping async ones in place.
    pub(crate) fn take_sync(&mut self) -> DisposeBag {
        DisposeBag {
            sync: std::mem::take(&mut self.sync),
            asyncs: Vec::new(),
        }
    }

    pub(crate) fn run_all_sync_reverse(&mut self) {
        while let Some(hook) = self.sync.pop() {
            hook();
        }
    }

    pub(crate) async fn run_all_async_reverse(&mut self) {
        while let Some(hook) = self.asyncs.pop() {
            hook().await;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sync.len() + self.asyncs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.asyncs.is_empty()
    }
}
