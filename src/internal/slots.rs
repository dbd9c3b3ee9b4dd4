//! Instance caches shared by a root container and all of its scopes.
//!
//! Every cache slot moves through `Unresolved -> Resolving -> Resolved`.
//! An absent entry is `Unresolved`; a failed instantiation removes the
//! `Resolving` entry again so the key can be retried later.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::registration::Instance;
use crate::Key;

pub(crate) type ScopeId = u64;

/// Scope id of the root container's own scoped cache.
pub(crate) const ROOT_SCOPE: ScopeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CacheId {
    Singletons,
    Scope(ScopeId),
}

enum Slot {
    Resolving(ThreadId),
    Resolved(Instance),
}

#[derive(Default)]
struct TableState {
    singletons: HashMap<Key, Slot>,
    scopes: HashMap<ScopeId, HashMap<Key, Slot>>,
    /// Slot each blocked thread is waiting for.
    waiting: HashMap<ThreadId, (CacheId, Key)>,
}

impl TableState {
    fn slot(&self, cache: CacheId, key: &Key) -> Option<&Slot> {
        match cache {
            CacheId::Singletons => self.singletons.get(key),
            CacheId::Scope(id) => self.scopes.get(&id)?.get(key),
        }
    }

    fn cache_mut(&mut self, cache: CacheId) -> &mut HashMap<Key, Slot> {
        match cache {
            CacheId::Singletons => &mut self.singletons,
            CacheId::Scope(id) => self.scopes.entry(id).or_default(),
        }
    }

    fn owner(&self, cache: CacheId, key: &Key) -> Option<ThreadId> {
        match self.slot(cache, key) {
            Some(Slot::Resolving(owner)) => Some(*owner),
            _ => None,
        }
    }

    /// Whether `owner` is, directly or through other blocked threads,
    /// waiting on a slot held by `me`.
    fn waits_on(&self, owner: ThreadId, me: ThreadId) -> bool {
        let mut current = owner;
        for _ in 0..=self.waiting.len() {
            if current == me {
                return true;
            }
            let next = self
                .waiting
                .get(&current)
                .and_then(|(cache, key)| self.owner(*cache, key));
            match next {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }
}

/// Outcome of trying to take a slot.
pub(crate) enum Claim<'t> {
    /// The slot already holds an instance.
    Cached(Instance),
    /// The caller now owns the slot and must fill it or drop the guard.
    Acquired(SlotGuard<'t>),
    /// Taking the slot would re-enter an instantiation that cannot finish
    /// before this one does.
    Cycle,
}

#[derive(Default)]
pub(crate) struct SlotTable {
    state: Mutex<TableState>,
    settled: Condvar,
}

impl SlotTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reads or reserves the slot for `key` in `cache`.
    ///
    /// A slot reserved by another thread is waited on until it settles,
    /// unless waiting would close a wait-for cycle.
    pub(crate) fn claim(&self, cache: CacheId, key: &Key) -> Claim<'_> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        loop {
            let owner = match state.slot(cache, key) {
                Some(Slot::Resolved(instance)) => return Claim::Cached(instance.clone()),
                Some(Slot::Resolving(owner)) => *owner,
                None => {
                    state.cache_mut(cache).insert(key.clone(), Slot::Resolving(me));
                    return Claim::Acquired(SlotGuard {
                        table: self,
                        cache,
                        key: Some(key.clone()),
                    });
                }
            };

            if owner == me || state.waits_on(owner, me) {
                return Claim::Cycle;
            }

            state.waiting.insert(me, (cache, key.clone()));
            self.settled.wait(&mut state);
            state.waiting.remove(&me);
        }
    }

    /// Drops the scoped cache of a scope that no longer exists.
    pub(crate) fn remove_scope(&self, id: ScopeId) {
        // Instances may own scopes of their own, so drop them unlocked.
        let removed = self.state.lock().scopes.remove(&id);
        drop(removed);
    }

    /// Number of resolved instances held in `cache`.
    pub(crate) fn resolved_count(&self, cache: CacheId) -> usize {
        let state = self.state.lock();
        let slots = match cache {
            CacheId::Singletons => Some(&state.singletons),
            CacheId::Scope(id) => state.scopes.get(&id),
        };
        slots.map_or(0, |slots| {
            slots
                .values()
                .filter(|slot| matches!(slot, Slot::Resolved(_)))
                .count()
        })
    }
}

/// Ownership of a `Resolving` slot.
///
/// Dropping the guard without [`fill`](Self::fill) returns the slot to
/// `Unresolved`, which is what happens when a factory fails or panics.
pub(crate) struct SlotGuard<'t> {
    table: &'t SlotTable,
    cache: CacheId,
    key: Option<Key>,
}

impl SlotGuard<'_> {
    pub(crate) fn fill(mut self, instance: Instance) {
        if let Some(key) = self.key.take() {
            self.table
                .state
                .lock()
                .cache_mut(self.cache)
                .insert(key, Slot::Resolved(instance));
            self.table.settled.notify_all();
        }
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            {
                let mut state = self.table.state.lock();
                let slots = match self.cache {
                    CacheId::Singletons => Some(&mut state.singletons),
                    CacheId::Scope(id) => state.scopes.get_mut(&id),
                };
                if let Some(slots) = slots {
                    slots.remove(&key);
                }
            }
            self.table.settled.notify_all();
        }
    }
}
