//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod dispose_bag;
pub(crate) mod slots;

pub(crate) use circular::Frame;
pub(crate) use dispose_bag::{AsyncHook, BoxFutureUnit, DisposeBag, SyncHook};
pub(crate) use slots::{CacheId, Claim, ScopeId, SlotTable, ROOT_SCOPE};
