//! Caching subsystem.
//!
//! [`StampedeCache`] memoizes provider output keyed on the canonical
//! request key. It bounds memory by entry count and write TTL, and lets at
//! most one caller compute a missing key at a time. The per-key lock
//! bookkeeping lives in [`key_lock`] and only holds keys that are
//! currently being resolved.
//!
//! The cache is in-process only. When shared caching across instances is
//! needed, the insertion point is
//! [`RecipeOrchestrator`](crate::RecipeOrchestrator), which only talks to
//! the cache through `get_or_compute`.

mod key_lock;
pub mod stampede;

pub use stampede::{CacheConfig, MAX_EXPIRE_AFTER_WRITE, StampedeCache};
