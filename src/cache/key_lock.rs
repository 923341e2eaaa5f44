//! Per-key exclusivity with bounded bookkeeping.
//!
//! Each key being resolved gets one slot holding an async mutex and a
//! participant count. Callers [`register`](KeyLocks::register) before
//! waiting on the mutex; the returned [`Participant`] deregisters on drop
//! (including when its future is cancelled) and the last participant out
//! removes the slot. The map therefore only ever holds keys that some
//! caller is currently resolving.
//!
//! Registration and deregistration both go through `DashMap::entry`, which
//! holds the shard lock for the whole check-and-update, so a participant
//! joining a slot can never race with the slot being removed.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, MutexGuard};

struct Slot {
    lock: Arc<Mutex<()>>,
    participants: usize,
}

/// Tracking map of live per-key locks.
#[derive(Default)]
pub(crate) struct KeyLocks {
    slots: DashMap<String, Slot>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Join (or start) the wave of callers resolving `key`.
    ///
    /// Concurrent callers converge on the same lock instance.
    pub(crate) fn register(&self, key: &str) -> Participant<'_> {
        let lock = match self.slots.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                slot.participants += 1;
                Arc::clone(&slot.lock)
            }
            Entry::Vacant(vacant) => {
                let lock = Arc::new(Mutex::new(()));
                vacant.insert(Slot {
                    lock: Arc::clone(&lock),
                    participants: 1,
                });
                lock
            }
        };
        Participant {
            locks: self,
            key: key.to_owned(),
            lock,
        }
    }

    /// Number of keys with a live lock.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn deregister(&self, key: &str, lock: &Arc<Mutex<()>>) {
        if let Entry::Occupied(mut occupied) = self.slots.entry(key.to_owned()) {
            // Only touch the slot this participant registered with.
            if !Arc::ptr_eq(&occupied.get().lock, lock) {
                return;
            }
            let slot = occupied.get_mut();
            slot.participants -= 1;
            if slot.participants == 0 {
                occupied.remove();
            }
        }
    }
}

/// A caller's membership in the wave resolving one key.
pub(crate) struct Participant<'a> {
    locks: &'a KeyLocks,
    key: String,
    lock: Arc<Mutex<()>>,
}

impl Participant<'_> {
    /// Wait for exclusive access to the key.
    ///
    /// The guard borrows the participant, so the lock is always released
    /// before the participant deregisters.
    pub(crate) async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for Participant<'_> {
    fn drop(&mut self) {
        self.locks.deregister(&self.key, &self.lock);
    }
}
