//! Per-owner mutation serialization.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// One mutex per owner key.
///
/// Holding an owner's slot across fetch → compute → persist turns the
/// read-modify-write into a critical section for that owner only; other
/// owners proceed in parallel.
#[derive(Debug)]
pub struct OwnerLocks<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for OwnerLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> OwnerLocks<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `key`, created on first use.
    pub fn slot(&self, key: &K) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.entry(key.clone()).or_default().clone()
    }

    /// Give back a slot taken with [`slot`](Self::slot).
    ///
    /// The entry is dropped when no other caller holds or waits on it.
    pub fn release(&self, key: &K, slot: Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        drop(slot);
        if slots.get(key).is_some_and(|s| Arc::strong_count(s) == 1) {
            slots.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock a slot, recovering from poisoning (the guarded data is `()`).
pub fn hold(slot: &Mutex<()>) -> MutexGuard<'_, ()> {
    slot.lock().unwrap_or_else(|p| p.into_inner())
}
