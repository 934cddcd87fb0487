//! In-memory catalog cache with explicit bulk-load and readiness.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use stash_core::DomainError;

use crate::definition::{ItemDefinition, ItemTypeId};

/// Read-only lookup service consumed by the mutation engine.
pub trait ItemCatalog: Send + Sync {
    fn resolve(&self, id: &ItemTypeId) -> Option<ItemDefinition>;
}

impl<C> ItemCatalog for Arc<C>
where
    C: ItemCatalog + ?Sized,
{
    fn resolve(&self, id: &ItemTypeId) -> Option<ItemDefinition> {
        (**self).resolve(id)
    }
}

impl<C> ItemCatalog for &C
where
    C: ItemCatalog + ?Sized,
{
    fn resolve(&self, id: &ItemTypeId) -> Option<ItemDefinition> {
        (**self).resolve(id)
    }
}

/// Fixed catalogs for tests and tooling.
impl ItemCatalog for HashMap<ItemTypeId, ItemDefinition> {
    fn resolve(&self, id: &ItemTypeId) -> Option<ItemDefinition> {
        self.get(id).cloned()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog not ready after {waited:?}")]
    NotReady { waited: Duration },

    #[error("invalid item definition: {0}")]
    Invalid(#[from] DomainError),

    #[error("catalog lock poisoned")]
    Poisoned,
}

/// Process-wide catalog cache.
///
/// Lifecycle:
/// 1. `new()`: empty, not ready; lookups return `None`
/// 2. `load_all()`: bulk-load, then the cache is frozen and marked ready
/// 3. `upsert()` / `remove()`: administrative writes, each applied
///    atomically under the write lock
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: RwLock<HashMap<ItemTypeId, ItemDefinition>>,
    ready: Mutex<bool>,
    ready_signal: Condvar,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with `definitions` and mark it ready.
    ///
    /// All definitions are validated before anything is swapped in.
    pub fn load_all<I>(&self, definitions: I) -> Result<usize, CatalogError>
    where
        I: IntoIterator<Item = ItemDefinition>,
    {
        let mut fresh = HashMap::new();
        for def in definitions {
            def.validate()?;
            fresh.insert(def.id.clone(), def);
        }
        let count = fresh.len();

        {
            let mut entries = self.entries.write().map_err(|_| CatalogError::Poisoned)?;
            *entries = fresh;
        }

        let mut ready = self.ready.lock().map_err(|_| CatalogError::Poisoned)?;
        *ready = true;
        self.ready_signal.notify_all();

        info!(definitions = count, "item catalog loaded");
        Ok(count)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.lock().map(|r| *r).unwrap_or(false)
    }

    /// Block until the cache was loaded, at most `timeout`.
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), CatalogError> {
        let ready = self.ready.lock().map_err(|_| CatalogError::Poisoned)?;
        let (ready, _) = self
            .ready_signal
            .wait_timeout_while(ready, timeout, |loaded| !*loaded)
            .map_err(|_| CatalogError::Poisoned)?;

        if *ready {
            Ok(())
        } else {
            Err(CatalogError::NotReady { waited: timeout })
        }
    }

    /// Insert or replace one definition; returns the previous entry.
    pub fn upsert(&self, definition: ItemDefinition) -> Result<Option<ItemDefinition>, CatalogError> {
        definition.validate()?;
        let mut entries = self.entries.write().map_err(|_| CatalogError::Poisoned)?;
        debug!(item_type = %definition.id, "catalog entry written");
        Ok(entries.insert(definition.id.clone(), definition))
    }

    pub fn remove(&self, id: &ItemTypeId) -> Result<Option<ItemDefinition>, CatalogError> {
        let mut entries = self.entries.write().map_err(|_| CatalogError::Poisoned)?;
        debug!(item_type = %id, "catalog entry removed");
        Ok(entries.remove(id))
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemCatalog for CatalogCache {
    fn resolve(&self, id: &ItemTypeId) -> Option<ItemDefinition> {
        let entries = self.entries.read().ok()?;
        entries.get(id).cloned()
    }
}
