//! Durable catalog records and the administrative write path.

pub mod service;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stash_catalog::{ItemDefinition, ItemTypeId};

use crate::owner_store::StoreError;

pub use service::{CatalogAdminError, CatalogService};

/// Durable storage of item definitions.
pub trait CatalogStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<ItemDefinition>, StoreError>;

    fn get(&self, id: &ItemTypeId) -> Result<Option<ItemDefinition>, StoreError>;

    fn put(&self, definition: ItemDefinition) -> Result<(), StoreError>;

    /// Returns whether a record was deleted.
    fn delete(&self, id: &ItemTypeId) -> Result<bool, StoreError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn load_all(&self) -> Result<Vec<ItemDefinition>, StoreError> {
        (**self).load_all()
    }

    fn get(&self, id: &ItemTypeId) -> Result<Option<ItemDefinition>, StoreError> {
        (**self).get(id)
    }

    fn put(&self, definition: ItemDefinition) -> Result<(), StoreError> {
        (**self).put(definition)
    }

    fn delete(&self, id: &ItemTypeId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }
}

/// In-memory catalog store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    records: RwLock<HashMap<ItemTypeId, ItemDefinition>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = ItemDefinition>,
    {
        let records = definitions.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self {
            records: RwLock::new(records),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn load_all(&self) -> Result<Vec<ItemDefinition>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.values().cloned().collect())
    }

    fn get(&self, id: &ItemTypeId) -> Result<Option<ItemDefinition>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.get(id).cloned())
    }

    fn put(&self, definition: ItemDefinition) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        records.insert(definition.id.clone(), definition);
        Ok(())
    }

    fn delete(&self, id: &ItemTypeId) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        Ok(records.remove(id).is_some())
    }
}
