use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

use stash_catalog::{CatalogCache, CatalogError, ItemDefinition, ItemTypeId};
use stash_core::DomainError;

use crate::owner_store::StoreError;

use super::CatalogStore;

#[derive(Debug, Error)]
pub enum CatalogAdminError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("catalog store failed: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CatalogError),
}

/// Administrative catalog writes.
///
/// Each write goes to the durable store first and is applied to the cache
/// only once the store accepted it. Writes are serialized so the cache never
/// observes two admin writes interleaved.
pub struct CatalogService<S> {
    store: S,
    cache: Arc<CatalogCache>,
    writer: Mutex<()>,
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S, cache: Arc<CatalogCache>) -> Self {
        Self {
            store,
            cache,
            writer: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Bulk-load every stored definition into the cache and mark it ready.
    pub fn load(&self) -> Result<usize, CatalogAdminError> {
        let _writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        let definitions = self.store.load_all()?;
        Ok(self.cache.load_all(definitions)?)
    }

    pub fn create(&self, definition: ItemDefinition) -> Result<(), CatalogAdminError> {
        definition.validate()?;
        let _writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        if self.store.get(&definition.id)?.is_some() {
            return Err(DomainError::conflict(format!("item type '{}' already exists", definition.id)).into());
        }
        self.write(definition)
    }

    pub fn update(&self, definition: ItemDefinition) -> Result<(), CatalogAdminError> {
        definition.validate()?;
        let _writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        if self.store.get(&definition.id)?.is_none() {
            return Err(DomainError::not_found().into());
        }
        self.write(definition)
    }

    pub fn remove(&self, id: &ItemTypeId) -> Result<(), CatalogAdminError> {
        let _writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        if !self.store.delete(id)? {
            return Err(DomainError::not_found().into());
        }
        self.cache.remove(id)?;
        info!(item_type = %id, "item definition removed");
        Ok(())
    }

    fn write(&self, definition: ItemDefinition) -> Result<(), CatalogAdminError> {
        let id = definition.id.clone();
        self.store.put(definition.clone())?;
        self.cache.upsert(definition)?;
        info!(item_type = %id, "item definition written");
        Ok(())
    }
}
