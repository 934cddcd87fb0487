//! Infrastructure layer: owner persistence, catalog administration, the
//! per-owner inventory adapters and background workers.

pub mod catalog;
pub mod config;
pub mod locks;
pub mod owner_store;
pub mod service;
pub mod workers;


pub use catalog::{CatalogAdminError, CatalogService, CatalogStore, InMemoryCatalogStore};
pub use config::{ConfigError, StashConfig};
pub use locks::OwnerLocks;
pub use owner_store::{InMemoryOwnerStore, OwnerKind, OwnerRecord, OwnerStore, StoreError};
pub use service::{DecayReport, InventoryHandle, InventoryService, OwnerRef, ServiceError, ServiceResult};
pub use workers::{DecayWorker, WorkerHandle};
