//! Item template catalog.
//!
//! Definitions are bulk-loaded once at startup, frozen, and afterwards only
//! changed through administrative writes applied to the cache under a single
//! writer. The mutation engine sees the catalog through [`ItemCatalog`].

pub mod cache;
pub mod definition;

pub use cache::{CatalogCache, CatalogError, ItemCatalog};
pub use definition::{ItemDefinition, ItemTypeId, Restrictions};
