use std::sync::Arc;

use thiserror::Error;

use stash_core::{ExpectedVersion, OwnerId};

use super::record::{OwnerKind, OwnerRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key/document store for owner records.
///
/// Implementations assign versions: `create` stores version 1 and every
/// successful `update` increments it. `update` must reject a write whose
/// expectation does not match the stored version. `create` rejects a second
/// storage with a name already in use.
pub trait OwnerStore: Send + Sync {
    fn get(&self, kind: OwnerKind, id: OwnerId) -> Result<Option<OwnerRecord>, StoreError>;

    /// Identity resolution by display name (named storages).
    fn find_by_name(&self, kind: OwnerKind, name: &str) -> Result<Option<OwnerRecord>, StoreError>;

    fn create(&self, record: OwnerRecord) -> Result<OwnerRecord, StoreError>;

    fn update(&self, record: OwnerRecord, expected: ExpectedVersion) -> Result<OwnerRecord, StoreError>;

    fn list(&self) -> Result<Vec<OwnerRecord>, StoreError>;
}

impl<S> OwnerStore for Arc<S>
where
    S: OwnerStore + ?Sized,
{
    fn get(&self, kind: OwnerKind, id: OwnerId) -> Result<Option<OwnerRecord>, StoreError> {
        (**self).get(kind, id)
    }

    fn find_by_name(&self, kind: OwnerKind, name: &str) -> Result<Option<OwnerRecord>, StoreError> {
        (**self).find_by_name(kind, name)
    }

    fn create(&self, record: OwnerRecord) -> Result<OwnerRecord, StoreError> {
        (**self).create(record)
    }

    fn update(&self, record: OwnerRecord, expected: ExpectedVersion) -> Result<OwnerRecord, StoreError> {
        (**self).update(record, expected)
    }

    fn list(&self) -> Result<Vec<OwnerRecord>, StoreError> {
        (**self).list()
    }
}
