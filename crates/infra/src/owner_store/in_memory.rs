use std::collections::HashMap;
use std::sync::RwLock;

use stash_core::{ExpectedVersion, OwnerId};

use super::record::{OwnerKind, OwnerRecord};
use super::r#trait::{OwnerStore, StoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    kind: OwnerKind,
    id: OwnerId,
}

impl RecordKey {
    fn of(record: &OwnerRecord) -> Self {
        Self {
            kind: record.kind,
            id: record.id,
        }
    }
}

/// In-memory owner store.
///
/// Intended for tests/dev. Name lookups scan the map.
#[derive(Debug, Default)]
pub struct InMemoryOwnerStore {
    records: RwLock<HashMap<RecordKey, OwnerRecord>>,
}

impl InMemoryOwnerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

impl OwnerStore for InMemoryOwnerStore {
    fn get(&self, kind: OwnerKind, id: OwnerId) -> Result<Option<OwnerRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.get(&RecordKey { kind, id }).cloned())
    }

    fn find_by_name(&self, kind: OwnerKind, name: &str) -> Result<Option<OwnerRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records
            .values()
            .find(|r| r.kind == kind && r.name == name)
            .cloned())
    }

    fn create(&self, mut record: OwnerRecord) -> Result<OwnerRecord, StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let key = RecordKey::of(&record);
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        // Storages are addressed by name, so the name is unique per kind.
        if record.kind == OwnerKind::Storage
            && records.values().any(|r| r.kind == OwnerKind::Storage && r.name == record.name)
        {
            return Err(StoreError::AlreadyExists);
        }

        record.version = 1;
        records.insert(key, record.clone());
        Ok(record)
    }

    fn update(&self, mut record: OwnerRecord, expected: ExpectedVersion) -> Result<OwnerRecord, StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let key = RecordKey::of(&record);
        let current = records.get(&key).ok_or(StoreError::NotFound)?.version;

        expected
            .check(current)
            .map_err(|e| StoreError::Concurrency(e.to_string()))?;

        record.version = current + 1;
        records.insert(key, record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<OwnerRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> OwnerRecord {
        OwnerRecord::new(OwnerId::new(), OwnerKind::Player, "ada", 30)
    }

    #[test]
    fn create_assigns_first_version_and_rejects_duplicates() {
        let store = InMemoryOwnerStore::new();
        let record = player();

        let stored = store.create(record.clone()).unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(store.create(record).unwrap_err(), StoreError::AlreadyExists);
    }

    #[test]
    fn update_checks_expected_version() {
        let store = InMemoryOwnerStore::new();
        let stored = store.create(player()).unwrap();

        let updated = store.update(stored.clone(), ExpectedVersion::Exact(1)).unwrap();
        assert_eq!(updated.version, 2);

        let stale = store.update(stored, ExpectedVersion::Exact(1)).unwrap_err();
        assert!(matches!(stale, StoreError::Concurrency(_)));
    }

    #[test]
    fn update_of_missing_record_fails() {
        let store = InMemoryOwnerStore::new();
        assert_eq!(
            store.update(player(), ExpectedVersion::Any).unwrap_err(),
            StoreError::NotFound
        );
    }

    #[test]
    fn kinds_do_not_collide() {
        let store = InMemoryOwnerStore::new();
        let id = OwnerId::new();
        store.create(OwnerRecord::new(id, OwnerKind::Player, "p", 10)).unwrap();
        store.create(OwnerRecord::new(id, OwnerKind::Vehicle, "v", 10)).unwrap();

        assert_eq!(store.get(OwnerKind::Vehicle, id).unwrap().unwrap().name, "v");
        assert!(store.get(OwnerKind::Storage, id).unwrap().is_none());
    }

    #[test]
    fn storage_names_are_unique() {
        let store = InMemoryOwnerStore::new();
        store.create(OwnerRecord::new(OwnerId::new(), OwnerKind::Storage, "depot", 100)).unwrap();

        let second = OwnerRecord::new(OwnerId::new(), OwnerKind::Storage, "depot", 100);
        assert_eq!(store.create(second).unwrap_err(), StoreError::AlreadyExists);
        store.create(OwnerRecord::new(OwnerId::new(), OwnerKind::Player, "depot", 10)).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn find_by_name_is_kind_scoped() {
        let store = InMemoryOwnerStore::new();
        store.create(OwnerRecord::new(OwnerId::new(), OwnerKind::Storage, "warehouse", 100)).unwrap();

        assert!(store.find_by_name(OwnerKind::Storage, "warehouse").unwrap().is_some());
        assert!(store.find_by_name(OwnerKind::Player, "warehouse").unwrap().is_none());
    }
}
