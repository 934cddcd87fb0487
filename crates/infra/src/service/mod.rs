//! Owner inventory adapters.
//!
//! Every mutation runs the same sequence for one owner:
//!
//! ```text
//! catalog ready? → lock owner → fetch record → engine → persist if changed → notify
//! ```
//!
//! Player, vehicle and storage owners differ only in how the record is
//! resolved (by id, or get-or-create by name for storages) and in the
//! notification channel their envelopes carry.

mod decay;
mod handle;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use stash_catalog::{CatalogCache, CatalogError, ItemTypeId};
use stash_core::{ExpectedVersion, OwnerId};
use stash_events::{EventBus, EventEnvelope};
use stash_inventory::{
    CapacityPolicy, InventoryEngine, InventoryError, InventoryEvent, ItemAdded, ItemRemoved, ItemStack, ItemsUpdated,
};

use crate::config::StashConfig;
use crate::locks::{OwnerLocks, hold};
use crate::owner_store::{OwnerKind, OwnerRecord, OwnerStore, StoreError};

pub use decay::DecayReport;
pub use handle::InventoryHandle;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The engine refused the operation; nothing was persisted.
    #[error(transparent)]
    Rejected(#[from] InventoryError),

    #[error("{kind} owner '{key}' not found")]
    OwnerNotFound { kind: OwnerKind, key: String },

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),

    #[error("owner store failed: {0}")]
    Store(#[from] StoreError),
}

/// Identity an adapter resolves its owner record by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerRef {
    Player(OwnerId),
    Vehicle(OwnerId),
    /// Named shared storage, created on first access.
    Storage(String),
}

impl OwnerRef {
    pub fn kind(&self) -> OwnerKind {
        match self {
            OwnerRef::Player(_) => OwnerKind::Player,
            OwnerRef::Vehicle(_) => OwnerKind::Vehicle,
            OwnerRef::Storage(_) => OwnerKind::Storage,
        }
    }

    /// The reference adapters use for an existing record.
    pub fn of(record: &OwnerRecord) -> Self {
        match record.kind {
            OwnerKind::Player => OwnerRef::Player(record.id),
            OwnerKind::Vehicle => OwnerRef::Vehicle(record.id),
            OwnerKind::Storage => OwnerRef::Storage(record.name.clone()),
        }
    }

    fn key(&self) -> String {
        match self {
            OwnerRef::Player(id) | OwnerRef::Vehicle(id) => id.to_string(),
            OwnerRef::Storage(name) => name.clone(),
        }
    }
}

/// Quantity change reported alongside the full collection.
#[derive(Debug, Clone, PartialEq)]
enum Change {
    Added { item_type: ItemTypeId, quantity: u32 },
    Removed { item_type: ItemTypeId, quantity: u32 },
}

type Engine = InventoryEngine<Arc<CatalogCache>>;
type Outcome = (Vec<ItemStack>, Option<Change>);

/// Inventory adapters over one owner store and one notification bus.
pub struct InventoryService<S, B> {
    store: S,
    bus: B,
    catalog: Arc<CatalogCache>,
    engine: Engine,
    config: StashConfig,
    locks: OwnerLocks<OwnerRef>,
}

impl<S, B> InventoryService<S, B>
where
    S: OwnerStore,
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    pub fn new(store: S, bus: B, catalog: Arc<CatalogCache>, config: StashConfig) -> Self {
        Self {
            store,
            bus,
            engine: InventoryEngine::new(catalog.clone()),
            catalog,
            config,
            locks: OwnerLocks::new(),
        }
    }

    pub fn config(&self) -> &StashConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<CatalogCache> {
        &self.catalog
    }

    pub fn player(&self, id: OwnerId) -> InventoryHandle<'_, S, B> {
        InventoryHandle::new(self, OwnerRef::Player(id))
    }

    pub fn vehicle(&self, id: OwnerId) -> InventoryHandle<'_, S, B> {
        InventoryHandle::new(self, OwnerRef::Vehicle(id))
    }

    pub fn storage(&self, name: impl Into<String>) -> InventoryHandle<'_, S, B> {
        InventoryHandle::new(self, OwnerRef::Storage(name.into()))
    }

    /// Register an empty player or vehicle with the kind's default cell limit.
    pub fn create_owner(&self, kind: OwnerKind, id: OwnerId, name: impl Into<String>) -> ServiceResult<OwnerRecord> {
        let max_cells = self.config.policy_for(kind).max_cells;
        self.register_owner(OwnerRecord::new(id, kind, name, max_cells))
    }

    pub fn register_owner(&self, record: OwnerRecord) -> ServiceResult<OwnerRecord> {
        let created = self.store.create(record)?;
        debug!(owner = %created.id, kind = %created.kind, "owner registered");
        Ok(created)
    }

    /// Current persisted collection of `owner`.
    pub fn items(&self, owner: &OwnerRef) -> ServiceResult<Vec<ItemStack>> {
        self.with_owner(owner, || Ok(self.fetch(owner)?.items))
    }

    /// Run `f` while holding `owner`'s slot.
    ///
    /// Storage fetches may create the record, so reads go through here too.
    fn with_owner<T>(&self, owner: &OwnerRef, f: impl FnOnce() -> ServiceResult<T>) -> ServiceResult<T> {
        let slot = self.locks.slot(owner);
        let result = {
            let _guard = hold(&slot);
            f()
        };
        self.locks.release(owner, slot);
        result
    }

    fn fetch(&self, owner: &OwnerRef) -> ServiceResult<OwnerRecord> {
        let kind = owner.kind();
        let found = match owner {
            OwnerRef::Player(id) | OwnerRef::Vehicle(id) => self.store.get(kind, *id)?,
            OwnerRef::Storage(name) => Some(self.open_storage(name)?),
        };
        found.ok_or_else(|| ServiceError::OwnerNotFound {
            kind,
            key: owner.key(),
        })
    }

    fn open_storage(&self, name: &str) -> ServiceResult<OwnerRecord> {
        if let Some(record) = self.store.find_by_name(OwnerKind::Storage, name)? {
            return Ok(record);
        }

        let max_cells = self.config.policy_for(OwnerKind::Storage).max_cells;
        let record = OwnerRecord::new(OwnerId::new(), OwnerKind::Storage, name, max_cells);
        match self.store.create(record) {
            Ok(created) => {
                debug!(owner = %created.id, storage = name, "storage opened");
                Ok(created)
            }
            // Opened concurrently elsewhere.
            Err(StoreError::AlreadyExists) => self
                .store
                .find_by_name(OwnerKind::Storage, name)?
                .ok_or(ServiceError::Store(StoreError::AlreadyExists)),
            Err(err) => Err(err.into()),
        }
    }

    fn policy_of(&self, record: &OwnerRecord) -> CapacityPolicy {
        let mut policy = self.config.policy_for(record.kind);
        policy.max_cells = record.max_cells;
        policy
    }

    /// Run `op` against the freshly fetched collection of `owner`.
    fn mutate<F>(&self, owner: &OwnerRef, op: F) -> ServiceResult<Vec<ItemStack>>
    where
        F: FnOnce(&Engine, &[ItemStack], &CapacityPolicy) -> Result<Outcome, InventoryError>,
    {
        self.catalog.wait_ready(self.config.catalog_ready_timeout())?;

        self.with_owner(owner, || {
            let record = self.fetch(owner)?;
            Ok(self.commit(record, op)?.items)
        })
    }

    /// Apply `op` to `record`, persisting and notifying only on change.
    ///
    /// The caller holds the owner's slot.
    fn commit<F>(&self, mut record: OwnerRecord, op: F) -> ServiceResult<OwnerRecord>
    where
        F: FnOnce(&Engine, &[ItemStack], &CapacityPolicy) -> Result<Outcome, InventoryError>,
    {
        let policy = self.policy_of(&record);
        let (next, change) = match op(&self.engine, &record.items, &policy) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(owner = %record.id, kind = %record.kind, error = %err, "inventory operation rejected");
                return Err(err.into());
            }
        };

        if next == record.items {
            return Ok(record);
        }

        record.items = next;
        record.last_accessed = Utc::now();
        let expected = ExpectedVersion::Exact(record.version);
        let saved = self.store.update(record, expected)?;

        self.notify(&saved, change);
        Ok(saved)
    }

    fn notify(&self, record: &OwnerRecord, change: Option<Change>) {
        let occurred_at = Utc::now();
        let owner_id = record.id;

        let mut events = Vec::with_capacity(2);
        match change {
            Some(Change::Added { item_type, quantity }) => events.push(InventoryEvent::ItemAdded(ItemAdded {
                owner_id,
                item_type,
                quantity,
                occurred_at,
            })),
            Some(Change::Removed { item_type, quantity }) => events.push(InventoryEvent::ItemRemoved(ItemRemoved {
                owner_id,
                item_type,
                quantity,
                occurred_at,
            })),
            None => {}
        }
        events.push(InventoryEvent::ItemsUpdated(ItemsUpdated {
            owner_id,
            items: record.items.clone(),
            occurred_at,
        }));

        for event in events {
            let envelope = EventEnvelope::wrap(owner_id, record.kind.channel(), event);
            if let Err(err) = self.bus.publish(envelope) {
                warn!(owner = %owner_id, kind = %record.kind, error = ?err, "inventory notification dropped");
            }
        }
    }
}
