use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stash_core::{OwnerId, VersionedRecord};
use stash_inventory::ItemStack;

/// Kind of entity holding an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Player,
    Vehicle,
    Storage,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Player => "player",
            OwnerKind::Vehicle => "vehicle",
            OwnerKind::Storage => "storage",
        }
    }

    /// Notification channel mutations of this owner kind are published on.
    pub fn channel(self) -> &'static str {
        match self {
            OwnerKind::Player => "player.inventory",
            OwnerKind::Vehicle => "vehicle.inventory",
            OwnerKind::Storage => "storage.inventory",
        }
    }
}

impl core::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted inventory document of one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub id: OwnerId,
    pub kind: OwnerKind,
    pub name: String,
    pub items: Vec<ItemStack>,
    pub max_cells: u32,
    pub last_accessed: DateTime<Utc>,
    #[serde(default)]
    pub decay_exempt: bool,
    /// Assigned by the store; 0 until first created.
    #[serde(default)]
    pub version: u64,
}

impl OwnerRecord {
    pub fn new(id: OwnerId, kind: OwnerKind, name: impl Into<String>, max_cells: u32) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            items: Vec::new(),
            max_cells,
            last_accessed: Utc::now(),
            decay_exempt: false,
            version: 0,
        }
    }

    pub fn exempt_from_decay(mut self) -> Self {
        self.decay_exempt = true;
        self
    }
}

impl VersionedRecord for OwnerRecord {
    type Id = OwnerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
