use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stash_catalog::ItemTypeId;
use stash_core::OwnerId;
use stash_events::Event;

use crate::stack::ItemStack;

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub owner_id: OwnerId,
    pub item_type: ItemTypeId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub owner_id: OwnerId,
    pub item_type: ItemTypeId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemsUpdated. Carries the full persisted collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsUpdated {
    pub owner_id: OwnerId,
    pub items: Vec<ItemStack>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    ItemsUpdated(ItemsUpdated),
}

impl InventoryEvent {
    pub fn owner_id(&self) -> OwnerId {
        match self {
            InventoryEvent::ItemAdded(e) => e.owner_id,
            InventoryEvent::ItemRemoved(e) => e.owner_id,
            InventoryEvent::ItemsUpdated(e) => e.owner_id,
        }
    }
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemAdded(_) => "inventory.item.added",
            InventoryEvent::ItemRemoved(_) => "inventory.item.removed",
            InventoryEvent::ItemsUpdated(_) => "inventory.items.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemAdded(e) => e.occurred_at,
            InventoryEvent::ItemRemoved(e) => e.occurred_at,
            InventoryEvent::ItemsUpdated(e) => e.occurred_at,
        }
    }
}
