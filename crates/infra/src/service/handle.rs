use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use stash_catalog::ItemTypeId;
use stash_core::StackId;
use stash_events::{EventBus, EventEnvelope};
use stash_inventory::{AddOptions, InventoryEvent, ItemStack, StackPatch, lookup};

use crate::owner_store::OwnerStore;

use super::{Change, InventoryService, OwnerRef, ServiceResult};

/// One owner's inventory.
///
/// Mutations return the collection as persisted; a rejected mutation leaves
/// the record untouched.
pub struct InventoryHandle<'a, S, B> {
    service: &'a InventoryService<S, B>,
    owner: OwnerRef,
}

impl<'a, S, B> InventoryHandle<'a, S, B>
where
    S: OwnerStore,
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    pub(super) fn new(service: &'a InventoryService<S, B>, owner: OwnerRef) -> Self {
        Self { service, owner }
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    pub fn add(&self, item_type: &ItemTypeId, quantity: u32) -> ServiceResult<Vec<ItemStack>> {
        self.add_inner(item_type, quantity, None)
    }

    /// Like [`add`](Self::add), attaching `data` to every newly created stack.
    pub fn add_with_data(&self, item_type: &ItemTypeId, quantity: u32, data: JsonValue) -> ServiceResult<Vec<ItemStack>> {
        self.add_inner(item_type, quantity, Some(data))
    }

    fn add_inner(&self, item_type: &ItemTypeId, quantity: u32, data: Option<JsonValue>) -> ServiceResult<Vec<ItemStack>> {
        self.service.mutate(&self.owner, |engine, items, policy| {
            let options = AddOptions {
                policy: *policy,
                data,
            };
            let next = engine.add(item_type, quantity, items, &options)?;
            let change = Change::Added {
                item_type: item_type.clone(),
                quantity,
            };
            Ok((next, Some(change)))
        })
    }

    pub fn add_specific(&self, stack: ItemStack) -> ServiceResult<Vec<ItemStack>> {
        self.service.mutate(&self.owner, |engine, items, policy| {
            let change = Change::Added {
                item_type: stack.item_type.clone(),
                quantity: stack.quantity,
            };
            Ok((engine.add_specific(stack, items, policy)?, Some(change)))
        })
    }

    pub fn remove(&self, item_type: &ItemTypeId, quantity: u32) -> ServiceResult<Vec<ItemStack>> {
        self.service.mutate(&self.owner, |engine, items, _| {
            let next = engine.remove(item_type, quantity, items)?;
            let change = Change::Removed {
                item_type: item_type.clone(),
                quantity,
            };
            Ok((next, Some(change)))
        })
    }

    pub fn remove_by_id(&self, id: StackId) -> ServiceResult<Vec<ItemStack>> {
        self.service.mutate(&self.owner, |engine, items, _| {
            let change = lookup::get_by_id(items, id).map(|stack| Change::Removed {
                item_type: stack.item_type.clone(),
                quantity: stack.quantity,
            });
            Ok((engine.remove_by_id(id, items)?, change))
        })
    }

    pub fn remove_quantity(&self, id: StackId, quantity: u32) -> ServiceResult<Vec<ItemStack>> {
        self.service.mutate(&self.owner, |engine, items, _| {
            let change = lookup::get_by_id(items, id).map(|stack| Change::Removed {
                item_type: stack.item_type.clone(),
                quantity,
            });
            Ok((engine.remove_quantity(id, quantity, items)?, change))
        })
    }

    pub fn split(&self, id: StackId, amount: u32) -> ServiceResult<Vec<ItemStack>> {
        self.service
            .mutate(&self.owner, |engine, items, policy| Ok((engine.split(id, amount, items, policy)?, None)))
    }

    pub fn stack(&self, target: StackId, source: StackId) -> ServiceResult<Vec<ItemStack>> {
        self.service
            .mutate(&self.owner, |engine, items, _| Ok((engine.stack(target, source, items)?, None)))
    }

    pub fn update(&self, id: StackId, patch: &StackPatch) -> ServiceResult<Vec<ItemStack>> {
        self.service
            .mutate(&self.owner, |engine, items, _| Ok((engine.update(id, patch, items)?, None)))
    }

    /// One decay tick for this owner only.
    pub fn invoke_decay(&self) -> ServiceResult<Vec<ItemStack>> {
        self.service
            .mutate(&self.owner, |engine, items, _| Ok((engine.invoke_decay(items), None)))
    }

    pub fn items(&self) -> ServiceResult<Vec<ItemStack>> {
        self.service.items(&self.owner)
    }

    pub fn get(&self, id: StackId) -> ServiceResult<Option<ItemStack>> {
        let items = self.items()?;
        Ok(lookup::get_by_id(&items, id).cloned())
    }

    pub fn has_quantity(&self, item_type: &ItemTypeId, quantity: u32) -> ServiceResult<bool> {
        Ok(lookup::has_quantity(&self.items()?, item_type, quantity))
    }

    pub fn aux_data<T: DeserializeOwned>(&self, id: StackId) -> ServiceResult<Option<T>> {
        Ok(lookup::aux_data(&self.items()?, id))
    }
}
