//! Capacity-checked stack mutations.
//!
//! Each operation clones the borrowed snapshot, works on the clone, and only
//! hands the clone back when every precondition held. A rejected operation
//! therefore never leaks a partially-applied collection.

use serde_json::Value as JsonValue;
use tracing::debug;

use stash_catalog::{ItemCatalog, ItemDefinition, ItemTypeId};
use stash_core::StackId;

use crate::capacity::{CapacityPolicy, fits, usage};
use crate::error::{InventoryError, InventoryResult};
use crate::stack::{ItemStack, StackPatch};

/// Options for catalog-based additions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOptions {
    pub policy: CapacityPolicy,
    /// Attached to every newly created stack.
    pub data: Option<JsonValue>,
}

impl AddOptions {
    pub fn new(policy: CapacityPolicy) -> Self {
        Self { policy, data: None }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }
}

/// The inventory mutation engine.
///
/// Holds nothing but a catalog handle, so one engine can serve any number
/// of owners and threads.
#[derive(Debug, Clone)]
pub struct InventoryEngine<C> {
    catalog: C,
}

impl<C> InventoryEngine<C>
where
    C: ItemCatalog,
{
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn resolve(&self, item_type: &ItemTypeId) -> InventoryResult<ItemDefinition> {
        self.catalog
            .resolve(item_type)
            .ok_or_else(|| InventoryError::UnknownItemType(item_type.clone()))
    }

    /// Add `quantity` units of a catalog item.
    ///
    /// Existing non-full stacks of the same type are topped up in collection
    /// order; whatever is left goes into new stacks.
    pub fn add(
        &self,
        item_type: &ItemTypeId,
        quantity: u32,
        items: &[ItemStack],
        options: &AddOptions,
    ) -> InventoryResult<Vec<ItemStack>> {
        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        let definition = self.resolve(item_type)?;
        let mut next = items.to_vec();
        let mut remaining = quantity;

        if definition.is_stackable() {
            for stack in next.iter_mut().filter(|s| s.item_type == definition.id) {
                if remaining == 0 {
                    break;
                }
                let room = definition.max_stack.saturating_sub(stack.quantity);
                let take = room.min(remaining);
                stack.quantity += take;
                remaining -= take;
            }
        }

        next.extend(ItemStack::batch_from_definition(
            &definition,
            remaining,
            options.data.as_ref(),
        ));

        ensure_fits(next, &options.policy)
    }

    /// Append a fully-formed stack, preserving its identity and data.
    ///
    /// The quantity is checked against the catalog definition, not the
    /// stack's own copy of the limit, and that copy is refreshed from the
    /// catalog. A stack arriving with decay at or below zero is refused.
    pub fn add_specific(
        &self,
        stack: ItemStack,
        items: &[ItemStack],
        policy: &CapacityPolicy,
    ) -> InventoryResult<Vec<ItemStack>> {
        let definition = self.resolve(&stack.item_type)?;
        if stack.quantity == 0 || stack.quantity > definition.max_stack {
            return Err(InventoryError::InvalidQuantity(stack.quantity));
        }
        if matches!(stack.decay, Some(d) if d <= 0) {
            return Err(InventoryError::Expired(stack.id));
        }
        if items.iter().any(|s| s.id == stack.id) {
            return Err(InventoryError::DuplicateStack(stack.id));
        }

        let mut stack = stack;
        stack.max_stack = definition.max_stack;
        let mut next = items.to_vec();
        next.push(stack);
        ensure_fits(next, policy)
    }

    /// Remove `quantity` units from the first stack of `item_type`.
    ///
    /// Only that one stack is considered; units in later stacks of the same
    /// type do not count towards the request.
    pub fn remove(
        &self,
        item_type: &ItemTypeId,
        quantity: u32,
        items: &[ItemStack],
    ) -> InventoryResult<Vec<ItemStack>> {
        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        let index = items
            .iter()
            .position(|s| &s.item_type == item_type)
            .ok_or(InventoryError::InsufficientQuantity { requested: quantity, available: 0 })?;

        let mut next = items.to_vec();
        take_from(&mut next, index, quantity)?;
        Ok(next)
    }

    /// Delete the identified stack outright.
    pub fn remove_by_id(&self, id: StackId, items: &[ItemStack]) -> InventoryResult<Vec<ItemStack>> {
        let index = index_of(items, id)?;
        let mut next = items.to_vec();
        next.remove(index);
        Ok(next)
    }

    /// Remove `quantity` units from the identified stack.
    pub fn remove_quantity(
        &self,
        id: StackId,
        quantity: u32,
        items: &[ItemStack],
    ) -> InventoryResult<Vec<ItemStack>> {
        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        let index = index_of(items, id)?;
        let mut next = items.to_vec();
        take_from(&mut next, index, quantity)?;
        Ok(next)
    }

    /// Move `amount` units of a stack into a new stack with a fresh id.
    ///
    /// Both halves stay non-empty: splitting zero units or the whole stack is
    /// an `InvalidSplit`. The new stack gets a deep copy of the source's data
    /// and no grid position.
    pub fn split(
        &self,
        id: StackId,
        amount: u32,
        items: &[ItemStack],
        policy: &CapacityPolicy,
    ) -> InventoryResult<Vec<ItemStack>> {
        let index = index_of(items, id)?;
        let source = &items[index];
        self.resolve(&source.item_type)?;

        if amount == 0 || amount >= source.quantity {
            return Err(InventoryError::InvalidSplit {
                requested: amount,
                available: source.quantity,
            });
        }

        let mut next = items.to_vec();
        next[index].quantity -= amount;

        let mut split_off = next[index].clone();
        split_off.id = StackId::new();
        split_off.quantity = amount;
        split_off.slot = None;
        next.push(split_off);

        ensure_fits(next, policy)
    }

    /// Merge units of `source` into `target`.
    ///
    /// Moves `min(target room, source quantity)`; the source is deleted when
    /// it runs empty. Never creates ids and never grows the collection, so
    /// capacity is not re-checked.
    pub fn stack(&self, target: StackId, source: StackId, items: &[ItemStack]) -> InventoryResult<Vec<ItemStack>> {
        if target == source {
            return Err(InventoryError::InvalidMerge(target));
        }
        let target_index = index_of(items, target)?;
        let source_index = index_of(items, source)?;
        let (into, from) = (&items[target_index], &items[source_index]);

        if into.item_type != from.item_type {
            return Err(InventoryError::TypeMismatch {
                target_type: into.item_type.clone(),
                source_type: from.item_type.clone(),
            });
        }
        if !into.is_stackable() {
            return Err(InventoryError::NotStackable(into.item_type.clone()));
        }
        if into.is_full() {
            return Err(InventoryError::AlreadyFull(target));
        }

        let moved = into.room().min(from.quantity);
        let mut next = items.to_vec();
        next[target_index].quantity += moved;
        next[source_index].quantity -= moved;
        if next[source_index].quantity == 0 {
            next.remove(source_index);
        }
        Ok(next)
    }

    /// Shallow-merge `patch` onto the identified stack.
    ///
    /// A patch that sets decay to zero or below deletes the stack instead.
    /// Footprint changes are not capacity-checked.
    pub fn update(&self, id: StackId, patch: &StackPatch, items: &[ItemStack]) -> InventoryResult<Vec<ItemStack>> {
        let index = index_of(items, id)?;
        let mut next = items.to_vec();

        if patch.kills() {
            next.remove(index);
            return Ok(next);
        }

        patch.apply_to(&mut next[index]);
        if !next[index].has_valid_quantity() {
            return Err(InventoryError::InvalidQuantity(next[index].quantity));
        }
        Ok(next)
    }

    /// Advance every decay counter by one tick and drop expired stacks.
    pub fn invoke_decay(&self, items: &[ItemStack]) -> Vec<ItemStack> {
        let mut next = items.to_vec();
        for index in (0..next.len()).rev() {
            let Some(decay) = next[index].decay else {
                continue;
            };
            let remaining = decay.saturating_sub(1);
            if remaining <= 0 {
                next.remove(index);
            } else {
                next[index].decay = Some(remaining);
            }
        }
        next
    }
}

fn index_of(items: &[ItemStack], id: StackId) -> InventoryResult<usize> {
    items
        .iter()
        .position(|s| s.id == id)
        .ok_or(InventoryError::NotFound(id))
}

fn take_from(items: &mut Vec<ItemStack>, index: usize, quantity: u32) -> InventoryResult<()> {
    let available = items[index].quantity;
    if quantity > available {
        return Err(InventoryError::InsufficientQuantity { requested: quantity, available });
    }
    if quantity == available {
        items.remove(index);
    } else {
        items[index].quantity -= quantity;
    }
    Ok(())
}

fn ensure_fits(items: Vec<ItemStack>, policy: &CapacityPolicy) -> InventoryResult<Vec<ItemStack>> {
    if fits(&items, policy) {
        Ok(items)
    } else {
        let used = usage(&items);
        debug!(cells = used.cells, weight = used.weight, "capacity check rejected mutation");
        Err(InventoryError::CapacityExceeded(used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serde_json::json;

    type Catalog = HashMap<ItemTypeId, ItemDefinition>;

    fn water_id() -> ItemTypeId {
        ItemTypeId::new("water_bottle")
    }

    fn catalog() -> Catalog {
        let defs = vec![
            ItemDefinition::new("water_bottle", "Water Bottle", 1.0, 5),
            ItemDefinition::new("pistol", "Pistol", 2.0, 1),
            ItemDefinition { width: 2, height: 2, ..ItemDefinition::new("toolbox", "Toolbox", 3.0, 2) },
            ItemDefinition { decay: Some(2), ..ItemDefinition::new("bread", "Bread", 0.5, 10) },
        ];
        defs.into_iter().map(|d| (d.id.clone(), d)).collect()
    }

    fn engine() -> InventoryEngine<Catalog> {
        InventoryEngine::new(catalog())
    }

    fn unlimited() -> AddOptions {
        AddOptions::default()
    }

    fn quantities(items: &[ItemStack]) -> Vec<u32> {
        items.iter().map(|s| s.quantity).collect()
    }

    fn waters(engine: &InventoryEngine<Catalog>, qty: &[u32]) -> Vec<ItemStack> {
        let def = engine.catalog().get(&water_id()).unwrap().clone();
        qty.iter().map(|q| ItemStack::from_definition(&def, *q, None)).collect()
    }

    #[test]
    fn add_twelve_water_bottles_fills_three_stacks() {
        let items = engine().add(&water_id(), 12, &[], &unlimited()).unwrap();
        assert_eq!(quantities(&items), vec![5, 5, 2]);
    }

    #[test]
    fn add_tops_up_existing_stacks_in_order_first() {
        let engine = engine();
        let items = waters(&engine, &[3, 5, 4]);
        let next = engine.add(&water_id(), 4, &items, &unlimited()).unwrap();

        assert_eq!(quantities(&next), vec![5, 5, 5, 1]);
        assert_eq!(next[0].id, items[0].id);
        assert_eq!(next[2].id, items[2].id);
    }

    #[test]
    fn add_non_stackable_creates_one_stack_per_unit() {
        let items = engine().add(&ItemTypeId::new("pistol"), 3, &[], &unlimited()).unwrap();
        assert_eq!(quantities(&items), vec![1, 1, 1]);
    }

    #[test]
    fn add_unknown_type_fails() {
        let err = engine().add(&ItemTypeId::new("unobtainium"), 1, &[], &unlimited()).unwrap_err();
        assert_eq!(err, InventoryError::UnknownItemType(ItemTypeId::new("unobtainium")));
    }

    #[test]
    fn add_zero_is_rejected() {
        let err = engine().add(&water_id(), 0, &[], &unlimited()).unwrap_err();
        assert_eq!(err, InventoryError::InvalidQuantity(0));
    }

    #[test]
    fn add_over_cell_capacity_leaves_input_untouched() {
        let engine = engine();
        let items = waters(&engine, &[5, 5]);
        let snapshot = items.clone();
        let options = AddOptions::new(CapacityPolicy::unlimited().with_cells(2));

        let err = engine.add(&water_id(), 1, &items, &options).unwrap_err();

        assert!(matches!(err, InventoryError::CapacityExceeded(u) if u.cells == 3));
        assert_eq!(items, snapshot);
    }

    #[test]
    fn add_over_weight_capacity_fails() {
        let options = AddOptions::new(CapacityPolicy::unlimited().with_weight(4.0));
        assert!(matches!(
            engine().add(&water_id(), 5, &[], &options),
            Err(InventoryError::CapacityExceeded(_))
        ));
        assert!(engine().add(&water_id(), 4, &[], &options).is_ok());
    }

    #[test]
    fn add_attaches_data_to_new_stacks() {
        let options = unlimited().with_data(json!({ "serial": "A-1" }));
        let items = engine().add(&ItemTypeId::new("pistol"), 1, &[], &options).unwrap();
        assert_eq!(items[0].data, Some(json!({ "serial": "A-1" })));
    }

    #[test]
    fn add_specific_preserves_identity() {
        let engine = engine();
        let stack = waters(&engine, &[2]).remove(0);
        let items = engine.add_specific(stack.clone(), &[], &CapacityPolicy::unlimited()).unwrap();
        assert_eq!(items, vec![stack]);
    }

    #[test]
    fn add_specific_rejects_duplicates_and_bad_quantities() {
        let engine = engine();
        let items = waters(&engine, &[2]);
        let policy = CapacityPolicy::unlimited();

        let err = engine.add_specific(items[0].clone(), &items, &policy).unwrap_err();
        assert_eq!(err, InventoryError::DuplicateStack(items[0].id));

        let mut overfull = waters(&engine, &[1]).remove(0);
        overfull.quantity = 6;
        assert_eq!(
            engine.add_specific(overfull, &items, &policy).unwrap_err(),
            InventoryError::InvalidQuantity(6)
        );
    }

    #[test]
    fn add_specific_checks_capacity() {
        let engine = engine();
        let items = waters(&engine, &[1]);
        let stack = waters(&engine, &[1]).remove(0);
        let policy = CapacityPolicy::unlimited().with_cells(1);
        assert!(matches!(
            engine.add_specific(stack, &items, &policy),
            Err(InventoryError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn add_specific_checks_quantity_against_catalog_limit() {
        let engine = engine();
        let mut forged = waters(&engine, &[1]).remove(0);
        forged.max_stack = 1000;
        forged.quantity = 900;
        assert_eq!(
            engine.add_specific(forged.clone(), &[], &CapacityPolicy::unlimited()).unwrap_err(),
            InventoryError::InvalidQuantity(900)
        );

        forged.quantity = 3;
        let items = engine.add_specific(forged, &[], &CapacityPolicy::unlimited()).unwrap();
        assert_eq!(items[0].max_stack, 5);

        let topped = engine.add(&water_id(), 10, &items, &unlimited()).unwrap();
        assert_eq!(quantities(&topped), vec![5, 5, 3]);
    }

    #[test]
    fn add_specific_of_unknown_type_fails() {
        let engine = engine();
        let mut stack = waters(&engine, &[1]).remove(0);
        stack.item_type = ItemTypeId::new("moonstone");
        assert_eq!(
            engine.add_specific(stack, &[], &CapacityPolicy::unlimited()).unwrap_err(),
            InventoryError::UnknownItemType(ItemTypeId::new("moonstone"))
        );
    }

    #[test]
    fn add_specific_refuses_already_decayed_stacks() {
        let engine = engine();
        for decay in [0, -4, i64::MIN] {
            let mut stack = waters(&engine, &[1]).remove(0);
            stack.decay = Some(decay);
            assert_eq!(
                engine.add_specific(stack.clone(), &[], &CapacityPolicy::unlimited()).unwrap_err(),
                InventoryError::Expired(stack.id)
            );
        }
    }

    #[test]
    fn remove_does_not_aggregate_across_stacks() {
        let engine = engine();
        let items = waters(&engine, &[5, 5]);
        let err = engine.remove(&water_id(), 10, &items).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientQuantity { requested: 10, available: 5 });
    }

    #[test]
    fn remove_decrements_or_deletes_first_matching_stack() {
        let engine = engine();
        let items = waters(&engine, &[4, 5]);

        let partial = engine.remove(&water_id(), 3, &items).unwrap();
        assert_eq!(quantities(&partial), vec![1, 5]);

        let whole = engine.remove(&water_id(), 4, &items).unwrap();
        assert_eq!(whole.len(), 1);
        assert_eq!(whole[0].id, items[1].id);
    }

    #[test]
    fn remove_missing_type_reports_nothing_available() {
        let err = engine().remove(&water_id(), 1, &[]).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientQuantity { requested: 1, available: 0 });
    }

    #[test]
    fn remove_by_id_deletes_the_stack() {
        let engine = engine();
        let items = waters(&engine, &[2, 3]);
        let next = engine.remove_by_id(items[0].id, &items).unwrap();
        assert_eq!(next, vec![items[1].clone()]);

        let missing = StackId::new();
        assert_eq!(engine.remove_by_id(missing, &items).unwrap_err(), InventoryError::NotFound(missing));
    }

    #[test]
    fn remove_quantity_checks_availability() {
        let engine = engine();
        let items = waters(&engine, &[3]);

        assert_eq!(quantities(&engine.remove_quantity(items[0].id, 2, &items).unwrap()), vec![1]);
        assert!(engine.remove_quantity(items[0].id, 3, &items).unwrap().is_empty());
        assert_eq!(
            engine.remove_quantity(items[0].id, 4, &items).unwrap_err(),
            InventoryError::InsufficientQuantity { requested: 4, available: 3 }
        );
    }

    #[test]
    fn split_produces_two_positive_stacks() {
        let engine = engine();
        let mut items = waters(&engine, &[5]);
        items[0].data = Some(json!({ "label": "spring" }));

        let next = engine.split(items[0].id, 2, &items, &CapacityPolicy::unlimited()).unwrap();

        assert_eq!(quantities(&next), vec![3, 2]);
        assert_eq!(next[0].id, items[0].id);
        assert_ne!(next[1].id, items[0].id);
        assert_eq!(next[1].data, items[0].data);
    }

    #[test]
    fn split_whole_or_zero_is_invalid() {
        let engine = engine();
        let items = waters(&engine, &[4]);
        let policy = CapacityPolicy::unlimited();

        assert_eq!(
            engine.split(items[0].id, 4, &items, &policy).unwrap_err(),
            InventoryError::InvalidSplit { requested: 4, available: 4 }
        );
        assert!(matches!(
            engine.split(items[0].id, 0, &items, &policy),
            Err(InventoryError::InvalidSplit { .. })
        ));
    }

    #[test]
    fn split_fails_when_catalog_entry_vanished() {
        let engine = engine();
        let items = waters(&engine, &[4]);
        let mut catalog = catalog();
        catalog.remove(&water_id());
        let orphaned = InventoryEngine::new(catalog);

        assert_eq!(
            orphaned.split(items[0].id, 1, &items, &CapacityPolicy::unlimited()).unwrap_err(),
            InventoryError::UnknownItemType(water_id())
        );
    }

    #[test]
    fn split_respects_capacity() {
        let engine = engine();
        let items = waters(&engine, &[4]);
        let policy = CapacityPolicy::unlimited().with_cells(1);
        assert!(matches!(
            engine.split(items[0].id, 1, &items, &policy),
            Err(InventoryError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn stack_into_full_target_fails() {
        let engine = engine();
        let items = waters(&engine, &[5, 3]);
        assert_eq!(
            engine.stack(items[0].id, items[1].id, &items).unwrap_err(),
            InventoryError::AlreadyFull(items[0].id)
        );
    }

    #[test]
    fn stack_moves_what_fits_and_keeps_leftover() {
        let engine = engine();
        let items = waters(&engine, &[3, 4]);
        let next = engine.stack(items[0].id, items[1].id, &items).unwrap();
        assert_eq!(quantities(&next), vec![5, 2]);
        assert_eq!(next[1].id, items[1].id);
    }

    #[test]
    fn stack_deletes_consumed_source() {
        let engine = engine();
        let items = waters(&engine, &[1, 2, 3]);
        let next = engine.stack(items[2].id, items[0].id, &items).unwrap();
        assert_eq!(quantities(&next), vec![2, 4]);
        assert_eq!(next[1].id, items[2].id);
    }

    #[test]
    fn stack_rejects_type_mismatch_non_stackable_and_self() {
        let engine = engine();
        let water = waters(&engine, &[1]);
        let pistols = engine.add(&ItemTypeId::new("pistol"), 2, &water, &unlimited()).unwrap();

        assert!(matches!(
            engine.stack(pistols[0].id, pistols[1].id, &pistols),
            Err(InventoryError::TypeMismatch { .. })
        ));
        assert_eq!(
            engine.stack(pistols[1].id, pistols[2].id, &pistols).unwrap_err(),
            InventoryError::NotStackable(ItemTypeId::new("pistol"))
        );
        assert_eq!(
            engine.stack(water[0].id, water[0].id, &water).unwrap_err(),
            InventoryError::InvalidMerge(water[0].id)
        );
        let missing = StackId::new();
        assert_eq!(
            engine.stack(water[0].id, missing, &water).unwrap_err(),
            InventoryError::NotFound(missing)
        );
    }

    #[test]
    fn update_with_zero_decay_deletes_stack() {
        let engine = engine();
        let items = waters(&engine, &[2, 3]);
        let next = engine.update(items[0].id, &StackPatch::default().with_decay(0), &items).unwrap();
        assert_eq!(next, vec![items[1].clone()]);
    }

    #[test]
    fn update_merges_patch_fields() {
        let engine = engine();
        let items = waters(&engine, &[2]);
        let patch = StackPatch { name: Some("Dirty Water".into()), ..StackPatch::default() }.with_decay(7);

        let next = engine.update(items[0].id, &patch, &items).unwrap();

        assert_eq!(next[0].name, "Dirty Water");
        assert_eq!(next[0].decay, Some(7));
        assert_eq!(next[0].quantity, 2);
    }

    #[test]
    fn update_rejects_out_of_range_quantity() {
        let engine = engine();
        let items = waters(&engine, &[2]);
        assert_eq!(
            engine.update(items[0].id, &StackPatch::default().with_quantity(6), &items).unwrap_err(),
            InventoryError::InvalidQuantity(6)
        );
        assert_eq!(
            engine.update(items[0].id, &StackPatch::default().with_quantity(0), &items).unwrap_err(),
            InventoryError::InvalidQuantity(0)
        );
    }

    #[test]
    fn update_missing_stack_fails() {
        let missing = StackId::new();
        assert_eq!(
            engine().update(missing, &StackPatch::default(), &[]).unwrap_err(),
            InventoryError::NotFound(missing)
        );
    }

    #[test]
    fn decay_without_counters_is_identity() {
        let engine = engine();
        let items = waters(&engine, &[1, 2, 3]);
        assert_eq!(engine.invoke_decay(&items), items);
    }

    #[test]
    fn decay_counts_down_and_expires() {
        let engine = engine();
        let items = engine.add(&ItemTypeId::new("bread"), 3, &waters(&engine, &[1]), &unlimited()).unwrap();
        assert_eq!(items[1].decay, Some(2));

        let once = engine.invoke_decay(&items);
        assert_eq!(once.len(), 2);
        assert_eq!(once[1].decay, Some(1));

        let twice = engine.invoke_decay(&once);
        assert_eq!(twice, vec![items[0].clone()]);
    }

    #[test]
    fn decay_tick_saturates_at_the_lowest_counter() {
        let engine = engine();
        let mut items = waters(&engine, &[1, 2]);
        items[0].decay = Some(i64::MIN);
        items[1].decay = Some(i64::MAX);

        let next = engine.invoke_decay(&items);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].decay, Some(i64::MAX - 1));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn assert_invariants(items: &[ItemStack]) -> Result<(), TestCaseError> {
            for stack in items {
                prop_assert!(stack.has_valid_quantity(), "stack out of range: {}", stack.quantity);
            }
            let mut ids: Vec<StackId> = items.iter().map(|s| s.id).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), items.len());
            Ok(())
        }

        fn water_total(items: &[ItemStack]) -> u64 {
            crate::lookup::total_quantity(items, &water_id())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: add then remove of the same amount conserves the total.
            #[test]
            fn add_then_remove_conserves_quantity(
                existing in proptest::collection::vec(1u32..=5, 0..6),
                qty in 1u32..=5,
            ) {
                let engine = engine();
                let items = waters(&engine, &existing);
                let before = water_total(&items);

                let added = engine.add(&water_id(), qty, &items, &unlimited()).unwrap();
                assert_invariants(&added)?;
                prop_assert_eq!(water_total(&added), before + u64::from(qty));

                // Remove from the first stack only; retry across stacks when
                // the first one is too small, as a caller would.
                let mut left = qty;
                let mut current = added;
                while left > 0 {
                    let first = current.iter().find(|s| s.item_type == water_id()).unwrap().quantity;
                    let take = first.min(left);
                    current = engine.remove(&water_id(), take, &current).unwrap();
                    left -= take;
                }
                assert_invariants(&current)?;
                prop_assert_eq!(water_total(&current), before);
            }

            /// Property: split yields two positive stacks summing to the original.
            #[test]
            fn split_conserves_quantity(qty in 2u32..=5, amount in 1u32..5) {
                prop_assume!(amount < qty);
                let engine = engine();
                let items = waters(&engine, &[qty]);
                let next = engine.split(items[0].id, amount, &items, &CapacityPolicy::unlimited()).unwrap();

                assert_invariants(&next)?;
                prop_assert_eq!(next.len(), 2);
                prop_assert_eq!(next[0].quantity + next[1].quantity, qty);
            }

            /// Property: merging never exceeds the target's max stack.
            #[test]
            fn stack_never_overfills(target in 1u32..=4, source in 1u32..=5) {
                let engine = engine();
                let items = waters(&engine, &[target, source]);
                let next = engine.stack(items[0].id, items[1].id, &items).unwrap();

                assert_invariants(&next)?;
                prop_assert!(next[0].quantity <= next[0].max_stack);
                prop_assert_eq!(water_total(&next), u64::from(target + source));
            }

            /// Property: a rejected add never changes the snapshot.
            #[test]
            fn capacity_rejection_is_all_or_nothing(
                existing in proptest::collection::vec(1u32..=5, 0..4),
                qty in 1u32..30,
                max_cells in 1u32..6,
            ) {
                let engine = engine();
                let items = waters(&engine, &existing);
                let snapshot = items.clone();
                let options = AddOptions::new(CapacityPolicy::unlimited().with_cells(max_cells));

                match engine.add(&water_id(), qty, &items, &options) {
                    Ok(next) => {
                        assert_invariants(&next)?;
                        prop_assert!(next.len() as u32 <= max_cells);
                    }
                    Err(err) => prop_assert!(matches!(err, InventoryError::CapacityExceeded(_))),
                }
                prop_assert_eq!(items, snapshot);
            }
        }
    }
}
