//! Read-only queries over a collection.

use serde::de::DeserializeOwned;

use stash_catalog::ItemTypeId;
use stash_core::StackId;

use crate::stack::ItemStack;

pub fn get_by_id(items: &[ItemStack], id: StackId) -> Option<&ItemStack> {
    items.iter().find(|s| s.id == id)
}

/// Decode a stack's auxiliary data into `T`.
///
/// `None` when the stack is missing, carries no data, or the data does not
/// decode as `T`.
pub fn aux_data<T: DeserializeOwned>(items: &[ItemStack], id: StackId) -> Option<T> {
    let data = get_by_id(items, id)?.data.clone()?;
    serde_json::from_value(data).ok()
}

pub fn find_by_type<'a>(items: &'a [ItemStack], item_type: &'a ItemTypeId) -> impl Iterator<Item = &'a ItemStack> + 'a {
    items.iter().filter(move |s| &s.item_type == item_type)
}

/// Units of `item_type` across every stack.
pub fn total_quantity(items: &[ItemStack], item_type: &ItemTypeId) -> u64 {
    find_by_type(items, item_type).map(|s| u64::from(s.quantity)).sum()
}

/// Whether the collection holds at least `quantity` units of `item_type`,
/// summed over all of its stacks.
pub fn has_quantity(items: &[ItemStack], item_type: &ItemTypeId, quantity: u32) -> bool {
    total_quantity(items, item_type) >= u64::from(quantity)
}
