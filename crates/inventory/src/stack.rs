use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stash_catalog::{ItemDefinition, ItemTypeId, Restrictions};
use stash_core::{Entity, StackId, ValueObject};

/// Grid placement of a stack inside an owner's inventory grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    pub x: u32,
    pub y: u32,
    #[serde(default)]
    pub rotated: bool,
}

impl ValueObject for GridSlot {}

/// An item definition instantiated into a collection.
///
/// Catalog fields are denormalized onto the stack so a persisted collection
/// stays readable when the catalog entry later changes or disappears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: StackId,
    pub item_type: ItemTypeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub weight: f64,
    pub max_stack: u32,
    pub quantity: u32,
    /// Remaining decay ticks; `None` means the stack never expires.
    #[serde(default)]
    pub decay: Option<i64>,
    #[serde(default)]
    pub durability: Option<u32>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub restrictions: Restrictions,
    #[serde(default)]
    pub use_event: Option<String>,
    #[serde(default)]
    pub slot: Option<GridSlot>,
    /// Free-form per-unit data; only meaningful on single-unit stacks.
    #[serde(default)]
    pub data: Option<JsonValue>,
}

impl Entity for ItemStack {
    type Id = StackId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ItemStack {
    /// Instantiate one stack with a fresh identifier.
    ///
    /// The caller is responsible for `quantity <= definition.max_stack`.
    pub fn from_definition(definition: &ItemDefinition, quantity: u32, data: Option<JsonValue>) -> Self {
        Self {
            id: StackId::new(),
            item_type: definition.id.clone(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            width: definition.width,
            height: definition.height,
            weight: definition.weight,
            max_stack: definition.max_stack,
            quantity,
            decay: definition.decay,
            durability: definition.durability,
            icon: definition.icon.clone(),
            restrictions: definition.restrictions,
            use_event: definition.use_event.clone(),
            slot: None,
            data,
        }
    }

    /// Create as many stacks as needed to hold `quantity` units, each capped
    /// at the definition's max stack.
    pub fn batch_from_definition(
        definition: &ItemDefinition,
        quantity: u32,
        data: Option<&JsonValue>,
    ) -> Vec<Self> {
        let cap = definition.max_stack.max(1);
        let mut remaining = quantity;
        let mut stacks = Vec::with_capacity(quantity.div_ceil(cap) as usize);
        while remaining > 0 {
            let take = remaining.min(cap);
            stacks.push(Self::from_definition(definition, take, data.cloned()));
            remaining -= take;
        }
        stacks
    }

    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    /// Units that can still be merged into this stack.
    pub fn room(&self) -> u32 {
        self.max_stack.saturating_sub(self.quantity)
    }

    pub fn is_full(&self) -> bool {
        self.room() == 0
    }

    pub fn footprint(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn total_weight(&self) -> f64 {
        self.weight * f64::from(self.quantity)
    }

    /// Quantity is within [1, max_stack].
    pub fn has_valid_quantity(&self) -> bool {
        self.quantity >= 1 && self.quantity <= self.max_stack
    }
}

/// Partial update shallow-merged onto an existing stack.
///
/// Identity and item type are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub weight: Option<f64>,
    pub quantity: Option<u32>,
    pub decay: Option<i64>,
    pub durability: Option<u32>,
    pub icon: Option<String>,
    pub slot: Option<GridSlot>,
    pub data: Option<JsonValue>,
}

impl StackPatch {
    pub fn with_decay(mut self, decay: i64) -> Self {
        self.decay = Some(decay);
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_slot(mut self, slot: GridSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    /// The patch expires the stack instead of updating it.
    pub fn kills(&self) -> bool {
        matches!(self.decay, Some(d) if d <= 0)
    }

    pub(crate) fn apply_to(&self, stack: &mut ItemStack) {
        if let Some(name) = &self.name {
            stack.name = name.clone();
        }
        if let Some(description) = &self.description {
            stack.description = description.clone();
        }
        if let Some(width) = self.width {
            stack.width = width;
        }
        if let Some(height) = self.height {
            stack.height = height;
        }
        if let Some(weight) = self.weight {
            stack.weight = weight;
        }
        if let Some(quantity) = self.quantity {
            stack.quantity = quantity;
        }
        if let Some(decay) = self.decay {
            stack.decay = Some(decay);
        }
        if let Some(durability) = self.durability {
            stack.durability = Some(durability);
        }
        if let Some(icon) = &self.icon {
            stack.icon = icon.clone();
        }
        if let Some(slot) = self.slot {
            stack.slot = Some(slot);
        }
        if let Some(data) = &self.data {
            stack.data = Some(data.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn water() -> ItemDefinition {
        ItemDefinition::new("water_bottle", "Water Bottle", 1.0, 5)
    }

    #[test]
    fn batch_caps_each_stack_at_max() {
        let stacks = ItemStack::batch_from_definition(&water(), 12, None);
        let quantities: Vec<u32> = stacks.iter().map(|s| s.quantity).collect();
        assert_eq!(quantities, vec![5, 5, 2]);
    }

    #[test]
    fn batch_assigns_distinct_ids() {
        let stacks = ItemStack::batch_from_definition(&water(), 10, None);
        assert_ne!(stacks[0].id, stacks[1].id);
    }

    #[test]
    fn batch_of_zero_is_empty() {
        assert!(ItemStack::batch_from_definition(&water(), 0, None).is_empty());
    }

    #[test]
    fn batch_copies_data_and_decay() {
        let def = ItemDefinition { decay: Some(24), ..ItemDefinition::new("bread", "Bread", 0.5, 1) };
        let data = json!({ "baker": "north" });
        let stacks = ItemStack::batch_from_definition(&def, 2, Some(&data));
        assert_eq!(stacks.len(), 2);
        assert!(stacks.iter().all(|s| s.decay == Some(24) && s.data == Some(data.clone())));
    }

    #[test]
    fn room_and_fullness() {
        let mut stack = ItemStack::from_definition(&water(), 3, None);
        assert_eq!(stack.room(), 2);
        stack.quantity = 5;
        assert!(stack.is_full());
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut stack = ItemStack::from_definition(&water(), 3, None);
        let before = stack.clone();
        StackPatch::default().with_slot(GridSlot { x: 1, y: 2, rotated: true }).apply_to(&mut stack);

        assert_eq!(stack.slot, Some(GridSlot { x: 1, y: 2, rotated: true }));
        assert_eq!(stack.quantity, before.quantity);
        assert_eq!(stack.name, before.name);
        assert_eq!(stack.id, before.id);
    }

    #[test]
    fn patch_with_non_positive_decay_kills() {
        assert!(StackPatch::default().with_decay(0).kills());
        assert!(StackPatch::default().with_decay(-3).kills());
        assert!(!StackPatch::default().with_decay(1).kills());
        assert!(!StackPatch::default().kills());
    }
}
