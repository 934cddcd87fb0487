//! Cell and weight capacity policy.

use serde::{Deserialize, Serialize};

use stash_core::ValueObject;

use crate::stack::ItemStack;

/// Per-owner limits, each independently enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityPolicy {
    pub max_cells: u32,
    pub max_weight: f64,
    pub enforce_cells: bool,
    pub enforce_weight: bool,
}

impl ValueObject for CapacityPolicy {}

impl CapacityPolicy {
    /// No limit of any kind.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_cells(mut self, max_cells: u32) -> Self {
        self.max_cells = max_cells;
        self.enforce_cells = true;
        self
    }

    pub fn with_weight(mut self, max_weight: f64) -> Self {
        self.max_weight = max_weight;
        self.enforce_weight = true;
        self
    }
}

/// Occupied cells and carried weight of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityUsage {
    pub cells: u64,
    pub weight: f64,
}

impl ValueObject for CapacityUsage {}

pub fn usage(items: &[ItemStack]) -> CapacityUsage {
    items.iter().fold(CapacityUsage::default(), |acc, stack| CapacityUsage {
        cells: acc.cells + stack.footprint(),
        weight: acc.weight + stack.total_weight(),
    })
}

/// Whether `items` respects `policy`.
///
/// An enforced cell limit of zero rejects every collection, the empty one
/// included.
pub fn fits(items: &[ItemStack], policy: &CapacityPolicy) -> bool {
    if policy.enforce_cells && policy.max_cells == 0 {
        return false;
    }

    let used = usage(items);
    if policy.enforce_cells && used.cells > u64::from(policy.max_cells) {
        return false;
    }
    if policy.enforce_weight && used.weight > policy.max_weight {
        return false;
    }
    true
}
