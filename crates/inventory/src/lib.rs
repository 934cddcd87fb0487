//! Inventory mutation engine.
//!
//! Pure, deterministic stack arithmetic over an owner's item collection (no
//! IO, no storage, no notifications). Every operation borrows a snapshot and
//! returns a freshly built collection or a typed failure; the snapshot is
//! never touched.

pub mod capacity;
pub mod engine;
pub mod error;
pub mod event;
pub mod lookup;
pub mod stack;

pub use capacity::{CapacityPolicy, CapacityUsage, fits, usage};
pub use engine::{AddOptions, InventoryEngine};
pub use error::{InventoryError, InventoryResult};
pub use event::{InventoryEvent, ItemAdded, ItemRemoved, ItemsUpdated};
pub use lookup::{aux_data, find_by_type, get_by_id, has_quantity, total_quantity};
pub use stack::{GridSlot, ItemStack, StackPatch};
