//! Mutation engine failures.

use thiserror::Error;

use stash_catalog::ItemTypeId;
use stash_core::StackId;

use crate::capacity::CapacityUsage;

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Expected, recoverable reasons an operation was refused.
///
/// Every failure means nothing was applied: the caller's snapshot is exactly
/// what it was before the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InventoryError {
    #[error("unknown item type '{0}'")]
    UnknownItemType(ItemTypeId),

    #[error("stack {0} not found")]
    NotFound(StackId),

    #[error("cannot merge '{source_type}' into '{target_type}'")]
    TypeMismatch {
        target_type: ItemTypeId,
        source_type: ItemTypeId,
    },

    #[error("item type '{0}' does not stack")]
    NotStackable(ItemTypeId),

    #[error("stack {0} is already full")]
    AlreadyFull(StackId),

    #[error("insufficient quantity (requested {requested}, available {available})")]
    InsufficientQuantity { requested: u32, available: u32 },

    #[error("cannot split {requested} from a stack of {available}")]
    InvalidSplit { requested: u32, available: u32 },

    #[error("capacity exceeded ({} cells, {} weight)", .0.cells, .0.weight)]
    CapacityExceeded(CapacityUsage),

    #[error("invalid quantity {0}")]
    InvalidQuantity(u32),

    #[error("stack {0} already exists in the collection")]
    DuplicateStack(StackId),

    #[error("stack {0} cannot be merged into itself")]
    InvalidMerge(StackId),

    #[error("stack {0} has already decayed")]
    Expired(StackId),
}
