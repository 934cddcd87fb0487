//! Owner record persistence boundary.
//!
//! One document per owner holds the whole item collection. The store is the
//! single source of truth and is re-read at the start of every mutation.

pub mod in_memory;
pub mod record;
pub mod r#trait;

pub use in_memory::InMemoryOwnerStore;
pub use record::{OwnerKind, OwnerRecord};
pub use r#trait::{OwnerStore, StoreError};
