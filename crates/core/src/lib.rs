//! `stash-core`: shared building blocks for the inventory workspace.
//!
//! This crate contains **pure** primitives (no storage, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod record;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{OwnerId, StackId};
pub use record::{ExpectedVersion, VersionedRecord};
pub use value_object::ValueObject;
