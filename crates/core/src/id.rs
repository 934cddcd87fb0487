//! Strongly-typed identifiers used across the workspace.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an owner record (player, vehicle or named storage).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

/// Globally-unique identifier of an item stack.
///
/// Assigned once when the stack is created and never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(OwnerId, "OwnerId");
impl_uuid_newtype!(StackId, "StackId");
