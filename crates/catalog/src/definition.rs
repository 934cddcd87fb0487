use serde::{Deserialize, Serialize};

use stash_core::{DomainError, DomainResult};

/// Item type identifier (catalog key, e.g. "water_bottle").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTypeId(String);

impl ItemTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemTypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemTypeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Optional restriction flags carried by a definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restrictions {
    pub no_trade: bool,
    pub no_storage: bool,
    pub destroy_on_drop: bool,
}

/// Catalog entry for one item type (immutable once loaded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemTypeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width: u32,
    pub height: u32,
    /// Weight of a single unit.
    pub weight: f64,
    pub max_stack: u32,
    /// In-game hours until a freshly created stack expires.
    #[serde(default)]
    pub decay: Option<i64>,
    #[serde(default)]
    pub durability: Option<u32>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub restrictions: Restrictions,
    /// Name of the event fired when the item is used.
    #[serde(default)]
    pub use_event: Option<String>,
}

impl ItemDefinition {
    /// Minimal 1x1 definition; the rest is filled in with struct update syntax.
    pub fn new(id: impl Into<ItemTypeId>, name: impl Into<String>, weight: f64, max_stack: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            width: 1,
            height: 1,
            weight,
            max_stack,
            decay: None,
            durability: None,
            icon: String::new(),
            restrictions: Restrictions::default(),
            use_event: None,
        }
    }

    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    /// Occupied grid cells (width x height).
    pub fn footprint(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }

    /// Reject definitions the engine cannot reason about.
    ///
    /// Runs at every catalog write so a stored definition is never corrupt.
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::validation("item type id cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!("{}: name cannot be empty", self.id)));
        }
        if self.max_stack == 0 {
            return Err(DomainError::validation(format!("{}: max_stack must be at least 1", self.id)));
        }
        if self.width == 0 || self.height == 0 {
            return Err(DomainError::validation(format!("{}: footprint must be at least 1x1", self.id)));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(DomainError::validation(format!("{}: weight must be a non-negative number", self.id)));
        }
        Ok(())
    }
}
