//! Entity trait: identity that survives state changes.

/// Entity marker + minimal interface.
///
/// An item stack is the canonical entity here: its quantity, decay and
/// auxiliary data change over its lifetime while its identifier never does.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
