//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Capacity policies, usage totals and grid placements are compared by their
/// attribute values; two policies with the same limits are interchangeable.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Footprint {
///     width: u32,
///     height: u32,
/// }
///
/// impl ValueObject for Footprint {}
///
/// assert_eq!(Footprint { width: 1, height: 2 }, Footprint { width: 1, height: 2 });
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
