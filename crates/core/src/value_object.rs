//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Two value objects
/// with the same attribute values are equal; identity does not exist for them.
///
/// Example:
/// - `DateRange { from, to }` is a value object
/// - `Trip { id: TripId(...), .. }` is an entity
///
/// Validation happens at construction, so a held value is always well-formed.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
