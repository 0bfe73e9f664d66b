//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are interchangeable. Derived figures such as invoice totals are
/// value objects; they are recomputed rather than mutated.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Totals { amount: i64, paid: i64 }
///
/// impl ValueObject for Totals {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
