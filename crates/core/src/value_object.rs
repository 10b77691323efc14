//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects wrap a primitive (or a small group of primitives), validate it once
/// at construction, and are **immutable** afterwards. Arithmetic and conversions
/// return new instances; they never mutate `self`.
///
/// ## Construction
///
/// Constructors return `DomainResult<Self>`: an invalid value is rejected before any
/// instance exists, so holding a `Price` or an `Rfc` is proof that it passed
/// validation.
///
/// ```ignore
/// let price = Price::new(Decimal::new(1999, 2))?;
/// let discounted = price.apply_discount(Decimal::new(10, 0))?; // `price` is unchanged
/// assert!(discounted.is_less_than(&price));
/// ```
///
/// ## Design Constraints
///
/// - **Clone**: value objects are cheap to copy
/// - **PartialEq**: compared by their attribute values (some use a tolerance or a
///   normalized form, e.g. case-insensitive product names)
/// - **Debug**: printable in logs and test failures
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
