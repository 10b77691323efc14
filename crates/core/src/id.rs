//! Strongly-typed identifiers used across the domain.
//!
//! Every identifier wraps a *nullable* positive integer: `null` means "not yet
//! persisted", never "invalid". Invalid raw values (zero, negatives, garbage
//! strings) are rejected at construction.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

macro_rules! nullable_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "Option<i64>", into = "Option<u64>")]
        pub struct $t(Option<u64>);

        impl $t {
            /// Wrap an already-assigned identifier.
            pub fn new(value: i64) -> DomainResult<Self> {
                if value <= 0 {
                    return Err(DomainError::invalid(concat!($name, " must be a positive integer or null")));
                }
                Ok(Self(Some(value as u64)))
            }

            /// Identifier of a record that has not been persisted yet.
            pub const fn null() -> Self {
                Self(None)
            }

            pub fn value(&self) -> Option<u64> {
                self.0
            }

            pub fn is_null(&self) -> bool {
                self.0.is_none()
            }

            /// The wrapped value, or an error for records that were never persisted.
            pub fn require(&self) -> DomainResult<u64> {
                self.0
                    .ok_or_else(|| DomainError::invalid(concat!($name, " has not been assigned yet")))
            }
        }

        impl From<u64> for $t {
            /// Identifiers issued by a persistence sequence (always > 0).
            fn from(value: u64) -> Self {
                if value == 0 { Self(None) } else { Self(Some(value)) }
            }
        }

        impl TryFrom<Option<i64>> for $t {
            type Error = DomainError;

            fn try_from(value: Option<i64>) -> Result<Self, Self::Error> {
                match value {
                    None => Ok(Self::null()),
                    Some(v) => Self::new(v),
                }
            }
        }

        impl From<$t> for Option<u64> {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self.0 {
                    Some(v) => write!(f, "{v}"),
                    None => f.write_str("null"),
                }
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() || s == "null" {
                    return Ok(Self::null());
                }
                let value = s
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid(format!("{}: {}", $name, e)))?;
                Self::new(value)
            }
        }
    };
}

nullable_id!(
    /// Identifier of a customer.
    CustomerId,
    "CustomerId"
);
nullable_id!(
    /// Identifier of a catalog product.
    ProductId,
    "ProductId"
);
nullable_id!(
    /// Identifier of a category node.
    CategoryId,
    "CategoryId"
);
nullable_id!(BrandId, "BrandId");
nullable_id!(UnitId, "UnitId");
nullable_id!(WarehouseId, "WarehouseId");
nullable_id!(
    /// Identifier of a per-warehouse stock record.
    StockId,
    "StockId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_distinct_from_invalid() {
        assert!(ProductId::null().is_null());
        assert!(ProductId::new(0).is_err());
        assert!(ProductId::new(-3).is_err());
        assert_eq!(ProductId::new(5).unwrap().value(), Some(5));
    }

    #[test]
    fn parses_from_string() {
        assert_eq!("12".parse::<CategoryId>().unwrap(), CategoryId::from(12));
        assert!("null".parse::<CategoryId>().unwrap().is_null());
        assert!("".parse::<CategoryId>().unwrap().is_null());
        assert!("abc".parse::<CategoryId>().is_err());
        assert!("-1".parse::<CategoryId>().is_err());
    }

    #[test]
    fn equality_is_by_wrapped_value() {
        assert_eq!(UnitId::from(3), UnitId::new(3).unwrap());
        assert_ne!(UnitId::from(3), UnitId::from(4));
        assert_eq!(UnitId::null(), UnitId::null());
    }

    #[test]
    fn require_rejects_unpersisted() {
        assert!(StockId::null().require().is_err());
        assert_eq!(StockId::from(9).require().unwrap(), 9);
    }

    #[test]
    fn serde_rejects_non_positive_values() {
        let id: BrandId = serde_json::from_str("7").unwrap();
        assert_eq!(id, BrandId::from(7));
        let id: BrandId = serde_json::from_str("null").unwrap();
        assert!(id.is_null());
        assert!(serde_json::from_str::<BrandId>("0").is_err());
        assert_eq!(serde_json::to_string(&WarehouseId::from(2)).unwrap(), "2");
    }
}
