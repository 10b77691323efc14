//! Whole-unit stock quantity.

use serde::{Deserialize, Serialize};

use comercia_core::{DomainError, DomainResult, ValueObject};

pub const MAX_QUANTITY: u64 = 999_999_999;

/// Non-negative integer quantity, at most [`MAX_QUANTITY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct StockQuantity(u64);

impl StockQuantity {
    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 0 {
            return Err(DomainError::invalid("Stock quantity cannot be negative"));
        }
        Self::checked(value as u64)
    }

    fn checked(value: u64) -> DomainResult<Self> {
        if value > MAX_QUANTITY {
            return Err(DomainError::invalid(
                "Stock quantity exceeds maximum allowed value",
            ));
        }
        Ok(Self(value))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn one() -> Self {
        Self(1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn add(&self, other: StockQuantity) -> DomainResult<StockQuantity> {
        Self::checked(self.0 + other.0)
    }

    pub fn subtract(&self, other: StockQuantity) -> DomainResult<StockQuantity> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or_else(|| DomainError::invalid("Insufficient stock quantity"))
    }

    pub fn multiply(&self, multiplier: u64) -> DomainResult<StockQuantity> {
        let result = self.0.checked_mul(multiplier).unwrap_or(u64::MAX);
        if result > MAX_QUANTITY {
            return Err(DomainError::invalid(
                "Result exceeds maximum allowed stock quantity",
            ));
        }
        Ok(Self(result))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_sufficient_for(&self, required: StockQuantity) -> bool {
        self.0 >= required.0
    }

    /// Share of `total` in percent; 0 when `total` is zero.
    pub fn percentage_of(&self, total: StockQuantity) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        self.0 as f64 / total.0 as f64 * 100.0
    }
}

impl ValueObject for StockQuantity {}

impl core::fmt::Display for StockQuantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl core::str::FromStr for StockQuantity {
    type Err = DomainError;

    /// Integers only: `"12"` parses, `"12.5"` and `"1e3"` do not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.parse::<f64>().is_err() {
            return Err(DomainError::invalid("Stock quantity must be a numeric value"));
        }
        let value = s
            .parse::<i64>()
            .map_err(|_| DomainError::invalid("Stock quantity must be an integer value"))?;
        Self::new(value)
    }
}

impl TryFrom<i64> for StockQuantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StockQuantity> for u64 {
    fn from(value: StockQuantity) -> Self {
        value.0
    }
}
