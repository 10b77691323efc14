//! Monetary amount with two decimal places.

use core::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use comercia_core::{DomainError, DomainResult, ValueObject};

const SCALE: u32 = 2;

fn max_price() -> Decimal {
    Decimal::new(99_999_999_999, SCALE)
}

fn hundred() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Non-negative amount, at most 999,999,999.99, rounded half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::invalid("Price cannot be negative"));
        }
        let rounded = amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        if rounded > max_price() {
            return Err(DomainError::invalid("Price exceeds maximum allowed value"));
        }
        Ok(Self(rounded.abs()))
    }

    /// `Price::from_cents(1999)` is 19.99.
    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        Self::new(Decimal::new(cents, SCALE))
    }

    pub fn from_f64(amount: f64) -> DomainResult<Self> {
        let amount = Decimal::from_f64(amount)
            .ok_or_else(|| DomainError::invalid("Price must be a finite number"))?;
        Self::new(amount)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    pub fn add(&self, other: &Price) -> DomainResult<Price> {
        Self::new(self.0 + other.0)
    }

    /// Rejects results below zero instead of clamping.
    pub fn subtract(&self, other: &Price) -> DomainResult<Price> {
        let result = self.0 - other.0;
        if result.is_sign_negative() && !result.is_zero() {
            return Err(DomainError::invalid("Resulting price cannot be negative"));
        }
        Self::new(result)
    }

    pub fn multiply(&self, multiplier: Decimal) -> DomainResult<Price> {
        if multiplier.is_sign_negative() && !multiplier.is_zero() {
            return Err(DomainError::invalid("Multiplier cannot be negative"));
        }
        let result = self
            .0
            .checked_mul(multiplier)
            .ok_or_else(|| DomainError::invalid("Price exceeds maximum allowed value"))?;
        Self::new(result)
    }

    pub fn divide(&self, divisor: Decimal) -> DomainResult<Price> {
        if divisor <= Decimal::ZERO {
            return Err(DomainError::invalid("Divisor must be greater than zero"));
        }
        let result = self
            .0
            .checked_div(divisor)
            .ok_or_else(|| DomainError::invalid("Price exceeds maximum allowed value"))?;
        Self::new(result)
    }

    /// `percentage` in `0..=100`.
    pub fn apply_discount(&self, percentage: Decimal) -> DomainResult<Price> {
        if percentage < Decimal::ZERO || percentage > hundred() {
            return Err(DomainError::invalid(
                "Discount percentage must be between 0 and 100",
            ));
        }
        Self::new(self.0 - self.0 * percentage / hundred())
    }

    pub fn apply_tax(&self, percentage: Decimal) -> DomainResult<Price> {
        if percentage < Decimal::ZERO {
            return Err(DomainError::invalid("Tax percentage cannot be negative"));
        }
        Self::new(self.0 + self.0 * percentage / hundred())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_greater_than(&self, other: &Price) -> bool {
        self.0 > other.0
    }

    pub fn is_less_than(&self, other: &Price) -> bool {
        self.0 < other.0
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    /// Always two decimals: `19.90`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut shown = self.0;
        shown.rescale(SCALE);
        write!(f, "{shown}")
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|_| DomainError::invalid("Price must be a numeric value"))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}
