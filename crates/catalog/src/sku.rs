//! Stock keeping unit code.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::text::ensure_max_len;
use comercia_core::{DomainError, DomainResult, ValueObject};

static SKU_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("sku pattern is valid"));

const MAX_LEN: usize = 50;

/// Uppercased SKU, e.g. `TSHIRT-RED-M`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::invalid("SKU cannot be empty"));
        }
        ensure_max_len(value, MAX_LEN, "SKU")?;
        if !SKU_PATTERN.is_match(value) {
            return Err(DomainError::invalid(
                "SKU can only contain letters, numbers, hyphens, and underscores",
            ));
        }
        Ok(Self(value.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Segment before the first `-` (the whole code when there is none).
    pub fn prefix(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Segment after the last `-`.
    pub fn suffix(&self) -> &str {
        self.0.rsplit('-').next().unwrap_or(&self.0)
    }
}

impl ValueObject for Sku {}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Sku {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Sku {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Sku> for String {
    fn from(value: Sku) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_uppercase() {
        let sku = Sku::new(" tshirt-red_x-m ").unwrap();
        assert_eq!(sku.value(), "TSHIRT-RED_X-M");
        assert_eq!(sku.prefix(), "TSHIRT");
        assert_eq!(sku.suffix(), "M");
        assert_eq!(sku, Sku::new("TSHIRT-RED_X-M").unwrap());
    }

    #[test]
    fn single_segment_is_both_prefix_and_suffix() {
        let sku = Sku::new("ABC123").unwrap();
        assert_eq!(sku.prefix(), "ABC123");
        assert_eq!(sku.suffix(), "ABC123");
    }

    #[test]
    fn rejects_bad_codes() {
        assert_eq!(Sku::new("  ").unwrap_err(), DomainError::invalid("SKU cannot be empty"));
        assert_eq!(
            Sku::new(&"A".repeat(51)).unwrap_err(),
            DomainError::invalid("SKU cannot exceed 50 characters")
        );
        assert!(Sku::new("ABC 123").is_err());
        assert!(Sku::new("ABC/123").is_err());
        assert!(Sku::new("CAFÉ-1").is_err());
    }
}
