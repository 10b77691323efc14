//! Free-text postal address.
//!
//! Stored as written (trimmed). The conventional layout is one item per line:
//! street, neighborhood, city/state; the ZIP code can appear anywhere.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::text::{char_len, contains_ignore_case};
use comercia_core::{DomainError, DomainResult, ValueObject};

static ZIP_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{5}\b").expect("zip pattern is valid"));

const MIN_LEN: usize = 10;
const MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::invalid("Address cannot be empty"));
        }
        let len = char_len(value);
        if len < MIN_LEN {
            return Err(DomainError::invalid("Address is too short"));
        }
        if len > MAX_LEN {
            return Err(DomainError::invalid("Address is too long"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Non-empty, trimmed lines.
    pub fn lines(&self) -> Vec<&str> {
        self.0
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn street(&self) -> Option<&str> {
        self.lines().first().copied()
    }

    pub fn neighborhood(&self) -> Option<&str> {
        self.lines().get(1).copied()
    }

    pub fn city_state(&self) -> Option<&str> {
        self.lines().get(2).copied()
    }

    /// First standalone group of five digits.
    pub fn zip_code(&self) -> Option<&str> {
        ZIP_CODE.find(&self.0).map(|m| m.as_str())
    }

    pub fn contains(&self, term: &str) -> bool {
        contains_ignore_case(&self.0, term)
    }
}

impl ValueObject for Address {}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}
