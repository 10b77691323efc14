//! RFC (Registro Federal de Contribuyentes), the Mexican tax identifier.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::{DomainError, DomainResult, ValueObject};

// 3 letters for companies, 4 for individuals; birth/incorporation date; homoclave.
static RFC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-ZÑ&]{3,4}[0-9]{6}[A-Z0-9]{3}$").expect("rfc pattern is valid"));

/// Uppercased, trimmed RFC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rfc(String);

impl Rfc {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let value = raw.trim().to_uppercase();
        if value.is_empty() {
            return Err(DomainError::invalid("RFC cannot be empty"));
        }
        if !RFC_PATTERN.is_match(&value) {
            return Err(DomainError::invalid("Invalid RFC format"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Companies (personas morales) carry a 3-letter prefix, individuals 4.
    pub fn is_company(&self) -> bool {
        self.0.chars().count() == 12
    }
}

impl ValueObject for Rfc {}

impl core::fmt::Display for Rfc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Rfc {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Rfc {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Rfc> for String {
    fn from(value: Rfc) -> Self {
        value.0
    }
}
