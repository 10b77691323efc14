//! Product display name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::text::{char_len, contains_ignore_case};
use comercia_core::{DomainError, DomainResult, ValueObject};

static ALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9\s\-.,'()áéíóúÁÉÍÓÚñÑüÜ]+$").expect("name pattern is valid")
});
static EDGE_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\-.,'()]|[\s\-.,'()]$").expect("edge pattern is valid"));
static REPEATED_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("space pattern is valid"));

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 255;

/// Trimmed product name. Equality ignores case.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    pub fn new(raw: &str) -> DomainResult<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::invalid("Product name cannot be empty"));
        }
        let len = char_len(name);
        if len < MIN_LEN {
            return Err(DomainError::invalid(
                "Product name must be at least 2 characters long",
            ));
        }
        if len > MAX_LEN {
            return Err(DomainError::invalid("Product name cannot exceed 255 characters"));
        }
        if !name.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::invalid(
                "Product name must contain at least one letter",
            ));
        }
        if !ALLOWED.is_match(name) {
            return Err(DomainError::invalid("Product name contains invalid characters"));
        }
        if EDGE_PUNCTUATION.is_match(name) {
            return Err(DomainError::invalid(
                "Product name cannot start or end with special characters",
            ));
        }
        if REPEATED_SPACE.is_match(name) {
            return Err(DomainError::invalid(
                "Product name cannot have multiple consecutive spaces",
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, term: &str) -> bool {
        contains_ignore_case(&self.0, term)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.to_lowercase().starts_with(&prefix.to_lowercase())
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.0.to_lowercase().ends_with(&suffix.to_lowercase())
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    pub fn len(&self) -> usize {
        char_len(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shortens to at most `max` characters (including `suffix`), preferring
    /// to cut at a word boundary in the second half of the kept text.
    pub fn abbreviate(&self, max: usize, suffix: &str) -> String {
        if self.len() <= max {
            return self.0.clone();
        }
        let keep = max.saturating_sub(char_len(suffix));
        let mut cut: String = self.0.chars().take(keep).collect();
        if let Some(space) = cut.rfind(' ') {
            if char_len(&cut[..space]) > max / 2 {
                cut.truncate(space);
            }
        }
        format!("{cut}{suffix}")
    }
}

impl PartialEq for ProductName {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl core::hash::Hash for ProductName {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl ValueObject for ProductName {}

impl core::fmt::Display for ProductName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ProductName> for String {
    fn from(value: ProductName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        for raw in ["Camiseta (Roja) Básica", "iPhone 15 Pro", "Men's T-Shirt, XL", "Año 2024"] {
            assert!(ProductName::new(raw).is_ok(), "{raw:?}");
        }
    }

    #[test]
    fn rejects_invalid_names() {
        let cases = [
            ("", "Product name cannot be empty"),
            ("A", "Product name must be at least 2 characters long"),
            ("12345", "Product name must contain at least one letter"),
            ("Tuerca #5", "Product name contains invalid characters"),
            ("-Tuerca", "Product name cannot start or end with special characters"),
            ("Tuerca.", "Product name cannot start or end with special characters"),
            ("Tuerca  grande", "Product name cannot have multiple consecutive spaces"),
        ];
        for (raw, msg) in cases {
            assert_eq!(ProductName::new(raw).unwrap_err(), DomainError::invalid(msg), "{raw:?}");
        }
        assert!(ProductName::new(&"a".repeat(256)).is_err());
    }

    #[test]
    fn equality_and_search_ignore_case() {
        let name = ProductName::new("Laptop Gamer Pro").unwrap();
        assert_eq!(name, ProductName::new("laptop gamer PRO").unwrap());
        assert!(name.contains("GAMER"));
        assert!(name.starts_with("lap"));
        assert!(name.ends_with("PRO"));
        assert_eq!(name.word_count(), 3);
    }

    #[test]
    fn abbreviate_prefers_word_boundaries() {
        let name = ProductName::new("Laptop Gamer Pro Edition").unwrap();
        assert_eq!(name.abbreviate(50, "..."), "Laptop Gamer Pro Edition");
        assert_eq!(name.abbreviate(20, "..."), "Laptop Gamer Pro...");
        assert_eq!(name.abbreviate(10, "..."), "Laptop...");
    }
}
