//! URL-safe product slug.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::{DomainError, DomainResult, ValueObject};

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductSlug(String);

fn fold_accent(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        _ => return None,
    };
    Some(folded)
}

impl ProductSlug {
    /// Validated slug (`lowercase-words-and-digits`).
    pub fn new(raw: &str) -> DomainResult<Self> {
        if raw.is_empty() {
            return Err(DomainError::invalid("Product slug cannot be empty"));
        }
        if !SLUG_PATTERN.is_match(raw) {
            return Err(DomainError::invalid("Invalid product slug format"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Lowercases and folds Spanish/Latin accents. Whitespace, `-` and `_`
    /// become single dashes; other punctuation is dropped.
    pub fn from_name(name: &str) -> DomainResult<Self> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;
        for c in name.chars().flat_map(char::to_lowercase) {
            let c = fold_accent(c).unwrap_or(c);
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else if c.is_whitespace() || c == '-' || c == '_' {
                pending_dash = true;
            }
        }
        if slug.is_empty() {
            return Err(DomainError::invalid("Cannot generate slug from empty name"));
        }
        Self::new(&slug)
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ProductSlug {}

impl core::fmt::Display for ProductSlug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductSlug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ProductSlug> for String {
    fn from(value: ProductSlug) -> Self {
        value.0
    }
}
