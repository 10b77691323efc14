//! Small text checks shared by value objects and entities.
//!
//! Lengths are counted in characters, not bytes, so accented names
//! (`"Café Ñandú"`) are measured the way a user would count them.

use crate::error::{DomainError, DomainResult};

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn ensure_not_blank(value: &str, what: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid(format!("{what} cannot be empty")));
    }
    Ok(())
}

pub fn ensure_max_len(value: &str, max: usize, what: &str) -> DomainResult<()> {
    if char_len(value) > max {
        return Err(DomainError::invalid(format!(
            "{what} cannot exceed {max} characters"
        )));
    }
    Ok(())
}

/// Non-blank and at most `max` characters.
pub fn ensure_present(value: &str, max: usize, what: &str) -> DomainResult<()> {
    ensure_not_blank(value, what)?;
    ensure_max_len(value, max, what)
}

/// Same as [`ensure_max_len`] for optional fields; `None` always passes.
pub fn ensure_optional_max_len(value: Option<&str>, max: usize, what: &str) -> DomainResult<()> {
    match value {
        Some(v) => ensure_max_len(v, max, what),
        None => Ok(()),
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(char_len("Ñandú"), 5);
        assert!(ensure_max_len("Ñandú", 5, "name").is_ok());
        assert!(ensure_max_len("Ñandús", 5, "name").is_err());
    }

    #[test]
    fn blank_values_are_rejected() {
        let err = ensure_present("   ", 10, "Brand name").unwrap_err();
        assert_eq!(err, DomainError::invalid("Brand name cannot be empty"));
        assert!(ensure_optional_max_len(None, 1, "notes").is_ok());
    }

    #[test]
    fn case_insensitive_search() {
        assert!(contains_ignore_case("Av. Reforma 222", "reforma"));
        assert!(!contains_ignore_case("Av. Reforma 222", "insurgentes"));
    }
}
