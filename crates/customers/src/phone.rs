//! Mexican phone number, normalized to 12 digits with the `52` country code.

use serde::{Deserialize, Serialize};

use comercia_core::{DomainError, DomainResult, ValueObject};

const COUNTRY_CODE: &str = "52";
const NATIONAL_DIGITS: usize = 10;
const FULL_DIGITS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accepts any punctuation; only the digits are kept.
    ///
    /// Ten digits are a national number and get the country code prepended.
    /// Twelve digits are taken as already carrying it. Anything else is rejected.
    pub fn new(raw: &str) -> DomainResult<Self> {
        if raw.trim().is_empty() {
            return Err(DomainError::invalid("Phone number cannot be empty"));
        }
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        match digits.len() {
            n if n < NATIONAL_DIGITS => Err(DomainError::invalid("Phone number is too short")),
            n if n > FULL_DIGITS => Err(DomainError::invalid("Phone number is too long")),
            NATIONAL_DIGITS => Ok(Self(format!("{COUNTRY_CODE}{digits}"))),
            FULL_DIGITS => Ok(Self(digits)),
            _ => Err(DomainError::invalid(
                "Phone number must have 10 digits or 12 digits including the country code",
            )),
        }
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// `+52 (555) 123-4567`
    pub fn formatted(&self) -> String {
        format!(
            "+{} ({}) {}-{}",
            self.country_code(),
            self.area_code(),
            &self.0[5..8],
            &self.0[8..]
        )
    }

    pub fn country_code(&self) -> &str {
        &self.0[..2]
    }

    pub fn area_code(&self) -> &str {
        &self.0[2..5]
    }

    pub fn local_number(&self) -> &str {
        &self.0[5..]
    }
}

impl ValueObject for PhoneNumber {}

impl core::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl core::str::FromStr for PhoneNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn national_numbers_get_the_country_code() {
        let phone = PhoneNumber::new("(555) 123-4567").unwrap();
        assert_eq!(phone.value(), "525551234567");
        assert_eq!(phone.formatted(), "+52 (555) 123-4567");
        assert_eq!(phone.to_string(), "+52 (555) 123-4567");
        assert_eq!(phone.country_code(), "52");
        assert_eq!(phone.area_code(), "555");
        assert_eq!(phone.local_number(), "1234567");
    }

    #[test]
    fn full_numbers_are_kept() {
        let a = PhoneNumber::new("+52 555 123 4567").unwrap();
        let b = PhoneNumber::new("5551234567").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert_eq!(
            PhoneNumber::new("").unwrap_err(),
            DomainError::invalid("Phone number cannot be empty")
        );
        assert_eq!(
            PhoneNumber::new("555-1234").unwrap_err(),
            DomainError::invalid("Phone number is too short")
        );
        assert_eq!(
            PhoneNumber::new("+52 1 555 123 4567 8").unwrap_err(),
            DomainError::invalid("Phone number is too long")
        );
        assert!(PhoneNumber::new("15551234567").is_err());
    }

    #[test]
    fn serde_goes_through_validation() {
        let phone: PhoneNumber = serde_json::from_str("\"5551234567\"").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"525551234567\"");
        assert!(serde_json::from_str::<PhoneNumber>("\"123\"").is_err());
    }
}
