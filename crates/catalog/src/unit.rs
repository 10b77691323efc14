//! Units of measure and conversion through a per-type base unit.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::text::{ensure_max_len, ensure_present};
use comercia_core::{DomainError, DomainResult, Entity, UnitId};

static LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").expect("letters pattern is valid"));

const NAME_MAX: usize = 50;
const ABBREVIATION_MAX: usize = 10;
const MAX_FACTOR: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Weight,
    Volume,
    Length,
    Area,
    Count,
    Time,
    Temperature,
    Other,
}

impl UnitType {
    pub const ALL: [UnitType; 8] = [
        Self::Weight,
        Self::Volume,
        Self::Length,
        Self::Area,
        Self::Count,
        Self::Time,
        Self::Temperature,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Volume => "volume",
            Self::Length => "length",
            Self::Area => "area",
            Self::Count => "count",
            Self::Time => "time",
            Self::Temperature => "temperature",
            Self::Other => "other",
        }
    }
}

impl core::fmt::Display for UnitType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for UnitType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| {
                DomainError::invalid(
                    "Invalid unit type. Allowed types are: weight, volume, length, area, count, time, temperature, other",
                )
            })
    }
}

/// Entity: unit of measure.
///
/// `conversion_factor` expresses one of this unit in the base unit of its
/// type (gram = 0.001 when kilogram is the base). Keeping a single base unit
/// per type is the store's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UnitRecord")]
pub struct Unit {
    id: UnitId,
    name: String,
    abbreviation: String,
    unit_type: UnitType,
    conversion_factor: f64,
    is_base_unit: bool,
    is_active: bool,
    usage_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    ensure_present(name, NAME_MAX, "Unit name")?;
    Ok(name.to_string())
}

fn validate_abbreviation(abbreviation: &str) -> DomainResult<String> {
    let abbreviation = abbreviation.trim();
    ensure_present(abbreviation, ABBREVIATION_MAX, "Unit abbreviation")?;
    if !LETTERS.is_match(abbreviation) {
        return Err(DomainError::invalid("Unit abbreviation can only contain letters"));
    }
    Ok(abbreviation.to_string())
}

fn validate_factor(factor: f64) -> DomainResult<f64> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(DomainError::invalid("Conversion factor must be greater than zero"));
    }
    if factor > MAX_FACTOR {
        return Err(DomainError::invalid("Conversion factor cannot exceed 1,000,000"));
    }
    Ok(factor)
}

/// Stored form of a [`Unit`].
#[derive(Debug, Clone, Deserialize)]
pub struct UnitRecord {
    pub id: UnitId,
    pub name: String,
    pub abbreviation: String,
    pub unit_type: UnitType,
    pub conversion_factor: f64,
    pub is_base_unit: bool,
    pub is_active: bool,
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UnitRecord> for Unit {
    type Error = DomainError;

    fn try_from(record: UnitRecord) -> DomainResult<Self> {
        Ok(Self {
            id: record.id,
            name: validate_name(&record.name)?,
            abbreviation: validate_abbreviation(&record.abbreviation)?,
            unit_type: record.unit_type,
            conversion_factor: validate_factor(record.conversion_factor)?,
            is_base_unit: record.is_base_unit,
            is_active: record.is_active,
            usage_count: record.usage_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Unit {
    pub fn create(
        name: &str,
        abbreviation: &str,
        unit_type: UnitType,
        conversion_factor: f64,
        is_base_unit: bool,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: UnitId::null(),
            name: validate_name(name)?,
            abbreviation: validate_abbreviation(abbreviation)?,
            unit_type,
            conversion_factor: validate_factor(conversion_factor)?,
            is_base_unit,
            is_active: true,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }

    pub fn is_base_unit(&self) -> bool {
        self.is_base_unit
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// `Kilogram (kg)`
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.abbreviation)
    }

    pub fn is_of_type(&self, unit_type: UnitType) -> bool {
        self.unit_type == unit_type
    }

    pub fn can_convert_to(&self, other: &Unit) -> bool {
        self.unit_type == other.unit_type
    }

    pub fn convert_to_base(&self, value: f64) -> f64 {
        value * self.conversion_factor
    }

    pub fn convert_from_base(&self, value: f64) -> f64 {
        value / self.conversion_factor
    }

    /// `value` in this unit expressed in `target`.
    pub fn convert_to(&self, target: &Unit, value: f64) -> DomainResult<f64> {
        if !self.can_convert_to(target) {
            return Err(DomainError::invalid(format!(
                "Cannot convert between different unit types ({} to {})",
                self.unit_type, target.unit_type
            )));
        }
        Ok(target.convert_from_base(self.convert_to_base(value)))
    }

    pub fn update_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn update_abbreviation(&mut self, abbreviation: &str) -> DomainResult<()> {
        self.abbreviation = validate_abbreviation(abbreviation)?;
        self.touch();
        Ok(())
    }

    pub fn update_conversion_factor(&mut self, factor: f64) -> DomainResult<()> {
        self.conversion_factor = validate_factor(factor)?;
        self.touch();
        Ok(())
    }

    pub fn mark_as_base_unit(&mut self) {
        self.is_base_unit = true;
        self.touch();
    }

    pub fn unmark_as_base_unit(&mut self) {
        self.is_base_unit = false;
        self.touch();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn increment_usage_count(&mut self) {
        self.usage_count += 1;
        self.touch();
    }

    pub fn decrement_usage_count(&mut self) {
        if self.usage_count > 0 {
            self.usage_count -= 1;
            self.touch();
        }
    }

    pub fn set_usage_count(&mut self, count: u64) {
        if self.usage_count != count {
            self.usage_count = count;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Unit {
    type Id = UnitId;

    fn id(&self) -> UnitId {
        self.id
    }

    fn with_id(mut self, id: UnitId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kilogram() -> Unit {
        Unit::create("Kilogram", "kg", UnitType::Weight, 1.0, true).unwrap()
    }

    fn gram() -> Unit {
        Unit::create("Gram", "g", UnitType::Weight, 0.001, false).unwrap()
    }

    #[test]
    fn converts_through_the_base_unit() {
        let kg = kilogram();
        let g = gram();
        assert!((kg.convert_to(&g, 2.5).unwrap() - 2500.0).abs() < 1e-9);
        assert!((g.convert_to(&kg, 750.0).unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(kg.convert_to(&kg, 3.0).unwrap(), 3.0);
        assert!((g.convert_to_base(500.0) - 0.5).abs() < 1e-12);
        assert_eq!(kg.display_name(), "Kilogram (kg)");
    }

    #[test]
    fn mismatched_types_cannot_convert() {
        let litre = Unit::create("Litre", "L", UnitType::Volume, 1.0, true).unwrap();
        assert!(!kilogram().can_convert_to(&litre));
        let err = kilogram().convert_to(&litre, 1.0).unwrap_err();
        assert_eq!(
            err,
            DomainError::invalid("Cannot convert between different unit types (weight to volume)")
        );
    }

    #[test]
    fn validation() {
        assert!(Unit::create("", "kg", UnitType::Weight, 1.0, false).is_err());
        assert!(Unit::create(&"n".repeat(51), "kg", UnitType::Weight, 1.0, false).is_err());
        assert_eq!(
            Unit::create("Metro cúbico", "m3", UnitType::Volume, 1.0, false).unwrap_err(),
            DomainError::invalid("Unit abbreviation can only contain letters")
        );
        assert!(Unit::create("Unidad", "abcdefghijk", UnitType::Count, 1.0, false).is_err());
        assert!(Unit::create("Nada", "x", UnitType::Other, 0.0, false).is_err());
        assert!(Unit::create("Mucho", "x", UnitType::Other, 1_000_001.0, false).is_err());
        assert!(Unit::create("Tonelada", "t", UnitType::Weight, 1_000.0, false).is_ok());
    }

    #[test]
    fn parses_unit_types() {
        assert_eq!(" Weight ".parse::<UnitType>().unwrap(), UnitType::Weight);
        assert!("mass".parse::<UnitType>().is_err());
    }

    #[test]
    fn base_flag_and_usage_counter() {
        let mut g = gram();
        g.mark_as_base_unit();
        assert!(g.is_base_unit());
        g.unmark_as_base_unit();
        assert!(!g.is_base_unit());
        g.decrement_usage_count();
        g.increment_usage_count();
        assert_eq!(g.usage_count(), 1);
        assert!(g.update_conversion_factor(-2.0).is_err());
        assert_eq!(g.conversion_factor(), 0.001);
    }

    #[test]
    fn stored_units_are_checked_on_load() {
        let g = gram();
        let json = serde_json::to_value(&g).unwrap();
        let back: Unit = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, g);

        let with = |field: &str, value: serde_json::Value| {
            let mut tampered = json.clone();
            tampered[field] = value;
            serde_json::from_value::<Unit>(tampered)
        };
        assert!(with("conversion_factor", 0.into()).is_err());
        assert!(with("conversion_factor", 2_000_000.0.into()).is_err());
        assert!(with("abbreviation", "g2".into()).is_err());
        assert!(with("name", "".into()).is_err());
        assert!(with("unit_type", "mass".into()).is_err());
    }
}
