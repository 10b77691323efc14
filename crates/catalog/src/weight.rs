//! Product weight with unit conversion.

use core::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::{DomainError, DomainResult, ValueObject};

use crate::dimensions::LengthUnit;
use crate::measure::{approx_eq, approx_le, round_to};
use crate::price::Price;

static WEIGHT_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\d.]+)\s*([a-zA-Z]+)$").expect("weight pattern is valid"));

/// Heaviest accepted weight, in kilograms. Values in other units are
/// converted before the check, so the limit is one physical mass.
const MAX_KG: f64 = 10_000.0;

/// Smallest stored amount in any unit; values are kept to 2 decimals.
const MIN_VALUE: f64 = 0.01;
const DECIMALS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Mg,
    G,
    Kg,
    Oz,
    Lb,
}

impl WeightUnit {
    pub const ALL: [WeightUnit; 5] = [Self::Mg, Self::G, Self::Kg, Self::Oz, Self::Lb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mg => "mg",
            Self::G => "g",
            Self::Kg => "kg",
            Self::Oz => "oz",
            Self::Lb => "lb",
        }
    }

    /// Multiplier turning an amount in `self` into an amount in `target`.
    pub fn factor_to(self, target: WeightUnit) -> f64 {
        use WeightUnit::*;
        match (self, target) {
            (a, b) if a == b => 1.0,
            (Mg, G) => 0.001,
            (Mg, Kg) => 0.000001,
            (Mg, Oz) => 0.000035274,
            (Mg, Lb) => 0.00000220462,
            (G, Mg) => 1000.0,
            (G, Kg) => 0.001,
            (G, Oz) => 0.035274,
            (G, Lb) => 0.00220462,
            (Kg, Mg) => 1_000_000.0,
            (Kg, G) => 1000.0,
            (Kg, Oz) => 35.274,
            (Kg, Lb) => 2.20462,
            (Oz, Mg) => 28349.5,
            (Oz, G) => 28.3495,
            (Oz, Kg) => 0.0283495,
            (Oz, Lb) => 0.0625,
            (Lb, Mg) => 453592.0,
            (Lb, G) => 453.592,
            (Lb, Kg) => 0.453592,
            (Lb, Oz) => 16.0,
            _ => 1.0,
        }
    }
}

impl core::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == lowered)
            .ok_or_else(|| DomainError::invalid("Invalid unit. Allowed units are: mg, g, kg, oz, lb"))
    }
}

/// Serialized form of [`Weight`]; validated on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    pub value: f64,
    pub unit: WeightUnit,
}

/// Strictly positive weight. An unknown weight is `Option::<Weight>::None`,
/// never zero.
///
/// Constructors round to 2 decimals; conversions keep full precision so a
/// round trip through another unit compares equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "WeightRecord", into = "WeightRecord")]
pub struct Weight {
    value: f64,
    unit: WeightUnit,
}

impl Weight {
    pub fn new(value: f64, unit: WeightUnit) -> DomainResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::invalid("Weight must be greater than zero"));
        }
        let value = round_to(value, DECIMALS);
        if value < MIN_VALUE {
            return Err(DomainError::invalid(format!(
                "Weight must be at least {MIN_VALUE} {unit}"
            )));
        }
        if value * unit.factor_to(WeightUnit::Kg) > MAX_KG * (1.0 + 1e-9) {
            return Err(DomainError::invalid(
                "Weight exceeds maximum allowed value (10000 kg)",
            ));
        }
        Ok(Self { value, unit })
    }

    pub fn kilograms(value: f64) -> DomainResult<Self> {
        Self::new(value, WeightUnit::Kg)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> WeightUnit {
        self.unit
    }

    /// Same mass expressed in `unit`.
    pub fn convert_to(&self, unit: WeightUnit) -> Weight {
        Weight {
            value: self.amount_in(unit),
            unit,
        }
    }

    pub fn amount_in(&self, unit: WeightUnit) -> f64 {
        self.value * self.unit.factor_to(unit)
    }

    /// Result keeps the unit of `self`.
    pub fn add(&self, other: &Weight) -> DomainResult<Weight> {
        Weight::new(self.value + other.amount_in(self.unit), self.unit)
    }

    pub fn subtract(&self, other: &Weight) -> DomainResult<Weight> {
        let result = self.value - other.amount_in(self.unit);
        if result <= 0.0 || approx_eq(self.value, other.amount_in(self.unit)) {
            return Err(DomainError::invalid(
                "Resulting weight cannot be zero or negative",
            ));
        }
        Weight::new(result, self.unit)
    }

    pub fn multiply(&self, multiplier: f64) -> DomainResult<Weight> {
        if multiplier <= 0.0 {
            return Err(DomainError::invalid("Multiplier must be greater than zero"));
        }
        Weight::new(self.value * multiplier, self.unit)
    }

    pub fn divide(&self, divisor: f64) -> DomainResult<Weight> {
        if divisor <= 0.0 {
            return Err(DomainError::invalid("Divisor must be greater than zero"));
        }
        Weight::new(self.value / divisor, self.unit)
    }

    pub fn is_heavier_than(&self, other: &Weight) -> bool {
        self.value > other.amount_in(self.unit) && self != other
    }

    pub fn is_lighter_than(&self, other: &Weight) -> bool {
        self.value < other.amount_in(self.unit) && self != other
    }

    pub fn is_within_range(&self, min: &Weight, max: &Weight) -> bool {
        approx_le(min.amount_in(self.unit), self.value) && approx_le(self.value, max.amount_in(self.unit))
    }

    /// Grams per cubic centimetre, rounded to 4 decimals. `volume` is in cubic
    /// `volume_unit` (`LengthUnit::Cm` means cm³).
    pub fn density(&self, volume: f64, volume_unit: LengthUnit) -> DomainResult<f64> {
        if !volume.is_finite() || volume <= 0.0 {
            return Err(DomainError::invalid("Volume must be greater than zero"));
        }
        let cm3 = volume * volume_unit.factor_to(LengthUnit::Cm).powi(3);
        Ok(round_to(self.amount_in(WeightUnit::G) / cm3, 4))
    }

    pub fn shipping_cost(&self, cost_per_kg: &Price) -> DomainResult<Price> {
        Price::from_f64(self.amount_in(WeightUnit::Kg) * cost_per_kg.to_f64())
    }

    /// `2.50 kg`
    pub fn formatted(&self) -> String {
        format!("{:.2} {}", self.value, self.unit)
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.value, other.amount_in(self.unit))
    }
}

impl ValueObject for Weight {}

impl core::fmt::Display for Weight {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl FromStr for Weight {
    type Err = DomainError;

    /// `"2.5 kg"`, `"500g"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = WEIGHT_TEXT.captures(s.trim()).ok_or_else(|| {
            DomainError::invalid("Invalid weight string format. Expected format: \"value unit\"")
        })?;
        let value = caps[1]
            .parse::<f64>()
            .map_err(|_| DomainError::invalid("Weight must be a numeric value"))?;
        Weight::new(value, caps[2].parse()?)
    }
}

impl TryFrom<WeightRecord> for Weight {
    type Error = DomainError;

    fn try_from(raw: WeightRecord) -> Result<Self, Self::Error> {
        Weight::new(raw.value, raw.unit)
    }
}

impl From<Weight> for WeightRecord {
    fn from(w: Weight) -> Self {
        WeightRecord {
            value: w.value,
            unit: w.unit,
        }
    }
}
