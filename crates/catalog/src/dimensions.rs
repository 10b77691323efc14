//! Box dimensions (length × width × height) with unit conversion.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use comercia_core::{DomainError, DomainResult, ValueObject};

use crate::measure::{approx_eq, approx_le, round_to};

/// Longest accepted side, in metres.
const MAX_SIDE_M: f64 = 1_000.0;

/// Shortest stored side in any unit.
const MIN_SIDE: f64 = 0.01;
const DECIMALS: i32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Mm,
    #[default]
    Cm,
    M,
    In,
    Ft,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 5] = [Self::Mm, Self::Cm, Self::M, Self::In, Self::Ft];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Cm => "cm",
            Self::M => "m",
            Self::In => "in",
            Self::Ft => "ft",
        }
    }

    /// Multiplier turning a length in `self` into a length in `target`.
    pub fn factor_to(self, target: LengthUnit) -> f64 {
        use LengthUnit::*;
        match (self, target) {
            (a, b) if a == b => 1.0,
            (Mm, Cm) => 0.1,
            (Mm, M) => 0.001,
            (Mm, In) => 0.0393701,
            (Mm, Ft) => 0.00328084,
            (Cm, Mm) => 10.0,
            (Cm, M) => 0.01,
            (Cm, In) => 0.393701,
            (Cm, Ft) => 0.0328084,
            (M, Mm) => 1000.0,
            (M, Cm) => 100.0,
            (M, In) => 39.3701,
            (M, Ft) => 3.28084,
            (In, Mm) => 25.4,
            (In, Cm) => 2.54,
            (In, M) => 0.0254,
            (In, Ft) => 0.0833333,
            (Ft, Mm) => 304.8,
            (Ft, Cm) => 30.48,
            (Ft, M) => 0.3048,
            (Ft, In) => 12.0,
            _ => 1.0,
        }
    }
}

impl core::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == lowered)
            .ok_or_else(|| DomainError::invalid("Invalid unit. Allowed units are: mm, cm, m, in, ft"))
    }
}

/// Serialized form of [`Dimensions`]; validated on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionsRecord {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: LengthUnit,
}

/// Strictly positive box. Unknown dimensions are `None`, never zero.
///
/// Sides are rounded to 2 decimals on construction; `convert_to` keeps full
/// precision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "DimensionsRecord", into = "DimensionsRecord")]
pub struct Dimensions {
    length: f64,
    width: f64,
    height: f64,
    unit: LengthUnit,
}

/// Validates one side and returns it rounded to 2 decimals.
fn check_side(value: f64, unit: LengthUnit, what: &str) -> DomainResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::invalid(format!("{what} must be greater than zero")));
    }
    let value = round_to(value, DECIMALS);
    if value < MIN_SIDE {
        return Err(DomainError::invalid(format!(
            "{what} must be at least {MIN_SIDE} {unit}"
        )));
    }
    if value * unit.factor_to(LengthUnit::M) > MAX_SIDE_M * (1.0 + 1e-9) {
        return Err(DomainError::invalid(format!(
            "{what} exceeds maximum allowed value (1000 m)"
        )));
    }
    Ok(value)
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64, unit: LengthUnit) -> DomainResult<Self> {
        Ok(Self {
            length: check_side(length, unit, "Length")?,
            width: check_side(width, unit, "Width")?,
            height: check_side(height, unit, "Height")?,
            unit,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn convert_to(&self, unit: LengthUnit) -> Dimensions {
        let f = self.unit.factor_to(unit);
        Dimensions {
            length: self.length * f,
            width: self.width * f,
            height: self.height * f,
            unit,
        }
    }

    /// In cubic `unit()`, rounded to 2 decimals.
    pub fn volume(&self) -> f64 {
        round_to(self.raw_volume(), 2)
    }

    /// In square `unit()`, rounded to 2 decimals.
    pub fn surface_area(&self) -> f64 {
        let (l, w, h) = (self.length, self.width, self.height);
        round_to(2.0 * (l * w + l * h + w * h), 2)
    }

    /// `6000.00 cm³`
    pub fn volume_with_unit(&self) -> String {
        format!("{:.2} {}³", self.volume(), self.unit)
    }

    pub fn surface_area_with_unit(&self) -> String {
        format!("{:.2} {}²", self.surface_area(), self.unit)
    }

    pub fn is_larger_than(&self, other: &Dimensions) -> bool {
        let theirs = other.convert_to(self.unit).raw_volume();
        self.raw_volume() > theirs && !approx_eq(self.raw_volume(), theirs)
    }

    pub fn is_smaller_than(&self, other: &Dimensions) -> bool {
        let theirs = other.convert_to(self.unit).raw_volume();
        self.raw_volume() < theirs && !approx_eq(self.raw_volume(), theirs)
    }

    /// Side-by-side comparison without rotating the box.
    pub fn can_fit_inside(&self, container: &Dimensions) -> bool {
        let me = self.convert_to(container.unit);
        approx_le(me.length, container.length)
            && approx_le(me.width, container.width)
            && approx_le(me.height, container.height)
    }

    /// `30.00 × 20.00 × 10.00 cm`
    pub fn formatted(&self) -> String {
        format!(
            "{:.2} × {:.2} × {:.2} {}",
            self.length, self.width, self.height, self.unit
        )
    }

    fn raw_volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

impl PartialEq for Dimensions {
    fn eq(&self, other: &Self) -> bool {
        let o = other.convert_to(self.unit);
        approx_eq(self.length, o.length) && approx_eq(self.width, o.width) && approx_eq(self.height, o.height)
    }
}

impl ValueObject for Dimensions {}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl TryFrom<DimensionsRecord> for Dimensions {
    type Error = DomainError;

    fn try_from(raw: DimensionsRecord) -> Result<Self, Self::Error> {
        Dimensions::new(raw.length, raw.width, raw.height, raw.unit)
    }
}

impl From<Dimensions> for DimensionsRecord {
    fn from(d: Dimensions) -> Self {
        DimensionsRecord {
            length: d.length,
            width: d.width,
            height: d.height,
            unit: d.unit,
        }
    }
}
