//! Numeric helpers shared by the unit-bearing value objects.

/// Relative tolerance for comparing measurements that went through a
/// conversion table (the published factors are rounded to ~6 digits).
pub(crate) const RELATIVE_TOLERANCE: f64 = 1e-4;

pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= RELATIVE_TOLERANCE * a.abs().max(b.abs())
}

/// `a <= b`, forgiving conversion noise.
pub(crate) fn approx_le(a: f64, b: f64) -> bool {
    a <= b || approx_eq(a, b)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
