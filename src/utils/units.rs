//! Height and weight conversion between display units and canonical metric units.
//!
//! Canonical units are centimeters and kilograms. Conversions are pure; callers
//! decide where they happen (the codec at submission, validators for bounds).

use crate::models::DisplayUnit;

pub const CM_PER_INCH: f64 = 2.54;
pub const KG_PER_POUND: f64 = 0.453592;

/// Decimal places kept on canonical values sent over the wire.
pub const CANONICAL_PRECISION: i32 = 2;

pub fn to_canonical_height(value: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Imperial => value * CM_PER_INCH,
        DisplayUnit::Metric => value,
    }
}

pub fn to_display_height(value_cm: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Imperial => value_cm / CM_PER_INCH,
        DisplayUnit::Metric => value_cm,
    }
}

pub fn to_canonical_weight(value: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Imperial => value * KG_PER_POUND,
        DisplayUnit::Metric => value,
    }
}

pub fn to_display_weight(value_kg: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Imperial => value_kg / KG_PER_POUND,
        DisplayUnit::Metric => value_kg,
    }
}

/// The height a UI would show if it chose to carry the measurement across a unit switch.
///
/// Forms never apply this on their own: a unit switch keeps the typed number.
pub fn recompute_height(value: f64, from: DisplayUnit, to: DisplayUnit) -> f64 {
    to_display_height(to_canonical_height(value, from), to)
}

/// Weight counterpart of [`recompute_height`].
pub fn recompute_weight(value: f64, from: DisplayUnit, to: DisplayUnit) -> f64 {
    to_display_weight(to_canonical_weight(value, from), to)
}

/// Rounds to [`CANONICAL_PRECISION`] decimal places.
pub fn round_canonical(value: f64) -> f64 {
    let factor = 10f64.powi(CANONICAL_PRECISION);
    (value * factor).round() / factor
}
