//! Units of measure and the conversion table
//!
//! Only metric mass (kg, g) and volume (L, mL) conversions are registered.
//! Every other pair falls back to an identity conversion.

use serde::{Deserialize, Serialize};

/// A unit an ingredient is purchased in or a recipe line is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitOfMeasure {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "L")]
    Liter,
    #[serde(rename = "mL")]
    Milliliter,
    /// Count of discrete items (eggs, buns)
    #[serde(rename = "unit")]
    #[default]
    Unit,
    /// Reserved, no conversion factors registered
    #[serde(rename = "lb")]
    Pound,
    /// Reserved, no conversion factors registered
    #[serde(rename = "oz")]
    Ounce,
    /// Reserved, no conversion factors registered
    #[serde(rename = "fl oz")]
    FluidOunce,
}

/// Family a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    Mass,
    Volume,
    Count,
    /// Imperial units kept for compatibility with older data
    Imperial,
}

impl UnitOfMeasure {
    /// All supported units, in display order
    pub const ALL: [UnitOfMeasure; 8] = [
        UnitOfMeasure::Kilogram,
        UnitOfMeasure::Gram,
        UnitOfMeasure::Liter,
        UnitOfMeasure::Milliliter,
        UnitOfMeasure::Unit,
        UnitOfMeasure::Pound,
        UnitOfMeasure::Ounce,
        UnitOfMeasure::FluidOunce,
    ];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Gram => "g",
            UnitOfMeasure::Liter => "L",
            UnitOfMeasure::Milliliter => "mL",
            UnitOfMeasure::Unit => "unit",
            UnitOfMeasure::Pound => "lb",
            UnitOfMeasure::Ounce => "oz",
            UnitOfMeasure::FluidOunce => "fl oz",
        }
    }

    /// Parse from the wire representation
    ///
    /// Case-insensitive, also accepts spelled-out metric names.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Some(UnitOfMeasure::Kilogram),
            "g" | "gram" | "grams" => Some(UnitOfMeasure::Gram),
            "l" | "liter" | "liters" | "litre" | "litres" => Some(UnitOfMeasure::Liter),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(UnitOfMeasure::Milliliter)
            }
            "unit" | "units" => Some(UnitOfMeasure::Unit),
            "lb" => Some(UnitOfMeasure::Pound),
            "oz" => Some(UnitOfMeasure::Ounce),
            "fl oz" => Some(UnitOfMeasure::FluidOunce),
            _ => None,
        }
    }

    /// Family of this unit
    pub fn family(&self) -> UnitFamily {
        match self {
            UnitOfMeasure::Kilogram | UnitOfMeasure::Gram => UnitFamily::Mass,
            UnitOfMeasure::Liter | UnitOfMeasure::Milliliter => UnitFamily::Volume,
            UnitOfMeasure::Unit => UnitFamily::Count,
            UnitOfMeasure::Pound | UnitOfMeasure::Ounce | UnitOfMeasure::FluidOunce => {
                UnitFamily::Imperial
            }
        }
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Conversion Constants
// ============================================================================

/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;
/// Kilograms per gram
pub const KG_PER_G: f64 = 0.001;
/// Milliliters per liter
pub const ML_PER_L: f64 = 1000.0;
/// Liters per milliliter
pub const L_PER_ML: f64 = 0.001;

// ============================================================================
// Conversion
// ============================================================================

/// Registered factor for converting `from` into `to`
///
/// Returns None when no factor is registered, in which case callers apply
/// the identity fallback.
pub fn conversion_factor(from: UnitOfMeasure, to: UnitOfMeasure) -> Option<f64> {
    use UnitOfMeasure::*;

    if from == to {
        return Some(1.0);
    }

    match (from, to) {
        (Kilogram, Gram) => Some(G_PER_KG),
        (Gram, Kilogram) => Some(KG_PER_G),
        (Liter, Milliliter) => Some(ML_PER_L),
        (Milliliter, Liter) => Some(L_PER_ML),
        _ => None,
    }
}

/// Convert a quantity between units, using the raw quantity when no
/// factor is registered for the pair
pub fn convert(quantity: f64, from: UnitOfMeasure, to: UnitOfMeasure) -> f64 {
    quantity * conversion_factor(from, to).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_factors() {
        assert_eq!(conversion_factor(UnitOfMeasure::Kilogram, UnitOfMeasure::Gram), Some(1000.0));
        assert_eq!(conversion_factor(UnitOfMeasure::Gram, UnitOfMeasure::Kilogram), Some(0.001));
        assert_eq!(conversion_factor(UnitOfMeasure::Liter, UnitOfMeasure::Milliliter), Some(1000.0));
        assert_eq!(conversion_factor(UnitOfMeasure::Milliliter, UnitOfMeasure::Liter), Some(0.001));
    }

    #[test]
    fn test_same_unit_is_identity() {
        for unit in UnitOfMeasure::ALL {
            assert_eq!(conversion_factor(unit, unit), Some(1.0));
        }
    }

    #[test]
    fn test_unregistered_pairs() {
        assert_eq!(conversion_factor(UnitOfMeasure::Gram, UnitOfMeasure::Milliliter), None);
        assert_eq!(conversion_factor(UnitOfMeasure::Unit, UnitOfMeasure::Kilogram), None);
        assert_eq!(conversion_factor(UnitOfMeasure::Pound, UnitOfMeasure::Gram), None);
        assert_eq!(conversion_factor(UnitOfMeasure::FluidOunce, UnitOfMeasure::Milliliter), None);
    }

    #[test]
    fn test_convert_identity_fallback() {
        assert_eq!(convert(3.0, UnitOfMeasure::Unit, UnitOfMeasure::Kilogram), 3.0);
        assert_eq!(convert(2.0, UnitOfMeasure::Ounce, UnitOfMeasure::Gram), 2.0);
    }

    #[test]
    fn test_round_trip() {
        let grams = convert(convert(437.5, UnitOfMeasure::Gram, UnitOfMeasure::Kilogram), UnitOfMeasure::Kilogram, UnitOfMeasure::Gram);
        assert!((grams - 437.5).abs() < 1e-9);

        let ml = convert(convert(250.0, UnitOfMeasure::Milliliter, UnitOfMeasure::Liter), UnitOfMeasure::Liter, UnitOfMeasure::Milliliter);
        assert!((ml - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(UnitOfMeasure::from_str("kg"), Some(UnitOfMeasure::Kilogram));
        assert_eq!(UnitOfMeasure::from_str("mL"), Some(UnitOfMeasure::Milliliter));
        assert_eq!(UnitOfMeasure::from_str("ml"), Some(UnitOfMeasure::Milliliter));
        assert_eq!(UnitOfMeasure::from_str(" L "), Some(UnitOfMeasure::Liter));
        assert_eq!(UnitOfMeasure::from_str("fl oz"), Some(UnitOfMeasure::FluidOunce));
        assert_eq!(UnitOfMeasure::from_str("cup"), None);
    }

    #[test]
    fn test_as_str_parses_back() {
        for unit in UnitOfMeasure::ALL {
            assert_eq!(UnitOfMeasure::from_str(unit.as_str()), Some(unit));
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&UnitOfMeasure::Milliliter).unwrap();
        assert_eq!(json, r#""mL""#);
        let unit: UnitOfMeasure = serde_json::from_str(r#""fl oz""#).unwrap();
        assert_eq!(unit, UnitOfMeasure::FluidOunce);
    }

    #[test]
    fn test_families() {
        assert_eq!(UnitOfMeasure::Gram.family(), UnitFamily::Mass);
        assert_eq!(UnitOfMeasure::Liter.family(), UnitFamily::Volume);
        assert_eq!(UnitOfMeasure::Unit.family(), UnitFamily::Count);
        assert_eq!(UnitOfMeasure::Pound.family(), UnitFamily::Imperial);
    }
}
