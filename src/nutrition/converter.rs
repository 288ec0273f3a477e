//! Unit conversion functions
//!
//! Resolves an ingredient amount to grams. Physical units use a fixed
//! multiplier; piece, slice and bunch use an average weight for the
//! product's category.

use super::error::{NutritionError, NutritionResult};
use super::units::{bunch_grams, piece_grams, slice_grams, Unit, UnitWeight};
use crate::models::ProductCategory;

/// Convert an amount in the given unit to grams
pub fn to_grams(amount: f64, unit: Unit, category: ProductCategory) -> NutritionResult<f64> {
    let grams = match unit.weight() {
        UnitWeight::Fixed(multiplier) => amount * multiplier,
        UnitWeight::CategoryDependent => category_grams(amount, unit, category)?,
        UnitWeight::Unsupported => return Err(NutritionError::UnsupportedUnit(unit)),
    };

    if !grams.is_finite() {
        return Err(NutritionError::WeightOutOfRange { amount, unit });
    }
    Ok(grams)
}

fn category_grams(amount: f64, unit: Unit, category: ProductCategory) -> NutritionResult<f64> {
    let per_unit = match unit {
        Unit::Piece => piece_grams(category),
        Unit::Slice => slice_grams(category),
        Unit::Bunch => bunch_grams(category),
        _ => return Err(NutritionError::UnsupportedUnit(unit)),
    };

    per_unit
        .map(|grams| amount * grams)
        .ok_or(NutritionError::UnresolvableCategoryUnit { unit, category })
}

/// Whether the unit resolves to a weight for products of this category
pub fn is_resolvable(unit: Unit, category: ProductCategory) -> bool {
    to_grams(1.0, unit, category).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: [(Unit, f64); 8] = [
        (Unit::Gram, 1.0),
        (Unit::Kilogram, 1000.0),
        (Unit::Liter, 1000.0),
        (Unit::Milliliter, 1.0),
        (Unit::Tablespoon, 15.0),
        (Unit::Teaspoon, 5.0),
        (Unit::Cup, 240.0),
        (Unit::Clove, 3.0),
    ];

    #[test]
    fn test_fixed_units_ignore_category() {
        for (unit, multiplier) in FIXED {
            for category in ProductCategory::ALL {
                let grams = to_grams(2.5, unit, category).unwrap();
                assert!((grams - 2.5 * multiplier).abs() < 1e-9, "{unit} / {category}");
            }
        }
    }

    #[test]
    fn test_piece_of_egg() {
        assert_eq!(to_grams(1.0, Unit::Piece, ProductCategory::Egg), Ok(60.0));
        assert_eq!(to_grams(2.0, Unit::Piece, ProductCategory::Fruit), Ok(300.0));
        assert_eq!(to_grams(1.0, Unit::Piece, ProductCategory::Vegetable), Ok(100.0));
    }

    #[test]
    fn test_two_cloves() {
        assert_eq!(to_grams(2.0, Unit::Clove, ProductCategory::Spice), Ok(6.0));
        assert_eq!(to_grams(2.0, Unit::Clove, ProductCategory::Meat), Ok(6.0));
    }

    #[test]
    fn test_slices_and_bunches() {
        assert_eq!(to_grams(3.0, Unit::Slice, ProductCategory::Grain), Ok(75.0));
        assert_eq!(to_grams(1.0, Unit::Slice, ProductCategory::Dairy), Ok(20.0));
        assert_eq!(to_grams(0.5, Unit::Bunch, ProductCategory::Vegetable), Ok(25.0));
    }

    #[test]
    fn test_piece_of_cheese_is_unresolvable() {
        assert_eq!(
            to_grams(1.0, Unit::Piece, ProductCategory::Dairy),
            Err(NutritionError::UnresolvableCategoryUnit {
                unit: Unit::Piece,
                category: ProductCategory::Dairy,
            })
        );
        assert!(matches!(
            to_grams(1.0, Unit::Bunch, ProductCategory::Fruit),
            Err(NutritionError::UnresolvableCategoryUnit { .. })
        ));
    }

    #[test]
    fn test_containers_are_unsupported() {
        for unit in [Unit::Package, Unit::Bottle, Unit::Can] {
            for category in ProductCategory::ALL {
                assert_eq!(
                    to_grams(1.0, unit, category),
                    Err(NutritionError::UnsupportedUnit(unit))
                );
            }
        }
    }

    #[test]
    fn test_overflowing_weight_is_rejected() {
        assert_eq!(
            to_grams(1e306, Unit::Kilogram, ProductCategory::Grain),
            Err(NutritionError::WeightOutOfRange { amount: 1e306, unit: Unit::Kilogram })
        );
        assert!(to_grams(f64::MAX, Unit::Piece, ProductCategory::Egg).is_err());
        assert!(to_grams(1e300, Unit::Kilogram, ProductCategory::Grain).is_ok());
    }

    #[test]
    fn test_is_resolvable() {
        assert!(is_resolvable(Unit::Slice, ProductCategory::Grain));
        assert!(!is_resolvable(Unit::Slice, ProductCategory::Meat));
        assert!(!is_resolvable(Unit::Bottle, ProductCategory::Beverage));
    }
}
