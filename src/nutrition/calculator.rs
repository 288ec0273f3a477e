//! Product nutrition calculator
//!
//! Scales a product's per-100g facts to an arbitrary amount.

use super::converter::to_grams;
use super::error::{NutritionError, NutritionResult};
use super::units::Unit;
use crate::models::{NutritionInfo, Product};

/// Nutrition of `amount` `unit`s of a product
pub fn calculate(product: &Product, amount: f64, unit: Unit) -> NutritionResult<NutritionInfo> {
    let per_100g = product
        .nutrition
        .complete()
        .ok_or_else(|| NutritionError::MissingNutritionData {
            product: product.name.clone(),
        })?;

    let grams = to_grams(amount, unit, product.category)?;
    let factor = grams / 100.0;

    Ok(NutritionInfo {
        calories: per_100g.calories * factor,
        fats: per_100g.fats * factor,
        protein: per_100g.protein * factor,
        carbs: per_100g.carbs * factor,
        weight: grams,
    })
}
