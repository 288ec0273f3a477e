//! Errors raised by the nutrition engine

use thiserror::Error;

use super::units::Unit;
use crate::models::ProductCategory;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    /// Unit has no gram equivalent at all (package, bottle, can)
    #[error("unit '{0}' cannot be converted to grams")]
    UnsupportedUnit(Unit),

    /// Category-dependent unit with no average weight for this category
    #[error("cannot determine {unit} weight for {category} products")]
    UnresolvableCategoryUnit {
        unit: Unit,
        category: ProductCategory,
    },

    #[error("weight of {amount} {unit} is out of range")]
    WeightOutOfRange { amount: f64, unit: Unit },

    #[error("nutrition information not available for product '{product}'")]
    MissingNutritionData { product: String },

    #[error("dish has no ingredients")]
    NoIngredients,

    #[error("dish weight resolves to zero grams")]
    ZeroWeight,

    #[error("no price data supplied")]
    NoPriceData,
}

pub type NutritionResult<T> = Result<T, NutritionError>;
