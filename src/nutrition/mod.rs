//! Nutrition engine
//!
//! Unit conversion, per-product nutrition, dish aggregation and dish
//! classification. Everything here is pure and works on loaded models.

pub mod aggregator;
pub mod calculator;
pub mod classifier;
pub mod converter;
pub mod error;
pub mod units;

pub use aggregator::{aggregate, nutrition_per_100g};
pub use calculator::calculate;
pub use classifier::{
    classify, complexity_level, complexity_score, estimate_cost, is_gluten_free, is_quick_meal,
    is_vegan, is_vegetarian, ComplexityLevel, DishClassification,
};
pub use converter::{is_resolvable, to_grams};
pub use error::{NutritionError, NutritionResult};
pub use units::{Unit, UnitWeight};
