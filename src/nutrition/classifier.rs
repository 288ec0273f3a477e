//! Dish classification
//!
//! Dietary flags, complexity and cost derived from a dish's ingredients.
//! Dietary flags look only at product categories (and the product's own
//! gluten-free flag for grain), so a dish with no ingredients is trivially
//! vegetarian, vegan and gluten-free.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::converter::to_grams;
use super::error::{NutritionError, NutritionResult};
use crate::models::{Dish, ProductCategory};

/// Longest total time that still counts as a quick meal, in minutes
pub const QUICK_MEAL_MINUTES: u32 = 30;

pub fn is_vegetarian(dish: &Dish) -> bool {
    !dish.ingredients.iter().any(|i| {
        matches!(i.product.category, ProductCategory::Meat | ProductCategory::Fish)
    })
}

pub fn is_vegan(dish: &Dish) -> bool {
    !dish.ingredients.iter().any(|i| {
        matches!(
            i.product.category,
            ProductCategory::Meat | ProductCategory::Fish | ProductCategory::Dairy | ProductCategory::Egg
        )
    })
}

/// Only grain products are checked; their own flag wins over the category.
pub fn is_gluten_free(dish: &Dish) -> bool {
    !dish
        .ingredients
        .iter()
        .any(|i| i.product.category == ProductCategory::Grain && !i.product.is_gluten_free)
}

pub fn is_quick_meal(dish: &Dish) -> bool {
    dish.total_time() <= QUICK_MEAL_MINUTES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
    #[serde(rename = "Very Complex")]
    VeryComplex,
}

impl ComplexityLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2 => ComplexityLevel::Simple,
            3..=5 => ComplexityLevel::Medium,
            6..=8 => ComplexityLevel::Complex,
            _ => ComplexityLevel::VeryComplex,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::Simple => "Simple",
            ComplexityLevel::Medium => "Medium",
            ComplexityLevel::Complex => "Complex",
            ComplexityLevel::VeryComplex => "Very Complex",
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn time_points(minutes: u32) -> u32 {
    match minutes {
        m if m > 120 => 3,
        m if m > 60 => 2,
        m if m > 30 => 1,
        _ => 0,
    }
}

fn ingredient_count_points(count: usize) -> u32 {
    match count {
        c if c > 15 => 3,
        c if c > 10 => 2,
        c if c > 5 => 1,
        _ => 0,
    }
}

/// Points for total time, essential ingredient count, and one per
/// essential ingredient with a preparation note
pub fn complexity_score(dish: &Dish) -> u32 {
    let essential_count = dish.essential_ingredients().count();
    let prepared = dish
        .essential_ingredients()
        .filter(|i| i.has_preparation())
        .count() as u32;

    time_points(dish.total_time()) + ingredient_count_points(essential_count) + prepared
}

pub fn complexity_level(dish: &Dish) -> ComplexityLevel {
    ComplexityLevel::from_score(complexity_score(dish))
}

/// Approximate cost from a map of product id to price per 100 g
///
/// Ingredients without a price or without a resolvable weight add nothing.
pub fn estimate_cost(dish: &Dish, prices_per_100g: &HashMap<i64, f64>) -> NutritionResult<f64> {
    if prices_per_100g.is_empty() {
        return Err(NutritionError::NoPriceData);
    }

    let cost = dish
        .ingredients
        .iter()
        .filter_map(|i| {
            let price = prices_per_100g.get(&i.product.id)?;
            let grams = to_grams(i.amount, i.unit, i.product.category).ok()?;
            Some(grams / 100.0 * price)
        })
        .sum();

    Ok(cost)
}

/// All classifications of a dish in one value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DishClassification {
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_quick_meal: bool,
    pub complexity_score: u32,
    pub complexity: ComplexityLevel,
}

pub fn classify(dish: &Dish) -> DishClassification {
    let score = complexity_score(dish);
    DishClassification {
        is_vegetarian: is_vegetarian(dish),
        is_vegan: is_vegan(dish),
        is_gluten_free: is_gluten_free(dish),
        is_quick_meal: is_quick_meal(dish),
        complexity_score: score,
        complexity: ComplexityLevel::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{Ingredient, NutritionFacts, Product};
    use crate::nutrition::Unit;

    fn product(category: ProductCategory) -> Arc<Product> {
        Arc::new(Product::sample(category.as_str(), category, NutritionFacts::default()))
    }

    fn dish_of(categories: &[ProductCategory]) -> Dish {
        let ingredients = categories
            .iter()
            .map(|c| Ingredient::sample(&product(*c), 100.0, Unit::Gram))
            .collect();
        Dish::sample(1, ingredients)
    }

    /// Dish with the given total time, essential ingredients and how many of
    /// them carry a preparation note
    fn complexity_dish(minutes: u32, essential: usize, prepared: usize) -> Dish {
        let veg = product(ProductCategory::Vegetable);
        let mut ingredients: Vec<_> = (0..essential)
            .map(|n| {
                let mut i = Ingredient::sample(&veg, 10.0, Unit::Gram);
                if n < prepared {
                    i.preparation = Some("diced".to_string());
                }
                i
            })
            .collect();

        let mut optional = Ingredient::sample(&veg, 1.0, Unit::Bunch);
        optional.is_optional = true;
        optional.preparation = Some("chopped".to_string());
        ingredients.push(optional);

        let mut dish = Dish::sample(2, ingredients);
        dish.cooking_time = minutes - minutes / 3;
        dish.preparation_time = minutes / 3;
        dish
    }

    #[test]
    fn test_empty_dish_is_vacuously_everything() {
        let dish = Dish::sample(1, vec![]);
        assert!(is_vegetarian(&dish));
        assert!(is_vegan(&dish));
        assert!(is_gluten_free(&dish));
        assert_eq!(complexity_level(&dish), ComplexityLevel::Simple);
    }

    #[test]
    fn test_fish_is_neither_vegetarian_nor_vegan() {
        let dish = dish_of(&[ProductCategory::Vegetable, ProductCategory::Fish]);
        assert!(!is_vegetarian(&dish));
        assert!(!is_vegan(&dish));
    }

    #[test]
    fn test_dairy_and_egg_are_vegetarian_not_vegan() {
        for category in [ProductCategory::Dairy, ProductCategory::Egg] {
            let dish = dish_of(&[ProductCategory::Grain, category]);
            assert!(is_vegetarian(&dish));
            assert!(!is_vegan(&dish));
        }
        assert!(is_vegan(&dish_of(&[ProductCategory::Fruit, ProductCategory::Oil])));
    }

    #[test]
    fn test_gluten_free_trusts_product_flag() {
        let mut buckwheat = Product::sample("Buckwheat", ProductCategory::Grain, NutritionFacts::default());
        buckwheat.is_gluten_free = true;
        let dish = Dish::sample(1, vec![Ingredient::sample(&Arc::new(buckwheat), 80.0, Unit::Gram)]);
        assert!(is_gluten_free(&dish));

        let wheat = dish_of(&[ProductCategory::Grain]);
        assert!(!is_gluten_free(&wheat));

        // Non-grain categories are not inspected
        assert!(is_gluten_free(&dish_of(&[ProductCategory::Sauce])));
    }

    #[test]
    fn test_quick_meal_boundary() {
        let mut dish = Dish::sample(1, vec![]);
        dish.cooking_time = 20;
        dish.preparation_time = 10;
        assert!(is_quick_meal(&dish));
        dish.preparation_time = 11;
        assert!(!is_quick_meal(&dish));
    }

    #[test]
    fn test_complexity_score() {
        let dish = complexity_dish(150, 12, 3);
        assert_eq!(complexity_score(&dish), 8);
        assert_eq!(complexity_level(&dish), ComplexityLevel::Complex);

        let dish = complexity_dish(150, 12, 4);
        assert_eq!(complexity_score(&dish), 9);
        assert_eq!(complexity_level(&dish), ComplexityLevel::VeryComplex);
    }

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(complexity_score(&complexity_dish(30, 5, 0)), 0);
        assert_eq!(complexity_score(&complexity_dish(31, 6, 0)), 2);
        assert_eq!(complexity_score(&complexity_dish(61, 11, 0)), 4);
        assert_eq!(complexity_score(&complexity_dish(121, 16, 0)), 6);

        assert_eq!(ComplexityLevel::from_score(2), ComplexityLevel::Simple);
        assert_eq!(ComplexityLevel::from_score(3), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(5), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(6), ComplexityLevel::Complex);
        assert_eq!(ComplexityLevel::VeryComplex.to_string(), "Very Complex");
    }

    #[test]
    fn test_any_preparation_note_counts() {
        let mut dish = complexity_dish(10, 2, 2);
        dish.ingredients[1].preparation = Some("   ".to_string());
        assert_eq!(complexity_score(&dish), 2);

        dish.ingredients[1].preparation = Some(String::new());
        assert_eq!(complexity_score(&dish), 1);
    }

    #[test]
    fn test_estimate_cost() {
        let mut apple = Product::sample("Apple", ProductCategory::Fruit, NutritionFacts::default());
        apple.id = 1;
        let mut cheese = Product::sample("Cheese", ProductCategory::Dairy, NutritionFacts::default());
        cheese.id = 2;
        let mut salt = Product::sample("Salt", ProductCategory::Spice, NutritionFacts::default());
        salt.id = 3;

        let (apple, cheese, salt) = (Arc::new(apple), Arc::new(cheese), Arc::new(salt));
        let dish = Dish::sample(
            1,
            vec![
                Ingredient::sample(&apple, 2.0, Unit::Piece),
                Ingredient::sample(&cheese, 1.0, Unit::Piece),
                Ingredient::sample(&salt, 1.0, Unit::Teaspoon),
            ],
        );

        let prices = HashMap::from([(1, 0.5), (2, 2.0)]);
        let cost = estimate_cost(&dish, &prices).unwrap();
        // 300 g of apple; the cheese piece has no weight; salt has no price
        assert!((cost - 1.5).abs() < 1e-9);

        assert_eq!(estimate_cost(&dish, &HashMap::new()), Err(NutritionError::NoPriceData));
    }

    #[test]
    fn test_classify_bundle() {
        let dish = dish_of(&[ProductCategory::Meat]);
        let c = classify(&dish);
        assert!(!c.is_vegetarian);
        assert!(c.is_gluten_free);
        assert!(c.is_quick_meal);
        assert_eq!(c.complexity, ComplexityLevel::Simple);
    }
}
