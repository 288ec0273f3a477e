//! Dish nutrition aggregation
//!
//! Totals are best-effort. An ingredient whose nutrition cannot be
//! resolved (no data, or a unit with no weight for its category) is left
//! out of the totals without failing the dish; the number left out is
//! reported in `DishNutrition::skipped_ingredients`.

use super::calculator::calculate;
use super::error::{NutritionError, NutritionResult};
use super::units::Unit;
use crate::models::{Dish, DishNutrition, Ingredient, NutritionInfo};

/// Sum nutrition over a dish's ingredients
pub fn aggregate(dish: &Dish) -> NutritionResult<DishNutrition> {
    if dish.ingredients.is_empty() {
        return Err(NutritionError::NoIngredients);
    }

    let resolved: Vec<NutritionInfo> = dish
        .ingredients
        .iter()
        .filter_map(ingredient_nutrition)
        .collect();
    let skipped_ingredients = dish.ingredients.len() - resolved.len();
    let total: NutritionInfo = resolved.into_iter().sum();

    let per_serving = if dish.servings > 0 {
        total * (1.0 / f64::from(dish.servings))
    } else {
        NutritionInfo::zero()
    };

    Ok(DishNutrition {
        total,
        per_serving,
        skipped_ingredients,
    })
}

fn ingredient_nutrition(ingredient: &Ingredient) -> Option<NutritionInfo> {
    let product = &ingredient.product;

    if ingredient.is_optional && !product.has_nutrition_info() {
        tracing::debug!(
            product = %product.name,
            "Skipping optional ingredient without nutrition data"
        );
        return None;
    }

    match calculate(product, ingredient.amount, ingredient.unit) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::debug!(
                product = %product.name,
                amount = ingredient.amount,
                unit = %ingredient.unit,
                "Skipping ingredient: {}",
                e
            );
            None
        }
    }
}

/// Nutrition per 100 g of the finished dish
pub fn nutrition_per_100g(dish: &Dish) -> NutritionResult<NutritionInfo> {
    let nutrition = aggregate(dish)?;

    let weight = nutrition.total.weight;
    if weight == 0.0 {
        return Err(NutritionError::ZeroWeight);
    }
    if !weight.is_finite() {
        return Err(NutritionError::WeightOutOfRange { amount: weight, unit: Unit::Gram });
    }

    Ok(nutrition.total * (100.0 / weight))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{NutritionFacts, Product, ProductCategory};
    use crate::nutrition::Unit;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn product(name: &str, category: ProductCategory, facts: NutritionFacts) -> Arc<Product> {
        Arc::new(Product::sample(name, category, facts))
    }

    #[test]
    fn test_empty_dish() {
        let dish = Dish::sample(1, vec![]);
        assert_eq!(aggregate(&dish), Err(NutritionError::NoIngredients));
        assert_eq!(nutrition_per_100g(&dish), Err(NutritionError::NoIngredients));
    }

    #[test]
    fn test_totals_and_per_serving() {
        let rice = product("Rice", ProductCategory::Grain, NutritionFacts::new(130.0, 0.3, 2.7, 28.0));
        let egg = product("Egg", ProductCategory::Egg, NutritionFacts::new(155.0, 11.0, 13.0, 1.0));

        let dish = Dish::sample(
            2,
            vec![
                Ingredient::sample(&rice, 200.0, Unit::Gram),
                Ingredient::sample(&egg, 2.0, Unit::Piece),
            ],
        );

        let nutrition = aggregate(&dish).unwrap();
        assert!(close(nutrition.total.calories, 260.0 + 186.0));
        assert!(close(nutrition.total.protein, 5.4 + 15.6));
        assert!(close(nutrition.total.weight, 320.0));
        assert!(close(nutrition.per_serving.calories, 223.0));
        assert!(close(nutrition.per_serving.weight, 160.0));
        assert_eq!(nutrition.skipped_ingredients, 0);
    }

    #[test]
    fn test_optional_without_data_is_skipped() {
        let unknown = product("Herbs", ProductCategory::Spice, NutritionFacts::default());
        let chicken = product("Chicken", ProductCategory::Meat, NutritionFacts::new(165.0, 3.6, 31.0, 0.0));

        let mut garnish = Ingredient::sample(&unknown, 5.0, Unit::Gram);
        garnish.is_optional = true;

        let dish = Dish::sample(1, vec![garnish, Ingredient::sample(&chicken, 100.0, Unit::Gram)]);

        let nutrition = aggregate(&dish).unwrap();
        assert!(close(nutrition.total.calories, 165.0));
        assert!(close(nutrition.total.weight, 100.0));
        assert_eq!(nutrition.skipped_ingredients, 1);
    }

    // Essential ingredients that cannot be resolved are also dropped from
    // the totals rather than failing the dish.
    #[test]
    fn test_unresolvable_essential_ingredients_undercount() {
        let unknown = product("Mystery sauce", ProductCategory::Sauce, NutritionFacts::default());
        let cheese = product("Cheese", ProductCategory::Dairy, NutritionFacts::new(400.0, 33.0, 25.0, 1.3));
        let bread = product("Bread", ProductCategory::Grain, NutritionFacts::new(265.0, 3.2, 9.0, 49.0));

        let dish = Dish::sample(
            1,
            vec![
                Ingredient::sample(&unknown, 30.0, Unit::Gram),
                Ingredient::sample(&cheese, 1.0, Unit::Piece),
                Ingredient::sample(&bread, 2.0, Unit::Slice),
            ],
        );

        let nutrition = aggregate(&dish).unwrap();
        assert!(close(nutrition.total.calories, 132.5));
        assert!(close(nutrition.total.weight, 50.0));
        assert_eq!(nutrition.skipped_ingredients, 2);
    }

    #[test]
    fn test_huge_amounts_never_produce_nan() {
        let flour = product("Flour", ProductCategory::Grain, NutritionFacts::new(364.0, 1.0, 10.0, 76.0));

        let dish = Dish::sample(
            1,
            vec![
                Ingredient::sample(&flour, 1e306, Unit::Kilogram),
                Ingredient::sample(&flour, 100.0, Unit::Gram),
            ],
        );
        let nutrition = aggregate(&dish).unwrap();
        assert_eq!(nutrition.skipped_ingredients, 1);
        assert!(close(nutrition.total.weight, 100.0));

        let per_100g = nutrition_per_100g(&dish).unwrap();
        assert!(close(per_100g.calories, 364.0));

        let overflowing = Dish::sample(
            1,
            vec![
                Ingredient::sample(&flour, f64::MAX, Unit::Gram),
                Ingredient::sample(&flour, f64::MAX, Unit::Gram),
            ],
        );
        assert!(matches!(
            nutrition_per_100g(&overflowing),
            Err(NutritionError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn test_order_does_not_change_totals() {
        let a = product("A", ProductCategory::Fruit, NutritionFacts::new(52.0, 0.2, 0.3, 14.0));
        let b = product("B", ProductCategory::Oil, NutritionFacts::new(884.0, 100.0, 0.0, 0.0));

        let forward = Dish::sample(1, vec![Ingredient::sample(&a, 1.0, Unit::Piece), Ingredient::sample(&b, 1.0, Unit::Tablespoon)]);
        let backward = Dish::sample(1, vec![Ingredient::sample(&b, 1.0, Unit::Tablespoon), Ingredient::sample(&a, 1.0, Unit::Piece)]);

        let f = aggregate(&forward).unwrap().total;
        let r = aggregate(&backward).unwrap().total;
        assert!(close(f.calories, r.calories));
        assert!(close(f.weight, r.weight));
    }

    #[test]
    fn test_per_100g() {
        let pasta = product("Pasta", ProductCategory::Grain, NutritionFacts::new(350.0, 1.5, 12.0, 72.0));
        let sauce = product("Tomato sauce", ProductCategory::Sauce, NutritionFacts::new(50.0, 0.5, 1.5, 8.0));

        let dish = Dish::sample(
            2,
            vec![
                Ingredient::sample(&pasta, 100.0, Unit::Gram),
                Ingredient::sample(&sauce, 300.0, Unit::Gram),
            ],
        );

        let per_100g = nutrition_per_100g(&dish).unwrap();
        assert!(close(per_100g.calories, (350.0 + 150.0) / 4.0));
        assert!(close(per_100g.carbs, (72.0 + 24.0) / 4.0));
        assert!(close(per_100g.weight, 100.0));
    }

    #[test]
    fn test_per_100g_zero_weight() {
        let unknown = product("Unknown", ProductCategory::Snack, NutritionFacts::default());
        let soda = product("Soda", ProductCategory::Beverage, NutritionFacts::new(42.0, 0.0, 0.0, 10.6));

        let dish = Dish::sample(
            1,
            vec![
                Ingredient::sample(&unknown, 50.0, Unit::Gram),
                Ingredient::sample(&soda, 1.0, Unit::Can),
            ],
        );

        assert_eq!(aggregate(&dish).unwrap().skipped_ingredients, 2);
        assert_eq!(nutrition_per_100g(&dish), Err(NutritionError::ZeroWeight));
    }
}
