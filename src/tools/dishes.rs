//! Dish MCP Tools
//!
//! Tools for managing dishes, their ingredients, and the nutrition and
//! classifications derived from them.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    Dish, DishCategory, DishCreate, DishFilter, DishNutrition, DishUpdate, Ingredient,
    IngredientCreate, IngredientUpdate, NutritionInfo, Product, ProductCategory,
};
use crate::nutrition::{self, DishClassification, NutritionError, Unit};

/// Ingredient as shown inside a dish
#[derive(Debug, Serialize)]
pub struct IngredientDetail {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_category: ProductCategory,
    pub amount: f64,
    pub unit: Unit,
    pub is_optional: bool,
    pub preparation: Option<String>,
    pub note: Option<String>,
    /// None when the unit has no weight for this product
    pub grams: Option<f64>,
    /// None when the ingredient is left out of the totals
    pub nutrition: Option<NutritionInfo>,
}

impl From<&Ingredient> for IngredientDetail {
    fn from(ingredient: &Ingredient) -> Self {
        let product = &ingredient.product;
        Self {
            id: ingredient.id,
            product_id: product.id,
            product_name: product.name.clone(),
            product_category: product.category,
            amount: ingredient.amount,
            unit: ingredient.unit,
            is_optional: ingredient.is_optional,
            preparation: ingredient.preparation.clone(),
            note: ingredient.note.clone(),
            grams: nutrition::to_grams(ingredient.amount, ingredient.unit, product.category).ok(),
            nutrition: nutrition::calculate(product, ingredient.amount, ingredient.unit).ok(),
        }
    }
}

/// Full dish detail response
#[derive(Debug, Serialize)]
pub struct DishDetail {
    pub id: i64,
    pub name: String,
    pub category: DishCategory,
    pub description: Option<String>,
    pub cooking_time: u32,
    pub preparation_time: u32,
    pub total_time: u32,
    pub servings: u32,
    pub instructions: Option<String>,
    pub is_public: bool,
    pub rating: f64,
    pub ingredients: Vec<IngredientDetail>,
    pub nutrition: Option<DishNutrition>,
    pub nutrition_per_100g: Option<NutritionInfo>,
    pub classification: DishClassification,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Dish> for DishDetail {
    fn from(dish: Dish) -> Self {
        let nutrition = nutrition::aggregate(&dish).ok();
        let nutrition_per_100g = nutrition::nutrition_per_100g(&dish).ok();
        let classification = nutrition::classify(&dish);
        let ingredients = dish.ingredients.iter().map(IngredientDetail::from).collect();

        Self {
            id: dish.id,
            total_time: dish.total_time(),
            name: dish.name,
            category: dish.category,
            description: dish.description,
            cooking_time: dish.cooking_time,
            preparation_time: dish.preparation_time,
            servings: dish.servings,
            instructions: dish.instructions,
            is_public: dish.is_public,
            rating: dish.rating,
            ingredients,
            nutrition,
            nutrition_per_100g,
            classification,
            created_at: dish.created_at,
            updated_at: dish.updated_at,
        }
    }
}

/// Summary of a dish for list results
#[derive(Debug, Serialize)]
pub struct DishSummary {
    pub id: i64,
    pub name: String,
    pub category: DishCategory,
    pub servings: u32,
    pub total_time: u32,
    pub ingredient_count: usize,
    pub rating: f64,
    pub is_public: bool,
    pub calories_per_serving: Option<f64>,
}

impl From<&Dish> for DishSummary {
    fn from(dish: &Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name.clone(),
            category: dish.category,
            servings: dish.servings,
            total_time: dish.total_time(),
            ingredient_count: dish.ingredients.len(),
            rating: dish.rating,
            is_public: dish.is_public,
            calories_per_serving: nutrition::aggregate(dish).ok().map(|n| n.per_serving.calories),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateDishResponse {
    pub id: i64,
    pub name: String,
    pub category: DishCategory,
    pub servings: u32,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListDishesResponse {
    pub items: Vec<DishSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateDishResponse {
    pub success: bool,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteDishResponse {
    pub success: bool,
    pub deleted_id: i64,
    pub ingredients_removed: usize,
}

#[derive(Debug, Serialize)]
pub struct AddIngredientResponse {
    pub ingredient: IngredientDetail,
    /// Set when the ingredient will be left out of nutrition totals
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddIngredientsBatchResponse {
    pub dish_id: i64,
    pub added: Vec<IngredientDetail>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoveIngredientResponse {
    pub success: bool,
    pub removed_id: i64,
    pub dish_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DishNutritionResponse {
    pub dish_id: i64,
    pub name: String,
    pub servings: u32,
    pub ingredient_count: usize,
    pub total: NutritionInfo,
    pub per_serving: NutritionInfo,
    pub per_100g: Option<NutritionInfo>,
    pub skipped_ingredients: usize,
}

#[derive(Debug, Serialize)]
pub struct ClassifyDishResponse {
    pub dish_id: i64,
    pub name: String,
    pub total_time: u32,
    pub essential_ingredients: usize,
    #[serde(flatten)]
    pub classification: DishClassification,
}

#[derive(Debug, Serialize)]
pub struct DishCostResponse {
    pub dish_id: i64,
    pub name: String,
    pub total_cost: f64,
    pub cost_per_serving: f64,
    /// Ingredients with no price or no resolvable weight
    pub unpriced_ingredients: Vec<String>,
}

/// Upper bound for cooking and preparation time, in minutes
const MAX_DISH_MINUTES: u32 = 10_000;

fn validate_dish_fields(
    cooking_time: Option<u32>,
    preparation_time: Option<u32>,
    servings: Option<u32>,
    rating: Option<f64>,
) -> Result<(), String> {
    for (field, minutes) in [("cooking_time", cooking_time), ("preparation_time", preparation_time)] {
        if minutes.is_some_and(|m| m > MAX_DISH_MINUTES) {
            return Err(format!("{} must be at most {} minutes", field, MAX_DISH_MINUTES));
        }
    }
    if servings == Some(0) {
        return Err("servings must be at least 1".to_string());
    }
    if let Some(rating) = rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err("rating must be between 0 and 5".to_string());
        }
    }
    Ok(())
}

/// Largest ingredient amount accepted, in the ingredient's own unit
const MAX_AMOUNT: f64 = 1_000_000.0;

fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err("amount must be greater than 0".to_string());
    }
    if amount > MAX_AMOUNT {
        return Err(format!("amount must be at most {}", MAX_AMOUNT));
    }
    Ok(())
}

fn load_dish(conn: &rusqlite::Connection, id: i64) -> Result<Dish, String> {
    Dish::get_by_id(conn, id)
        .map_err(|e| format!("Failed to get dish: {}", e))?
        .ok_or_else(|| format!("Dish not found with id: {}", id))
}

/// Warning for an ingredient the aggregator will have to skip
fn skip_warning(product: &Product, unit: Unit) -> Option<String> {
    if let Err(e) = nutrition::to_grams(1.0, unit, product.category) {
        return Some(format!(
            "'{}' will be left out of nutrition totals: {}",
            product.name, e
        ));
    }
    if !product.has_nutrition_info() {
        return Some(format!(
            "'{}' will be left out of nutrition totals: {}",
            product.name,
            NutritionError::MissingNutritionData { product: product.name.clone() }
        ));
    }
    None
}

/// Create a dish without ingredients
pub fn create_dish(db: &Database, mut data: DishCreate) -> Result<CreateDishResponse, String> {
    data.name = data.name.trim().to_string();
    if data.name.is_empty() {
        return Err("Dish name cannot be empty".to_string());
    }
    validate_dish_fields(
        Some(data.cooking_time),
        Some(data.preparation_time),
        Some(data.servings),
        Some(data.rating),
    )?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dish = Dish::create(&conn, &data)
        .map_err(|e| format!("Failed to create dish: {}", e))?;

    tracing::info!(id = dish.id, name = %dish.name, "Dish created");

    Ok(CreateDishResponse {
        id: dish.id,
        name: dish.name,
        category: dish.category,
        servings: dish.servings,
        created_at: dish.created_at,
    })
}

/// Get a dish with ingredients, nutrition and classifications
pub fn get_dish(db: &Database, id: i64) -> Result<Option<DishDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dish = Dish::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get dish: {}", e))?;

    Ok(dish.map(DishDetail::from))
}

/// List dishes with filtering, sorting and pagination
#[allow(clippy::too_many_arguments)]
pub fn list_dishes(
    db: &Database,
    query: Option<&str>,
    category: Option<&str>,
    public_only: bool,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListDishesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let filter = DishFilter {
        query,
        category: category.map(super::parse_dish_category).transpose()?,
        public_only,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dishes = Dish::list(&conn, &filter, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list dishes: {}", e))?;
    let total = Dish::count(&conn, &filter)
        .map_err(|e| format!("Failed to count dishes: {}", e))?;

    Ok(ListDishesResponse {
        items: dishes.iter().map(DishSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Update dish metadata
pub fn update_dish(db: &Database, id: i64, mut data: DishUpdate) -> Result<UpdateDishResponse, String> {
    if let Some(name) = data.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err("Dish name cannot be empty".to_string());
        }
    }
    validate_dish_fields(data.cooking_time, data.preparation_time, data.servings, data.rating)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Dish::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update dish: {}", e))?;

    match updated {
        Some(dish) => Ok(UpdateDishResponse {
            success: true,
            updated_at: dish.updated_at,
        }),
        None => Err(format!("Dish not found with id: {}", id)),
    }
}

/// Delete a dish together with its ingredients
pub fn delete_dish(db: &Database, id: i64) -> Result<DeleteDishResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dish = load_dish(&conn, id)?;

    Dish::delete(&conn, id)
        .map_err(|e| format!("Failed to delete dish: {}", e))?;

    tracing::info!(id, name = %dish.name, "Dish deleted");

    Ok(DeleteDishResponse {
        success: true,
        deleted_id: id,
        ingredients_removed: dish.ingredients.len(),
    })
}

/// Add one ingredient at the end of a dish
pub fn add_dish_ingredient(db: &Database, mut data: IngredientCreate) -> Result<AddIngredientResponse, String> {
    validate_amount(data.amount)?;
    data.preparation = data.preparation.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Dish::get_by_id(&conn, data.dish_id)
        .map_err(|e| format!("Failed to get dish: {}", e))?
        .is_none()
    {
        return Err(format!("Dish not found with id: {}", data.dish_id));
    }
    let product = Product::get_by_id(&conn, data.product_id)
        .map_err(|e| format!("Failed to get product: {}", e))?
        .ok_or_else(|| format!("Product not found with id: {}", data.product_id))?;

    let ingredient = Ingredient::create(&conn, &data)
        .map_err(|e| format!("Failed to add ingredient: {}", e))?;
    Dish::touch(&conn, data.dish_id)
        .map_err(|e| format!("Failed to update dish: {}", e))?;

    Ok(AddIngredientResponse {
        warning: skip_warning(&product, data.unit),
        ingredient: IngredientDetail::from(&ingredient),
    })
}

/// Add several ingredients to one dish; all are added or none
pub fn add_dish_ingredients_batch(
    db: &Database,
    dish_id: i64,
    items: Vec<IngredientCreate>,
) -> Result<AddIngredientsBatchResponse, String> {
    if items.is_empty() {
        return Err("No ingredients given".to_string());
    }
    for (n, item) in items.iter().enumerate() {
        validate_amount(item.amount).map_err(|e| format!("Ingredient {}: {}", n + 1, e))?;
    }

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn
        .transaction()
        .map_err(|e| format!("Failed to start transaction: {}", e))?;

    if Dish::get_by_id(&tx, dish_id)
        .map_err(|e| format!("Failed to get dish: {}", e))?
        .is_none()
    {
        return Err(format!("Dish not found with id: {}", dish_id));
    }

    let mut added = Vec::with_capacity(items.len());
    let mut warnings = Vec::new();
    for (n, mut item) in items.into_iter().enumerate() {
        item.dish_id = dish_id;
        item.preparation = item.preparation.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());

        let product = Product::get_by_id(&tx, item.product_id)
            .map_err(|e| format!("Failed to get product: {}", e))?
            .ok_or_else(|| format!("Ingredient {}: product not found with id: {}", n + 1, item.product_id))?;

        let ingredient = Ingredient::create(&tx, &item)
            .map_err(|e| format!("Ingredient {}: failed to add: {}", n + 1, e))?;

        warnings.extend(skip_warning(&product, item.unit));
        added.push(IngredientDetail::from(&ingredient));
    }

    Dish::touch(&tx, dish_id).map_err(|e| format!("Failed to update dish: {}", e))?;
    tx.commit().map_err(|e| format!("Failed to commit: {}", e))?;

    tracing::info!(dish_id, count = added.len(), "Ingredients added");

    Ok(AddIngredientsBatchResponse {
        dish_id,
        added,
        warnings,
    })
}

pub fn update_dish_ingredient(
    db: &Database,
    ingredient_id: i64,
    mut data: IngredientUpdate,
) -> Result<AddIngredientResponse, String> {
    if let Some(amount) = data.amount {
        validate_amount(amount)?;
    }
    data.preparation = data.preparation.map(|p| p.trim().to_string());

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Ingredient::update(&conn, ingredient_id, &data)
        .map_err(|e| format!("Failed to update ingredient: {}", e))?
        .ok_or_else(|| format!("Ingredient not found with id: {}", ingredient_id))?;

    if let Some(dish_id) = Ingredient::get_dish_id(&conn, ingredient_id)
        .map_err(|e| format!("Database error: {}", e))?
    {
        Dish::touch(&conn, dish_id).map_err(|e| format!("Failed to update dish: {}", e))?;
    }

    Ok(AddIngredientResponse {
        warning: skip_warning(&updated.product, updated.unit),
        ingredient: IngredientDetail::from(&updated),
    })
}

pub fn remove_dish_ingredient(db: &Database, ingredient_id: i64) -> Result<RemoveIngredientResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dish_id = Ingredient::get_dish_id(&conn, ingredient_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Ingredient not found with id: {}", ingredient_id))?;

    Ingredient::delete(&conn, ingredient_id)
        .map_err(|e| format!("Failed to remove ingredient: {}", e))?;
    Dish::touch(&conn, dish_id).map_err(|e| format!("Failed to update dish: {}", e))?;

    Ok(RemoveIngredientResponse {
        success: true,
        removed_id: ingredient_id,
        dish_id,
    })
}

/// Totals, per serving and per 100 g for a dish
pub fn get_dish_nutrition(db: &Database, id: i64) -> Result<DishNutritionResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let dish = load_dish(&conn, id)?;

    let DishNutrition {
        total,
        per_serving,
        skipped_ingredients,
    } = nutrition::aggregate(&dish).map_err(|e| e.to_string())?;

    let per_100g = match nutrition::nutrition_per_100g(&dish) {
        Ok(info) => Some(info),
        Err(NutritionError::ZeroWeight) => None,
        Err(e) => return Err(e.to_string()),
    };

    Ok(DishNutritionResponse {
        dish_id: dish.id,
        ingredient_count: dish.ingredients.len(),
        name: dish.name,
        servings: dish.servings,
        total,
        per_serving,
        per_100g,
        skipped_ingredients,
    })
}

pub fn classify_dish(db: &Database, id: i64) -> Result<ClassifyDishResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let dish = load_dish(&conn, id)?;

    Ok(ClassifyDishResponse {
        dish_id: dish.id,
        total_time: dish.total_time(),
        essential_ingredients: dish.essential_ingredients().count(),
        classification: nutrition::classify(&dish),
        name: dish.name,
    })
}

/// Cost from prices per 100 g keyed by product id
pub fn estimate_dish_cost(
    db: &Database,
    id: i64,
    prices_per_100g: &HashMap<i64, f64>,
) -> Result<DishCostResponse, String> {
    if prices_per_100g.values().any(|p| !p.is_finite() || *p < 0.0) {
        return Err("prices cannot be negative".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let dish = load_dish(&conn, id)?;

    let total_cost = nutrition::estimate_cost(&dish, prices_per_100g).map_err(|e| e.to_string())?;

    let unpriced_ingredients = dish
        .ingredients
        .iter()
        .filter(|i| {
            !prices_per_100g.contains_key(&i.product.id)
                || !nutrition::is_resolvable(i.unit, i.product.category)
        })
        .map(|i| i.product.name.clone())
        .collect();

    Ok(DishCostResponse {
        dish_id: dish.id,
        name: dish.name,
        total_cost,
        cost_per_serving: total_cost / f64::from(dish.servings.max(1)),
        unpriced_ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NutritionFacts, ProductCreate, ProductType};

    fn add_product(db: &Database, name: &str, category: ProductCategory, nutrition: NutritionFacts) -> i64 {
        db.with_conn(|conn| {
            Product::create(
                conn,
                &ProductCreate {
                    name: name.to_string(),
                    description: None,
                    brand: None,
                    image_url: None,
                    category,
                    product_type: ProductType::RawIngredient,
                    nutrition,
                    is_organic: false,
                    is_vegetarian: false,
                    is_vegan: false,
                    is_gluten_free: false,
                },
            )
        })
        .unwrap()
        .id
    }

    fn dish_data(name: &str, servings: u32) -> DishCreate {
        DishCreate {
            name: name.to_string(),
            category: DishCategory::Breakfast,
            description: None,
            cooking_time: 10,
            preparation_time: 5,
            servings,
            instructions: None,
            is_public: true,
            rating: 4.5,
        }
    }

    fn item(product_id: i64, amount: f64, unit: Unit) -> IngredientCreate {
        IngredientCreate {
            dish_id: 0,
            product_id,
            amount,
            unit,
            is_optional: false,
            preparation: None,
            note: None,
        }
    }

    /// Omelette for two: eggs, milk, and a cheese piece with no weight
    fn omelette(db: &Database) -> i64 {
        let egg = add_product(db, "Egg", ProductCategory::Egg, NutritionFacts::new(155.0, 11.0, 13.0, 1.0));
        let milk = add_product(db, "Milk", ProductCategory::Dairy, NutritionFacts::new(42.0, 1.0, 3.4, 5.0));
        let cheese = add_product(db, "Cheese", ProductCategory::Dairy, NutritionFacts::new(400.0, 33.0, 25.0, 1.3));

        let dish = create_dish(db, dish_data("Omelette", 2)).unwrap();
        let mut cheese_item = item(cheese, 1.0, Unit::Piece);
        cheese_item.is_optional = true;
        cheese_item.preparation = Some("grated".to_string());

        let result = add_dish_ingredients_batch(
            db,
            dish.id,
            vec![item(egg, 3.0, Unit::Piece), item(milk, 50.0, Unit::Milliliter), cheese_item],
        )
        .unwrap();
        assert_eq!(result.added.len(), 3);
        assert_eq!(result.warnings.len(), 1);

        dish.id
    }

    #[test]
    fn test_create_dish_validation() {
        let db = Database::open_in_memory().unwrap();

        assert!(create_dish(&db, dish_data("  ", 1)).is_err());
        assert!(create_dish(&db, dish_data("Toast", 0)).is_err());

        let mut bad_rating = dish_data("Toast", 1);
        bad_rating.rating = 5.5;
        assert!(create_dish(&db, bad_rating).is_err());

        let created = create_dish(&db, dish_data(" Toast ", 1)).unwrap();
        assert_eq!(created.name, "Toast");
    }

    #[test]
    fn test_dish_times_are_bounded() {
        let db = Database::open_in_memory().unwrap();

        let mut endless = dish_data("Stew", 2);
        endless.cooking_time = u32::MAX;
        endless.preparation_time = 1;
        let err = create_dish(&db, endless).unwrap_err();
        assert!(err.contains("cooking_time"));

        let stew = create_dish(&db, dish_data("Stew", 2)).unwrap();
        let update = DishUpdate {
            preparation_time: Some(MAX_DISH_MINUTES + 1),
            ..Default::default()
        };
        assert!(update_dish(&db, stew.id, update).is_err());

        let slow = DishUpdate {
            cooking_time: Some(MAX_DISH_MINUTES),
            preparation_time: Some(MAX_DISH_MINUTES),
            ..Default::default()
        };
        update_dish(&db, stew.id, slow).unwrap();

        let classified = classify_dish(&db, stew.id).unwrap();
        assert_eq!(classified.total_time, 2 * MAX_DISH_MINUTES);
        assert!(!classified.classification.is_quick_meal);
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let db = Database::open_in_memory().unwrap();
        let flour = add_product(&db, "Flour", ProductCategory::Grain, NutritionFacts::new(364.0, 1.0, 10.0, 76.0));
        let bread = create_dish(&db, dish_data("Bread", 1)).unwrap();

        let mut huge = item(flour, 1e306, Unit::Kilogram);
        huge.dish_id = bread.id;
        assert!(add_dish_ingredient(&db, huge).is_err());
        assert!(add_dish_ingredients_batch(&db, bread.id, vec![item(flour, 1e306, Unit::Kilogram)]).is_err());

        let mut ok = item(flour, 500.0, Unit::Gram);
        ok.dish_id = bread.id;
        let added = add_dish_ingredient(&db, ok).unwrap();
        let update = IngredientUpdate {
            amount: Some(MAX_AMOUNT * 10.0),
            ..Default::default()
        };
        assert!(update_dish_ingredient(&db, added.ingredient.id, update).is_err());
    }

    #[test]
    fn test_dish_nutrition() {
        let db = Database::open_in_memory().unwrap();
        let id = omelette(&db);

        let result = get_dish_nutrition(&db, id).unwrap();
        // 180 g egg (279 kcal) + 50 g milk (21 kcal); cheese piece skipped
        assert!((result.total.calories - 300.0).abs() < 1e-9);
        assert!((result.total.weight - 230.0).abs() < 1e-9);
        assert!((result.per_serving.calories - 150.0).abs() < 1e-9);
        assert_eq!(result.skipped_ingredients, 1);
        assert_eq!(result.ingredient_count, 3);

        let per_100g = result.per_100g.unwrap();
        assert!((per_100g.weight - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_nutrition_of_empty_dish_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let dish = create_dish(&db, dish_data("Nothing", 1)).unwrap();

        let err = get_dish_nutrition(&db, dish.id).unwrap_err();
        assert!(err.contains("no ingredients"));

        let detail = get_dish(&db, dish.id).unwrap().unwrap();
        assert!(detail.nutrition.is_none());
        assert!(detail.classification.is_vegan);
    }

    #[test]
    fn test_get_dish_detail() {
        let db = Database::open_in_memory().unwrap();
        let id = omelette(&db);

        let detail = get_dish(&db, id).unwrap().unwrap();
        assert_eq!(detail.ingredients.len(), 3);
        assert_eq!(detail.ingredients[0].product_name, "Egg");
        assert_eq!(detail.ingredients[0].grams, Some(180.0));
        assert_eq!(detail.ingredients[2].grams, None);
        assert!(detail.ingredients[2].nutrition.is_none());
        assert_eq!(detail.total_time, 15);
        assert!(detail.classification.is_vegetarian);
        assert!(!detail.classification.is_vegan);
        assert!(detail.classification.is_quick_meal);

        assert!(get_dish(&db, 999).unwrap().is_none());
    }

    #[test]
    fn test_ingredient_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let rice = add_product(&db, "Rice", ProductCategory::Grain, NutritionFacts::new(130.0, 0.3, 2.7, 28.0));
        let dish = create_dish(&db, dish_data("Rice bowl", 1)).unwrap();

        let mut data = item(rice, 100.0, Unit::Gram);
        data.dish_id = dish.id;
        let added = add_dish_ingredient(&db, data).unwrap();
        assert!(added.warning.is_none());

        let update = IngredientUpdate {
            amount: Some(1.0),
            unit: Some(Unit::Can),
            ..Default::default()
        };
        let updated = update_dish_ingredient(&db, added.ingredient.id, update).unwrap();
        assert!(updated.warning.is_some());
        assert_eq!(updated.ingredient.unit, Unit::Can);

        let bad = IngredientUpdate {
            amount: Some(-2.0),
            ..Default::default()
        };
        assert!(update_dish_ingredient(&db, added.ingredient.id, bad).is_err());

        let removed = remove_dish_ingredient(&db, added.ingredient.id).unwrap();
        assert_eq!(removed.dish_id, dish.id);
        assert!(remove_dish_ingredient(&db, added.ingredient.id).is_err());
    }

    #[test]
    fn test_add_ingredient_rejects_unknown_references() {
        let db = Database::open_in_memory().unwrap();
        let rice = add_product(&db, "Rice", ProductCategory::Grain, NutritionFacts::default());
        let dish = create_dish(&db, dish_data("Bowl", 1)).unwrap();

        let mut missing_dish = item(rice, 100.0, Unit::Gram);
        missing_dish.dish_id = 999;
        assert!(add_dish_ingredient(&db, missing_dish).is_err());

        let mut missing_product = item(999, 100.0, Unit::Gram);
        missing_product.dish_id = dish.id;
        assert!(add_dish_ingredient(&db, missing_product).is_err());

        let mut zero = item(rice, 0.0, Unit::Gram);
        zero.dish_id = dish.id;
        assert!(add_dish_ingredient(&db, zero).is_err());

        // Unknown nutrition is accepted with a warning
        let mut unknown = item(rice, 100.0, Unit::Gram);
        unknown.dish_id = dish.id;
        assert!(add_dish_ingredient(&db, unknown).unwrap().warning.is_some());
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let db = Database::open_in_memory().unwrap();
        let rice = add_product(&db, "Rice", ProductCategory::Grain, NutritionFacts::default());
        let dish = create_dish(&db, dish_data("Bowl", 1)).unwrap();

        let result = add_dish_ingredients_batch(
            &db,
            dish.id,
            vec![item(rice, 100.0, Unit::Gram), item(999, 10.0, Unit::Gram)],
        );
        assert!(result.is_err());

        let detail = get_dish(&db, dish.id).unwrap().unwrap();
        assert!(detail.ingredients.is_empty());
    }

    #[test]
    fn test_delete_dish_removes_ingredients() {
        let db = Database::open_in_memory().unwrap();
        let id = omelette(&db);

        let deleted = delete_dish(&db, id).unwrap();
        assert_eq!(deleted.ingredients_removed, 3);
        assert!(get_dish(&db, id).unwrap().is_none());
        assert!(delete_dish(&db, id).is_err());

        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM dish_ingredients", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_list_and_update_dishes() {
        let db = Database::open_in_memory().unwrap();
        omelette(&db);
        let soup = create_dish(&db, dish_data("Pumpkin soup", 4)).unwrap();

        let update = DishUpdate {
            category: Some(DishCategory::Soup),
            cooking_time: Some(45),
            ..Default::default()
        };
        update_dish(&db, soup.id, update).unwrap();
        assert!(update_dish(&db, soup.id, DishUpdate { servings: Some(0), ..Default::default() }).is_err());

        let soups = list_dishes(&db, None, Some("soup"), false, "name", "asc", 50, 0).unwrap();
        assert_eq!(soups.total, 1);
        assert_eq!(soups.items[0].total_time, 50);
        assert_eq!(soups.items[0].calories_per_serving, None);

        let search = list_dishes(&db, Some("omel"), None, true, "name", "asc", 50, 0).unwrap();
        assert_eq!(search.total, 1);
        let calories = search.items[0].calories_per_serving.unwrap();
        assert!((calories - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_and_cost() {
        let db = Database::open_in_memory().unwrap();
        let id = omelette(&db);

        let classification = classify_dish(&db, id).unwrap();
        assert_eq!(classification.essential_ingredients, 2);
        assert_eq!(classification.classification.complexity_score, 0);

        let (egg, milk) = db
            .with_conn(|conn| {
                let dish = Dish::get_by_id(conn, id)?.unwrap();
                Ok((dish.ingredients[0].product.id, dish.ingredients[1].product.id))
            })
            .unwrap();

        let prices = HashMap::from([(egg, 1.0), (milk, 0.2)]);
        let cost = estimate_dish_cost(&db, id, &prices).unwrap();
        // 180 g egg at 1.0 + 50 g milk at 0.2
        assert!((cost.total_cost - 1.9).abs() < 1e-9);
        assert!((cost.cost_per_serving - 0.95).abs() < 1e-9);
        assert_eq!(cost.unpriced_ingredients, vec!["Cheese".to_string()]);

        assert!(estimate_dish_cost(&db, id, &HashMap::new()).is_err());
        assert!(estimate_dish_cost(&db, id, &HashMap::from([(egg, -1.0)])).is_err());
    }
}
