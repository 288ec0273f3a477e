//! Utility to seed the database with a starter catalog and one dish

use std::path::PathBuf;

use fitly::models::{
    DishCategory, DishCreate, IngredientCreate, NutritionFacts, Product, ProductCategory,
    ProductCreate, ProductType,
};
use fitly::nutrition::Unit;
use fitly::tools::{dishes, products};

fn get_database_path() -> PathBuf {
    std::env::var("FITLY_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("fitly.db");
            path
        })
}

/// (name, category, kcal, fats, protein, carbs, gluten free)
const STARTER_PRODUCTS: &[(&str, ProductCategory, f64, f64, f64, f64, bool)] = &[
    ("Egg", ProductCategory::Egg, 155.0, 11.0, 13.0, 1.1, true),
    ("Whole milk", ProductCategory::Dairy, 61.0, 3.3, 3.2, 4.8, true),
    ("Cheddar", ProductCategory::Dairy, 403.0, 33.0, 25.0, 1.3, true),
    ("Tomato", ProductCategory::Vegetable, 18.0, 0.2, 0.9, 3.9, true),
    ("Spinach", ProductCategory::Vegetable, 23.0, 0.4, 2.9, 3.6, true),
    ("Wholegrain bread", ProductCategory::Grain, 247.0, 3.4, 13.0, 41.0, false),
    ("Olive oil", ProductCategory::Oil, 884.0, 100.0, 0.0, 0.0, true),
    ("Chicken breast", ProductCategory::Meat, 165.0, 3.6, 31.0, 0.0, true),
    ("Apple", ProductCategory::Fruit, 52.0, 0.2, 0.3, 14.0, true),
];

fn starter_product(entry: &(&str, ProductCategory, f64, f64, f64, f64, bool)) -> ProductCreate {
    let (name, category, calories, fats, protein, carbs, is_gluten_free) = *entry;
    let animal = matches!(category, ProductCategory::Meat | ProductCategory::Fish);
    let vegan = !animal && !matches!(category, ProductCategory::Dairy | ProductCategory::Egg);

    ProductCreate {
        name: name.to_string(),
        description: None,
        brand: None,
        image_url: None,
        category,
        product_type: ProductType::RawIngredient,
        nutrition: NutritionFacts::new(calories, fats, protein, carbs),
        is_organic: false,
        is_vegetarian: !animal,
        is_vegan: vegan,
        is_gluten_free,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = fitly::db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        fitly::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let existing = database.with_conn(|conn| Product::count(conn, None))?;
    if existing > 0 {
        println!("Catalog already has {} product(s); nothing to seed", existing);
        return Ok(());
    }

    let mut ids = Vec::with_capacity(STARTER_PRODUCTS.len());
    for entry in STARTER_PRODUCTS {
        let added = products::add_product(&database, starter_product(entry))?;
        println!("  Added product {:>3}: {}", added.id, added.name);
        ids.push(added.id);
    }

    let dish = dishes::create_dish(
        &database,
        DishCreate {
            name: "Spinach omelette".to_string(),
            category: DishCategory::Breakfast,
            description: Some("Fluffy omelette with wilted spinach and cheddar".to_string()),
            cooking_time: 10,
            preparation_time: 5,
            servings: 2,
            instructions: Some("Whisk eggs with milk, wilt spinach in oil, pour eggs over, top with cheese.".to_string()),
            is_public: true,
            rating: 4.5,
        },
    )?;

    let ingredient = |index: usize, amount: f64, unit: Unit, optional: bool, preparation: Option<&str>| IngredientCreate {
        dish_id: dish.id,
        product_id: ids[index],
        amount,
        unit,
        is_optional: optional,
        preparation: preparation.map(str::to_string),
        note: None,
    };

    dishes::add_dish_ingredients_batch(
        &database,
        dish.id,
        vec![
            ingredient(0, 3.0, Unit::Piece, false, Some("whisked")),
            ingredient(1, 50.0, Unit::Milliliter, false, None),
            ingredient(4, 1.0, Unit::Bunch, false, Some("chopped")),
            ingredient(6, 1.0, Unit::Tablespoon, false, None),
            ingredient(2, 1.0, Unit::Slice, true, Some("grated")),
        ],
    )?;

    let nutrition = dishes::get_dish_nutrition(&database, dish.id)?;
    println!("Dish seeded: {} (id {})", nutrition.name, nutrition.dish_id);
    println!("  Total: {:.0} kcal, {:.0} g", nutrition.total.calories, nutrition.total.weight);
    println!("  Per serving: {:.0} kcal", nutrition.per_serving.calories);

    Ok(())
}
