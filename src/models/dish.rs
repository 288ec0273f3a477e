//! Dish model
//!
//! A recipe: an ordered list of ingredients plus cooking metadata.
//! Loading a dish always resolves its ingredients and their products.

use std::fmt;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::Ingredient;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DishCategory {
    Salad,
    Soup,
    Main,
    Dessert,
    Sandwich,
    Wrap,
    Pizza,
    Pasta,
    Burger,
    Breakfast,
    Drink,
}

impl DishCategory {
    pub const ALL: [DishCategory; 11] = [
        DishCategory::Salad,
        DishCategory::Soup,
        DishCategory::Main,
        DishCategory::Dessert,
        DishCategory::Sandwich,
        DishCategory::Wrap,
        DishCategory::Pizza,
        DishCategory::Pasta,
        DishCategory::Burger,
        DishCategory::Breakfast,
        DishCategory::Drink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DishCategory::Salad => "salad",
            DishCategory::Soup => "soup",
            DishCategory::Main => "main",
            DishCategory::Dessert => "dessert",
            DishCategory::Sandwich => "sandwich",
            DishCategory::Wrap => "wrap",
            DishCategory::Pizza => "pizza",
            DishCategory::Pasta => "pasta",
            DishCategory::Burger => "burger",
            DishCategory::Breakfast => "breakfast",
            DishCategory::Drink => "drink",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == lower)
    }
}

impl fmt::Display for DishCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub category: DishCategory,
    pub description: Option<String>,
    /// Minutes
    pub cooking_time: u32,
    /// Minutes
    pub preparation_time: u32,
    /// Always at least 1
    pub servings: u32,
    pub instructions: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub is_public: bool,
    /// 0 to 5
    pub rating: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new dish (ingredients added separately)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishCreate {
    pub name: String,
    pub category: DishCategory,
    pub description: Option<String>,
    #[serde(default)]
    pub cooking_time: u32,
    #[serde(default)]
    pub preparation_time: u32,
    #[serde(default = "default_servings")]
    pub servings: u32,
    pub instructions: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub rating: f64,
}

fn default_servings() -> u32 {
    1
}

/// Data for updating dish metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishUpdate {
    pub name: Option<String>,
    pub category: Option<DishCategory>,
    pub description: Option<String>,
    pub cooking_time: Option<u32>,
    pub preparation_time: Option<u32>,
    pub servings: Option<u32>,
    pub instructions: Option<String>,
    pub is_public: Option<bool>,
    pub rating: Option<f64>,
}

/// Filters for listing dishes
#[derive(Debug, Clone, Default)]
pub struct DishFilter<'a> {
    pub query: Option<&'a str>,
    pub category: Option<DishCategory>,
    pub public_only: bool,
}

impl Dish {
    /// Cooking plus preparation time in minutes
    pub fn total_time(&self) -> u32 {
        self.cooking_time.saturating_add(self.preparation_time)
    }

    /// Ingredients not marked optional
    pub fn essential_ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter().filter(|i| i.is_essential())
    }

    /// Row without ingredients; callers attach them
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            description: row.get("description")?,
            cooking_time: row.get("cooking_time")?,
            preparation_time: row.get("preparation_time")?,
            servings: row.get("servings")?,
            instructions: row.get("instructions")?,
            ingredients: Vec::new(),
            is_public: row.get::<_, i32>("is_public")? != 0,
            rating: row.get("rating")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn with_ingredients(mut self, conn: &Connection) -> DbResult<Self> {
        self.ingredients = Ingredient::get_for_dish(conn, self.id)?;
        Ok(self)
    }

    pub fn create(conn: &Connection, data: &DishCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO dishes (
                name, category, description, cooking_time, preparation_time,
                servings, instructions, is_public, rating
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.name,
                data.category,
                data.description,
                data.cooking_time,
                data.preparation_time,
                data.servings,
                data.instructions,
                data.is_public,
                data.rating,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Load a dish with all of its ingredients
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let result = conn.query_row("SELECT * FROM dishes WHERE id = ?1", [id], Self::from_row);
        match result {
            Ok(dish) => Ok(Some(dish.with_ingredients(conn)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn where_clause(filter: &DishFilter<'_>, params_vec: &mut Vec<Box<dyn rusqlite::ToSql>>) -> String {
        let mut conditions = Vec::new();

        if let Some(query) = filter.query.map(str::trim).filter(|q| !q.is_empty()) {
            conditions.push(format!("name LIKE ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(format!("%{}%", query)));
        }
        if let Some(category) = filter.category {
            conditions.push(format!("category = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(category));
        }
        if filter.public_only {
            conditions.push("is_public = 1".to_string());
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        }
    }

    /// List dishes with filtering, sorting and pagination
    pub fn list(
        conn: &Connection,
        filter: &DishFilter<'_>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.eq_ignore_ascii_case("desc") { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "created_at",
            "rating" => "rating",
            "cooking_time" => "cooking_time",
            _ => "name",
        };

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let where_sql = Self::where_clause(filter, &mut params_vec);

        let sql = format!(
            "SELECT * FROM dishes {} ORDER BY {} {} LIMIT ?{} OFFSET ?{}",
            where_sql,
            sort_col,
            order,
            params_vec.len() + 1,
            params_vec.len() + 2
        );
        params_vec.push(Box::new(limit));
        params_vec.push(Box::new(offset));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let dishes = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        dishes
            .into_iter()
            .map(|dish| dish.with_ingredients(conn))
            .collect()
    }

    pub fn count(conn: &Connection, filter: &DishFilter<'_>) -> DbResult<i64> {
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let where_sql = Self::where_clause(filter, &mut params_vec);
        let sql = format!("SELECT COUNT(*) FROM dishes {}", where_sql);

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let count: i64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    pub fn update(conn: &Connection, id: i64, data: &DishUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", stringify!($field), params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name);
        add_update!(category);
        add_update!(description);
        add_update!(cooking_time);
        add_update!(preparation_time);
        add_update!(servings);
        add_update!(instructions);
        add_update!(is_public);
        add_update!(rating);

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE dishes SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a dish and its ingredients
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM dishes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Bump `updated_at` after the ingredient list changed
    pub fn touch(conn: &Connection, id: i64) -> DbResult<()> {
        conn.execute("UPDATE dishes SET updated_at = datetime('now') WHERE id = ?1", [id])?;
        Ok(())
    }
}

#[cfg(test)]
impl Dish {
    pub fn sample(servings: u32, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: 0,
            name: "Sample".to_string(),
            category: DishCategory::Main,
            description: None,
            cooking_time: 0,
            preparation_time: 0,
            servings,
            instructions: None,
            ingredients,
            is_public: false,
            rating: 0.0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{IngredientCreate, IngredientUpdate, NutritionFacts, Product, ProductCategory, ProductCreate, ProductType};
    use crate::nutrition::Unit;

    #[test]
    fn test_total_time_saturates() {
        let mut dish = Dish::sample(1, vec![]);
        dish.cooking_time = u32::MAX;
        dish.preparation_time = 1;
        assert_eq!(dish.total_time(), u32::MAX);
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn product(conn: &Connection, name: &str, category: ProductCategory) -> Product {
        Product::create(
            conn,
            &ProductCreate {
                name: name.to_string(),
                description: None,
                brand: None,
                image_url: None,
                category,
                product_type: ProductType::RawIngredient,
                nutrition: NutritionFacts::new(100.0, 1.0, 2.0, 3.0),
                is_organic: false,
                is_vegetarian: false,
                is_vegan: false,
                is_gluten_free: false,
            },
        )
        .unwrap()
    }

    fn dish(conn: &Connection, name: &str, category: DishCategory, is_public: bool) -> Dish {
        Dish::create(
            conn,
            &DishCreate {
                name: name.to_string(),
                category,
                description: None,
                cooking_time: 20,
                preparation_time: 5,
                servings: 2,
                instructions: None,
                is_public,
                rating: 4.5,
            },
        )
        .unwrap()
    }

    fn add(conn: &Connection, dish_id: i64, product_id: i64, amount: f64, unit: Unit) -> Ingredient {
        Ingredient::create(
            conn,
            &IngredientCreate {
                dish_id,
                product_id,
                amount,
                unit,
                is_optional: false,
                preparation: None,
                note: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(DishCategory::from_str("Drink"), Some(DishCategory::Drink));
        assert_eq!(DishCategory::from_str("snack"), None);
    }

    #[test]
    fn test_load_resolves_ingredients_in_order() {
        let conn = conn();
        let egg = product(&conn, "Egg", ProductCategory::Egg);
        let tomato = product(&conn, "Tomato", ProductCategory::Vegetable);
        let omelette = dish(&conn, "Omelette", DishCategory::Breakfast, false);

        add(&conn, omelette.id, egg.id, 3.0, Unit::Piece);
        add(&conn, omelette.id, tomato.id, 1.0, Unit::Piece);
        add(&conn, omelette.id, egg.id, 20.0, Unit::Gram);

        let loaded = Dish::get_by_id(&conn, omelette.id).unwrap().unwrap();
        let names: Vec<_> = loaded.ingredients.iter().map(|i| i.product.name.as_str()).collect();
        assert_eq!(names, vec!["Egg", "Tomato", "Egg"]);
        assert_eq!(loaded.ingredients[0].unit, Unit::Piece);
        assert_eq!(loaded.total_time(), 25);
        assert_eq!(loaded.servings, 2);
    }

    #[test]
    fn test_product_in_use_cannot_be_deleted() {
        let conn = conn();
        let salmon = product(&conn, "Salmon", ProductCategory::Fish);
        let bowl = dish(&conn, "Poke", DishCategory::Main, true);
        add(&conn, bowl.id, salmon.id, 150.0, Unit::Gram);

        assert_eq!(Product::get_dish_usage_count(&conn, salmon.id).unwrap(), 1);
        assert_eq!(Product::get_used_in_dishes(&conn, salmon.id).unwrap(), vec!["Poke".to_string()]);
        assert!(Product::delete(&conn, salmon.id).is_err());

        assert!(Dish::delete(&conn, bowl.id).unwrap());
        assert_eq!(Product::get_dish_usage_count(&conn, salmon.id).unwrap(), 0);
        assert!(Product::delete(&conn, salmon.id).unwrap());
    }

    #[test]
    fn test_list_filters() {
        let conn = conn();
        dish(&conn, "Greek Salad", DishCategory::Salad, true);
        dish(&conn, "Caesar Salad", DishCategory::Salad, false);
        dish(&conn, "Borscht", DishCategory::Soup, true);

        let filter = DishFilter {
            query: Some("salad"),
            public_only: true,
            ..Default::default()
        };
        let found = Dish::list(&conn, &filter, "name", "asc", 10, 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Greek Salad");

        let soups = DishFilter {
            category: Some(DishCategory::Soup),
            ..Default::default()
        };
        assert_eq!(Dish::count(&conn, &soups).unwrap(), 1);
        assert_eq!(Dish::count(&conn, &DishFilter::default()).unwrap(), 3);
    }

    #[test]
    fn test_update_dish_and_ingredient() {
        let conn = conn();
        let bread = product(&conn, "Bread", ProductCategory::Grain);
        let toast = dish(&conn, "Toast", DishCategory::Breakfast, false);
        let slice = add(&conn, toast.id, bread.id, 2.0, Unit::Slice);

        let updated = Dish::update(
            &conn,
            toast.id,
            &DishUpdate {
                servings: Some(4),
                rating: Some(3.0),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.servings, 4);
        assert_eq!(updated.ingredients.len(), 1);

        let changed = Ingredient::update(
            &conn,
            slice.id,
            &IngredientUpdate {
                amount: Some(3.0),
                preparation: Some("toasted".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(changed.amount, 3.0);
        assert!(changed.has_preparation());
        assert_eq!(Ingredient::get_dish_id(&conn, slice.id).unwrap(), Some(toast.id));

        assert!(Ingredient::delete(&conn, slice.id).unwrap());
        let emptied = Dish::get_by_id(&conn, toast.id).unwrap().unwrap();
        assert!(emptied.ingredients.is_empty());
    }
}
