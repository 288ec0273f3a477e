//! Product model
//!
//! A raw food item with per-100g nutrition facts.

use std::fmt;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::NutritionFacts;
use crate::db::{DbError, DbResult};

/// Product category, also the key into the piece/slice/bunch weight tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Fruit,
    Vegetable,
    Meat,
    Fish,
    Dairy,
    Sauce,
    Grain,
    Oil,
    Beverage,
    Snack,
    Spice,
    Egg,
    Sweet,
    Frozen,
    Canned,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 15] = [
        ProductCategory::Fruit,
        ProductCategory::Vegetable,
        ProductCategory::Meat,
        ProductCategory::Fish,
        ProductCategory::Dairy,
        ProductCategory::Sauce,
        ProductCategory::Grain,
        ProductCategory::Oil,
        ProductCategory::Beverage,
        ProductCategory::Snack,
        ProductCategory::Spice,
        ProductCategory::Egg,
        ProductCategory::Sweet,
        ProductCategory::Frozen,
        ProductCategory::Canned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Fruit => "fruit",
            ProductCategory::Vegetable => "vegetable",
            ProductCategory::Meat => "meat",
            ProductCategory::Fish => "fish",
            ProductCategory::Dairy => "dairy",
            ProductCategory::Sauce => "sauce",
            ProductCategory::Grain => "grain",
            ProductCategory::Oil => "oil",
            ProductCategory::Beverage => "beverage",
            ProductCategory::Snack => "snack",
            ProductCategory::Spice => "spice",
            ProductCategory::Egg => "egg",
            ProductCategory::Sweet => "sweet",
            ProductCategory::Frozen => "frozen",
            ProductCategory::Canned => "canned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == lower)
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Degree of processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductType {
    #[default]
    #[serde(rename = "raw")]
    RawIngredient,
    #[serde(rename = "ready")]
    ReadyProduct,
    #[serde(rename = "semi")]
    SemiFinished,
    #[serde(rename = "composite")]
    Composite,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::RawIngredient => "raw",
            ProductType::ReadyProduct => "ready",
            ProductType::SemiFinished => "semi",
            ProductType::Composite => "composite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Some(ProductType::RawIngredient),
            "ready" => Some(ProductType::ReadyProduct),
            "semi" => Some(ProductType::SemiFinished),
            "composite" => Some(ProductType::Composite),
            _ => None,
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub category: ProductCategory,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub nutrition: NutritionFacts,
    pub is_organic: bool,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub category: ProductCategory,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub nutrition: NutritionFacts,
    #[serde(default)]
    pub is_organic: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
}

/// Data for updating a product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<ProductCategory>,
    pub product_type: Option<ProductType>,
    pub calories: Option<f64>,
    pub fats: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub is_organic: Option<bool>,
    pub is_vegetarian: Option<bool>,
    pub is_vegan: Option<bool>,
    pub is_gluten_free: Option<bool>,
}

impl Product {
    /// All four macro-nutrients are known
    pub fn has_nutrition_info(&self) -> bool {
        self.nutrition.is_complete()
    }

    pub fn is_ready_to_eat(&self) -> bool {
        self.product_type == ProductType::ReadyProduct
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            brand: row.get("brand")?,
            image_url: row.get("image_url")?,
            category: row.get("category")?,
            product_type: row.get("product_type")?,
            nutrition: NutritionFacts {
                calories: row.get("calories")?,
                fats: row.get("fats")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
            },
            is_organic: row.get::<_, i32>("is_organic")? != 0,
            is_vegetarian: row.get::<_, i32>("is_vegetarian")? != 0,
            is_vegan: row.get::<_, i32>("is_vegan")? != 0,
            is_gluten_free: row.get::<_, i32>("is_gluten_free")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new product into the database
    pub fn create(conn: &Connection, data: &ProductCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO products (
                name, description, brand, image_url, category, product_type,
                calories, fats, protein, carbs,
                is_organic, is_vegetarian, is_vegan, is_gluten_free
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                data.name,
                data.description,
                data.brand,
                data.image_url,
                data.category,
                data.product_type,
                data.nutrition.calories,
                data.nutrition.fats,
                data.nutrition.protein,
                data.nutrition.carbs,
                data.is_organic,
                data.is_vegetarian,
                data.is_vegan,
                data.is_gluten_free,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM products WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search products by name, brand or alias
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM products
            WHERE name LIKE ?1
               OR brand LIKE ?1
               OR id IN (SELECT product_id FROM product_aliases WHERE alias LIKE ?1)
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;

        let products = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// List products with optional category filter, sorting and pagination
    pub fn list(
        conn: &Connection,
        category: Option<ProductCategory>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.eq_ignore_ascii_case("desc") { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "created_at",
            "calories" => "calories",
            "category" => "category",
            _ => "name",
        };

        let products = match category {
            Some(category) => {
                let sql = format!(
                    "SELECT * FROM products WHERE category = ?1 ORDER BY {} {} LIMIT ?2 OFFSET ?3",
                    sort_col, order
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![category, limit, offset], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!(
                    "SELECT * FROM products ORDER BY {} {} LIMIT ?1 OFFSET ?2",
                    sort_col, order
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![limit, offset], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(products)
    }

    pub fn count(conn: &Connection, category: Option<ProductCategory>) -> DbResult<i64> {
        let count: i64 = match category {
            Some(category) => conn.query_row(
                "SELECT COUNT(*) FROM products WHERE category = ?1",
                [category],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    pub fn update(conn: &Connection, id: i64, data: &ProductUpdate) -> DbResult<Option<Self>> {
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
        add_update!(description);
        add_update!(brand);
        add_update!(image_url);
        add_update!(category);
        add_update!(product_type);
        add_update!(calories);
        add_update!(fats);
        add_update!(protein);
        add_update!(carbs);
        add_update!(is_organic);
        add_update!(is_vegetarian);
        add_update!(is_vegan);
        add_update!(is_gluten_free);

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE products SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Number of dish ingredients referencing this product
    pub fn get_dish_usage_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM dish_ingredients WHERE product_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Names of dishes that use this product
    pub fn get_used_in_dishes(conn: &Connection, id: i64) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT d.name FROM dishes d
            INNER JOIN dish_ingredients di ON d.id = di.dish_id
            WHERE di.product_id = ?1
            ORDER BY d.name
            "#,
        )?;

        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Delete a product. Fails with a constraint error while dishes use it.
    /// Returns Ok(false) if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
impl Product {
    /// In-memory product for core tests
    pub fn sample(name: &str, category: ProductCategory, nutrition: NutritionFacts) -> Self {
        Self {
            id: 0,
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
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}
