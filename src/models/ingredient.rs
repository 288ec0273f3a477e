//! Ingredient model
//!
//! An amount of one product inside a dish. The dish owns its ingredients;
//! ingredients share the product they point at.

use std::collections::HashMap;
use std::sync::Arc;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::Product;
use crate::db::{DbError, DbResult};
use crate::nutrition::Unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub product: Arc<Product>,
    pub amount: f64,
    pub unit: Unit,
    pub is_optional: bool,
    pub preparation: Option<String>,
    pub note: Option<String>,
}

/// Data for adding an ingredient to a dish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub dish_id: i64,
    pub product_id: i64,
    pub amount: f64,
    pub unit: Unit,
    #[serde(default)]
    pub is_optional: bool,
    pub preparation: Option<String>,
    pub note: Option<String>,
}

/// Data for updating an ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub amount: Option<f64>,
    pub unit: Option<Unit>,
    pub is_optional: Option<bool>,
    pub preparation: Option<String>,
    pub note: Option<String>,
}

/// Stored row before its product is resolved
struct IngredientRow {
    id: i64,
    product_id: i64,
    amount: f64,
    unit: Unit,
    is_optional: bool,
    preparation: Option<String>,
    note: Option<String>,
}

impl IngredientRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            product_id: row.get("product_id")?,
            amount: row.get("amount")?,
            unit: row.get("unit")?,
            is_optional: row.get::<_, i32>("is_optional")? != 0,
            preparation: row.get("preparation")?,
            note: row.get("note")?,
        })
    }

    fn resolve(self, product: Arc<Product>) -> Ingredient {
        Ingredient {
            id: self.id,
            product,
            amount: self.amount,
            unit: self.unit,
            is_optional: self.is_optional,
            preparation: self.preparation,
            note: self.note,
        }
    }
}

fn load_product(conn: &Connection, product_id: i64) -> DbResult<Arc<Product>> {
    Product::get_by_id(conn, product_id)?
        .map(Arc::new)
        .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}

impl Ingredient {
    /// Essential ingredients are the ones not marked optional
    pub fn is_essential(&self) -> bool {
        !self.is_optional
    }

    pub fn has_preparation(&self) -> bool {
        self.preparation.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Add an ingredient at the end of a dish's list
    pub fn create(conn: &Connection, data: &IngredientCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO dish_ingredients (
                dish_id, product_id, position, amount, unit, is_optional, preparation, note
            ) VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM dish_ingredients WHERE dish_id = ?1),
                ?3, ?4, ?5, ?6, ?7
            )
            "#,
            params![
                data.dish_id,
                data.product_id,
                data.amount,
                data.unit,
                data.is_optional,
                data.preparation,
                data.note,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let result = conn.query_row(
            "SELECT * FROM dish_ingredients WHERE id = ?1",
            [id],
            IngredientRow::from_row,
        );
        let row = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let product = load_product(conn, row.product_id)?;
        Ok(Some(row.resolve(product)))
    }

    /// All ingredients of a dish in list order, products resolved
    pub fn get_for_dish(conn: &Connection, dish_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM dish_ingredients WHERE dish_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt
            .query_map([dish_id], IngredientRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut products: HashMap<i64, Arc<Product>> = HashMap::new();
        let mut ingredients = Vec::with_capacity(rows.len());
        for row in rows {
            let product = match products.get(&row.product_id) {
                Some(product) => Arc::clone(product),
                None => {
                    let product = load_product(conn, row.product_id)?;
                    products.insert(row.product_id, Arc::clone(&product));
                    product
                }
            };
            ingredients.push(row.resolve(product));
        }

        Ok(ingredients)
    }

    pub fn update(conn: &Connection, id: i64, data: &IngredientUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(amount) = data.amount {
            updates.push(format!("amount = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(amount));
        }
        if let Some(unit) = data.unit {
            updates.push(format!("unit = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(unit));
        }
        if let Some(is_optional) = data.is_optional {
            updates.push(format!("is_optional = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(is_optional));
        }
        if let Some(ref preparation) = data.preparation {
            updates.push(format!("preparation = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(preparation.clone()));
        }
        if let Some(ref note) = data.note {
            updates.push(format!("note = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(note.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE dish_ingredients SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM dish_ingredients WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// The dish an ingredient belongs to
    pub fn get_dish_id(conn: &Connection, id: i64) -> DbResult<Option<i64>> {
        let result: Result<i64, _> = conn.query_row(
            "SELECT dish_id FROM dish_ingredients WHERE id = ?1",
            [id],
            |row| row.get(0),
        );
        match result {
            Ok(dish_id) => Ok(Some(dish_id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
impl Ingredient {
    pub fn sample(product: &Arc<Product>, amount: f64, unit: Unit) -> Self {
        Self {
            id: 0,
            product: Arc::clone(product),
            amount,
            unit,
            is_optional: false,
            preparation: None,
            note: None,
        }
    }
}
