//! Product MCP Tools
//!
//! Tools for managing the product catalog.

use serde::Serialize;

use super::parse_unit;
use crate::db::Database;
use crate::models::{
    NutritionFacts, NutritionInfo, Product, ProductAlias, ProductCategory, ProductCreate,
    ProductType, ProductUpdate,
};
use crate::nutrition::{self, Unit};

/// Summary of a product for list/search results
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub category: ProductCategory,
    pub calories: Option<f64>,
    pub has_nutrition_info: bool,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category,
            calories: product.nutrition.calories,
            has_nutrition_info: product.has_nutrition_info(),
        }
    }
}

/// Response for add_product
#[derive(Debug, Serialize)]
pub struct AddProductResponse {
    pub id: i64,
    pub name: String,
    pub category: ProductCategory,
    pub has_nutrition_info: bool,
    pub created_at: String,
}

/// Full product detail response
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub has_nutrition_info: bool,
    pub is_ready_to_eat: bool,
    pub aliases: Vec<ProductAlias>,
    pub usage_count: i64,
    pub used_in_dishes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchProductsResponse {
    pub items: Vec<ProductSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub items: Vec<ProductSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateProductResponse {
    pub success: bool,
    pub updated_at: String,
    /// Dishes whose computed nutrition changes with this product
    pub affected_dishes: Vec<String>,
}

/// Response for delete_product blocked
#[derive(Debug, Serialize)]
pub struct DeleteProductBlockedResponse {
    pub error: String,
    pub usage_count: i64,
    pub used_in_dishes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteProductSuccessResponse {
    pub success: bool,
    pub deleted_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RemoveAliasResponse {
    pub success: bool,
    pub removed_id: i64,
}

/// Nutrition of an amount of a product
#[derive(Debug, Serialize)]
pub struct ProductNutritionResponse {
    pub product_id: i64,
    pub product_name: String,
    pub amount: f64,
    pub unit: Unit,
    pub nutrition: NutritionInfo,
}

fn validate_nutrition(
    calories: Option<f64>,
    fats: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
) -> Result<(), String> {
    let fields = [("calories", calories), ("fats", fats), ("protein", protein), ("carbs", carbs)];
    for (name, value) in fields {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} cannot be negative", name));
            }
        }
    }
    Ok(())
}

/// Add a new product to the catalog
pub fn add_product(db: &Database, mut data: ProductCreate) -> Result<AddProductResponse, String> {
    data.name = data.name.trim().to_string();
    if data.name.is_empty() {
        return Err("Product name cannot be empty".to_string());
    }

    let NutritionFacts { calories, fats, protein, carbs } = data.nutrition;
    validate_nutrition(calories, fats, protein, carbs)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let product = Product::create(&conn, &data)
        .map_err(|e| format!("Failed to create product: {}", e))?;

    tracing::info!(id = product.id, name = %product.name, "Product added");

    Ok(AddProductResponse {
        id: product.id,
        has_nutrition_info: product.has_nutrition_info(),
        name: product.name,
        category: product.category,
        created_at: product.created_at,
    })
}

/// Get a product with aliases and dish usage
pub fn get_product(db: &Database, id: i64) -> Result<Option<ProductDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let product = Product::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get product: {}", e))?;

    match product {
        Some(product) => {
            let aliases = ProductAlias::get_for_product(&conn, id)
                .map_err(|e| format!("Failed to get aliases: {}", e))?;
            let usage_count = Product::get_dish_usage_count(&conn, id)
                .map_err(|e| format!("Failed to get usage count: {}", e))?;
            let used_in_dishes = Product::get_used_in_dishes(&conn, id)
                .map_err(|e| format!("Failed to get dish usage: {}", e))?;

            Ok(Some(ProductDetail {
                has_nutrition_info: product.has_nutrition_info(),
                is_ready_to_eat: product.is_ready_to_eat(),
                product,
                aliases,
                usage_count,
                used_in_dishes,
            }))
        }
        None => Ok(None),
    }
}

/// Search products by name, brand or alias
pub fn search_products(db: &Database, query: &str, limit: i64) -> Result<SearchProductsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let products = Product::search(&conn, query, limit)
        .map_err(|e| format!("Search failed: {}", e))?;

    let items: Vec<ProductSummary> = products.iter().map(ProductSummary::from).collect();
    let total = items.len();

    Ok(SearchProductsResponse { items, total })
}

/// List products with optional category filter and pagination
pub fn list_products(
    db: &Database,
    category: Option<&str>,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListProductsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let category = category.map(super::parse_product_category).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let products = Product::list(&conn, category, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list products: {}", e))?;
    let total = Product::count(&conn, category)
        .map_err(|e| format!("Failed to count products: {}", e))?;

    Ok(ListProductsResponse {
        items: products.iter().map(ProductSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Update a product; dishes pick up new nutrition on their next read
pub fn update_product(db: &Database, id: i64, mut data: ProductUpdate) -> Result<UpdateProductResponse, String> {
    if let Some(name) = data.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err("Product name cannot be empty".to_string());
        }
    }
    validate_nutrition(data.calories, data.fats, data.protein, data.carbs)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Product::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update product: {}", e))?;

    match updated {
        Some(product) => {
            let affected_dishes = Product::get_used_in_dishes(&conn, id)
                .map_err(|e| format!("Failed to get dish usage: {}", e))?;

            Ok(UpdateProductResponse {
                success: true,
                updated_at: product.updated_at,
                affected_dishes,
            })
        }
        None => Err(format!("Product not found with id: {}", id)),
    }
}

/// Delete a product (blocked while any dish uses it)
pub fn delete_product(
    db: &Database,
    id: i64,
) -> Result<Result<DeleteProductSuccessResponse, DeleteProductBlockedResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let product = Product::get_by_id(&conn, id)
        .map_err(|e| format!("Database error: {}", e))?;
    if product.is_none() {
        return Err(format!("Product not found with id: {}", id));
    }

    let usage_count = Product::get_dish_usage_count(&conn, id)
        .map_err(|e| format!("Failed to check usage: {}", e))?;

    if usage_count > 0 {
        let used_in_dishes = Product::get_used_in_dishes(&conn, id)
            .map_err(|e| format!("Failed to get dish usage: {}", e))?;

        return Ok(Err(DeleteProductBlockedResponse {
            error: format!("Cannot delete product: used in {} dish ingredient(s)", usage_count),
            usage_count,
            used_in_dishes,
        }));
    }

    Product::delete(&conn, id)
        .map_err(|e| format!("Failed to delete product: {}", e))?;

    tracing::info!(id, "Product deleted");

    Ok(Ok(DeleteProductSuccessResponse {
        success: true,
        deleted_id: id,
    }))
}

pub fn add_product_alias(db: &Database, product_id: i64, alias: &str) -> Result<ProductAlias, String> {
    let alias = alias.trim();
    if alias.is_empty() {
        return Err("Alias cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let exists = Product::get_by_id(&conn, product_id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_some();
    if !exists {
        return Err(format!("Product not found with id: {}", product_id));
    }

    ProductAlias::create(&conn, product_id, alias)
        .map_err(|e| format!("Failed to add alias: {}", e))
}

pub fn remove_product_alias(db: &Database, alias_id: i64) -> Result<RemoveAliasResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = ProductAlias::delete(&conn, alias_id)
        .map_err(|e| format!("Failed to remove alias: {}", e))?;

    if !deleted {
        return Err(format!("Alias not found with id: {}", alias_id));
    }

    Ok(RemoveAliasResponse {
        success: true,
        removed_id: alias_id,
    })
}

/// Nutrition for an amount of a product in any supported unit
pub fn calculate_product_nutrition(
    db: &Database,
    product_id: i64,
    amount: f64,
    unit: &str,
) -> Result<ProductNutritionResponse, String> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err("amount must be greater than 0".to_string());
    }
    let unit = parse_unit(unit)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let product = Product::get_by_id(&conn, product_id)
        .map_err(|e| format!("Failed to get product: {}", e))?
        .ok_or_else(|| format!("Product not found with id: {}", product_id))?;

    let nutrition = nutrition::calculate(&product, amount, unit).map_err(|e| e.to_string())?;

    Ok(ProductNutritionResponse {
        product_id,
        product_name: product.name,
        amount,
        unit,
        nutrition,
    })
}

/// Product type from an optional code, raw when absent
pub(crate) fn parse_product_type(s: Option<&str>) -> Result<ProductType, String> {
    match s {
        None => Ok(ProductType::default()),
        Some(s) => ProductType::from_str(s).ok_or_else(|| {
            format!("Unknown product type '{}'. Expected one of: raw, ready, semi, composite", s)
        }),
    }
}
