//! Fitly MCP Server Implementation
//!
//! Implements the MCP server with all Fitly tools.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{
    DishCreate, DishUpdate, IngredientCreate, IngredientUpdate, NutritionFacts, ProductCreate,
    ProductUpdate,
};
use crate::tools::dishes;
use crate::tools::products;
use crate::tools::status::StatusTracker;
use crate::tools::{parse_dish_category, parse_product_category, parse_unit};

/// Fitly MCP Service
#[derive(Clone)]
pub struct FitlyService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<FitlyService>,
}

impl FitlyService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn invalid(e: String) -> McpError {
    McpError::invalid_params(e, None)
}

// ============================================================================
// Product Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddProductParams {
    pub name: String,
    /// fruit, vegetable, meat, fish, dairy, sauce, grain, oil, beverage, snack, spice, egg, sweet, frozen, canned
    pub category: String,
    /// raw (default), ready, semi, composite
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    /// kcal per 100 g; omit when unknown
    pub calories: Option<f64>,
    /// Grams per 100 g; omit when unknown
    pub fats: Option<f64>,
    /// Grams per 100 g; omit when unknown
    pub protein: Option<f64>,
    /// Grams per 100 g; omit when unknown
    pub carbs: Option<f64>,
    #[serde(default)]
    pub is_organic: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetProductParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchProductsParams {
    /// Matched against name, brand and aliases
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListProductsParams {
    pub category: Option<String>,
    /// name, created_at, calories, category
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// asc or desc
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String { "name".to_string() }
fn default_sort_order() -> String { "asc".to_string() }
fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProductParams {
    pub id: i64,
    pub name: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub calories: Option<f64>,
    pub fats: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub is_organic: Option<bool>,
    pub is_vegetarian: Option<bool>,
    pub is_vegan: Option<bool>,
    pub is_gluten_free: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteProductParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddProductAliasParams {
    pub product_id: i64,
    pub alias: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveProductAliasParams {
    /// Alias ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateProductNutritionParams {
    pub product_id: i64,
    pub amount: f64,
    /// g, kg, l, ml, pcs, tbsp, tsp, cup, pack, bottle, can, slice, bunch, clove
    pub unit: String,
}

// ============================================================================
// Dish Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateDishParams {
    pub name: String,
    /// salad, soup, main, dessert, sandwich, wrap, pizza, pasta, burger, breakfast, drink
    pub category: String,
    pub description: Option<String>,
    /// Minutes
    #[serde(default)]
    pub cooking_time: u32,
    /// Minutes
    #[serde(default)]
    pub preparation_time: u32,
    #[serde(default = "default_servings")]
    pub servings: u32,
    pub instructions: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    /// 0 to 5
    #[serde(default)]
    pub rating: f64,
}

fn default_servings() -> u32 { 1 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDishParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDishesParams {
    /// Name contains
    pub query: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub public_only: bool,
    /// name, created_at, rating, cooking_time
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDishParams {
    pub id: i64,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub cooking_time: Option<u32>,
    pub preparation_time: Option<u32>,
    pub servings: Option<u32>,
    pub instructions: Option<String>,
    pub is_public: Option<bool>,
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDishParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParams {
    pub product_id: i64,
    pub amount: f64,
    /// g, kg, l, ml, pcs, tbsp, tsp, cup, pack, bottle, can, slice, bunch, clove
    pub unit: String,
    #[serde(default)]
    pub is_optional: bool,
    /// Preparation work such as "diced"; counts toward complexity
    pub preparation: Option<String>,
    pub note: Option<String>,
}

impl IngredientParams {
    fn into_create(self, dish_id: i64) -> Result<IngredientCreate, String> {
        Ok(IngredientCreate {
            dish_id,
            product_id: self.product_id,
            amount: self.amount,
            unit: parse_unit(&self.unit)?,
            is_optional: self.is_optional,
            preparation: self.preparation,
            note: self.note,
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDishIngredientParams {
    pub dish_id: i64,
    #[serde(flatten)]
    pub ingredient: IngredientParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDishIngredientsBatchParams {
    pub dish_id: i64,
    pub ingredients: Vec<IngredientParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDishIngredientParams {
    /// Ingredient ID
    pub id: i64,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub is_optional: Option<bool>,
    pub preparation: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveDishIngredientParams {
    /// Ingredient ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProductPriceParams {
    pub product_id: i64,
    pub price_per_100g: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateDishCostParams {
    pub id: i64,
    pub prices: Vec<ProductPriceParams>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl FitlyService {
    // --- Status ---

    #[tool(description = "Get the current status of the Fitly service including build info, database status, and process information")]
    async fn fitly_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        to_json(&status)
    }

    #[tool(description = "Get instructions for building dishes: units, nutrition rules, classifications. Call this when starting a catalog or recipe session.")]
    fn dish_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::DISH_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(DISH_INSTRUCTIONS)]))
    }

    // --- Products ---

    #[tool(description = "Add a product to the catalog with nutrition per 100 g")]
    fn add_product(&self, Parameters(p): Parameters<AddProductParams>) -> Result<CallToolResult, McpError> {
        let data = ProductCreate {
            name: p.name,
            description: p.description,
            brand: p.brand,
            image_url: p.image_url,
            category: parse_product_category(&p.category).map_err(invalid)?,
            product_type: products::parse_product_type(p.product_type.as_deref()).map_err(invalid)?,
            nutrition: NutritionFacts {
                calories: p.calories,
                fats: p.fats,
                protein: p.protein,
                carbs: p.carbs,
            },
            is_organic: p.is_organic,
            is_vegetarian: p.is_vegetarian,
            is_vegan: p.is_vegan,
            is_gluten_free: p.is_gluten_free,
        };
        let result = products::add_product(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get full details for a product including aliases and dish usage")]
    fn get_product(&self, Parameters(p): Parameters<GetProductParams>) -> Result<CallToolResult, McpError> {
        let result = products::get_product(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(product) => to_json(&product),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Product not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "Search products by name, brand or alias")]
    fn search_products(&self, Parameters(p): Parameters<SearchProductsParams>) -> Result<CallToolResult, McpError> {
        let result = products::search_products(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List products with optional category filter, sorting, and pagination")]
    fn list_products(&self, Parameters(p): Parameters<ListProductsParams>) -> Result<CallToolResult, McpError> {
        let result = products::list_products(&self.database, p.category.as_deref(), &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update a product. Dishes using it reflect the change on their next read.")]
    fn update_product(&self, Parameters(p): Parameters<UpdateProductParams>) -> Result<CallToolResult, McpError> {
        let data = ProductUpdate {
            name: p.name,
            description: p.description,
            brand: p.brand,
            image_url: p.image_url,
            category: p.category.as_deref().map(parse_product_category).transpose().map_err(invalid)?,
            product_type: match p.product_type.as_deref() {
                Some(code) => Some(products::parse_product_type(Some(code)).map_err(invalid)?),
                None => None,
            },
            calories: p.calories,
            fats: p.fats,
            protein: p.protein,
            carbs: p.carbs,
            is_organic: p.is_organic,
            is_vegetarian: p.is_vegetarian,
            is_vegan: p.is_vegan,
            is_gluten_free: p.is_gluten_free,
        };
        let result = products::update_product(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a product (only allowed if no dish uses it)")]
    fn delete_product(&self, Parameters(p): Parameters<DeleteProductParams>) -> Result<CallToolResult, McpError> {
        let result = products::delete_product(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(success) => to_json(&success),
            Err(blocked) => to_json(&blocked),
        }
    }

    #[tool(description = "Add an alternative name used when searching for a product")]
    fn add_product_alias(&self, Parameters(p): Parameters<AddProductAliasParams>) -> Result<CallToolResult, McpError> {
        let result = products::add_product_alias(&self.database, p.product_id, &p.alias).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove a product alias by alias ID")]
    fn remove_product_alias(&self, Parameters(p): Parameters<RemoveProductAliasParams>) -> Result<CallToolResult, McpError> {
        let result = products::remove_product_alias(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Calculate nutrition for an amount of a product in any supported unit")]
    fn calculate_product_nutrition(&self, Parameters(p): Parameters<CalculateProductNutritionParams>) -> Result<CallToolResult, McpError> {
        let result = products::calculate_product_nutrition(&self.database, p.product_id, p.amount, &p.unit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Dishes ---

    #[tool(description = "Create a dish. Add ingredients afterwards with add_dish_ingredient or add_dish_ingredients_batch.")]
    fn create_dish(&self, Parameters(p): Parameters<CreateDishParams>) -> Result<CallToolResult, McpError> {
        let data = DishCreate {
            name: p.name,
            category: parse_dish_category(&p.category).map_err(invalid)?,
            description: p.description,
            cooking_time: p.cooking_time,
            preparation_time: p.preparation_time,
            servings: p.servings,
            instructions: p.instructions,
            is_public: p.is_public,
            rating: p.rating,
        };
        let result = dishes::create_dish(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a dish with ingredients, nutrition totals, per serving, per 100 g, and classifications")]
    fn get_dish(&self, Parameters(p): Parameters<GetDishParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::get_dish(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(dish) => to_json(&dish),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Dish not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "List dishes with optional name search, category filter, sorting, and pagination")]
    fn list_dishes(&self, Parameters(p): Parameters<ListDishesParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::list_dishes(
            &self.database,
            p.query.as_deref(),
            p.category.as_deref(),
            p.public_only,
            &p.sort_by,
            &p.sort_order,
            p.limit,
            p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update dish metadata (name, category, times, servings, rating, visibility)")]
    fn update_dish(&self, Parameters(p): Parameters<UpdateDishParams>) -> Result<CallToolResult, McpError> {
        let data = DishUpdate {
            name: p.name,
            category: p.category.as_deref().map(parse_dish_category).transpose().map_err(invalid)?,
            description: p.description,
            cooking_time: p.cooking_time,
            preparation_time: p.preparation_time,
            servings: p.servings,
            instructions: p.instructions,
            is_public: p.is_public,
            rating: p.rating,
        };
        let result = dishes::update_dish(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a dish and all of its ingredients")]
    fn delete_dish(&self, Parameters(p): Parameters<DeleteDishParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::delete_dish(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add one ingredient to the end of a dish. Warns when the ingredient will be left out of nutrition totals.")]
    fn add_dish_ingredient(&self, Parameters(p): Parameters<AddDishIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = p.ingredient.into_create(p.dish_id).map_err(invalid)?;
        let result = dishes::add_dish_ingredient(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add several ingredients to a dish in one call. Either all are added or none.")]
    fn add_dish_ingredients_batch(&self, Parameters(p): Parameters<AddDishIngredientsBatchParams>) -> Result<CallToolResult, McpError> {
        let items = p
            .ingredients
            .into_iter()
            .map(|i| i.into_create(p.dish_id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;
        let result = dishes::add_dish_ingredients_batch(&self.database, p.dish_id, items)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update an ingredient's amount, unit, optional flag, preparation or note")]
    fn update_dish_ingredient(&self, Parameters(p): Parameters<UpdateDishIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientUpdate {
            amount: p.amount,
            unit: p.unit.as_deref().map(parse_unit).transpose().map_err(invalid)?,
            is_optional: p.is_optional,
            preparation: p.preparation,
            note: p.note,
        };
        let result = dishes::update_dish_ingredient(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove an ingredient from its dish")]
    fn remove_dish_ingredient(&self, Parameters(p): Parameters<RemoveDishIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::remove_dish_ingredient(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Calculate dish nutrition: totals, per serving, per 100 g, and how many ingredients were skipped")]
    fn get_dish_nutrition(&self, Parameters(p): Parameters<GetDishParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::get_dish_nutrition(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Classify a dish: vegetarian, vegan, gluten-free, quick meal, and complexity")]
    fn classify_dish(&self, Parameters(p): Parameters<GetDishParams>) -> Result<CallToolResult, McpError> {
        let result = dishes::classify_dish(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Estimate a dish's cost from prices per 100 g for its products")]
    fn estimate_dish_cost(&self, Parameters(p): Parameters<EstimateDishCostParams>) -> Result<CallToolResult, McpError> {
        let prices: HashMap<i64, f64> = p
            .prices
            .into_iter()
            .map(|price| (price.product_id, price.price_per_100g))
            .collect();
        let result = dishes::estimate_dish_cost(&self.database, p.id, &prices).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FitlyService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fitly".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Fitly".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Fitly - Product catalog and dish nutrition. \
                 IMPORTANT: Call dish_instructions before building dishes. \
                 Products: add/get/search/list/update/delete_product, add/remove_product_alias, calculate_product_nutrition. \
                 Dishes: create/get/list/update/delete_dish. \
                 Ingredients: add_dish_ingredient, add_dish_ingredients_batch, update/remove_dish_ingredient. \
                 Analysis: get_dish_nutrition, classify_dish, estimate_dish_cost."
                    .into(),
            ),
        }
    }
}
