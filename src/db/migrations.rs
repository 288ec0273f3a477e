//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
    }

    Ok(())
}

/// Migration v1: products and aliases
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PRODUCTS
        -- Per-100g nutrition facts; NULL means unknown
        -- ============================================
        CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            brand TEXT,
            image_url TEXT,
            category TEXT NOT NULL CHECK(category IN (
                'fruit', 'vegetable', 'meat', 'fish', 'dairy', 'sauce', 'grain', 'oil',
                'beverage', 'snack', 'spice', 'egg', 'sweet', 'frozen', 'canned'
            )),
            product_type TEXT NOT NULL DEFAULT 'raw'
                CHECK(product_type IN ('raw', 'ready', 'semi', 'composite')),

            calories REAL,
            fats REAL,
            protein REAL,
            carbs REAL,

            is_organic INTEGER NOT NULL DEFAULT 0,
            is_vegetarian INTEGER NOT NULL DEFAULT 0,
            is_vegan INTEGER NOT NULL DEFAULT 0,
            is_gluten_free INTEGER NOT NULL DEFAULT 0,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_products_name ON products(name);
        CREATE INDEX idx_products_category ON products(category);
        CREATE INDEX idx_products_brand ON products(brand);

        -- ============================================
        -- PRODUCT ALIASES
        -- Alternative names used by search
        -- ============================================
        CREATE TABLE product_aliases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            alias TEXT NOT NULL,
            UNIQUE(product_id, alias)
        );

        CREATE INDEX idx_product_aliases_alias ON product_aliases(alias);
        "#,
    )?;

    Ok(())
}

/// Migration v2: dishes and their ingredients
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- DISHES
        -- ============================================
        CREATE TABLE dishes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL CHECK(category IN (
                'salad', 'soup', 'main', 'dessert', 'sandwich', 'wrap', 'pizza',
                'pasta', 'burger', 'breakfast', 'drink'
            )),
            description TEXT,
            cooking_time INTEGER NOT NULL DEFAULT 0 CHECK(cooking_time >= 0),     -- minutes
            preparation_time INTEGER NOT NULL DEFAULT 0 CHECK(preparation_time >= 0), -- minutes
            servings INTEGER NOT NULL DEFAULT 1 CHECK(servings >= 1),
            instructions TEXT,
            is_public INTEGER NOT NULL DEFAULT 0,
            rating REAL NOT NULL DEFAULT 0 CHECK(rating >= 0 AND rating <= 5),

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_dishes_name ON dishes(name);
        CREATE INDEX idx_dishes_category ON dishes(category);

        -- ============================================
        -- DISH INGREDIENTS
        -- Ordered by position within a dish
        -- ============================================
        CREATE TABLE dish_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dish_id INTEGER NOT NULL REFERENCES dishes(id) ON DELETE CASCADE,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE RESTRICT,
            position INTEGER NOT NULL,
            amount REAL NOT NULL CHECK(amount > 0),
            unit TEXT NOT NULL,
            is_optional INTEGER NOT NULL DEFAULT 0,
            preparation TEXT,
            note TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_dish_ingredients_dish ON dish_ingredients(dish_id, position);
        CREATE INDEX idx_dish_ingredients_product ON dish_ingredients(product_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let tracked: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations')",
        [],
        |row| row.get(0),
    )?;
    if !tracked {
        return Ok(true);
    }
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
