//! Fitly Status Tool
//!
//! Runtime status of the service and the usage guide exposed to clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Catalog and dish usage guide for AI assistants
pub const DISH_INSTRUCTIONS: &str = r#"
# Fitly Dish Instructions

This guide explains how to build dishes from catalog products and read
their nutrition.

## Overview

1. **Products** - Catalog items with nutrition facts per 100 g
2. **Dishes** - Recipes made of product ingredients, each with an amount and a unit
3. **Nutrition** - Computed on demand from the ingredients; never stored

---

## Products

Store nutrition **per 100 grams**, whatever the package says.

**Formula:** `(value_per_serving / serving_grams) * 100`

Example: 190 kcal per 32 g serving -> `calories: 594`

Leave a nutrient out when it is unknown. An unknown value is not zero:
a product with any unknown macro-nutrient contributes nothing to dish totals.

### Categories

fruit, vegetable, meat, fish, dairy, sauce, grain, oil, beverage, snack,
spice, egg, sweet, frozen, canned

The category matters for counted units (see below) and for dietary flags.

### Aliases

Use `add_product_alias` for alternative names ("courgette" for "Zucchini").
`search_products` matches names, brands and aliases.

---

## Units

| Unit | Grams |
|------|-------|
| g | 1 |
| kg | 1000 |
| ml | 1 (water density) |
| l | 1000 (water density) |
| tbsp | 15 |
| tsp | 5 |
| cup | 240 |
| clove | 3 |
| pcs | egg 60, fruit 150, vegetable 100 |
| slice | grain 25, dairy 20 |
| bunch | vegetable 50 |

`pack`, `bottle` and `can` have no gram equivalent. Ingredients in those
units, or in a counted unit the category has no weight for (a "piece" of
cheese), are **skipped** from nutrition totals. The response reports how
many ingredients were skipped; prefer grams when in doubt.

---

## Building a Dish

1. `create_dish` with name, category, times in minutes and servings (at least 1)
2. `add_dish_ingredients_batch` (or `add_dish_ingredient`) for each product
   - `is_optional: true` for garnishes and toppings
   - `preparation` for work like "diced" or "marinated"; it raises complexity
3. `get_dish` to review totals, per serving, per 100 g and classifications

---

## Classifications

- **Vegetarian**: no meat or fish ingredients
- **Vegan**: no meat, fish, dairy or egg ingredients
- **Gluten-free**: every grain product is flagged `is_gluten_free`
- **Quick meal**: cooking plus preparation time at most 30 minutes
- **Complexity**: points for total time (over 30/60/120 min), essential
  ingredient count (over 5/10/15) and one per prepared essential ingredient.
  0-2 Simple, 3-5 Medium, 6-8 Complex, 9+ Very Complex

---

## Cost

`estimate_dish_cost` takes prices per 100 g keyed by product id. Products
without a price, or with an unresolvable unit, add nothing.
"#;

/// Service status response
#[derive(Debug, Serialize)]
pub struct FitlyStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: String,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: chrono::Utc::now().to_rfc3339(),
            database_path,
        }
    }

    pub fn get_status(&self) -> FitlyStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FitlyStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            started_at: self.started_at.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
