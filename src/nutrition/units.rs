//! Unit types and conversion tables
//!
//! Every table is an exhaustive `match` over a closed enum, so adding a unit
//! or a product category fails to compile until each table has an answer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::ProductCategory;

/// Measurement unit an ingredient amount is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "pack")]
    Package,
    #[serde(rename = "bottle")]
    Bottle,
    #[serde(rename = "can")]
    Can,
    #[serde(rename = "slice")]
    Slice,
    #[serde(rename = "bunch")]
    Bunch,
    #[serde(rename = "clove")]
    Clove,
}

impl Unit {
    pub const ALL: [Unit; 14] = [
        Unit::Gram,
        Unit::Kilogram,
        Unit::Liter,
        Unit::Milliliter,
        Unit::Piece,
        Unit::Tablespoon,
        Unit::Teaspoon,
        Unit::Cup,
        Unit::Package,
        Unit::Bottle,
        Unit::Can,
        Unit::Slice,
        Unit::Bunch,
        Unit::Clove,
    ];

    /// Short code used on the wire and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Liter => "l",
            Unit::Milliliter => "ml",
            Unit::Piece => "pcs",
            Unit::Tablespoon => "tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Cup => "cup",
            Unit::Package => "pack",
            Unit::Bottle => "bottle",
            Unit::Can => "can",
            Unit::Slice => "slice",
            Unit::Bunch => "bunch",
            Unit::Clove => "clove",
        }
    }

    /// Parse a short code or a spelled-out unit name
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.trim() {
            "g" | "gram" | "grams" => Some(Unit::Gram),
            "kg" | "kilogram" | "kilograms" => Some(Unit::Kilogram),
            "l" | "liter" | "liters" | "litre" | "litres" => Some(Unit::Liter),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(Unit::Milliliter)
            }
            "pcs" | "piece" | "pieces" => Some(Unit::Piece),
            "tbsp" | "tablespoon" | "tablespoons" => Some(Unit::Tablespoon),
            "tsp" | "teaspoon" | "teaspoons" => Some(Unit::Teaspoon),
            "cup" | "cups" => Some(Unit::Cup),
            "pack" | "package" | "packages" => Some(Unit::Package),
            "bottle" | "bottles" => Some(Unit::Bottle),
            "can" | "cans" => Some(Unit::Can),
            "slice" | "slices" => Some(Unit::Slice),
            "bunch" | "bunches" => Some(Unit::Bunch),
            "clove" | "cloves" => Some(Unit::Clove),
            _ => None,
        }
    }

    pub fn weight(&self) -> UnitWeight {
        base_grams(*self)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a unit maps onto grams
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitWeight {
    /// Same gram value for every product
    Fixed(f64),
    /// Average weight looked up by product category
    CategoryDependent,
    /// No gram equivalent
    Unsupported,
}

// ============================================================================
// Fixed multipliers (grams per unit)
// ============================================================================

pub const G_PER_GRAM: f64 = 1.0;
pub const G_PER_KG: f64 = 1000.0;
/// Assumes the density of water
pub const G_PER_LITER: f64 = 1000.0;
/// Assumes the density of water
pub const G_PER_ML: f64 = 1.0;
pub const G_PER_TBSP: f64 = 15.0;
pub const G_PER_TSP: f64 = 5.0;
pub const G_PER_CUP: f64 = 240.0;
/// Average garlic clove
pub const G_PER_CLOVE: f64 = 3.0;

/// Base multiplier table
pub const fn base_grams(unit: Unit) -> UnitWeight {
    match unit {
        Unit::Gram => UnitWeight::Fixed(G_PER_GRAM),
        Unit::Kilogram => UnitWeight::Fixed(G_PER_KG),
        Unit::Liter => UnitWeight::Fixed(G_PER_LITER),
        Unit::Milliliter => UnitWeight::Fixed(G_PER_ML),
        Unit::Tablespoon => UnitWeight::Fixed(G_PER_TBSP),
        Unit::Teaspoon => UnitWeight::Fixed(G_PER_TSP),
        Unit::Cup => UnitWeight::Fixed(G_PER_CUP),
        Unit::Clove => UnitWeight::Fixed(G_PER_CLOVE),
        Unit::Piece | Unit::Slice | Unit::Bunch => UnitWeight::CategoryDependent,
        Unit::Package | Unit::Bottle | Unit::Can => UnitWeight::Unsupported,
    }
}

// ============================================================================
// Category-dependent average weights
// ============================================================================

/// Average weight of one piece (an egg, an apple, a tomato)
pub const fn piece_grams(category: ProductCategory) -> Option<f64> {
    match category {
        ProductCategory::Egg => Some(60.0),
        ProductCategory::Fruit => Some(150.0),
        ProductCategory::Vegetable => Some(100.0),
        ProductCategory::Meat
        | ProductCategory::Fish
        | ProductCategory::Dairy
        | ProductCategory::Sauce
        | ProductCategory::Grain
        | ProductCategory::Oil
        | ProductCategory::Beverage
        | ProductCategory::Snack
        | ProductCategory::Spice
        | ProductCategory::Sweet
        | ProductCategory::Frozen
        | ProductCategory::Canned => None,
    }
}

/// Average weight of one slice (bread, cheese)
pub const fn slice_grams(category: ProductCategory) -> Option<f64> {
    match category {
        ProductCategory::Grain => Some(25.0),
        ProductCategory::Dairy => Some(20.0),
        ProductCategory::Fruit
        | ProductCategory::Vegetable
        | ProductCategory::Meat
        | ProductCategory::Fish
        | ProductCategory::Sauce
        | ProductCategory::Oil
        | ProductCategory::Beverage
        | ProductCategory::Snack
        | ProductCategory::Spice
        | ProductCategory::Egg
        | ProductCategory::Sweet
        | ProductCategory::Frozen
        | ProductCategory::Canned => None,
    }
}

/// Average weight of one bunch of greens
pub const fn bunch_grams(category: ProductCategory) -> Option<f64> {
    match category {
        ProductCategory::Vegetable => Some(50.0),
        ProductCategory::Fruit
        | ProductCategory::Meat
        | ProductCategory::Fish
        | ProductCategory::Dairy
        | ProductCategory::Sauce
        | ProductCategory::Grain
        | ProductCategory::Oil
        | ProductCategory::Beverage
        | ProductCategory::Snack
        | ProductCategory::Spice
        | ProductCategory::Egg
        | ProductCategory::Sweet
        | ProductCategory::Frozen
        | ProductCategory::Canned => None,
    }
}
