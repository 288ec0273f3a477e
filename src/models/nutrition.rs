//! Nutrition data structures
//!
//! `NutritionFacts` is what a product stores (per 100 g, each value may be
//! unknown). `NutritionInfo` and `DishNutrition` are derived on demand and
//! never persisted.

use serde::{Deserialize, Serialize};

/// Per-100g macro-nutrients as recorded for a product
///
/// `None` means unknown, which is not the same as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: Option<f64>,
    pub fats: Option<f64>,     // grams
    pub protein: Option<f64>,  // grams
    pub carbs: Option<f64>,    // grams
}

impl NutritionFacts {
    pub fn new(calories: f64, fats: f64, protein: f64, carbs: f64) -> Self {
        Self {
            calories: Some(calories),
            fats: Some(fats),
            protein: Some(protein),
            carbs: Some(carbs),
        }
    }

    /// All four values are known
    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }

    /// The known values as a 100 g `NutritionInfo`, if all four are present
    pub fn complete(&self) -> Option<NutritionInfo> {
        Some(NutritionInfo {
            calories: self.calories?,
            fats: self.fats?,
            protein: self.protein?,
            carbs: self.carbs?,
            weight: 100.0,
        })
    }
}

/// Macro-nutrients for a concrete amount of food
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub calories: f64,
    pub fats: f64,
    pub protein: f64,
    pub carbs: f64,
    /// Grams
    pub weight: f64,
}

impl NutritionInfo {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale every value, weight included
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            fats: self.fats * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            weight: self.weight * multiplier,
        }
    }

    pub fn add(&self, other: &NutritionInfo) -> Self {
        Self {
            calories: self.calories + other.calories,
            fats: self.fats + other.fats,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            weight: self.weight + other.weight,
        }
    }
}

impl std::ops::Add for NutritionInfo {
    type Output = NutritionInfo;

    fn add(self, other: NutritionInfo) -> NutritionInfo {
        NutritionInfo::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for NutritionInfo {
    type Output = NutritionInfo;

    fn mul(self, multiplier: f64) -> NutritionInfo {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for NutritionInfo {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionInfo::zero(), |acc, n| acc + n)
    }
}

/// Aggregate nutrition of a whole dish
///
/// Totals are best-effort: ingredients whose nutrition could not be
/// resolved are left out and only counted in `skipped_ingredients`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DishNutrition {
    pub total: NutritionInfo,
    pub per_serving: NutritionInfo,
    pub skipped_ingredients: usize,
}
