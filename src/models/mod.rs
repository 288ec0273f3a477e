//! Data models
//!
//! Catalog entities and the derived nutrition values.

mod dish;
mod ingredient;
mod nutrition;
mod product;
mod product_alias;

pub use dish::{Dish, DishCategory, DishCreate, DishFilter, DishUpdate};
pub use ingredient::{Ingredient, IngredientCreate, IngredientUpdate};
pub use nutrition::{DishNutrition, NutritionFacts, NutritionInfo};
pub use product::{Product, ProductCategory, ProductCreate, ProductType, ProductUpdate};
pub use product_alias::ProductAlias;
