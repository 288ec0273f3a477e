//! Fitly Tools module
//!
//! Tool implementations behind the MCP surface. Each call takes one pooled
//! connection and reports failures as plain messages.

pub mod dishes;
pub mod products;
pub mod status;

use crate::models::{DishCategory, ProductCategory};
use crate::nutrition::Unit;

pub(crate) fn parse_unit(s: &str) -> Result<Unit, String> {
    Unit::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = Unit::ALL.iter().map(|u| u.as_str()).collect();
        format!("Unknown unit '{}'. Expected one of: {}", s, known.join(", "))
    })
}

pub(crate) fn parse_product_category(s: &str) -> Result<ProductCategory, String> {
    ProductCategory::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = ProductCategory::ALL.iter().map(|c| c.as_str()).collect();
        format!("Unknown product category '{}'. Expected one of: {}", s, known.join(", "))
    })
}

pub(crate) fn parse_dish_category(s: &str) -> Result<DishCategory, String> {
    DishCategory::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = DishCategory::ALL.iter().map(|c| c.as_str()).collect();
        format!("Unknown dish category '{}'. Expected one of: {}", s, known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_unit("tbsp"), Ok(Unit::Tablespoon));
        assert_eq!(parse_product_category("Dairy"), Ok(ProductCategory::Dairy));
        assert_eq!(parse_dish_category("soup"), Ok(DishCategory::Soup));

        let err = parse_unit("handful").unwrap_err();
        assert!(err.contains("handful"));
        assert!(err.contains("tbsp"));
        assert!(parse_dish_category("snack").is_err());
    }
}
