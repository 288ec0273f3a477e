//! SQLite mappings for the catalog enums
//!
//! Enums are stored as their text codes.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::models::{DishCategory, ProductCategory, ProductType};
use crate::nutrition::Unit;

macro_rules! text_code_column {
    ($ty:ty, $what:literal) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let code = value.as_str()?;
                <$ty>::from_str(code).ok_or_else(|| {
                    tracing::warn!("Stored {} '{}' is not recognised", $what, code);
                    FromSqlError::Other(format!("unknown {} '{}'", $what, code).into())
                })
            }
        }
    };
}

text_code_column!(Unit, "unit");
text_code_column!(ProductCategory, "product category");
text_code_column!(ProductType, "product type");
text_code_column!(DishCategory, "dish category");
