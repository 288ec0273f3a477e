//! Product alias model
//!
//! Alternative names a product can be found by.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAlias {
    pub id: i64,
    pub product_id: i64,
    pub alias: String,
}

impl ProductAlias {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            product_id: row.get("product_id")?,
            alias: row.get("alias")?,
        })
    }

    pub fn create(conn: &Connection, product_id: i64, alias: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO product_aliases (product_id, alias) VALUES (?1, ?2)",
            params![product_id, alias],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let result = conn.query_row(
            "SELECT * FROM product_aliases WHERE id = ?1",
            [id],
            Self::from_row,
        );
        match result {
            Ok(alias) => Ok(Some(alias)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_for_product(conn: &Connection, product_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM product_aliases WHERE product_id = ?1 ORDER BY alias",
        )?;

        let aliases = stmt
            .query_map([product_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(aliases)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM product_aliases WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
