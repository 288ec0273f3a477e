//! Fitly Library
//!
//! Product catalog, dish recipes and the nutrition engine behind them.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
