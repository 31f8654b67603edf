//! Quarry Query - Query engine for CSV-backed tables.
//!
//! This crate provides the query execution engine including:
//!
//! - `ast`: Predicate expressions and the parsed SELECT statement
//! - `catalog`: Table name to schema and storage locator mapping
//! - `resolver`: Qualified column to flat tuple offset resolution
//! - `eval`: Predicate and SUM-expression evaluation with pushdown semantics
//! - `executor`: Pull-based operators (scan, select, project, join, sort, distinct, aggregate)
//! - `planner`: Operator tree construction from a SELECT statement
//! - `sql`: Lexer and parser for the supported SQL dialect

pub mod ast;
pub mod catalog;
pub mod eval;
pub mod executor;
pub mod planner;
pub mod resolver;
pub mod sql;

pub use catalog::{Catalog, CatalogBuilder};
pub use executor::Operator;
pub use planner::{plan_select, QueryPlanner};
