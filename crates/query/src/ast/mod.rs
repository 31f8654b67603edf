//! AST module for predicate expressions and SELECT statements.

mod expr;
mod select;

pub use expr::{ColumnRef, CompareOp, Expr, WILDCARD};
pub use select::{SelectItem, SelectStmt};
