//! SQL front end.
//!
//! Accepts `SELECT [DISTINCT] ... FROM ... [WHERE ...] [GROUP BY ...]
//! [ORDER BY ...]` where conditions are conjunctions of integer comparisons
//! and every column is qualified with its table.

mod lexer;
mod parser;

pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::ast::SelectStmt;
use quarry_core::Result;

/// Parses one SELECT statement.
///
/// ```
/// use quarry_query::sql::parse_select;
///
/// let stmt = parse_select("SELECT R.a FROM R WHERE R.b > 10").unwrap();
/// assert_eq!(stmt.tables, vec!["R"]);
/// ```
pub fn parse_select(input: &str) -> Result<SelectStmt> {
    Parser::new(input)?.parse()
}
