//! Select (filter) executor.

use crate::ast::Expr;
use crate::catalog::Catalog;
use crate::eval::Evaluator;
use crate::executor::Operator;
use quarry_core::{Result, Tuple};
use std::sync::Arc;

/// Select executor - passes through the child tuples that satisfy a predicate.
///
/// The predicate is evaluated over `join_order`, normally the single table
/// scanned below, so conditions on tables not joined yet are vacuously true.
pub struct SelectExecutor {
    child: Box<Operator>,
    predicate: Expr,
    join_order: Vec<String>,
    catalog: Arc<Catalog>,
}

impl SelectExecutor {
    /// Creates a new select executor.
    pub fn new(child: Operator, predicate: Expr, join_order: Vec<String>, catalog: Arc<Catalog>) -> Self {
        Self {
            child: Box::new(child),
            predicate,
            join_order,
            catalog,
        }
    }

    /// Returns the predicate.
    pub fn predicate(&self) -> &Expr {
        &self.predicate
    }

    /// Returns the child operator.
    pub fn child(&self) -> &Operator {
        &self.child
    }

    /// Pulls until a tuple satisfies the predicate or the child is exhausted.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            let evaluator = Evaluator::new(&self.catalog, &self.join_order, &tuple);
            if evaluator.evaluate(&self.predicate)? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    /// Resets the child.
    pub fn reset(&mut self) -> Result<()> {
        self.child.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::test_support::*;
    use crate::executor::TableScanExecutor;

    fn scan(catalog: &Catalog, table: &str) -> Operator {
        Operator::Scan(TableScanExecutor::new(catalog, table).unwrap())
    }

    #[test]
    fn test_select_filters() {
        let (_dir, catalog) = sample();
        let pred = Expr::gt(Expr::column("R", "b"), Expr::literal(10));
        let mut select = Operator::Select(SelectExecutor::new(
            scan(&catalog, "R"),
            pred,
            order(&["R"]),
            catalog.clone(),
        ));
        assert_eq!(rows(&select.drain().unwrap()), vec!["1,20"]);
    }

    #[test]
    fn test_select_pushdown_ignores_other_tables() {
        let (_dir, catalog) = sample();
        // The full WHERE clause of a join query, evaluated over R alone.
        let pred = Expr::and(
            Expr::eq(Expr::column("R", "a"), Expr::column("S", "a")),
            Expr::lt(Expr::column("R", "b"), Expr::literal(15)),
        );
        let mut select = Operator::Select(SelectExecutor::new(
            scan(&catalog, "R"),
            pred,
            order(&["R"]),
            catalog.clone(),
        ));
        assert_eq!(rows(&select.drain().unwrap()), vec!["1,10", "2,5"]);
    }

    #[test]
    fn test_select_reset() {
        let (_dir, catalog) = sample();
        let pred = Expr::eq(Expr::column("S", "a"), Expr::literal(2));
        let mut select = Operator::Select(SelectExecutor::new(
            scan(&catalog, "S"),
            pred,
            order(&["S"]),
            catalog.clone(),
        ));
        let first = select.drain().unwrap();
        select.reset().unwrap();
        let second = select.drain().unwrap();
        assert_eq!(first, second);
        assert_eq!(rows(&first), vec!["2,200"]);
    }
}
