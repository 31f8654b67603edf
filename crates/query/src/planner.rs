//! Query planner.
//!
//! Turns a [`SelectStmt`] into a left-deep operator tree:
//!
//! 1. **Scan** every FROM table, in declared order
//! 2. **Select** over a table's scan when some WHERE conjunct is about that
//!    table alone (pushdown)
//! 3. **Join** the per-table subtrees left to right, each join carrying the
//!    join order accumulated so far
//! 4. **Sort** for ORDER BY
//! 5. **Aggregate** for GROUP BY / SUM, otherwise **Project**
//! 6. **Distinct** for DISTINCT
//!
//! Every column the statement references is resolved against the full join
//! order before any operator is opened, so unknown tables and columns fail
//! planning rather than execution.

use crate::ast::{ColumnRef, Expr, SelectItem, SelectStmt};
use crate::catalog::Catalog;
use crate::executor::{
    AggregateExecutor, DistinctExecutor, NestedLoopJoin, Operator, ProjectExecutor,
    SelectExecutor, SortExecutor, TableScanExecutor,
};
use crate::resolver;
use log::debug;
use quarry_core::{Error, Result};
use std::sync::Arc;

/// Builds operator trees over a shared catalog.
pub struct QueryPlanner {
    catalog: Arc<Catalog>,
}

impl QueryPlanner {
    /// Creates a planner over `catalog`.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Plans a SELECT statement.
    ///
    /// Blocking operators drain their input here, so a successful return
    /// means the statement's tables were readable.
    pub fn plan(&self, stmt: &SelectStmt) -> Result<Operator> {
        self.validate(stmt)?;
        let join_order = &stmt.tables;

        let mut root: Option<Operator> = None;
        for (i, table) in join_order.iter().enumerate() {
            let leaf = self.plan_table(stmt, table, i == 0)?;
            root = Some(match root {
                None => leaf,
                Some(left) => {
                    let prefix = join_order[..=i].to_vec();
                    debug!("joining {} over {:?}", table, prefix);
                    Operator::Join(NestedLoopJoin::new(
                        left,
                        leaf,
                        stmt.where_clause.clone(),
                        prefix,
                        self.catalog.clone(),
                    )?)
                }
            });
        }
        let mut root = root.ok_or_else(|| Error::unsupported("query has no FROM table"))?;

        if let Some(order_by) = &stmt.order_by {
            debug!("sorting on {:?}", order_by);
            root = Operator::Sort(SortExecutor::new(root, &self.catalog, order_by, join_order)?);
        }

        root = if stmt.is_aggregate() {
            let group_by = stmt.group_by.as_deref().unwrap_or(&[]);
            debug!(
                "aggregating {} sums grouped by {:?}",
                stmt.sum_expressions().len(),
                group_by
            );
            Operator::Aggregate(AggregateExecutor::new(
                root,
                &self.catalog,
                &stmt.items,
                group_by,
                join_order,
            )?)
        } else {
            Operator::Project(ProjectExecutor::new(root, &self.catalog, &stmt.items, join_order)?)
        };

        if stmt.distinct {
            root = Operator::Distinct(DistinctExecutor::new(root));
        }

        debug!("plan for `{}`:\n{}", stmt, root.explain());
        Ok(root)
    }

    /// Scans one table, under a Select when the WHERE clause filters it.
    fn plan_table(&self, stmt: &SelectStmt, table: &str, first: bool) -> Result<Operator> {
        let scan = Operator::Scan(TableScanExecutor::new(&self.catalog, table)?);
        let Some(predicate) = &stmt.where_clause else {
            return Ok(scan);
        };
        if !filters_table(predicate, table, first) {
            return Ok(scan);
        }

        debug!("pushing WHERE down to {}", table);
        Ok(Operator::Select(SelectExecutor::new(
            scan,
            predicate.clone(),
            vec![table.to_string()],
            self.catalog.clone(),
        )))
    }

    fn validate(&self, stmt: &SelectStmt) -> Result<()> {
        let join_order = &stmt.tables;
        for (i, table) in join_order.iter().enumerate() {
            self.catalog.schema(table)?;
            if join_order[..i].contains(table) {
                return Err(Error::unsupported(format!(
                    "table {} appears more than once in FROM",
                    table
                )));
            }
        }

        // WHERE columns may name catalog tables outside the FROM list; those
        // comparisons stay vacuously true.
        if let Some(predicate) = &stmt.where_clause {
            for col in predicate.columns() {
                if col.is_wildcard() {
                    return Err(Error::unsupported(format!("{} in WHERE", col)));
                }
                resolver::resolve(&self.catalog, col, join_order)?;
            }
        }

        for item in &stmt.items {
            match item {
                SelectItem::Wildcard => {}
                SelectItem::Column(col) => self.require(col, join_order)?,
                SelectItem::Sum(expr) => {
                    for col in expr.columns() {
                        self.require_single(col, join_order)?;
                    }
                }
            }
        }
        for col in stmt.group_by.iter().chain(stmt.order_by.iter()).flatten() {
            self.require_single(col, join_order)?;
        }
        Ok(())
    }

    /// Requires `col` (possibly `table.*`) to be reachable in `join_order`.
    fn require(&self, col: &ColumnRef, join_order: &[String]) -> Result<()> {
        match resolver::resolve(&self.catalog, col, join_order)? {
            resolver::Resolution::Offsets(_) => Ok(()),
            resolver::Resolution::NotYetJoined => Err(Error::unknown_table(&col.table)),
        }
    }

    fn require_single(&self, col: &ColumnRef, join_order: &[String]) -> Result<()> {
        resolver::resolve_required(&self.catalog, col, join_order).map(|_| ())
    }
}

/// Returns true if `predicate` has a conjunct whose only table is `table`.
/// Column-free conjuncts count for the first table.
fn filters_table(predicate: &Expr, table: &str, first: bool) -> bool {
    predicate.conjuncts().iter().any(|conjunct| match conjunct.tables().as_slice() {
        [] => first,
        [only] => *only == table,
        _ => false,
    })
}

/// Plans `stmt` over `catalog`.
pub fn plan_select(catalog: Arc<Catalog>, stmt: &SelectStmt) -> Result<Operator> {
    QueryPlanner::new(catalog).plan(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::test_support::*;

    fn tables(names: &[&str]) -> Vec<String> {
        order(names)
    }

    #[test]
    fn test_plan_scan_only() {
        let (_dir, catalog) = sample();
        let mut root = plan_select(catalog, &SelectStmt::new(tables(&["R"]))).unwrap();
        assert_eq!(root.explain(), "Project(*)\n  TableScan(R)\n");
        assert_eq!(rows(&root.drain().unwrap()), vec!["1,10", "1,20", "2,5"]);
    }

    #[test]
    fn test_plan_filter_and_sort() {
        let (_dir, catalog) = sample();
        let stmt = SelectStmt::new(tables(&["R"]))
            .with_where(Expr::gt(Expr::column("R", "b"), Expr::literal(10)))
            .with_order_by(vec![ColumnRef::new("R", "a")]);
        let mut root = plan_select(catalog, &stmt).unwrap();
        assert_eq!(
            root.explain(),
            "Project(*)\n  Sort([0])\n    Select(R.b > 10)\n      TableScan(R)\n"
        );
        assert_eq!(rows(&root.drain().unwrap()), vec!["1,20"]);
    }

    #[test]
    fn test_plan_pushdown_placement() {
        let (_dir, catalog) = sample();
        let pred = Expr::and(
            Expr::eq(Expr::column("R", "a"), Expr::column("S", "a")),
            Expr::gt(Expr::column("S", "c"), Expr::literal(150)),
        );
        let stmt = SelectStmt::new(tables(&["R", "S"])).with_where(pred.clone());
        let mut root = plan_select(catalog, &stmt).unwrap();
        assert_eq!(
            root.explain(),
            format!(
                "Project(*)\n  NestedLoopJoin({})\n    TableScan(R)\n    Select({})\n      TableScan(S)\n",
                pred, pred
            )
        );
        assert_eq!(rows(&root.drain().unwrap()), vec!["2,5,2,200"]);
    }

    #[test]
    fn test_plan_constant_conjunct_goes_to_first_table() {
        let (_dir, catalog) = sample();
        let stmt = SelectStmt::new(tables(&["R", "S"]))
            .with_where(Expr::lt(Expr::literal(2), Expr::literal(1)));
        let mut root = plan_select(catalog, &stmt).unwrap();
        assert!(root.explain().contains("Select(2 < 1)\n      TableScan(R)"));
        assert!(root.drain().unwrap().is_empty());
    }

    #[test]
    fn test_plan_group_by_sum() {
        let (_dir, catalog) = sample();
        let stmt = SelectStmt::new(tables(&["R", "S"]))
            .with_items(vec![
                SelectItem::Column(ColumnRef::new("R", "a")),
                SelectItem::Sum(Expr::column("R", "b")),
            ])
            .with_where(Expr::eq(Expr::column("R", "a"), Expr::column("S", "a")))
            .with_group_by(vec![ColumnRef::new("R", "a")]);
        let mut root = plan_select(catalog, &stmt).unwrap();
        assert!(root.explain().starts_with("Aggregate(group_by=[0], sums=1)\n"));
        assert_eq!(rows(&root.drain().unwrap()), vec!["1,30", "2,5"]);
    }

    #[test]
    fn test_plan_distinct_projection() {
        let (_dir, catalog) = sample();
        let stmt = SelectStmt::new(tables(&["R"]))
            .with_items(vec![SelectItem::Column(ColumnRef::new("R", "a"))])
            .with_distinct(true);
        let mut root = plan_select(catalog, &stmt).unwrap();
        assert_eq!(
            root.explain(),
            "Distinct\n  Project([0])\n    TableScan(R)\n"
        );
        assert_eq!(rows(&root.drain().unwrap()), vec!["1", "2"]);
    }

    #[test]
    fn test_plan_rejects_unknown_references() {
        let (_dir, catalog) = sample();

        let stmt = SelectStmt::new(tables(&["X"]));
        assert!(matches!(plan_select(catalog.clone(), &stmt), Err(Error::UnknownTable { .. })));

        let stmt = SelectStmt::new(tables(&["R"]))
            .with_where(Expr::eq(Expr::column("R", "zz"), Expr::literal(1)));
        assert!(matches!(plan_select(catalog.clone(), &stmt), Err(Error::UnknownColumn { .. })));

        let stmt = SelectStmt::new(tables(&["R"]))
            .with_order_by(vec![ColumnRef::new("S", "a")]);
        assert!(matches!(plan_select(catalog.clone(), &stmt), Err(Error::UnknownTable { .. })));

        let stmt = SelectStmt::new(tables(&["R"]))
            .with_items(vec![SelectItem::Sum(Expr::column("R", "nope"))]);
        assert!(matches!(plan_select(catalog, &stmt), Err(Error::UnknownColumn { .. })));
    }

    #[test]
    fn test_plan_where_on_table_outside_from_is_vacuous() {
        let (_dir, catalog) = sample();
        let stmt = SelectStmt::new(tables(&["R"]))
            .with_where(Expr::eq(Expr::column("S", "a"), Expr::literal(42)));
        let mut root = plan_select(catalog, &stmt).unwrap();
        assert_eq!(root.drain().unwrap().len(), 3);
    }

    #[test]
    fn test_plan_rejects_duplicate_from_table() {
        let (_dir, catalog) = sample();
        let stmt = SelectStmt::new(tables(&["R", "R"]));
        assert!(matches!(
            plan_select(catalog, &stmt),
            Err(Error::UnsupportedExpression { .. })
        ));
    }

    #[test]
    fn test_plan_rejects_empty_from() {
        let (_dir, catalog) = sample();
        let stmt = SelectStmt::new(Vec::new());
        assert!(matches!(
            plan_select(catalog, &stmt),
            Err(Error::UnsupportedExpression { .. })
        ));
    }
}
