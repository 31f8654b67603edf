//! Group-by SUM aggregate executor.

use crate::ast::{ColumnRef, Expr, SelectItem};
use crate::catalog::Catalog;
use crate::eval::Evaluator;
use crate::executor::Operator;
use crate::resolver;
use hashbrown::HashMap;
use log::{debug, trace};
use quarry_core::{Error, Result, Tuple};

/// One group: its key values and a running total per SUM expression.
struct Group {
    key: Vec<String>,
    sums: Vec<i64>,
}

/// Aggregate executor - groups its input and sums expressions per group.
///
/// Drains the child on construction. Groups are emitted in the order their
/// key was first seen. Each output tuple holds the selected GROUP BY columns,
/// in select-list order, followed by the SUM totals in declared order.
pub struct AggregateExecutor {
    child: Box<Operator>,
    group_offsets: Vec<usize>,
    /// Position within the group key of each selected non-aggregate column.
    output_positions: Vec<usize>,
    sum_count: usize,
    groups: Vec<Group>,
    position: usize,
}

impl AggregateExecutor {
    /// Drains `child` and aggregates it.
    ///
    /// `items` is the query's select list: every plain column must appear in
    /// `group_by`. Without GROUP BY all tuples fall into a single group.
    pub fn new(
        child: Operator,
        catalog: &Catalog,
        items: &[SelectItem],
        group_by: &[ColumnRef],
        join_order: &[String],
    ) -> Result<Self> {
        let group_offsets = group_by
            .iter()
            .map(|col| resolver::resolve_required(catalog, col, join_order))
            .collect::<Result<Vec<_>>>()?;

        let mut output_positions = Vec::new();
        let mut sum_exprs: Vec<&Expr> = Vec::new();
        for item in items {
            match item {
                SelectItem::Sum(expr) => sum_exprs.push(expr),
                SelectItem::Column(col) => {
                    let position = group_by.iter().position(|g| g == col).ok_or_else(|| {
                        Error::unsupported(format!("{} is selected but not in GROUP BY", col))
                    })?;
                    output_positions.push(position);
                }
                SelectItem::Wildcard => {
                    return Err(Error::unsupported("* in an aggregate query"));
                }
            }
        }

        let mut child = Box::new(child);
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();
        let mut input_count = 0usize;

        while let Some(tuple) = child.next()? {
            input_count += 1;
            let key = group_offsets
                .iter()
                .map(|&idx| {
                    tuple.normalized(idx).ok_or_else(|| {
                        Error::malformed_row(format!(
                            "group key field {} missing from a row with {} fields",
                            idx,
                            tuple.len()
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let evaluator = Evaluator::new(catalog, join_order, &tuple);
            let values = sum_exprs
                .iter()
                .map(|expr| evaluator.evaluate_sum_expression(expr))
                .collect::<Result<Vec<_>>>()?;

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    trace!("new group {:?}", key);
                    groups.push(Group {
                        key: key.clone(),
                        sums: vec![0; sum_exprs.len()],
                    });
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };
            for (total, value) in groups[slot].sums.iter_mut().zip(values) {
                *total = total
                    .checked_add(value)
                    .ok_or_else(|| Error::malformed_row("SUM overflows"))?;
            }
        }
        debug!(
            "aggregated {} tuples into {} groups",
            input_count,
            groups.len()
        );

        Ok(Self {
            child,
            group_offsets,
            output_positions,
            sum_count: sum_exprs.len(),
            groups,
            position: 0,
        })
    }

    /// Returns the resolved GROUP BY offsets.
    pub fn group_offsets(&self) -> &[usize] {
        &self.group_offsets
    }

    /// Returns the number of SUM expressions.
    pub fn sum_count(&self) -> usize {
        self.sum_count
    }

    /// Returns the child operator.
    pub fn child(&self) -> &Operator {
        &self.child
    }

    /// Returns the next group's output tuple.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        let Some(group) = self.groups.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;

        let mut values: Vec<String> = self
            .output_positions
            .iter()
            .map(|&pos| group.key[pos].clone())
            .collect();
        values.extend(group.sums.iter().map(|sum| sum.to_string()));
        Ok(Some(Tuple::new(values)))
    }

    /// Rewinds to the first group without re-aggregating.
    pub fn reset(&mut self) {
        self.position = 0;
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
    fn test_group_by_sum() {
        let (_dir, catalog) = sample();
        let items = vec![
            SelectItem::Column(ColumnRef::new("R", "a")),
            SelectItem::Sum(Expr::column("R", "b")),
        ];
        let agg = AggregateExecutor::new(
            scan(&catalog, "R"),
            &catalog,
            &items,
            &[ColumnRef::new("R", "a")],
            &order(&["R"]),
        )
        .unwrap();
        let mut op = Operator::Aggregate(agg);
        assert_eq!(rows(&op.drain().unwrap()), vec!["1,30", "2,5"]);
    }

    #[test]
    fn test_sum_without_group_by() {
        let (_dir, catalog) = sample();
        let items = vec![
            SelectItem::Sum(Expr::literal(1)),
            SelectItem::Sum(Expr::Product(vec![Expr::column("R", "a"), Expr::column("R", "b")])),
        ];
        let agg = AggregateExecutor::new(scan(&catalog, "R"), &catalog, &items, &[], &order(&["R"])).unwrap();
        let mut op = Operator::Aggregate(agg);
        // count = 3, sum(a*b) = 10 + 20 + 10
        assert_eq!(rows(&op.drain().unwrap()), vec!["3,40"]);
    }

    #[test]
    fn test_group_by_without_sum_and_reordered_select() {
        let (_dir, catalog) = catalog(&[("T", &["a", "b"], &["1,2", "1,2", "2,1"])]);
        let items = vec![
            SelectItem::Column(ColumnRef::new("T", "b")),
            SelectItem::Column(ColumnRef::new("T", "a")),
        ];
        let group_by = [ColumnRef::new("T", "a"), ColumnRef::new("T", "b")];
        let agg = AggregateExecutor::new(scan(&catalog, "T"), &catalog, &items, &group_by, &order(&["T"])).unwrap();
        let mut op = Operator::Aggregate(agg);
        assert_eq!(rows(&op.drain().unwrap()), vec!["2,1", "1,2"]);
    }

    #[test]
    fn test_empty_input_produces_no_groups() {
        let (_dir, catalog) = catalog(&[("E", &["a"], &[])]);
        let items = vec![SelectItem::Sum(Expr::column("E", "a"))];
        let agg = AggregateExecutor::new(scan(&catalog, "E"), &catalog, &items, &[], &order(&["E"])).unwrap();
        let mut op = Operator::Aggregate(agg);
        assert!(op.drain().unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_reset() {
        let (_dir, catalog) = sample();
        let items = vec![SelectItem::Sum(Expr::column("R", "b"))];
        let agg = AggregateExecutor::new(
            scan(&catalog, "R"),
            &catalog,
            &items,
            &[ColumnRef::new("R", "a")],
            &order(&["R"]),
        )
        .unwrap();
        let mut op = Operator::Aggregate(agg);
        let first = op.drain().unwrap();
        op.reset().unwrap();
        assert_eq!(first, op.drain().unwrap());
        assert_eq!(rows(&first), vec!["30", "5"]);
    }

    #[test]
    fn test_selected_column_must_be_grouped() {
        let (_dir, catalog) = sample();
        let items = vec![
            SelectItem::Column(ColumnRef::new("R", "b")),
            SelectItem::Sum(Expr::column("R", "b")),
        ];
        let result = AggregateExecutor::new(
            scan(&catalog, "R"),
            &catalog,
            &items,
            &[ColumnRef::new("R", "a")],
            &order(&["R"]),
        );
        assert!(matches!(result, Err(Error::UnsupportedExpression { .. })));
    }
}
