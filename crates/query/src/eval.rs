//! Predicate and SUM-expression evaluation.
//!
//! An [`Evaluator`] is bound to one tuple and to the join order describing
//! which tables that tuple spans. A comparison whose column operand cannot be
//! read from the tuple, because its table is not joined yet or its offset
//! falls past the end of the tuple, evaluates to `true`. A Select over a
//! single-table scan can therefore evaluate the whole WHERE clause: conjuncts
//! about other tables drop out and are evaluated for real by the join that
//! first sees all their tables.

use crate::ast::{ColumnRef, Expr};
use crate::catalog::Catalog;
use crate::resolver;
use quarry_core::{Error, Result, Tuple};

/// Evaluates expressions against one tuple.
pub struct Evaluator<'a> {
    catalog: &'a Catalog,
    join_order: &'a [String],
    tuple: &'a Tuple,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator for `tuple`, whose fields span `join_order`.
    pub fn new(catalog: &'a Catalog, join_order: &'a [String], tuple: &'a Tuple) -> Self {
        Self {
            catalog,
            join_order,
            tuple,
        }
    }

    /// Evaluates a predicate.
    ///
    /// Conjunctions short-circuit. A comparison with an unavailable column
    /// operand is vacuously true.
    pub fn evaluate(&self, predicate: &Expr) -> Result<bool> {
        match predicate {
            Expr::And(left, right) => {
                if !self.evaluate(left)? {
                    return Ok(false);
                }
                self.evaluate(right)
            }
            Expr::Compare { op, left, right } => {
                let Some(left) = self.operand(left)? else {
                    return Ok(true);
                };
                let Some(right) = self.operand(right)? else {
                    return Ok(true);
                };
                Ok(op.apply(left, right))
            }
            other => Err(Error::unsupported(format!(
                "{} is not a boolean condition",
                other
            ))),
        }
    }

    /// Evaluates the integer value of a comparison operand.
    ///
    /// Returns `None` when a referenced column is not available in this tuple.
    fn operand(&self, expr: &Expr) -> Result<Option<i64>> {
        match expr {
            Expr::Literal(v) => Ok(Some(*v)),
            Expr::Column(col) => self.column_value(col),
            Expr::Product(factors) => {
                let mut product: i64 = 1;
                for factor in factors {
                    let Some(value) = self.operand(factor)? else {
                        return Ok(None);
                    };
                    product = checked_mul(product, value)?;
                }
                Ok(Some(product))
            }
            other => Err(Error::unsupported(format!(
                "{} is not a comparison operand",
                other
            ))),
        }
    }

    fn column_value(&self, col: &ColumnRef) -> Result<Option<i64>> {
        if col.is_wildcard() {
            return Err(Error::unsupported(format!("{} in a comparison", col)));
        }
        match resolver::resolve(self.catalog, col, self.join_order)?.first() {
            Some(offset) if offset < self.tuple.len() => self.tuple.int(offset).map(Some),
            _ => Ok(None),
        }
    }

    /// Evaluates a SUM argument: a literal, a column, or a product of those.
    ///
    /// Every referenced table must be present in the join order.
    pub fn evaluate_sum_expression(&self, expr: &Expr) -> Result<i64> {
        match expr {
            Expr::Literal(v) => Ok(*v),
            Expr::Column(col) => {
                let offset = resolver::resolve_required(self.catalog, col, self.join_order)?;
                self.tuple.int(offset)
            }
            Expr::Product(factors) => factors.iter().try_fold(1i64, |acc, factor| {
                checked_mul(acc, self.evaluate_sum_expression(factor)?)
            }),
            other => Err(Error::unsupported(format!(
                "{} is not a SUM argument",
                other
            ))),
        }
    }
}

fn checked_mul(left: i64, right: i64) -> Result<i64> {
    left.checked_mul(right)
        .ok_or_else(|| Error::malformed_row(format!("{} * {} overflows", left, right)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builder("/db")
            .add_table("R", ["a", "b"])
            .add_table("S", ["a", "c"])
            .build()
            .unwrap()
    }

    fn order(tables: &[&str]) -> Vec<String> {
        tables.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_single_table_comparison() {
        let catalog = catalog();
        let join_order = order(&["R"]);
        let tuple = Tuple::from(vec!["1", "20"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);

        assert!(eval
            .evaluate(&Expr::gt(Expr::column("R", "b"), Expr::literal(10)))
            .unwrap());
        assert!(!eval
            .evaluate(&Expr::lt(Expr::column("R", "b"), Expr::literal(10)))
            .unwrap());
        assert!(eval
            .evaluate(&Expr::ne(Expr::column("R", "a"), Expr::column("R", "b")))
            .unwrap());
    }

    #[test]
    fn test_not_yet_joined_is_vacuously_true() {
        let catalog = catalog();
        let join_order = order(&["R"]);
        let tuple = Tuple::from(vec!["1", "5"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);

        // S is not joined: the join condition drops out, the R filter stays.
        let pred = Expr::and(
            Expr::eq(Expr::column("R", "a"), Expr::column("S", "a")),
            Expr::gt(Expr::column("R", "b"), Expr::literal(10)),
        );
        assert!(!eval.evaluate(&pred).unwrap());

        let pred = Expr::and(
            Expr::eq(Expr::column("R", "a"), Expr::column("S", "a")),
            Expr::lt(Expr::column("R", "b"), Expr::literal(10)),
        );
        assert!(eval.evaluate(&pred).unwrap());
    }

    #[test]
    fn test_offset_past_tuple_end_is_vacuously_true() {
        let catalog = catalog();
        let join_order = order(&["R", "S"]);
        // Only R's fields are present.
        let tuple = Tuple::from(vec!["1", "5"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);
        assert!(eval
            .evaluate(&Expr::eq(Expr::column("S", "c"), Expr::literal(999)))
            .unwrap());
    }

    #[test]
    fn test_unavailable_left_operand_skips_right() {
        let catalog = catalog();
        let join_order = order(&["R"]);
        let tuple = Tuple::from(vec!["1", "5"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);
        // The right operand would be an unknown column, but it is never resolved.
        let pred = Expr::eq(Expr::column("S", "a"), Expr::column("R", "nope"));
        assert!(eval.evaluate(&pred).unwrap());
    }

    #[test]
    fn test_join_context_evaluates_everything() {
        let catalog = catalog();
        let join_order = order(&["R", "S"]);
        let matching = Tuple::from(vec!["1", "10", "1", "100"]);
        let other = Tuple::from(vec!["1", "10", "2", "200"]);
        let pred = Expr::eq(Expr::column("R", "a"), Expr::column("S", "a"));

        assert!(Evaluator::new(&catalog, &join_order, &matching)
            .evaluate(&pred)
            .unwrap());
        assert!(!Evaluator::new(&catalog, &join_order, &other)
            .evaluate(&pred)
            .unwrap());
    }

    #[test]
    fn test_errors() {
        let catalog = catalog();
        let join_order = order(&["R"]);
        let tuple = Tuple::from(vec!["x", "5"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);

        assert!(matches!(
            eval.evaluate(&Expr::eq(Expr::column("R", "a"), Expr::literal(1))),
            Err(Error::MalformedRow { .. })
        ));
        assert!(matches!(
            eval.evaluate(&Expr::eq(Expr::column("Q", "a"), Expr::literal(1))),
            Err(Error::UnknownTable { .. })
        ));
        assert!(matches!(
            eval.evaluate(&Expr::eq(Expr::column("R", "z"), Expr::literal(1))),
            Err(Error::UnknownColumn { .. })
        ));
        assert!(matches!(
            eval.evaluate(&Expr::literal(1)),
            Err(Error::UnsupportedExpression { .. })
        ));
    }

    #[test]
    fn test_constant_comparison() {
        let catalog = catalog();
        let join_order = order(&["R"]);
        let tuple = Tuple::from(vec!["1", "5"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);
        assert!(!eval
            .evaluate(&Expr::eq(Expr::literal(1), Expr::literal(2)))
            .unwrap());
    }

    #[test]
    fn test_sum_expression() {
        let catalog = catalog();
        let join_order = order(&["R", "S"]);
        let tuple = Tuple::from(vec!["2", " 10", "2", "7"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);

        assert_eq!(eval.evaluate_sum_expression(&Expr::literal(1)).unwrap(), 1);
        assert_eq!(
            eval.evaluate_sum_expression(&Expr::column("R", "b")).unwrap(),
            10
        );
        let product = Expr::Product(vec![
            Expr::column("R", "b"),
            Expr::column("S", "c"),
            Expr::literal(3),
        ]);
        assert_eq!(eval.evaluate_sum_expression(&product).unwrap(), 210);
    }

    #[test]
    fn test_sum_expression_requires_joined_table() {
        let catalog = catalog();
        let join_order = order(&["R"]);
        let tuple = Tuple::from(vec!["2", "10"]);
        let eval = Evaluator::new(&catalog, &join_order, &tuple);
        assert!(matches!(
            eval.evaluate_sum_expression(&Expr::column("S", "c")),
            Err(Error::UnknownTable { .. })
        ));
    }
}
