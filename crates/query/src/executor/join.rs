//! Nested Loop Join implementation.

use crate::ast::Expr;
use crate::catalog::Catalog;
use crate::eval::Evaluator;
use crate::executor::Operator;
use quarry_core::{Result, Tuple};
use std::sync::Arc;

/// Nested Loop Join executor.
///
/// Holds one left tuple at a time and streams the whole right input past it,
/// resetting the right child for every left tuple. Output tuples are the left
/// fields followed by the right fields, so `join_order` must list the left
/// subtree's tables followed by the right child's table.
pub struct NestedLoopJoin {
    left: Box<Operator>,
    right: Box<Operator>,
    predicate: Option<Expr>,
    join_order: Vec<String>,
    catalog: Arc<Catalog>,
    current_left: Option<Tuple>,
}

impl NestedLoopJoin {
    /// Creates a join and pulls the first left tuple.
    ///
    /// `predicate` is the full WHERE clause; conditions on tables outside
    /// `join_order` stay vacuously true at this level.
    pub fn new(
        left: Operator,
        right: Operator,
        predicate: Option<Expr>,
        join_order: Vec<String>,
        catalog: Arc<Catalog>,
    ) -> Result<Self> {
        let mut left = Box::new(left);
        let current_left = left.next()?;
        Ok(Self {
            left,
            right: Box::new(right),
            predicate,
            join_order,
            catalog,
            current_left,
        })
    }

    /// Returns the join predicate.
    pub fn predicate(&self) -> Option<&Expr> {
        self.predicate.as_ref()
    }

    /// Returns the left child.
    pub fn left(&self) -> &Operator {
        &self.left
    }

    /// Returns the right child.
    pub fn right(&self) -> &Operator {
        &self.right
    }

    /// Returns the next matching combination of left and right tuples.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        while let Some(left) = &self.current_left {
            while let Some(right) = self.right.next()? {
                let candidate = left.concat(&right);
                if self.matches(&candidate)? {
                    return Ok(Some(candidate));
                }
            }
            self.right.reset()?;
            self.current_left = self.left.next()?;
        }
        Ok(None)
    }

    fn matches(&self, candidate: &Tuple) -> Result<bool> {
        match &self.predicate {
            Some(pred) => Evaluator::new(&self.catalog, &self.join_order, candidate).evaluate(pred),
            None => Ok(true),
        }
    }

    /// Resets both children and pulls the first left tuple again.
    pub fn reset(&mut self) -> Result<()> {
        self.left.reset()?;
        self.right.reset()?;
        self.current_left = self.left.next()?;
        Ok(())
    }
}
