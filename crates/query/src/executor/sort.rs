//! Sort executor.

use crate::ast::ColumnRef;
use crate::catalog::Catalog;
use crate::executor::Operator;
use crate::resolver;
use log::debug;
use quarry_core::{Result, Tuple};

/// Sort executor - materializes its input and serves it in key order.
///
/// Keys compare as integers, ascending, first differing key decides. The sort
/// is stable, so tuples with equal keys keep their input order.
pub struct SortExecutor {
    child: Box<Operator>,
    key_offsets: Vec<usize>,
    sorted: Vec<Tuple>,
    position: usize,
}

impl SortExecutor {
    /// Drains `child` and sorts it by the ORDER BY columns over `join_order`.
    pub fn new(
        child: Operator,
        catalog: &Catalog,
        order_by: &[ColumnRef],
        join_order: &[String],
    ) -> Result<Self> {
        let key_offsets = order_by
            .iter()
            .map(|col| resolver::resolve_required(catalog, col, join_order))
            .collect::<Result<Vec<_>>>()?;
        Self::with_offsets(child, key_offsets)
    }

    /// Drains `child` and sorts it by explicit key offsets.
    pub fn with_offsets(child: Operator, key_offsets: Vec<usize>) -> Result<Self> {
        let mut child = Box::new(child);

        let mut keyed: Vec<(Vec<i64>, Tuple)> = Vec::new();
        while let Some(tuple) = child.next()? {
            let key = key_offsets
                .iter()
                .map(|&idx| tuple.int(idx))
                .collect::<Result<Vec<_>>>()?;
            keyed.push((key, tuple));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        debug!("sorted {} tuples on offsets {:?}", keyed.len(), key_offsets);

        Ok(Self {
            child,
            key_offsets,
            sorted: keyed.into_iter().map(|(_, tuple)| tuple).collect(),
            position: 0,
        })
    }

    /// Returns the resolved key offsets.
    pub fn key_offsets(&self) -> &[usize] {
        &self.key_offsets
    }

    /// Returns the child operator.
    pub fn child(&self) -> &Operator {
        &self.child
    }

    /// Returns the next tuple in sorted order.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        let tuple = self.sorted.get(self.position).cloned();
        if tuple.is_some() {
            self.position += 1;
        }
        Ok(tuple)
    }

    /// Rewinds to the first sorted tuple without re-reading the child.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}
