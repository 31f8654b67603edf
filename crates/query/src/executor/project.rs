//! Project executor.

use crate::ast::SelectItem;
use crate::catalog::Catalog;
use crate::executor::Operator;
use crate::resolver::{self, Resolution};
use quarry_core::{Error, Result, Tuple};

/// Project executor - projects specific columns from tuples.
pub struct ProjectExecutor {
    child: Box<Operator>,
    /// Offsets to emit, in order. `None` passes tuples through unchanged.
    offsets: Option<Vec<usize>>,
}

impl ProjectExecutor {
    /// Creates a project executor for a select list over `join_order`.
    pub fn new(
        child: Operator,
        catalog: &Catalog,
        items: &[SelectItem],
        join_order: &[String],
    ) -> Result<Self> {
        if matches!(items, [SelectItem::Wildcard]) {
            return Ok(Self::passthrough(child));
        }

        let mut offsets = Vec::new();
        for item in items {
            match item {
                SelectItem::Wildcard => {
                    offsets.extend(0..resolver::tuple_width(catalog, join_order)?);
                }
                SelectItem::Column(col) => match resolver::resolve(catalog, col, join_order)? {
                    Resolution::Offsets(resolved) => offsets.extend(resolved),
                    Resolution::NotYetJoined => return Err(Error::unknown_table(&col.table)),
                },
                SelectItem::Sum(expr) => {
                    return Err(Error::unsupported(format!(
                        "SUM({}) outside an aggregate query",
                        expr
                    )))
                }
            }
        }
        Ok(Self::with_offsets(child, offsets))
    }

    /// Creates a project executor that emits the child tuples unchanged.
    pub fn passthrough(child: Operator) -> Self {
        Self {
            child: Box::new(child),
            offsets: None,
        }
    }

    /// Creates a project executor over explicit offsets.
    pub fn with_offsets(child: Operator, offsets: Vec<usize>) -> Self {
        Self {
            child: Box::new(child),
            offsets: Some(offsets),
        }
    }

    /// Returns the projected offsets, or `None` for a passthrough.
    pub fn offsets(&self) -> Option<&[usize]> {
        self.offsets.as_deref()
    }

    /// Returns the child operator.
    pub fn child(&self) -> &Operator {
        &self.child
    }

    /// Pulls one tuple and projects it.
    ///
    /// Projected fields have their whitespace stripped.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        let Some(tuple) = self.child.next()? else {
            return Ok(None);
        };
        let Some(offsets) = &self.offsets else {
            return Ok(Some(tuple));
        };

        let values = offsets
            .iter()
            .map(|&idx| {
                tuple.normalized(idx).ok_or_else(|| {
                    Error::malformed_row(format!(
                        "field {} requested from a row with {} fields",
                        idx,
                        tuple.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Tuple::new(values)))
    }

    /// Resets the child.
    pub fn reset(&mut self) -> Result<()> {
        self.child.reset()
    }
}
