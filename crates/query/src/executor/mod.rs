//! Query executor module.
//!
//! Operators follow the pull (iterator) model: the consumer calls
//! [`Operator::next`] on the root, which pulls from its children until it can
//! produce one tuple or reports end of stream with `Ok(None)`. Sort and
//! aggregate are blocking and drain their child when constructed.
//!
//! ```text
//! Distinct
//!   └── Project | Aggregate
//!         └── Sort
//!               └── NestedLoopJoin
//!                     ├── NestedLoopJoin
//!                     │     ├── Select ── TableScan(R)
//!                     │     └── TableScan(S)
//!                     └── Select ── TableScan(T)
//! ```

mod aggregate;
mod distinct;
mod join;
mod project;
mod scan;
mod select;
mod sort;

pub use aggregate::AggregateExecutor;
pub use distinct::DistinctExecutor;
pub use join::NestedLoopJoin;
pub use project::ProjectExecutor;
pub use scan::TableScanExecutor;
pub use select::SelectExecutor;
pub use sort::SortExecutor;

use quarry_core::{Error, Result, Tuple};
use std::io::Write;

/// A node of the operator tree.
pub enum Operator {
    Scan(TableScanExecutor),
    Select(SelectExecutor),
    Project(ProjectExecutor),
    Join(NestedLoopJoin),
    Sort(SortExecutor),
    Distinct(DistinctExecutor),
    Aggregate(AggregateExecutor),
}

impl Operator {
    /// Returns the next tuple, or `None` at end of stream.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        match self {
            Operator::Scan(op) => op.next(),
            Operator::Select(op) => op.next(),
            Operator::Project(op) => op.next(),
            Operator::Join(op) => op.next(),
            Operator::Sort(op) => op.next(),
            Operator::Distinct(op) => op.next(),
            Operator::Aggregate(op) => op.next(),
        }
    }

    /// Rewinds the operator so the next pull starts a new pass.
    pub fn reset(&mut self) -> Result<()> {
        match self {
            Operator::Scan(op) => op.reset(),
            Operator::Select(op) => op.reset(),
            Operator::Project(op) => op.reset(),
            Operator::Join(op) => op.reset(),
            Operator::Sort(op) => {
                op.reset();
                Ok(())
            }
            Operator::Distinct(op) => op.reset(),
            Operator::Aggregate(op) => {
                op.reset();
                Ok(())
            }
        }
    }

    /// Pulls every remaining tuple.
    pub fn drain(&mut self) -> Result<Vec<Tuple>> {
        let mut tuples = Vec::new();
        while let Some(tuple) = self.next()? {
            tuples.push(tuple);
        }
        Ok(tuples)
    }

    /// Renders the operator tree, one node per line.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0);
        out
    }

    fn explain_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.describe());
        out.push('\n');
        for child in self.children() {
            child.explain_into(out, depth + 1);
        }
    }

    fn describe(&self) -> String {
        match self {
            Operator::Scan(op) => format!("TableScan({})", op.table()),
            Operator::Select(op) => format!("Select({})", op.predicate()),
            Operator::Project(op) => match op.offsets() {
                Some(offsets) => format!("Project({:?})", offsets),
                None => "Project(*)".to_string(),
            },
            Operator::Join(op) => match op.predicate() {
                Some(pred) => format!("NestedLoopJoin({})", pred),
                None => "NestedLoopJoin".to_string(),
            },
            Operator::Sort(op) => format!("Sort({:?})", op.key_offsets()),
            Operator::Distinct(_) => "Distinct".to_string(),
            Operator::Aggregate(op) => format!(
                "Aggregate(group_by={:?}, sums={})",
                op.group_offsets(),
                op.sum_count()
            ),
        }
    }

    fn children(&self) -> Vec<&Operator> {
        match self {
            Operator::Scan(_) => Vec::new(),
            Operator::Select(op) => vec![op.child()],
            Operator::Project(op) => vec![op.child()],
            Operator::Join(op) => vec![op.left(), op.right()],
            Operator::Sort(op) => vec![op.child()],
            Operator::Distinct(op) => vec![op.child()],
            Operator::Aggregate(op) => vec![op.child()],
        }
    }
}

/// Drains `root`, writing one comma-separated line per tuple.
///
/// Returns the number of rows written.
pub fn write_csv<W: Write>(root: &mut Operator, out: &mut W) -> Result<usize> {
    let mut rows = 0;
    while let Some(tuple) = root.next()? {
        writeln!(out, "{}", tuple.to_csv()).map_err(|e| Error::io("output", e.to_string()))?;
        rows += 1;
    }
    out.flush().map_err(|e| Error::io("output", e.to_string()))?;
    Ok(rows)
}
