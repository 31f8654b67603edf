//! Distinct executor.

use crate::executor::Operator;
use hashbrown::HashSet;
use quarry_core::{Result, Tuple};

/// Distinct executor - drops tuples already emitted during the current pass.
pub struct DistinctExecutor {
    child: Box<Operator>,
    /// Delimiter-joined encodings of emitted tuples.
    seen: HashSet<String>,
}

impl DistinctExecutor {
    /// Creates a new distinct executor.
    pub fn new(child: Operator) -> Self {
        Self {
            child: Box::new(child),
            seen: HashSet::new(),
        }
    }

    /// Returns the child operator.
    pub fn child(&self) -> &Operator {
        &self.child
    }

    /// Pulls until a tuple not seen before, or end of stream.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            if self.seen.insert(tuple.to_csv()) {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    /// Resets the child and forgets emitted tuples.
    pub fn reset(&mut self) -> Result<()> {
        self.child.reset()?;
        self.seen.clear();
        Ok(())
    }
}
