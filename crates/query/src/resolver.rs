//! Column resolution over a join order.
//!
//! A tuple flowing through a left-deep join tree is the concatenation of one
//! row per joined table, in join order. The first column of a table sits at
//! the sum of the schema sizes of every table before it.

use crate::ast::ColumnRef;
use crate::catalog::Catalog;
use quarry_core::{Error, Result};

/// Outcome of resolving a column reference.
///
/// An unknown table or column is an `Err`; a table that exists but is not part
/// of the join order at this point in the plan is [`Resolution::NotYetJoined`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Flat tuple offsets: one for a named column, one per column for a wildcard.
    Offsets(Vec<usize>),
    /// The table is valid but has not been joined yet.
    NotYetJoined,
}

impl Resolution {
    /// Returns the first offset, or `None` when not yet joined.
    pub fn first(&self) -> Option<usize> {
        match self {
            Resolution::Offsets(offsets) => offsets.first().copied(),
            Resolution::NotYetJoined => None,
        }
    }
}

/// Returns the flat offset of `table`'s first column within `join_order`,
/// or `None` if the table is not in the join order.
pub fn table_offset(catalog: &Catalog, table: &str, join_order: &[String]) -> Result<Option<usize>> {
    let mut offset = 0;
    for name in join_order {
        if name == table {
            return Ok(Some(offset));
        }
        offset += catalog.schema(name)?.len();
    }
    Ok(None)
}

/// Returns the width of a tuple spanning every table of `join_order`.
pub fn tuple_width(catalog: &Catalog, join_order: &[String]) -> Result<usize> {
    join_order
        .iter()
        .try_fold(0, |acc, name| Ok(acc + catalog.schema(name)?.len()))
}

/// Resolves a column reference against a join order.
///
/// Fails with `UnknownTable` if the table is not in the catalog and with
/// `UnknownColumn` if the column is not in the table's schema.
pub fn resolve(catalog: &Catalog, column: &ColumnRef, join_order: &[String]) -> Result<Resolution> {
    let schema = catalog.schema(&column.table)?;

    let Some(offset) = table_offset(catalog, &column.table, join_order)? else {
        return Ok(Resolution::NotYetJoined);
    };

    if column.is_wildcard() {
        return Ok(Resolution::Offsets((offset..offset + schema.len()).collect()));
    }

    let index = schema
        .column_index(&column.column)
        .ok_or_else(|| Error::unknown_column(&column.table, &column.column))?;
    Ok(Resolution::Offsets(vec![offset + index]))
}

/// Resolves a single named column to exactly one offset.
///
/// Used where a value is required (sort keys, group keys, projections of a
/// named column); a table outside the join order is an `UnknownTable` error
/// here.
pub fn resolve_required(catalog: &Catalog, column: &ColumnRef, join_order: &[String]) -> Result<usize> {
    if column.is_wildcard() {
        return Err(Error::unsupported(format!(
            "wildcard {} where a single column is required",
            column
        )));
    }
    resolve(catalog, column, join_order)?
        .first()
        .ok_or_else(|| Error::unknown_table(&column.table))
}
