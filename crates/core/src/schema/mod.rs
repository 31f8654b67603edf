//! Schema module for Quarry.
//!
//! Tables are described by a name and an ordered list of column names. Column
//! order defines the field layout of every tuple scanned from the table.

mod table;

pub use table::TableSchema;
