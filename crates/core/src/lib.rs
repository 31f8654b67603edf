//! Quarry Core - Core types shared by the Quarry query executor.
//!
//! This crate provides the foundational types for the executor:
//!
//! - `Tuple`: An ordered, fixed-length sequence of field values
//! - `schema`: Table schema definitions (name and ordered column list)
//! - `Error`: Error taxonomy for plan construction and execution
//!
//! # Example
//!
//! ```rust
//! use quarry_core::Tuple;
//! use quarry_core::schema::TableSchema;
//!
//! let schema = TableSchema::new("R", vec!["a".into(), "b".into()]).unwrap();
//! assert_eq!(schema.column_index("b"), Some(1));
//!
//! let tuple = Tuple::from_line("1, 10");
//! assert_eq!(tuple.int(1).unwrap(), 10);
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod error;
pub mod schema;
mod tuple;

pub use error::{Error, Result};
pub use tuple::{Tuple, FIELD_DELIMITER};
