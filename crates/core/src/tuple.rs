//! Tuple structure for Quarry.
//!
//! A `Tuple` is the unit of data flow between operators. Fields are kept as
//! the strings read from storage and parsed as integers on demand.

use crate::error::{Error, Result};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Delimiter between fields in table storage and in output rows.
pub const FIELD_DELIMITER: char = ',';

/// An ordered, fixed-length sequence of field values.
///
/// Tuples are never mutated in place; joins and projections build new ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Tuple {
    values: Vec<String>,
}

impl Tuple {
    /// Creates a tuple from field values.
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Parses one storage line into a tuple, splitting on the field delimiter.
    ///
    /// Fields are kept verbatim, including surrounding whitespace.
    pub fn from_line(line: &str) -> Self {
        Self {
            values: line.split(FIELD_DELIMITER).map(ToString::to_string).collect(),
        }
    }

    /// Returns the concatenation of `self`'s fields followed by `other`'s.
    pub fn concat(&self, other: &Tuple) -> Self {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend(self.values.iter().cloned());
        values.extend(other.values.iter().cloned());
        Self { values }
    }

    /// Returns the raw field at the given index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Returns the field at the given index with all whitespace removed.
    pub fn normalized(&self, index: usize) -> Option<String> {
        self.get(index)
            .map(|v| v.chars().filter(|c| !c.is_whitespace()).collect())
    }

    /// Parses the field at the given index as an integer.
    pub fn int(&self, index: usize) -> Result<i64> {
        let field = self.normalized(index).ok_or_else(|| {
            Error::malformed_row(format!(
                "field {} requested from a row with {} fields",
                index,
                self.values.len()
            ))
        })?;
        field.parse::<i64>().map_err(|_| {
            Error::malformed_row(format!("field {} is not an integer: {:?}", index, field))
        })
    }

    /// Returns the field values.
    #[inline]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Consumes the tuple, returning its field values.
    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the tuple has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the delimiter-joined representation used for output and
    /// duplicate detection.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                out.push(FIELD_DELIMITER);
            }
            out.push_str(value);
        }
        out
    }
}

impl From<Vec<String>> for Tuple {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

impl From<Vec<&str>> for Tuple {
    fn from(values: Vec<&str>) -> Self {
        Self::new(values.into_iter().map(ToString::to_string).collect())
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_tuple_from_line() {
        let tuple = Tuple::from_line("1, 200,50");
        assert_eq!(tuple.len(), 3);
        assert_eq!(tuple.get(1), Some(" 200"));
        assert_eq!(tuple.normalized(1).as_deref(), Some("200"));
        assert_eq!(tuple.get(3), None);
    }

    #[test]
    fn test_tuple_int() {
        let tuple = Tuple::from(vec!["1", " -42 ", "abc"]);
        assert_eq!(tuple.int(0).unwrap(), 1);
        assert_eq!(tuple.int(1).unwrap(), -42);
        assert!(matches!(tuple.int(2), Err(Error::MalformedRow { .. })));
        assert!(matches!(tuple.int(3), Err(Error::MalformedRow { .. })));
    }

    #[test]
    fn test_tuple_concat() {
        let left = Tuple::from(vec!["1", "10"]);
        let right = Tuple::from(vec!["1", "100"]);
        let joined = left.concat(&right);
        assert_eq!(joined.values(), &["1", "10", "1", "100"]);
        // Sources are untouched.
        assert_eq!(left.len(), 2);
    }

    #[test]
    fn test_tuple_to_csv() {
        let tuple = Tuple::from(vec!["1", "20"]);
        assert_eq!(tuple.to_csv(), "1,20");
        assert_eq!(Tuple::default().to_csv(), "");
    }
}
