//! Parsed SELECT statement.

use super::expr::{ColumnRef, Expr};
use core::fmt;

/// One item of the select list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectItem {
    /// `*`: every column of every table, in join order.
    Wildcard,
    /// A column, or `table.*`.
    Column(ColumnRef),
    /// `SUM(expr)` where `expr` is a literal, a column or a product of those.
    Sum(Expr),
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Wildcard => f.write_str("*"),
            SelectItem::Column(col) => write!(f, "{}", col),
            SelectItem::Sum(expr) => write!(f, "SUM({})", expr),
        }
    }
}

/// A SELECT statement as produced by the SQL front end.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectStmt {
    /// Select list.
    pub items: Vec<SelectItem>,
    /// FROM / JOIN tables, in declared order. This is the join order.
    pub tables: Vec<String>,
    /// WHERE predicate, with any ON conditions conjoined.
    pub where_clause: Option<Expr>,
    /// GROUP BY columns.
    pub group_by: Option<Vec<ColumnRef>>,
    /// ORDER BY columns (ascending).
    pub order_by: Option<Vec<ColumnRef>>,
    /// DISTINCT flag.
    pub distinct: bool,
}

impl SelectStmt {
    /// Creates a `SELECT * FROM <tables>` statement.
    pub fn new(tables: Vec<String>) -> Self {
        Self {
            items: vec![SelectItem::Wildcard],
            tables,
            ..Default::default()
        }
    }

    /// Sets the select list.
    pub fn with_items(mut self, items: Vec<SelectItem>) -> Self {
        self.items = items;
        self
    }

    /// Sets the WHERE predicate.
    pub fn with_where(mut self, predicate: Expr) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    /// Sets the GROUP BY columns.
    pub fn with_group_by(mut self, columns: Vec<ColumnRef>) -> Self {
        self.group_by = Some(columns);
        self
    }

    /// Sets the ORDER BY columns.
    pub fn with_order_by(mut self, columns: Vec<ColumnRef>) -> Self {
        self.order_by = Some(columns);
        self
    }

    /// Sets the DISTINCT flag.
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Returns true if the select list is a single `*`.
    pub fn is_select_all(&self) -> bool {
        matches!(self.items.as_slice(), [SelectItem::Wildcard])
    }

    /// Returns the expressions inside `SUM(...)`, in declared order.
    pub fn sum_expressions(&self) -> Vec<&Expr> {
        self.items
            .iter()
            .filter_map(|item| match item {
                SelectItem::Sum(expr) => Some(expr),
                _ => None,
            })
            .collect()
    }

    /// Returns true if the statement needs the group-aggregate operator.
    pub fn is_aggregate(&self) -> bool {
        self.group_by.is_some() || self.items.iter().any(|i| matches!(i, SelectItem::Sum(_)))
    }
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        let items: Vec<String> = self.items.iter().map(|i| i.to_string()).collect();
        write!(f, "{} FROM {}", items.join(", "), self.tables.join(", "))?;
        if let Some(pred) = &self.where_clause {
            write!(f, " WHERE {}", pred)?;
        }
        if let Some(cols) = &self.group_by {
            let cols: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
            write!(f, " GROUP BY {}", cols.join(", "))?;
        }
        if let Some(cols) = &self.order_by {
            let cols: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
            write!(f, " ORDER BY {}", cols.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all() {
        let stmt = SelectStmt::new(vec!["R".into()]);
        assert!(stmt.is_select_all());
        assert!(!stmt.is_aggregate());
    }

    #[test]
    fn test_aggregate_detection() {
        let stmt = SelectStmt::new(vec!["R".into()]).with_items(vec![SelectItem::Sum(Expr::literal(1))]);
        assert!(stmt.is_aggregate());
        assert_eq!(stmt.sum_expressions(), vec![&Expr::Literal(1)]);

        let stmt = SelectStmt::new(vec!["R".into()])
            .with_items(vec![SelectItem::Column(ColumnRef::new("R", "a"))])
            .with_group_by(vec![ColumnRef::new("R", "a")]);
        assert!(stmt.is_aggregate());
    }

    #[test]
    fn test_display() {
        let stmt = SelectStmt::new(vec!["R".into(), "S".into()])
            .with_items(vec![
                SelectItem::Column(ColumnRef::new("R", "a")),
                SelectItem::Sum(Expr::column("R", "b")),
            ])
            .with_where(Expr::eq(Expr::column("R", "a"), Expr::column("S", "a")))
            .with_group_by(vec![ColumnRef::new("R", "a")]);
        assert_eq!(
            stmt.to_string(),
            "SELECT R.a, SUM(R.b) FROM R, S WHERE R.a = S.a GROUP BY R.a"
        );
    }
}
