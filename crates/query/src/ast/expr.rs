//! Expression AST definitions.

use core::fmt;

/// Column name that stands for every column of a table.
pub const WILDCARD: &str = "*";

/// Qualified reference to a column (`table.column`) or to all columns of a
/// table (`table.*`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name.
    pub table: String,
    /// Column name, or [`WILDCARD`].
    pub column: String,
}

impl ColumnRef {
    /// Creates a new column reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a reference to all columns of a table.
    pub fn wildcard(table: impl Into<String>) -> Self {
        Self::new(table, WILDCARD)
    }

    /// Returns true if this references every column of the table.
    pub fn is_wildcard(&self) -> bool {
        self.column == WILDCARD
    }

    /// Returns the normalized name (table.column).
    pub fn normalized_name(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Applies the comparison to two integers.
    pub fn apply(self, left: i64, right: i64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }

    /// Returns the SQL symbol for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Expression AST node.
///
/// Covers WHERE predicates (conjunctions of comparisons) and the products
/// used inside `SUM(...)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal.
    Literal(i64),
    /// Column reference.
    Column(ColumnRef),
    /// Conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Comparison of two integer-valued operands.
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Product of factors.
    Product(Vec<Expr>),
}

impl Expr {
    /// Creates a column reference expression.
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::new(table, column))
    }

    /// Creates an integer literal expression.
    pub fn literal(value: i64) -> Self {
        Expr::Literal(value)
    }

    /// Creates a comparison expression.
    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates an equality expression.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    /// Creates a not-equal expression.
    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Ne, left, right)
    }

    /// Creates a less-than expression.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Lt, left, right)
    }

    /// Creates a less-than-or-equal expression.
    pub fn le(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Le, left, right)
    }

    /// Creates a greater-than expression.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Gt, left, right)
    }

    /// Creates a greater-than-or-equal expression.
    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Ge, left, right)
    }

    /// Creates a conjunction.
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    /// Folds a list of predicates into a left-nested conjunction.
    pub fn conjoin(predicates: Vec<Expr>) -> Option<Expr> {
        predicates.into_iter().reduce(Expr::and)
    }

    /// Returns the conjuncts of this expression, flattening nested ANDs.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        self.collect_conjuncts(&mut out);
        out
    }

    fn collect_conjuncts<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            Expr::And(left, right) => {
                left.collect_conjuncts(out);
                right.collect_conjuncts(out);
            }
            other => out.push(other),
        }
    }

    /// Returns every column referenced by this expression, in order of appearance.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Column(col) => out.push(col),
            Expr::And(left, right) | Expr::Compare { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Product(factors) => {
                for factor in factors {
                    factor.collect_columns(out);
                }
            }
        }
    }

    /// Returns the distinct tables referenced by this expression.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for col in self.columns() {
            if !tables.contains(&col.table.as_str()) {
                tables.push(col.table.as_str());
            }
        }
        tables
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Column(col) => write!(f, "{}", col),
            Expr::And(left, right) => write!(f, "{} AND {}", left, right),
            Expr::Compare { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Expr::Product(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" * ")?;
                    }
                    write!(f, "{}", factor)?;
                }
                Ok(())
            }
        }
    }
}
