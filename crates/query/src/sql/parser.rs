//! Recursive-descent parser for SELECT statements.

use super::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::ast::{ColumnRef, CompareOp, Expr, SelectItem, SelectStmt};
use quarry_core::{Error, Result};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Tokenizes `input` and prepares to parse it.
    pub fn new(input: &str) -> Result<Self> {
        Ok(Self {
            tokens: Lexer::new(input).tokenize()?,
            pos: 0,
        })
    }

    /// Parses a single SELECT statement with an optional trailing `;`.
    pub fn parse(&mut self) -> Result<SelectStmt> {
        let stmt = self.parse_select()?;
        self.consume(&TokenKind::Semicolon);
        if !self.check(&TokenKind::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(stmt)
    }

    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.expect_keyword(Keyword::Select)?;
        let distinct = self.consume_keyword(Keyword::Distinct);
        let items = self.parse_select_items()?;

        self.expect_keyword(Keyword::From)?;
        let mut tables = vec![self.expect_ident("table name")?];
        let mut conditions = Vec::new();
        loop {
            if self.consume(&TokenKind::Comma) {
                tables.push(self.expect_ident("table name")?);
            } else if self.check_keyword(Keyword::Join) || self.check_keyword(Keyword::Inner) {
                if self.consume_keyword(Keyword::Inner) {
                    self.expect_keyword(Keyword::Join)?;
                } else {
                    self.advance();
                }
                tables.push(self.expect_ident("table name")?);
                if self.consume_keyword(Keyword::On) {
                    conditions.extend(self.parse_condition()?);
                }
            } else {
                break;
            }
        }

        if self.consume_keyword(Keyword::Where) {
            conditions.extend(self.parse_condition()?);
        }

        let mut group_by = None;
        if self.consume_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            group_by = Some(self.parse_column_list(false)?);
        }

        let mut order_by = None;
        if self.consume_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            order_by = Some(self.parse_column_list(true)?);
        }

        Ok(SelectStmt {
            items,
            tables,
            where_clause: Expr::conjoin(conditions),
            group_by,
            order_by,
            distinct,
        })
    }

    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>> {
        let mut items = vec![self.parse_select_item()?];
        while self.consume(&TokenKind::Comma) {
            items.push(self.parse_select_item()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        if self.consume(&TokenKind::Star) {
            return Ok(SelectItem::Wildcard);
        }
        if self.consume_keyword(Keyword::Sum) {
            self.expect(&TokenKind::LParen, "'('")?;
            let expr = self.parse_product()?;
            self.expect(&TokenKind::RParen, "')'")?;
            return Ok(SelectItem::Sum(expr));
        }
        let table = self.expect_ident("column or SUM(...)")?;
        self.expect(&TokenKind::Dot, "'.' after table name")?;
        if self.consume(&TokenKind::Star) {
            return Ok(SelectItem::Column(ColumnRef::wildcard(table)));
        }
        let column = self.expect_ident("column name")?;
        Ok(SelectItem::Column(ColumnRef::new(table, column)))
    }

    /// Parses `col ("," col)*`, accepting an `ASC` suffix when `ordering`.
    fn parse_column_list(&mut self, ordering: bool) -> Result<Vec<ColumnRef>> {
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column()?);
            if ordering {
                if self.check_keyword(Keyword::Desc) {
                    return Err(Error::unsupported("ORDER BY ... DESC"));
                }
                self.consume_keyword(Keyword::Asc);
            }
            if !self.consume(&TokenKind::Comma) {
                return Ok(columns);
            }
        }
    }

    fn parse_column(&mut self) -> Result<ColumnRef> {
        let table = self.expect_ident("table name")?;
        self.expect(&TokenKind::Dot, "'.' after table name")?;
        let column = self.expect_ident("column name")?;
        Ok(ColumnRef::new(table, column))
    }

    /// Parses `cmp (AND cmp)*` into its comparisons.
    fn parse_condition(&mut self) -> Result<Vec<Expr>> {
        let mut comparisons = vec![self.parse_comparison()?];
        while self.consume_keyword(Keyword::And) {
            comparisons.push(self.parse_comparison()?);
        }
        Ok(comparisons)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_product()?;
        let op = match self.peek_kind() {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Ne => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Le => CompareOp::Le,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Ge => CompareOp::Ge,
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();
        let right = self.parse_product()?;
        Ok(Expr::compare(op, left, right))
    }

    /// Parses `atom ("*" atom)*`. A single atom is returned unwrapped.
    fn parse_product(&mut self) -> Result<Expr> {
        let mut factors = vec![self.parse_atom()?];
        while self.consume(&TokenKind::Star) {
            factors.push(self.parse_atom()?);
        }
        Ok(if factors.len() == 1 {
            factors.remove(0)
        } else {
            Expr::Product(factors)
        })
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let negative = self.consume(&TokenKind::Minus);
        let token = self.current().clone();
        match token.kind {
            TokenKind::Integer(digits) => {
                self.advance();
                let text = if negative { format!("-{}", digits) } else { digits };
                let value = text.parse::<i64>().map_err(|_| {
                    Error::syntax(format!("integer {} out of range", text), token.position)
                })?;
                Ok(Expr::Literal(value))
            }
            TokenKind::Ident(_) if !negative => {
                let col = self.parse_column()?;
                Ok(Expr::Column(col))
            }
            _ => Err(self.unexpected("integer or column")),
        }
    }

    // ---- token helpers ----

    fn current(&self) -> &Token {
        // tokenize() always ends with Eof, and advance() never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<()> {
        if self.consume(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.check(&TokenKind::Keyword(keyword))
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        self.consume(&TokenKind::Keyword(keyword))
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        self.expect(&TokenKind::Keyword(keyword), keyword.as_str())
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.current();
        Error::syntax(
            format!("expected {}, found {}", expected, token.kind),
            token.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<SelectStmt> {
        Parser::new(sql)?.parse()
    }

    #[test]
    fn test_parse_select_all() {
        let stmt = parse("SELECT * FROM R").unwrap();
        assert_eq!(stmt, SelectStmt::new(vec!["R".into()]));
    }

    #[test]
    fn test_parse_full_statement() {
        let stmt = parse(
            "select distinct R.a, SUM(R.b * S.c * 2) from R, S \
             where R.a = S.a and R.b >= -3 group by R.a order by R.a asc;",
        )
        .unwrap();
        assert!(stmt.distinct);
        assert_eq!(stmt.tables, vec!["R", "S"]);
        assert_eq!(
            stmt.items,
            vec![
                SelectItem::Column(ColumnRef::new("R", "a")),
                SelectItem::Sum(Expr::Product(vec![
                    Expr::column("R", "b"),
                    Expr::column("S", "c"),
                    Expr::literal(2),
                ])),
            ]
        );
        assert_eq!(
            stmt.where_clause,
            Some(Expr::and(
                Expr::eq(Expr::column("R", "a"), Expr::column("S", "a")),
                Expr::ge(Expr::column("R", "b"), Expr::literal(-3)),
            ))
        );
        assert_eq!(stmt.group_by, Some(vec![ColumnRef::new("R", "a")]));
        assert_eq!(stmt.order_by, Some(vec![ColumnRef::new("R", "a")]));
    }

    #[test]
    fn test_parse_join_on_is_conjoined_with_where() {
        let stmt = parse("SELECT S.* FROM R INNER JOIN S ON R.a = S.a JOIN T WHERE T.x < 5").unwrap();
        assert_eq!(stmt.tables, vec!["R", "S", "T"]);
        assert_eq!(stmt.items, vec![SelectItem::Column(ColumnRef::wildcard("S"))]);
        assert_eq!(
            stmt.where_clause.unwrap().to_string(),
            "R.a = S.a AND T.x < 5"
        );
    }

    #[test]
    fn test_parse_rejects_desc() {
        let err = parse("SELECT * FROM R ORDER BY R.a DESC").unwrap_err();
        assert!(matches!(err, Error::UnsupportedExpression { .. }));
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse("SELECT * FROM R WHERE R.a").unwrap_err();
        assert_eq!(
            err,
            Error::syntax("expected comparison operator, found end of input", 25)
        );

        let err = parse("SELECT a FROM R").unwrap_err();
        assert_eq!(
            err,
            Error::syntax("expected '.' after table name, found FROM", 9)
        );
    }

    #[test]
    fn test_parse_rejects_trailing_tokens() {
        let err = parse("SELECT * FROM R R").unwrap_err();
        assert!(matches!(err, Error::Syntax { position: 16, .. }));
    }

    #[test]
    fn test_parse_integer_bounds() {
        let stmt = parse("SELECT * FROM R WHERE R.a > -9223372036854775808").unwrap();
        assert_eq!(
            stmt.where_clause,
            Some(Expr::gt(Expr::column("R", "a"), Expr::literal(i64::MIN)))
        );
        assert!(matches!(
            parse("SELECT * FROM R WHERE R.a > 9223372036854775808"),
            Err(Error::Syntax { .. })
        ));
    }
}
