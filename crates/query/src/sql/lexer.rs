//! SQL lexer.
//!
//! Converts query text into [`Token`]s. Keywords are case-insensitive,
//! identifiers keep their spelling. `--` starts a comment that runs to the
//! end of the line.

use core::fmt;
use quarry_core::{Error, Result};

/// Reserved words of the supported dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Select,
    Distinct,
    From,
    Inner,
    Join,
    On,
    Where,
    And,
    Group,
    Order,
    By,
    Asc,
    Desc,
    Sum,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        let keyword = match word.to_ascii_uppercase().as_str() {
            "SELECT" => Keyword::Select,
            "DISTINCT" => Keyword::Distinct,
            "FROM" => Keyword::From,
            "INNER" => Keyword::Inner,
            "JOIN" => Keyword::Join,
            "ON" => Keyword::On,
            "WHERE" => Keyword::Where,
            "AND" => Keyword::And,
            "GROUP" => Keyword::Group,
            "ORDER" => Keyword::Order,
            "BY" => Keyword::By,
            "ASC" => Keyword::Asc,
            "DESC" => Keyword::Desc,
            "SUM" => Keyword::Sum,
            _ => return None,
        };
        Some(keyword)
    }

    /// Returns the canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::Distinct => "DISTINCT",
            Keyword::From => "FROM",
            Keyword::Inner => "INNER",
            Keyword::Join => "JOIN",
            Keyword::On => "ON",
            Keyword::Where => "WHERE",
            Keyword::And => "AND",
            Keyword::Group => "GROUP",
            Keyword::Order => "ORDER",
            Keyword::By => "BY",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::Sum => "SUM",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident(String),
    /// Unsigned integer literal, kept as written so the parser can apply a sign.
    Integer(String),
    Comma,
    Dot,
    Star,
    Minus,
    LParen,
    RParen,
    Semicolon,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => f.write_str(kw.as_str()),
            TokenKind::Ident(name) => write!(f, "identifier `{}`", name),
            TokenKind::Integer(digits) => write!(f, "integer {}", digits),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::Eq => f.write_str("'='"),
            TokenKind::Ne => f.write_str("'!='"),
            TokenKind::Lt => f.write_str("'<'"),
            TokenKind::Le => f.write_str("'<='"),
            TokenKind::Gt => f.write_str("'>'"),
            TokenKind::Ge => f.write_str("'>='"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(ch) = self.peek(0) {
                self.pos += ch.len_utf8();
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek(0).is_some_and(char::is_whitespace) {
                self.advance(1);
            }
            if self.input[self.pos..].starts_with("--") {
                while let Some(ch) = self.peek(0) {
                    self.advance(1);
                    if ch == '\n' {
                        break;
                    }
                }
                continue;
            }
            return;
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let Some(ch) = self.peek(0) else {
            return Ok(Token::new(TokenKind::Eof, start));
        };

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.read_word(start));
        }
        if ch.is_ascii_digit() {
            return Ok(self.read_integer(start));
        }

        let (kind, len) = match (ch, self.peek(1)) {
            ('<', Some('=')) => (TokenKind::Le, 2),
            ('<', Some('>')) => (TokenKind::Ne, 2),
            ('>', Some('=')) => (TokenKind::Ge, 2),
            ('!', Some('=')) => (TokenKind::Ne, 2),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', _) => (TokenKind::Gt, 1),
            ('=', _) => (TokenKind::Eq, 1),
            (',', _) => (TokenKind::Comma, 1),
            ('.', _) => (TokenKind::Dot, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            (';', _) => (TokenKind::Semicolon, 1),
            (other, _) => {
                return Err(Error::syntax(
                    format!("unexpected character '{}'", other),
                    start,
                ))
            }
        };
        self.advance(len);
        Ok(Token::new(kind, start))
    }

    fn read_word(&mut self, start: usize) -> Token {
        while self
            .peek(0)
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            self.advance(1);
        }
        let word = &self.input[start..self.pos];
        let kind = match Keyword::lookup(word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(word.to_string()),
        };
        Token::new(kind, start)
    }

    fn read_integer(&mut self, start: usize) -> Token {
        while self.peek(0).is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance(1);
        }
        Token::new(
            TokenKind::Integer(self.input[start..self.pos].to_string()),
            start,
        )
    }
}
