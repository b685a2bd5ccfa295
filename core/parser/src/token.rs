//! FILENAME: core/parser/src/token.rs
//! PURPOSE: Token definitions for the pricing formula lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the parser.
//! Each token remembers the exact source text it was read from and the
//! character offset where it starts, so errors can point at the input box.

use crate::ast::Variable;

/// The concrete kind of a token.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TokenKind {
    // Literals
    Number(f64),
    /// price, price.actual or price.compra
    Variable(Variable),

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    EqualEqual,
    NotEqual,

    // Delimiters
    LParen,
    RParen,
    Comma,

    // Keywords (case-insensitive in the source)
    And,
    Or,
    If,

    // Special
    EOF,
}

/// Coarse grouping of token kinds, used in error messages and by callers
/// that highlight formula text.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenCategory {
    NumberLiteral,
    Identifier,
    Operator,
    Punctuation,
    Keyword,
    End,
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::Number(_) => TokenCategory::NumberLiteral,
            TokenKind::Variable(_) => TokenCategory::Identifier,
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::LessThan
            | TokenKind::LessEqual
            | TokenKind::GreaterThan
            | TokenKind::GreaterEqual
            | TokenKind::EqualEqual
            | TokenKind::NotEqual => TokenCategory::Operator,
            TokenKind::LParen | TokenKind::RParen | TokenKind::Comma => {
                TokenCategory::Punctuation
            }
            TokenKind::And | TokenKind::Or | TokenKind::If => TokenCategory::Keyword,
            TokenKind::EOF => TokenCategory::End,
        }
    }
}

/// A single lexed token.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact slice of the formula this token was read from.
    pub text: String,
    /// 0-based character offset of the first character of the token.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EOF
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Variable(v) => write!(f, "{}", v),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Asterisk => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::And => write!(f, "AND"),
            TokenKind::Or => write!(f, "OR"),
            TokenKind::If => write!(f, "IF"),
            TokenKind::EOF => write!(f, "end of formula"),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_eof() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "'{}'", self.text)
        }
    }
}
