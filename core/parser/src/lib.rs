//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the pricing formula parser.
//! CONTEXT: This module exposes the lexer, parser, and AST components
//! needed to convert formula strings into expression trees.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST --> Validator / Evaluator
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, /
//! - Comparison: ==, !=, <, >, <=, >=
//! - Logical: AND, OR (case-insensitive)
//! - Variables: price.actual (or price), price.compra
//! - Conditionals: IF(price.compra > 100, price.compra * 2, price.compra * 3)
//! - Parentheses for grouping
//! - Unary negation: -5

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{BinaryOperator, Expression, LogicalOperator, UnaryOperator, Variable};
pub use error::{ParseResult, SyntaxError};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, parse_formula, Parser, MAX_NESTING_DEPTH};
pub use token::{Token, TokenCategory, TokenKind};
