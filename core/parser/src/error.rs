//! FILENAME: core/parser/src/error.rs

use thiserror::Error;

/// Message used for every lexical error.
pub const UNEXPECTED_CHARACTER: &str = "unexpected character";

/// A malformed formula, reported at the character offset that caused it.
#[derive(Error, Debug, PartialEq, Eq, Clone, serde::Serialize, serde::Deserialize)]
#[error("Syntax error at position {position}: {message}")]
pub struct SyntaxError {
    pub position: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        SyntaxError {
            position,
            message: message.into(),
        }
    }

    pub fn unexpected_character(position: usize) -> Self {
        SyntaxError::new(position, UNEXPECTED_CHARACTER)
    }
}

pub type ParseResult<T> = Result<T, SyntaxError>;
