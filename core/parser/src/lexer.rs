//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw pricing formula and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, number parsing, the dotted price identifiers,
//! case-insensitive keywords and two-character operators like <= and ==.
//!
//! SUPPORTED OPERATORS:
//! - Single char: + - * / < > ( ) ,
//! - Multi char: <= >= == !=
//! - Identifiers: price, price.actual, price.compra
//! - Keywords: AND, OR, IF (any case)
//!
//! Every character outside this alphabet is a SyntaxError. Nothing is
//! stripped or skipped besides whitespace.

use crate::ast::Variable;
use crate::error::{ParseResult, SyntaxError};
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    /// Character offset of the next unread character.
    position: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
            position: 0,
            finished: false,
        }
    }

    /// Advances the lexer and returns the next token.
    /// Once the input is exhausted this keeps returning EOF.
    pub fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace();

        let start = self.position;
        let ch = match self.bump() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::EOF, "", start)),
        };

        let single =
            |kind: TokenKind| -> ParseResult<Token> { Ok(Token::new(kind, ch.to_string(), start)) };

        match ch {
            '+' => single(TokenKind::Plus),
            '-' => single(TokenKind::Minus),
            '*' => single(TokenKind::Asterisk),
            '/' => single(TokenKind::Slash),
            '(' => single(TokenKind::LParen),
            ')' => single(TokenKind::RParen),
            ',' => single(TokenKind::Comma),

            // < and <=
            '<' => Ok(self.read_with_optional_equals(
                start,
                '<',
                TokenKind::LessThan,
                TokenKind::LessEqual,
            )),

            // > and >=
            '>' => Ok(self.read_with_optional_equals(
                start,
                '>',
                TokenKind::GreaterThan,
                TokenKind::GreaterEqual,
            )),

            // == only; a lone '=' is not part of the language
            '=' => self.read_required_equals(start, '=', TokenKind::EqualEqual),

            // != only
            '!' => self.read_required_equals(start, '!', TokenKind::NotEqual),

            ch if ch.is_ascii_digit() || ch == '.' => self.read_number(start, ch),

            ch if ch.is_ascii_alphabetic() => self.read_word(start, ch),

            _ => Err(SyntaxError::unexpected_character(start)),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.input.next()?;
        self.position += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn read_with_optional_equals(
        &mut self,
        start: usize,
        first: char,
        bare: TokenKind,
        with_equals: TokenKind,
    ) -> Token {
        if self.input.peek() == Some(&'=') {
            self.bump();
            Token::new(with_equals, format!("{}=", first), start)
        } else {
            Token::new(bare, first.to_string(), start)
        }
    }

    fn read_required_equals(
        &mut self,
        start: usize,
        first: char,
        kind: TokenKind,
    ) -> ParseResult<Token> {
        if self.input.peek() == Some(&'=') {
            self.bump();
            Ok(Token::new(kind, format!("{}=", first), start))
        } else {
            Err(SyntaxError::unexpected_character(start))
        }
    }

    fn read_number(&mut self, start: usize, first_char: char) -> ParseResult<Token> {
        let mut number_str = String::from(first_char);
        let mut has_dot = first_char == '.';

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.bump();
            } else if ch == '.' {
                if has_dot {
                    // A second '.' can never continue a literal
                    return Err(SyntaxError::unexpected_character(self.position));
                }
                has_dot = true;
                number_str.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        match number_str.parse::<f64>() {
            Ok(n) => Ok(Token::new(TokenKind::Number(n), number_str, start)),
            // Just "."
            Err(_) => Err(SyntaxError::unexpected_character(start)),
        }
    }

    /// Reads a run of identifier characters and resolves it to a price
    /// variable or a keyword. Unknown words are rejected as a whole.
    fn read_word(&mut self, start: usize, first_char: char) -> ParseResult<Token> {
        let mut word = String::from(first_char);

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                word.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        let kind = match word.as_str() {
            "price" | "price.actual" => TokenKind::Variable(Variable::Actual),
            "price.compra" => TokenKind::Variable(Variable::Compra),
            _ => match word.to_ascii_uppercase().as_str() {
                "AND" => TokenKind::And,
                "OR" => TokenKind::Or,
                "IF" => TokenKind::If,
                _ => return Err(SyntaxError::unexpected_character(start)),
            },
        };

        Ok(Token::new(kind, word, start))
    }
}

impl Iterator for Lexer<'_> {
    type Item = ParseResult<Token>;

    /// Yields tokens up to and including the first EOF or error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(token) if !token.is_eof() => {}
            _ => self.finished = true,
        }
        Some(result)
    }
}

/// Tokenizes a whole formula. The returned list always ends with EOF.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    Lexer::new(source).collect()
}
