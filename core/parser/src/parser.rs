//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds an Expression tree that can be validated and
//! evaluated.
//!
//! GRAMMAR:
//!   expression     --> logical_or
//!   logical_or     --> logical_and ( "OR" logical_and )*
//!   logical_and    --> comparison ( "AND" comparison )*
//!   comparison     --> additive ( ("<" | "<=" | ">" | ">=" | "==" | "!=") additive )?
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/") unary )*
//!   unary          --> "-" unary | primary
//!   primary        --> NUMBER | VARIABLE | "(" expression ")" | conditional
//!   conditional    --> "IF" "(" expression "," expression "," expression ")"
//!
//! Comparisons do not chain: `a < b < c` is rejected.

use crate::ast::{BinaryOperator, Expression, LogicalOperator, UnaryOperator};
use crate::error::{ParseResult, SyntaxError};
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Number of arguments IF takes.
const IF_ARITY: usize = 3;

/// Deepest nesting of parentheses and IF calls accepted before bailing out.
pub const MAX_NESTING_DEPTH: usize = 128;

/// The Parser holds the token list and a cursor into it.
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    depth: usize,
    /// Synthetic EOF used when the token list does not end with one.
    end: Token,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let end_position = tokens
            .last()
            .map(|t| t.position + t.text.chars().count())
            .unwrap_or(0);
        Parser {
            tokens,
            current: 0,
            depth: 0,
            end: Token::new(TokenKind::EOF, "", end_position),
        }
    }

    /// Parses the entire token stream and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.current_token().is_eof() {
            return Err(SyntaxError::new(
                self.current_token().position,
                "Empty expression",
            ));
        }

        let expr = self.parse_expression()?;

        // Ensure we consumed all tokens
        let token = self.current_token();
        if !token.is_eof() {
            let message = if token.kind == TokenKind::RParen {
                "Unmatched ')'".to_string()
            } else {
                format!("Unexpected token after expression: {}", token)
            };
            return Err(SyntaxError::new(token.position, message));
        }

        Ok(expr)
    }

    fn current_token(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.end)
    }

    fn current_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token. Never moves past EOF.
    fn advance(&mut self) {
        if !self.current_token().is_eof() {
            self.current += 1;
        }
    }

    /// Checks if the current token matches the expected kind.
    /// If it matches, advances and returns Ok. Otherwise returns an error.
    fn expect(&mut self, expected: TokenKind) -> ParseResult<()> {
        if self.current_kind() == expected {
            self.advance();
            Ok(())
        } else {
            let token = self.current_token();
            Err(SyntaxError::new(
                token.position,
                format!("Expected '{}', found {}", expected, token),
            ))
        }
    }

    /// Entry point for expression parsing.
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::new(
                self.current_token().position,
                "Formula is nested too deeply",
            ));
        }
        self.depth += 1;
        let result = self.parse_logical_or();
        self.depth -= 1;
        result
    }

    fn parse_logical_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_logical_and()?;

        while self.current_kind() == TokenKind::Or {
            self.advance();
            let right = self.parse_logical_and()?;

            left = Expression::LogicalOp {
                left: Box::new(left),
                op: LogicalOperator::Or,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_comparison()?;

        while self.current_kind() == TokenKind::And {
            self.advance();
            let right = self.parse_comparison()?;

            left = Expression::LogicalOp {
                left: Box::new(left),
                op: LogicalOperator::And,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses at most one comparison (<, <=, >, >=, ==, !=).
    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let left = self.parse_additive()?;

        let op = match comparison_operator(self.current_kind()) {
            Some(op) => op,
            None => return Ok(left),
        };

        self.advance();
        let right = self.parse_additive()?;

        if comparison_operator(self.current_kind()).is_some() {
            return Err(SyntaxError::new(
                self.current_token().position,
                "Comparison operators cannot be chained",
            ));
        }

        Ok(Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Parses additive expressions (+ and -).
    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_kind() {
                TokenKind::Asterisk => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses unary expressions (negation). Repeated signs are counted
    /// iteratively so `----x` does not recurse once per sign.
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let mut negations = 0usize;
        while self.current_kind() == TokenKind::Minus {
            if negations >= MAX_NESTING_DEPTH {
                return Err(SyntaxError::new(
                    self.current_token().position,
                    "Formula is nested too deeply",
                ));
            }
            self.advance();
            negations += 1;
        }

        let mut expr = self.parse_primary()?;
        for _ in 0..negations {
            expr = Expression::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(expr),
            };
        }

        Ok(expr)
    }

    /// Parses primary expressions (literals, variables, IF, parentheses).
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let position = self.current_token().position;

        match self.current_kind() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expression::Number(n))
            }

            TokenKind::Variable(variable) => {
                self.advance();
                Ok(Expression::Variable(variable))
            }

            TokenKind::If => self.parse_conditional(position),

            // Parenthesized expression
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                if self.current_kind() != TokenKind::RParen {
                    let token = self.current_token();
                    let message = if token.is_eof() {
                        format!("Unmatched '(' opened at position {}", position)
                    } else {
                        format!("Expected ')', found {}", token)
                    };
                    return Err(SyntaxError::new(token.position, message));
                }
                self.advance();
                Ok(expr)
            }

            // Error cases
            TokenKind::EOF => Err(SyntaxError::new(position, "Unexpected end of expression")),

            _ => Err(SyntaxError::new(
                position,
                format!("Unexpected token: {}", self.current_token()),
            )),
        }
    }

    /// Parses IF(cond, then, else). Arguments are full expressions, so
    /// conditionals nest and can appear inside arithmetic.
    fn parse_conditional(&mut self, if_position: usize) -> ParseResult<Expression> {
        // Consume IF
        self.advance();
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::with_capacity(IF_ARITY);

        if self.current_kind() != TokenKind::RParen {
            args.push(self.parse_expression()?);

            // Parse remaining arguments separated by commas
            while self.current_kind() == TokenKind::Comma {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }

        if self.current_kind() != TokenKind::RParen {
            let token = self.current_token();
            let message = if token.is_eof() {
                format!("Unmatched '(' in IF opened at position {}", if_position)
            } else {
                format!("Expected ',' or ')' in IF, found {}", token)
            };
            return Err(SyntaxError::new(token.position, message));
        }
        self.advance();

        let [condition, then_branch, else_branch]: [Expression; IF_ARITY] =
            args.try_into().map_err(|args: Vec<Expression>| {
                SyntaxError::new(
                    if_position,
                    format!(
                        "IF expects exactly {} arguments, found {}",
                        IF_ARITY,
                        args.len()
                    ),
                )
            })?;

        Ok(Expression::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }
}

fn comparison_operator(kind: TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::EqualEqual => Some(BinaryOperator::Equal),
        TokenKind::NotEqual => Some(BinaryOperator::NotEqual),
        TokenKind::LessThan => Some(BinaryOperator::LessThan),
        TokenKind::GreaterThan => Some(BinaryOperator::GreaterThan),
        TokenKind::LessEqual => Some(BinaryOperator::LessEqual),
        TokenKind::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        _ => None,
    }
}

/// Parses an already tokenized formula.
pub fn parse(tokens: &[Token]) -> ParseResult<Expression> {
    Parser::new(tokens).parse()
}

/// Convenience function to tokenize and parse a formula string directly.
pub fn parse_formula(source: &str) -> ParseResult<Expression> {
    let tokens = tokenize(source)?;
    parse(&tokens)
}
