//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for pricing formulas.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. The engine's validator and
//! evaluator then traverse this tree.
//!
//! SUPPORTED EXPRESSIONS:
//! - Literals: Numbers
//! - Variables: price.actual (alias: price), price.compra
//! - Binary operations: +, -, *, /, <, <=, >, >=, ==, !=
//! - Logical operations: AND, OR
//! - Unary operations: - (negation)
//! - Conditionals: IF(cond, then, else)

use serde::{Deserialize, Serialize};

/// Represents a parsed pricing formula.
/// Every node owns its children; the tree is never shared or mutated.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// A numeric literal.
    Number(f64),

    /// A reference to one of the two price inputs.
    Variable(Variable),

    /// A unary operation: op operand (e.g., -5).
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// An arithmetic or comparison operation: left op right.
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A short-circuiting AND/OR.
    LogicalOp {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },

    /// IF(condition, then_branch, else_branch).
    Conditional {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
}

/// The two price inputs a formula can read.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    /// Current sale price (price.actual, or bare price).
    Actual,
    /// Purchase price (price.compra).
    Compra,
}

impl Variable {
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Actual => "actual",
            Variable::Compra => "compra",
        }
    }
}

/// Binary operators for expressions.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    // Comparison operators (lowest precedence)
    Equal,        // ==
    NotEqual,     // !=
    LessThan,     // <
    GreaterThan,  // >
    LessEqual,    // <=
    GreaterEqual, // >=

    // Arithmetic operators
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
}

impl BinaryOperator {
    /// True for the operators that produce a boolean.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterEqual
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Unary operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate, // -
}

impl Expression {
    /// Visits this node and every descendant, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        match self {
            Expression::Number(_) | Expression::Variable(_) => {}
            Expression::UnaryOp { operand, .. } => operand.walk(visit),
            Expression::BinaryOp { left, right, .. }
            | Expression::LogicalOp { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Expression::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.walk(visit);
                then_branch.walk(visit);
                else_branch.walk(visit);
            }
        }
    }

    /// Returns true if any node in the tree satisfies `predicate`.
    pub fn any(&self, mut predicate: impl FnMut(&Expression) -> bool) -> bool {
        let mut found = false;
        self.walk(&mut |node| {
            if !found && predicate(node) {
                found = true;
            }
        });
        found
    }

    pub fn references(&self, variable: Variable) -> bool {
        self.any(|node| matches!(node, Expression::Variable(v) if *v == variable))
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "price.{}", self.name())
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
            BinaryOperator::Equal => write!(f, "=="),
            BinaryOperator::NotEqual => write!(f, "!="),
            BinaryOperator::LessThan => write!(f, "<"),
            BinaryOperator::GreaterThan => write!(f, ">"),
            BinaryOperator::LessEqual => write!(f, "<="),
            BinaryOperator::GreaterEqual => write!(f, ">="),
        }
    }
}

impl std::fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
        }
    }
}

/// Renders the canonical formula text. Every compound sub-expression is
/// parenthesized, so the output parses back to the same tree.
impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::UnaryOp { op, operand } => match operand.as_ref() {
                Expression::Number(_) | Expression::Variable(_) => write!(f, "{}{}", op, operand),
                _ => write!(f, "{}({})", op, operand),
            },
            Expression::BinaryOp { left, op, right } => {
                write_operand(f, left)?;
                write!(f, " {} ", op)?;
                write_operand(f, right)
            }
            Expression::LogicalOp { left, op, right } => {
                write_operand(f, left)?;
                write!(f, " {} ", op)?;
                write_operand(f, right)
            }
            Expression::Conditional {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "IF({}, {}, {})", condition, then_branch, else_branch),
        }
    }
}

fn write_operand(f: &mut std::fmt::Formatter<'_>, expr: &Expression) -> std::fmt::Result {
    match expr {
        Expression::BinaryOp { .. } | Expression::LogicalOp { .. } => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}
