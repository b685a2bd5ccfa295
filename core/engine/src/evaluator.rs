//! FILENAME: core/engine/src/evaluator.rs
//! PURPOSE: Evaluates pricing formula ASTs against an Environment.
//! CONTEXT: After a formula is parsed into an AST, this module traverses
//! the tree and computes the final result. It is a pure tree walk: the
//! environment is only read, and the same AST and environment always give
//! the same outcome.
//!
//! SUPPORTED FEATURES:
//! - Literal evaluation: Numbers
//! - Variable lookup: price.actual, price.compra
//! - Binary operations: +, -, *, /, ==, !=, <, >, <=, >=
//! - Logical operations: AND, OR (short-circuit)
//! - Unary operations: - (negation)
//! - Conditionals: IF(cond, then, else), evaluating only the taken branch
//!
//! There is no coercion between numbers and booleans anywhere.

use crate::environment::Environment;
use formula_parser::{BinaryOperator, Expression, LogicalOperator, UnaryOperator, Variable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The result of evaluating a formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EvaluationOutcome {
    Number(f64),
    Boolean(bool),
}

/// The type of an outcome, used when reporting mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Number,
    Boolean,
}

impl EvaluationOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            EvaluationOutcome::Number(_) => OutcomeKind::Number,
            EvaluationOutcome::Boolean(_) => OutcomeKind::Boolean,
        }
    }

    /// Returns the number, if this is a numeric outcome. Booleans are not
    /// converted.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EvaluationOutcome::Number(n) => Some(*n),
            EvaluationOutcome::Boolean(_) => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            EvaluationOutcome::Boolean(b) => Some(*b),
            EvaluationOutcome::Number(_) => None,
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Number => write!(f, "number"),
            OutcomeKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// Failures of a single evaluation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationError {
    #[error("Missing value for {0}")]
    MissingVariable(Variable),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: OutcomeKind,
        found: OutcomeKind,
    },

    #[error("Division by zero")]
    DivisionByZero,
}

pub type EvalResult = Result<EvaluationOutcome, EvaluationError>;

/// The formula evaluator.
/// Holds a reference to the environment for variable lookups.
pub struct Evaluator<'a> {
    env: &'a Environment,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Evaluator { env }
    }

    /// Evaluates an AST expression and returns the result.
    pub fn evaluate(&self, expr: &Expression) -> EvalResult {
        match expr {
            Expression::Number(n) => Ok(EvaluationOutcome::Number(*n)),
            Expression::Variable(variable) => self.eval_variable(*variable),
            Expression::UnaryOp { op, operand } => self.eval_unary_op(op, operand),
            Expression::BinaryOp { left, op, right } => self.eval_binary_op(left, op, right),
            Expression::LogicalOp { left, op, right } => self.eval_logical_op(left, op, right),
            Expression::Conditional {
                condition,
                then_branch,
                else_branch,
            } => self.eval_conditional(condition, then_branch, else_branch),
        }
    }

    fn eval_variable(&self, variable: Variable) -> EvalResult {
        self.env
            .get(variable)
            .map(EvaluationOutcome::Number)
            .ok_or(EvaluationError::MissingVariable(variable))
    }

    /// Evaluates a sub-expression that must produce a number.
    fn eval_number(&self, expr: &Expression) -> Result<f64, EvaluationError> {
        match self.evaluate(expr)? {
            EvaluationOutcome::Number(n) => Ok(n),
            other => Err(EvaluationError::TypeMismatch {
                expected: OutcomeKind::Number,
                found: other.kind(),
            }),
        }
    }

    /// Evaluates a sub-expression that must produce a boolean.
    fn eval_boolean(&self, expr: &Expression) -> Result<bool, EvaluationError> {
        match self.evaluate(expr)? {
            EvaluationOutcome::Boolean(b) => Ok(b),
            other => Err(EvaluationError::TypeMismatch {
                expected: OutcomeKind::Boolean,
                found: other.kind(),
            }),
        }
    }

    fn eval_unary_op(&self, op: &UnaryOperator, operand: &Expression) -> EvalResult {
        let value = self.eval_number(operand)?;
        match op {
            UnaryOperator::Negate => Ok(EvaluationOutcome::Number(-value)),
        }
    }

    /// Evaluates an arithmetic or comparison operation. Both sides are
    /// always evaluated, left first.
    fn eval_binary_op(
        &self,
        left: &Expression,
        op: &BinaryOperator,
        right: &Expression,
    ) -> EvalResult {
        let l = self.eval_number(left)?;
        let r = self.eval_number(right)?;

        match op {
            // Arithmetic operations
            BinaryOperator::Add => Ok(EvaluationOutcome::Number(l + r)),
            BinaryOperator::Subtract => Ok(EvaluationOutcome::Number(l - r)),
            BinaryOperator::Multiply => Ok(EvaluationOutcome::Number(l * r)),
            BinaryOperator::Divide => {
                if r == 0.0 {
                    Err(EvaluationError::DivisionByZero)
                } else {
                    Ok(EvaluationOutcome::Number(l / r))
                }
            }

            // Comparison operations
            BinaryOperator::Equal => Ok(EvaluationOutcome::Boolean(numbers_equal(l, r))),
            BinaryOperator::NotEqual => Ok(EvaluationOutcome::Boolean(!numbers_equal(l, r))),
            BinaryOperator::LessThan => Ok(EvaluationOutcome::Boolean(l < r)),
            BinaryOperator::GreaterThan => Ok(EvaluationOutcome::Boolean(l > r)),
            BinaryOperator::LessEqual => Ok(EvaluationOutcome::Boolean(l <= r)),
            BinaryOperator::GreaterEqual => Ok(EvaluationOutcome::Boolean(l >= r)),
        }
    }

    /// AND stops at the first false, OR at the first true. The right side
    /// is only evaluated (and type-checked) when it decides the result.
    fn eval_logical_op(
        &self,
        left: &Expression,
        op: &LogicalOperator,
        right: &Expression,
    ) -> EvalResult {
        let l = self.eval_boolean(left)?;

        let result = match op {
            LogicalOperator::And => l && self.eval_boolean(right)?,
            LogicalOperator::Or => l || self.eval_boolean(right)?,
        };

        Ok(EvaluationOutcome::Boolean(result))
    }

    /// Only the selected branch is evaluated, so the other one may contain
    /// e.g. a division that would fail.
    fn eval_conditional(
        &self,
        condition: &Expression,
        then_branch: &Expression,
        else_branch: &Expression,
    ) -> EvalResult {
        if self.eval_boolean(condition)? {
            self.evaluate(then_branch)
        } else {
            self.evaluate(else_branch)
        }
    }
}

fn numbers_equal(l: f64, r: f64) -> bool {
    (l - r).abs() < f64::EPSILON
}

/// Evaluates `ast` against a single environment.
pub fn evaluate(ast: &Expression, env: &Environment) -> EvalResult {
    Evaluator::new(env).evaluate(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula_parser::parse_formula;

    fn eval(formula: &str, env: &Environment) -> EvalResult {
        let ast = parse_formula(formula).unwrap();
        evaluate(&ast, env)
    }

    fn eval_empty(formula: &str) -> EvalResult {
        eval(formula, &Environment::default())
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval_empty("2 + 3 * 4"), Ok(EvaluationOutcome::Number(14.0)));
        assert_eq!(eval_empty("(2 + 3) * 4"), Ok(EvaluationOutcome::Number(20.0)));
        assert_eq!(eval_empty("10 - 4 - 3"), Ok(EvaluationOutcome::Number(3.0)));
        assert_eq!(eval_empty("100 / 10 / 2"), Ok(EvaluationOutcome::Number(5.0)));
        assert_eq!(eval_empty("-2 * -3"), Ok(EvaluationOutcome::Number(6.0)));
    }

    #[test]
    fn test_variable_lookup() {
        let env = Environment::default().with_actual(10000.0).with_compra(40000.0);

        let result = eval("price.actual * 1.1", &env).unwrap();
        match result {
            EvaluationOutcome::Number(n) => assert!((n - 11000.0).abs() < 1e-6),
            other => panic!("Expected numeric result, got {:?}", other),
        }

        assert_eq!(eval("price", &env), Ok(EvaluationOutcome::Number(10000.0)));
        assert_eq!(eval("price.compra", &env), Ok(EvaluationOutcome::Number(40000.0)));
    }

    #[test]
    fn test_missing_variable() {
        let env = Environment::default().with_actual(5.0);
        assert_eq!(
            eval("price.compra * 2", &env),
            Err(EvaluationError::MissingVariable(Variable::Compra))
        );
        assert_eq!(
            eval_empty("price.actual"),
            Err(EvaluationError::MissingVariable(Variable::Actual))
        );
    }

    #[test]
    fn test_conditional_pricing() {
        let formula = "IF(price.compra > 33000, price.compra*2+5800, price.compra*2)";

        let high = Environment::default().with_compra(40000.0);
        assert_eq!(eval(formula, &high), Ok(EvaluationOutcome::Number(85800.0)));

        let low = Environment::default().with_compra(20000.0);
        assert_eq!(eval(formula, &low), Ok(EvaluationOutcome::Number(40000.0)));
    }

    #[test]
    fn test_conditional_skips_untaken_branch() {
        let env = Environment::default().with_compra(5.0);
        assert_eq!(
            eval("IF(price.compra > 0, 1, 1/0)", &env),
            Ok(EvaluationOutcome::Number(1.0))
        );
        // A missing variable in the untaken branch is never looked up
        assert_eq!(
            eval("IF(price.compra > 0, 2, price.actual)", &env),
            Ok(EvaluationOutcome::Number(2.0))
        );
    }

    #[test]
    fn test_conditional_may_return_boolean() {
        assert_eq!(
            eval_empty("IF(1 < 2, 3 > 4, 5)"),
            Ok(EvaluationOutcome::Boolean(false))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval_empty("1 / 0"), Err(EvaluationError::DivisionByZero));
        assert_eq!(eval_empty("1 / (2 - 2)"), Err(EvaluationError::DivisionByZero));
        assert_eq!(eval_empty("0 / 5"), Ok(EvaluationOutcome::Number(0.0)));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_empty("1 < 2"), Ok(EvaluationOutcome::Boolean(true)));
        assert_eq!(eval_empty("2 <= 2"), Ok(EvaluationOutcome::Boolean(true)));
        assert_eq!(eval_empty("1 > 2"), Ok(EvaluationOutcome::Boolean(false)));
        assert_eq!(eval_empty("3 >= 4"), Ok(EvaluationOutcome::Boolean(false)));
        assert_eq!(eval_empty("0.1 + 0.2 == 0.3"), Ok(EvaluationOutcome::Boolean(true)));
        assert_eq!(eval_empty("1 != 1"), Ok(EvaluationOutcome::Boolean(false)));
    }

    #[test]
    fn test_logical_short_circuit() {
        // Right side would divide by zero if evaluated
        assert_eq!(
            eval_empty("1 > 2 AND 1 / 0 > 0"),
            Ok(EvaluationOutcome::Boolean(false))
        );
        assert_eq!(
            eval_empty("1 < 2 OR 1 / 0 > 0"),
            Ok(EvaluationOutcome::Boolean(true))
        );
        assert_eq!(
            eval_empty("1 < 2 AND 1 / 0 > 0"),
            Err(EvaluationError::DivisionByZero)
        );
        // Non-boolean right side is skipped too when it doesn't matter
        assert_eq!(eval_empty("1 > 2 AND 5"), Ok(EvaluationOutcome::Boolean(false)));
    }

    #[test]
    fn test_logical_type_mismatch() {
        let mismatch = Err(EvaluationError::TypeMismatch {
            expected: OutcomeKind::Boolean,
            found: OutcomeKind::Number,
        });
        assert_eq!(eval_empty("5 AND 1 < 2"), mismatch);
        assert_eq!(eval_empty("1 < 2 AND 5"), mismatch);
        assert_eq!(eval_empty("1 > 2 OR 5"), mismatch);
        assert_eq!(eval_empty("IF(1, 2, 3)"), mismatch);
    }

    #[test]
    fn test_arithmetic_type_mismatch() {
        let mismatch = Err(EvaluationError::TypeMismatch {
            expected: OutcomeKind::Number,
            found: OutcomeKind::Boolean,
        });
        assert_eq!(eval_empty("(1 < 2) + 1"), mismatch);
        assert_eq!(eval_empty("-(1 < 2)"), mismatch);
        assert_eq!(eval_empty("(1 < 2) == (2 < 3)"), mismatch);
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let ast = parse_formula("IF(price.compra > 10, price.compra * 1.21, price.actual / 3)").unwrap();
        let env = Environment::new(Some(7.0), Some(3.0));

        let first = evaluate(&ast, &env);
        let second = evaluate(&ast, &env);
        assert_eq!(first, second);
        if let (Ok(EvaluationOutcome::Number(a)), Ok(EvaluationOutcome::Number(b))) = (first, second) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EvaluationError::MissingVariable(Variable::Compra).to_string(),
            "Missing value for price.compra"
        );
        assert_eq!(
            EvaluationError::TypeMismatch {
                expected: OutcomeKind::Boolean,
                found: OutcomeKind::Number,
            }
            .to_string(),
            "Type mismatch: expected boolean, found number"
        );
    }
}
