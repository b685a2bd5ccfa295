//! FILENAME: core/engine/src/validator.rs
//! PURPOSE: Context-specific acceptance rules for parsed formulas.
//! CONTEXT: A formula can be syntactically fine and still be wrong for
//! where it is used. These checks walk the AST, so they are exact and not
//! affected by whitespace or formatting of the original text.

use formula_parser::{Expression, Variable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the formula is going to be applied. Supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationContext {
    /// Operator-driven bulk update of an existing price list.
    #[default]
    Manual,
    /// Price list generated from purchase prices: formulas must be based
    /// on price.compra only.
    AutoPriceList,
}

/// The rule a formula broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationRule {
    MustNotReferenceActual,
    MustReferenceCompra,
    LogicalRequiresComparison,
}

impl ValidationRule {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationRule::MustNotReferenceActual => "must not reference actual",
            ValidationRule::MustReferenceCompra => "must reference compra",
            ValidationRule::LogicalRequiresComparison => {
                "AND/OR require a boolean-producing comparison"
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Invalid formula: {message}")]
pub struct ValidationError {
    pub rule: ValidationRule,
    pub message: String,
}

impl From<ValidationRule> for ValidationError {
    fn from(rule: ValidationRule) -> Self {
        ValidationError {
            rule,
            message: rule.message().to_string(),
        }
    }
}

/// What a single walk of the tree found.
#[derive(Default)]
struct FormulaShape {
    references_actual: bool,
    references_compra: bool,
    has_logical: bool,
    has_comparison: bool,
}

impl FormulaShape {
    fn of(ast: &Expression) -> Self {
        let mut shape = FormulaShape::default();
        ast.walk(&mut |node| match node {
            Expression::Variable(Variable::Actual) => shape.references_actual = true,
            Expression::Variable(Variable::Compra) => shape.references_compra = true,
            Expression::LogicalOp { .. } => shape.has_logical = true,
            Expression::BinaryOp { op, .. } if op.is_comparison() => shape.has_comparison = true,
            _ => {}
        });
        shape
    }
}

/// Checks `ast` against the rules of `ctx`. An empty list means valid.
///
/// In `AutoPriceList` the variable rules are one group: a formula that reads
/// price.actual is reported for that alone, not also for lacking price.compra.
pub fn validate(ast: &Expression, ctx: ValidationContext) -> Vec<ValidationError> {
    let shape = FormulaShape::of(ast);
    let mut errors = Vec::new();

    if ctx == ValidationContext::AutoPriceList {
        if shape.references_actual {
            errors.push(ValidationRule::MustNotReferenceActual.into());
        } else if !shape.references_compra {
            errors.push(ValidationRule::MustReferenceCompra.into());
        }
    }

    if shape.has_logical && !shape.has_comparison {
        errors.push(ValidationRule::LogicalRequiresComparison.into());
    }

    errors
}
