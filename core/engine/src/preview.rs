//! FILENAME: core/engine/src/preview.rs
//! PURPOSE: Live preview of a formula against a sample item.
//! CONTEXT: Called on every keystroke in the formula box. Each call lexes,
//! parses, validates and evaluates from scratch; there is no I/O and no
//! state kept between calls.

use crate::config::PreviewConfig;
use crate::evaluator::{evaluate, EvaluationError, EvaluationOutcome};
use crate::number_format::format_number;
use crate::validator::{validate, ValidationContext, ValidationError};
use formula_parser::{parse_formula, SyntaxError};
use log::trace;
use thiserror::Error;

/// Why a preview could not be rendered. Only the first failing stage is
/// reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreviewError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Renders previews using a fixed PreviewConfig.
#[derive(Debug, Clone, Default)]
pub struct Previewer {
    config: PreviewConfig,
}

impl Previewer {
    pub fn new(config: PreviewConfig) -> Self {
        Previewer { config }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn preview(&self, source: &str, ctx: ValidationContext) -> Result<String, PreviewError> {
        let ast = parse_formula(source)?;

        let errors = validate(&ast, ctx);
        if !errors.is_empty() {
            return Err(PreviewError::Validation(errors));
        }

        let outcome = evaluate(&ast, &self.config.sample)?;
        trace!("Preview of {:?}: {:?}", source, outcome);

        Ok(self.render(outcome))
    }

    fn render(&self, outcome: EvaluationOutcome) -> String {
        match outcome {
            EvaluationOutcome::Number(n) => format_number(n, &self.config.number_format),
            EvaluationOutcome::Boolean(b) => b.to_string(),
        }
    }
}

/// Previews `source` with the default sample item and general number format.
pub fn preview(source: &str, ctx: ValidationContext) -> Result<String, PreviewError> {
    Previewer::default().preview(source, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::number_format::NumberFormat;
    use crate::validator::ValidationRule;
    use formula_parser::Variable;

    #[test]
    fn test_preview_number() {
        // Default sample: actual = 1000, compra = 700
        assert_eq!(preview("price.actual * 1.1", ValidationContext::Manual).unwrap(), "1100");
        assert_eq!(preview("price.compra * 1.25", ValidationContext::Manual).unwrap(), "875");
        assert_eq!(preview("price.compra / 8", ValidationContext::AutoPriceList).unwrap(), "87.5");
    }

    #[test]
    fn test_preview_boolean() {
        assert_eq!(preview("price.compra > 500", ValidationContext::Manual).unwrap(), "true");
        assert_eq!(
            preview("price.compra > 500 AND price.actual < 10", ValidationContext::Manual).unwrap(),
            "false"
        );
    }

    #[test]
    fn test_preview_syntax_error() {
        let err = preview("price.actual * (1.1", ValidationContext::Manual).unwrap_err();
        match err {
            PreviewError::Syntax(e) => assert_eq!(e.position, 19),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_validation_error() {
        let err = preview("price.actual * 1.1", ValidationContext::AutoPriceList).unwrap_err();
        match &err {
            PreviewError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].rule, ValidationRule::MustNotReferenceActual);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Invalid formula: must not reference actual");
    }

    #[test]
    fn test_preview_evaluation_error() {
        assert_eq!(
            preview("price.compra / (price.compra - 700)", ValidationContext::Manual),
            Err(PreviewError::Evaluation(EvaluationError::DivisionByZero))
        );
    }

    #[test]
    fn test_previewer_uses_configured_sample_and_format() {
        let previewer = Previewer::new(PreviewConfig {
            sample: Environment::new(None, Some(40000.0)),
            number_format: NumberFormat::currency(2, "$"),
        });

        assert_eq!(
            previewer
                .preview(
                    "IF(price.compra > 33000, price.compra*2+5800, price.compra*2)",
                    ValidationContext::AutoPriceList
                )
                .unwrap(),
            "$85,800.00"
        );
        assert_eq!(
            previewer.preview("price.actual", ValidationContext::Manual),
            Err(PreviewError::Evaluation(EvaluationError::MissingVariable(
                Variable::Actual
            )))
        );
    }
}
