//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the pricing formula engine.
//! CONTEXT: Re-exports public types and modules for use by the price-list
//! manager. The four entry points are `preview`, `validate`, `evaluate`
//! and `apply_batch`; everything else supports them.

pub mod batch;
pub mod config;
pub mod environment;
pub mod evaluator;
pub mod history;
pub mod number_format;
pub mod preview;
pub mod validator;

// Re-export commonly used types at the crate root
pub use batch::{apply_batch, BatchApplier, BatchResult, BatchSummary, Item};
pub use config::{BatchConfig, ConfigError, EngineConfig, PreviewConfig};
pub use environment::Environment;
pub use evaluator::{evaluate, EvalResult, EvaluationError, EvaluationOutcome, Evaluator, OutcomeKind};
pub use history::{FormulaHistory, MAX_HISTORY_ENTRIES};
pub use number_format::{format_number, CurrencyPosition, NumberFormat};
pub use preview::{preview, PreviewError, Previewer};
pub use validator::{validate, ValidationContext, ValidationError, ValidationRule};

pub use formula_parser::{parse_formula, Expression, SyntaxError, Variable};

/// One configured engine: a batch applier and a previewer sharing an
/// EngineConfig.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    applier: BatchApplier,
    previewer: Previewer,
}

impl PricingEngine {
    pub fn new(config: EngineConfig) -> Self {
        PricingEngine {
            applier: BatchApplier::new(config.batch),
            previewer: Previewer::new(config.preview),
        }
    }

    pub fn preview(&self, source: &str, ctx: ValidationContext) -> Result<String, PreviewError> {
        self.previewer.preview(source, ctx)
    }

    pub fn apply_batch(&self, ast: &Expression, items: &[Item]) -> Vec<BatchResult> {
        self.applier.apply(ast, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_test_preview_then_apply() {
        let engine = PricingEngine::default();
        let formula = "IF(price.compra > 33000, price.compra*2+5800, price.compra*2)";

        // Preview accepts the formula for an auto-generated price list
        assert_eq!(
            engine.preview(formula, ValidationContext::AutoPriceList).unwrap(),
            "1400"
        );

        // Then the same AST is reused for the whole batch
        let ast = parse_formula(formula).unwrap();
        assert!(validate(&ast, ValidationContext::AutoPriceList).is_empty());

        let items = vec![
            Item::new("HIGH", None, Some(40000.0)),
            Item::new("LOW", None, Some(20000.0)),
        ];
        let prices: Vec<Option<f64>> = engine
            .apply_batch(&ast, &items)
            .iter()
            .map(BatchResult::price)
            .collect();
        assert_eq!(prices, vec![Some(85800.0), Some(40000.0)]);
    }

    #[test]
    fn integration_test_history_after_successful_batch() {
        let engine = PricingEngine::new(EngineConfig::default());
        let mut history = FormulaHistory::new("acme");
        let source = "price.compra*1.25";

        let ast = parse_formula(source).unwrap();
        let results = engine.apply_batch(&ast, &[Item::new("A", None, Some(8.0))]);

        if BatchSummary::from_results(&results).all_priced() {
            history.record(&ast.to_string());
        }
        assert_eq!(history.latest(), Some("price.compra * 1.25"));
    }
}
