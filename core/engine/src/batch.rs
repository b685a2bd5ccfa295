//! FILENAME: core/engine/src/batch.rs
//! PURPOSE: Applies one parsed formula to every item of a price list.
//! CONTEXT: Each item gets its own Environment and its own result. A failing
//! item is recorded and the batch carries on; the caller decides what to do
//! with failures and with boolean outcomes (which are not prices).
//!
//! Items are independent, so large batches may be split across the rayon
//! thread pool. Results always come back in input order.

use crate::config::BatchConfig;
use crate::environment::Environment;
use crate::evaluator::{EvaluationError, EvaluationOutcome, Evaluator};
use formula_parser::Expression;
use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// An item as supplied by the price-list / import subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_code: String,
    /// Current sale price, bound to price.actual.
    #[serde(default)]
    pub existing_price: Option<f64>,
    /// Purchase price, bound to price.compra.
    #[serde(default)]
    pub purchase_price: Option<f64>,
}

impl Item {
    pub fn new(
        item_code: impl Into<String>,
        existing_price: Option<f64>,
        purchase_price: Option<f64>,
    ) -> Self {
        Item {
            item_code: item_code.into(),
            existing_price,
            purchase_price,
        }
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.existing_price, self.purchase_price)
    }
}

/// The outcome of the formula for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub item_id: String,
    pub outcome: Result<EvaluationOutcome, EvaluationError>,
}

impl BatchResult {
    /// The new price, when the formula produced a number for this item.
    pub fn price(&self) -> Option<f64> {
        self.outcome.as_ref().ok().and_then(EvaluationOutcome::as_number)
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Per-batch counts for reporting back to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    /// Items that got a numeric result.
    pub priced: usize,
    /// Items whose formula evaluated to true/false instead of a price.
    pub non_numeric: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchResult]) -> Self {
        results.iter().fold(
            BatchSummary {
                total: results.len(),
                ..BatchSummary::default()
            },
            |mut summary, result| {
                match &result.outcome {
                    Ok(EvaluationOutcome::Number(_)) => summary.priced += 1,
                    Ok(EvaluationOutcome::Boolean(_)) => summary.non_numeric += 1,
                    Err(_) => summary.failed += 1,
                }
                summary
            },
        )
    }

    pub fn all_priced(&self) -> bool {
        self.priced == self.total
    }
}

/// Runs a formula over item lists according to a BatchConfig.
#[derive(Debug, Clone, Default)]
pub struct BatchApplier {
    config: BatchConfig,
}

impl BatchApplier {
    pub fn new(config: BatchConfig) -> Self {
        BatchApplier { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn should_parallelize(&self, len: usize) -> bool {
        self.config.parallel && len >= self.config.parallel_threshold.max(1)
    }

    /// Evaluates `ast` once per item. Never fails as a whole.
    pub fn apply(&self, ast: &Expression, items: &[Item]) -> Vec<BatchResult> {
        let results: Vec<BatchResult> = if self.should_parallelize(items.len()) {
            debug!("Applying formula to {} items in parallel", items.len());
            items.par_iter().map(|item| apply_one(ast, item)).collect()
        } else {
            debug!("Applying formula to {} items", items.len());
            items.iter().map(|item| apply_one(ast, item)).collect()
        };

        let summary = BatchSummary::from_results(&results);
        debug!(
            "Batch finished: {} priced, {} non-numeric, {} failed",
            summary.priced, summary.non_numeric, summary.failed
        );

        results
    }
}

fn apply_one(ast: &Expression, item: &Item) -> BatchResult {
    let env = item.environment();
    let outcome = Evaluator::new(&env).evaluate(ast);

    match &outcome {
        Ok(value) => trace!("Item {}: {:?}", item.item_code, value),
        Err(e) => warn!("Item {}: {}", item.item_code, e),
    }

    BatchResult {
        item_id: item.item_code.clone(),
        outcome,
    }
}

/// Applies `ast` to every item with the default configuration.
pub fn apply_batch(ast: &Expression, items: &[Item]) -> Vec<BatchResult> {
    BatchApplier::default().apply(ast, items)
}
