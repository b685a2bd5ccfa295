//! FILENAME: core/engine/src/environment.rs
//! PURPOSE: The variable bindings a formula is evaluated against.
//! CONTEXT: An Environment is built fresh for every evaluation (one per item
//! in a batch) and is only ever read by the evaluator.

use formula_parser::Variable;
use serde::{Deserialize, Serialize};

/// Values for the two price inputs. Absent values stay `None` and surface
/// as `MissingVariable` only if the formula actually reads them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Environment {
    pub actual: Option<f64>,
    pub compra: Option<f64>,
}

impl Environment {
    pub fn new(actual: Option<f64>, compra: Option<f64>) -> Self {
        Environment { actual, compra }
    }

    pub fn with_actual(mut self, actual: f64) -> Self {
        self.actual = Some(actual);
        self
    }

    pub fn with_compra(mut self, compra: f64) -> Self {
        self.compra = Some(compra);
        self
    }

    /// Looks up the bound value for a variable.
    pub fn get(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Actual => self.actual,
            Variable::Compra => self.compra,
        }
    }
}
