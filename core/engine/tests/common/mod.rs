//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for pricing engine integration tests.

#![allow(dead_code)]

use pricing_engine::{parse_formula, Expression, Item};

/// A parsed formula plus the price list it is applied to.
pub struct TestHarness {
    pub ast: Expression,
    pub items: Vec<Item>,
}

impl TestHarness {
    /// Parses `formula`, panicking on syntax errors.
    pub fn new(formula: &str) -> Self {
        TestHarness {
            ast: parse_formula(formula).unwrap_or_else(|e| panic!("{}: {}", formula, e)),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, code: &str, actual: Option<f64>, compra: Option<f64>) -> Self {
        self.items.push(Item::new(code, actual, compra));
        self
    }

    /// `count` items with increasing purchase prices; every tenth item has none.
    pub fn with_price_list(mut self, count: usize) -> Self {
        for i in 0..count {
            let compra = if i % 10 == 9 { None } else { Some(100.0 + i as f64) };
            self.items
                .push(Item::new(format!("SKU-{:05}", i), Some(150.0 + i as f64), compra));
        }
        self
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}
