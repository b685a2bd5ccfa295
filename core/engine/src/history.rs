//! FILENAME: core/engine/src/history.rs
//! PURPOSE: Shape of the per-company list of recently accepted formulas.
//! CONTEXT: The history itself is stored by the host application. The engine
//! only defines the record and the rule for adding to it, so every host
//! keeps the same "last 5, newest first, no duplicates" behaviour.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// How many formulas are kept per company.
pub const MAX_HISTORY_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormulaHistory {
    /// Company / tenant the history belongs to.
    pub tenant: String,
    /// Newest first.
    entries: VecDeque<String>,
}

impl FormulaHistory {
    pub fn new(tenant: impl Into<String>) -> Self {
        FormulaHistory {
            tenant: tenant.into(),
            entries: VecDeque::with_capacity(MAX_HISTORY_ENTRIES),
        }
    }

    /// Records a formula that was just applied. Re-using an existing entry
    /// moves it to the front instead of duplicating it.
    pub fn record(&mut self, formula: &str) {
        let formula = formula.trim();
        if formula.is_empty() {
            return;
        }

        self.entries.retain(|existing| existing != formula);
        self.entries.push_front(formula.to_string());
        self.entries.truncate(MAX_HISTORY_ENTRIES);
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
