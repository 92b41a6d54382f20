//! Build results
//!
//! Collects one [`Outcome`] per build unit and renders the summary table.

use std::fmt;

use serde::Serialize;

use crate::config::defaults;
use crate::core::descriptor::UnitKey;

/// Result of one build unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        })
    }
}

/// Row of the result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    #[serde(flatten)]
    pub key: UnitKey,
    pub outcome: Outcome,
}

/// Outcomes of a run, in the order units were recorded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of `key`, replacing an earlier one
    pub fn record(&mut self, key: UnitKey, outcome: Outcome) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.key == key) {
            row.outcome = outcome;
        } else {
            self.rows.push(ResultRow { key, outcome });
        }
    }

    /// Outcome recorded for `key`
    pub fn get(&self, key: &UnitKey) -> Option<Outcome> {
        self.rows
            .iter()
            .find(|row| &row.key == key)
            .map(|row| row.outcome)
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows with `outcome`
    pub fn count(&self, outcome: Outcome) -> usize {
        self.rows.iter().filter(|row| row.outcome == outcome).count()
    }

    /// True when no unit failed; skipped units do not count as failures
    pub fn all_passed(&self) -> bool {
        self.count(Outcome::Failed) == 0
    }

    /// Render the fixed-width summary table
    pub fn render(&self) -> String {
        let mut out = pad_column("Application");
        out.push_str("Build\n");
        for row in &self.rows {
            out.push_str(&pad_column(&format!(
                "{} ({}):",
                row.key.application, row.key.language
            )));
            out.push_str(&row.outcome.to_string());
            out.push('\n');
        }
        out
    }
}

/// Pad `text` to the next multiple of the column width, like a tab stop
fn pad_column(text: &str) -> String {
    let width = defaults::RESULT_COLUMN_WIDTH;
    let len = text.chars().count();
    let stop = (len / width + 1) * width;
    format!("{text}{}", " ".repeat(stop - len))
}
