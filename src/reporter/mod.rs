//! Reporter module for output formatting

pub mod console;
pub mod json;
pub mod sarif;

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use sarif::SarifReporter;

use crate::LintResult;
use serde::Serialize;

/// Totals over every linted file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub files_linted: usize,
    pub files_with_problems: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub fixable_count: usize,
}

impl Summary {
    pub fn from_results(results: &[LintResult]) -> Self {
        let mut summary = Summary {
            files_linted: results.len(),
            ..Summary::default()
        };
        for result in results {
            if !result.diagnostics.is_empty() {
                summary.files_with_problems += 1;
            }
            summary.error_count += result.error_count();
            summary.warning_count += result.warning_count();
            summary.info_count += result.diagnostics.len() - result.error_count() - result.warning_count();
            summary.fixable_count += result.fixable_count();
        }
        summary
    }

    pub fn problem_count(&self) -> usize {
        self.error_count + self.warning_count + self.info_count
    }
}
