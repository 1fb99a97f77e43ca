//! JSON reporter for machine-readable output

use super::Summary;
use crate::LintResult;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Report every result with the run summary
    pub fn report(&self, results: &[LintResult]) -> String {
        let output = JsonOutput {
            results: results
                .iter()
                .map(|result| JsonFile {
                    result,
                    error_count: result.error_count(),
                    warning_count: result.warning_count(),
                    fixable_count: result.fixable_count(),
                })
                .collect(),
            summary: Summary::from_results(results),
        };

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    results: Vec<JsonFile<'a>>,
    summary: Summary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFile<'a> {
    #[serde(flatten)]
    result: &'a LintResult,
    error_count: usize,
    warning_count: usize,
    fixable_count: usize,
}
