//! tlint: Testing Library lint rules for TypeScript and JavaScript test files
//!
//! This library parses test files with tree-sitter, classifies identifiers and
//! calls as Testing Library constructs (queries, async utils, render helpers,
//! event dispatchers, assertions) and reports misuse, with auto-fixes where a
//! rule can offer one.

pub mod analyzer;
pub mod config;
pub mod detector;
pub mod error;
pub mod fixer;
pub mod parser;
pub mod reporter;

pub use analyzer::Linter;
pub use error::LintError;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of linting one file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    /// Path to the linted file
    pub file_path: PathBuf,
    /// Diagnostics in source order
    pub diagnostics: Vec<Diagnostic>,
}

impl LintResult {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Diagnostics that carry an auto-fix
    pub fn fixable_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.fix.is_some()).count()
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// A problem reported by a rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Rule id, e.g. `await-async-events`
    pub rule: String,
    /// Key into the rule's message table
    pub message_id: String,
    /// Severity configured for the rule
    pub severity: Severity,
    /// Interpolated message
    pub message: String,
    /// Location of the anchor node
    pub location: Location,
    /// Byte range of the anchor node
    pub span: Span,
    /// Auto-fix, when the rule can offer one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

/// Byte range in the source, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A text patch: one or more edits applied together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub edits: Vec<Edit>,
}

impl Fix {
    /// Smallest byte range covering every edit
    pub fn span(&self) -> Option<Span> {
        let start = self.edits.iter().map(|e| e.start).min()?;
        let end = self.edits.iter().map(|e| e.end).max()?;
        Some(Span { start, end })
    }
}

/// Replace `[start, end)` with `replacement`. Inserts have `start == end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// End line (optional)
    pub end_line: Option<usize>,
    /// End column (optional)
    pub end_column: Option<usize>,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }
}

/// Public API: lint a single file with the config found from `work_dir`.
///
/// * `path` - path to the test file
/// * `work_dir` - directory where the `.tlintrc.json` search starts
/// * `config_path` - optional explicit config file
pub fn lint_file(
    path: &std::path::Path,
    work_dir: &std::path::Path,
    config_path: Option<&std::path::Path>,
) -> anyhow::Result<LintResult> {
    let config = crate::config::load_config(work_dir, config_path)?;
    let linter = Linter::for_file(&config, path)?;
    Ok(linter.lint_file(path)?)
}
