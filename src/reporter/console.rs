//! Console reporter with colored output

use super::Summary;
use crate::{Diagnostic, LintResult, Severity};
use colored::Colorize;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Only report errors
    quiet: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            quiet: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Hide warnings and info diagnostics
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Render every file with problems followed by the summary line
    pub fn render(&self, results: &[LintResult]) -> String {
        if !self.use_colors {
            colored::control::set_override(false);
        }
        let mut out = String::new();
        for result in results {
            self.render_file(result, &mut out);
        }
        self.render_summary(&Summary::from_results(results), &mut out);
        out
    }

    /// Print the rendered report to stdout
    pub fn report(&self, results: &[LintResult]) {
        print!("{}", self.render(results));
    }

    fn visible<'r>(&self, result: &'r LintResult) -> Vec<&'r Diagnostic> {
        result
            .diagnostics
            .iter()
            .filter(|d| !self.quiet || d.severity == Severity::Error)
            .collect()
    }

    fn render_file(&self, result: &LintResult, out: &mut String) {
        let diagnostics = self.visible(result);
        if diagnostics.is_empty() {
            return;
        }
        out.push('\n');
        out.push_str(&format!("{}\n", result.file_path.display().to_string().underline()));

        let width = diagnostics
            .iter()
            .map(|d| position(d).len())
            .max()
            .unwrap_or(0);
        for diagnostic in diagnostics {
            let at = format!("{:<width$}", position(diagnostic), width = width);
            let fixable = if diagnostic.fix.is_some() {
                format!(" {}", "(fixable)".dimmed())
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {}  {}  {}  {}{}\n",
                at.dimmed(),
                severity_label(diagnostic.severity),
                diagnostic.message,
                diagnostic.rule.dimmed(),
                fixable
            ));
        }
    }

    fn render_summary(&self, summary: &Summary, out: &mut String) {
        out.push('\n');
        let problems = if self.quiet {
            summary.error_count
        } else {
            summary.problem_count()
        };
        if problems == 0 {
            out.push_str(&format!(
                "{} {} linted, no problems\n",
                "✓".green().bold(),
                plural(summary.files_linted, "file")
            ));
            return;
        }

        let headline = format!(
            "✗ {} ({}, {})",
            plural(problems, "problem"),
            plural(summary.error_count, "error"),
            plural(summary.warning_count, "warning")
        );
        let headline = if summary.error_count > 0 {
            headline.red().bold()
        } else {
            headline.yellow().bold()
        };
        out.push_str(&format!("{}\n", headline));
        out.push_str(&format!(
            "  {} linted, {} with problems\n",
            plural(summary.files_linted, "file"),
            summary.files_with_problems
        ));
        if summary.fixable_count > 0 {
            out.push_str(&format!(
                "  {} potentially fixable with the `--fix` option\n",
                plural(summary.fixable_count, "problem")
            ));
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn position(diagnostic: &Diagnostic) -> String {
    format!("{}:{}", diagnostic.location.line, diagnostic.location.column)
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
