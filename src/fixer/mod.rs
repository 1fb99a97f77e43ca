//! Auto-fix application.
//!
//! Each diagnostic may carry a [`Fix`] made of several byte-range edits. Fixes
//! are applied in position order; a fix that overlaps one already applied in
//! the same pass is left for the next pass, after the file is re-linted.

use crate::{Diagnostic, Edit, Fix};
use std::fs;
use std::path::Path;

/// Result of one fix pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// Source with the applied fixes
    pub output: String,
    /// Fixes applied in this pass
    pub applied: usize,
    /// Fixes skipped because they overlap an applied one
    pub remaining: usize,
}

/// Result of fixing a whole file across passes
#[derive(Debug, Clone)]
pub struct FixedSource {
    pub output: String,
    /// Fixes applied over all passes
    pub fixes_applied: usize,
    /// Diagnostics still reported by the fixed source
    pub diagnostics: Vec<Diagnostic>,
}

impl FixedSource {
    pub fn changed(&self) -> bool {
        self.fixes_applied > 0
    }
}

/// Apply every non-overlapping fix carried by `diagnostics` to `source`
pub fn apply_fixes(source: &str, diagnostics: &[Diagnostic]) -> FixOutcome {
    let mut fixes: Vec<&Fix> = diagnostics.iter().filter_map(|d| d.fix.as_ref()).collect();
    fixes.sort_by_key(|fix| fix.span().map(|s| (s.start, s.end)));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0usize;
    let mut last_end: Option<usize> = None;
    let mut applied = 0;
    let mut remaining = 0;

    for fix in fixes {
        let Some(span) = fix.span() else {
            continue;
        };
        let overlaps = last_end.is_some_and(|end| span.start <= end);
        if overlaps || span.end > source.len() || !is_char_boundary(source, span.start, span.end) {
            remaining += 1;
            continue;
        }
        let Some(replacement) = merge_edits(source, fix) else {
            remaining += 1;
            continue;
        };
        output.push_str(&source[cursor..span.start]);
        output.push_str(&replacement);
        cursor = span.end;
        last_end = Some(span.end);
        applied += 1;
    }
    output.push_str(&source[cursor..]);

    FixOutcome {
        output,
        applied,
        remaining,
    }
}

/// Replacement text for the fix's whole span, with every edit folded in
fn merge_edits(source: &str, fix: &Fix) -> Option<String> {
    let span = fix.span()?;
    let mut edits: Vec<&Edit> = fix.edits.iter().collect();
    edits.sort_by_key(|e| (e.start, e.end));

    let mut merged = String::new();
    let mut cursor = span.start;
    for edit in edits {
        if edit.start < cursor || !is_char_boundary(source, edit.start, edit.end) {
            return None;
        }
        merged.push_str(&source[cursor..edit.start]);
        merged.push_str(&edit.replacement);
        cursor = edit.end;
    }
    merged.push_str(&source[cursor..span.end]);
    Some(merged)
}

fn is_char_boundary(source: &str, start: usize, end: usize) -> bool {
    start <= end && source.is_char_boundary(start) && source.is_char_boundary(end)
}

/// Write fixed content back to `path`
pub fn write_fixed(path: &Path, fixed: &FixedSource) -> std::io::Result<()> {
    if !fixed.changed() {
        return Ok(());
    }
    fs::write(path, &fixed.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, Severity, Span};

    fn diagnostic(edits: Vec<(usize, usize, &str)>) -> Diagnostic {
        Diagnostic {
            rule: "test-rule".to_string(),
            message_id: "m".to_string(),
            severity: Severity::Error,
            message: "m".to_string(),
            location: Location::new(1, 1),
            span: Span { start: 0, end: 0 },
            fix: Some(Fix {
                edits: edits
                    .into_iter()
                    .map(|(start, end, r)| Edit {
                        start,
                        end,
                        replacement: r.to_string(),
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn applies_multi_edit_fix() {
        let source = "() => { fireEvent.click(el); }";
        let outcome = apply_fixes(source, &[diagnostic(vec![(8, 8, "await "), (0, 0, "async ")])]);
        assert_eq!(outcome.output, "async () => { await fireEvent.click(el); }");
        assert_eq!(outcome.applied, 1);
    }

    #[test]
    fn overlapping_fix_waits_for_next_pass() {
        let source = "abcdef";
        let outcome = apply_fixes(
            source,
            &[
                diagnostic(vec![(0, 3, "X")]),
                diagnostic(vec![(2, 4, "Y")]),
                diagnostic(vec![(4, 6, "Z")]),
            ],
        );
        assert_eq!(outcome.output, "XdZ");
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.remaining, 1);
    }

    #[test]
    fn no_fixes_is_identity() {
        let outcome = apply_fixes("const a = 1;", &[]);
        assert_eq!(outcome.output, "const a = 1;");
        assert_eq!(outcome.applied, 0);
    }

    #[test]
    fn write_fixed_skips_unchanged() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.test.ts");
        fs::write(&path, "x").unwrap();
        let fixed = FixedSource {
            output: "y".to_string(),
            fixes_applied: 0,
            diagnostics: Vec::new(),
        };
        write_fixed(&path, &fixed).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x");
    }
}
