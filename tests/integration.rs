//! Integration tests: lint the fixture files through the public API.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tlint::config::{load_config, Config, Preset};
use tlint::{LintResult, Linter, Severity};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn lint_fixture(name: &str) -> LintResult {
    let path = fixture(name);
    let work_dir = path.parent().unwrap().to_path_buf();
    tlint::lint_file(&path, &work_dir, None).unwrap()
}

fn rules(result: &LintResult) -> BTreeSet<&str> {
    result.diagnostics.iter().map(|d| d.rule.as_str()).collect()
}

#[test]
fn clean_file_has_no_diagnostics() {
    let result = lint_fixture("clean.test.tsx");
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn problems_file_reports_each_misuse() {
    let result = lint_fixture("problems.test.tsx");
    let rules = rules(&result);
    for expected in [
        "prefer-screen-queries",
        "await-async-queries",
        "await-async-utils",
        "render-result-naming-convention",
    ] {
        assert!(rules.contains(expected), "missing {} in {:?}", expected, rules);
    }
    assert!(result.error_count() >= 4);
    assert_eq!(result.warning_count(), 0);
}

#[test]
fn diagnostics_are_in_source_order() {
    let result = lint_fixture("problems.test.tsx");
    let starts: Vec<usize> = result.diagnostics.iter().map(|d| d.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn locations_are_one_based() {
    let result = lint_fixture("problems.test.tsx");
    let naming = result
        .diagnostics
        .iter()
        .find(|d| d.rule == "render-result-naming-convention")
        .unwrap();
    assert_eq!(naming.location.line, 12);
    assert_eq!(naming.location.column, 9);
    assert!(naming.message.contains("`wrapper`"));
}

#[test]
fn debugging_utils_are_warnings_in_framework_presets() {
    let result = lint_fixture("debugging.test.tsx");
    assert_eq!(rules(&result), BTreeSet::from(["no-debugging-utils"]));
    assert_eq!(result.warning_count(), 1);
    assert_eq!(result.error_count(), 0);
}

#[test]
fn dom_preset_skips_framework_rules() {
    let config: Config = serde_json::from_value(serde_json::json!({ "preset": "dom" })).unwrap();
    assert_eq!(config.preset(), Preset::Dom);
    let path = fixture("debugging.test.tsx");
    let result = Linter::for_file(&config, &path)
        .unwrap()
        .lint_file(&path)
        .unwrap();
    assert!(result.diagnostics.is_empty());
}

#[test]
fn fixable_file_is_fixed_in_memory() {
    let path = fixture("fixable.test.tsx");
    let linter = Linter::from_config(&Config::default()).unwrap();

    let before = linter.lint_file(&path).unwrap();
    assert_eq!(before.fixable_count(), 1);
    assert_eq!(before.diagnostics[0].rule, "no-await-sync-queries");

    let fixed = linter.fix_file(&path).unwrap();
    assert!(fixed.changed());
    assert_eq!(fixed.fixes_applied, 1);
    assert!(fixed.diagnostics.is_empty());
    assert!(fixed.output.contains("const count = screen.getByText('0');"));
}

#[test]
fn config_overrides_apply_per_file() {
    let dir = fixture("configured");
    let config = load_config(&dir, None).unwrap();

    let panel = dir.join("panel.test.tsx");
    let result = Linter::for_file(&config, &panel)
        .unwrap()
        .lint_file(&panel)
        .unwrap();
    assert_eq!(rules(&result), BTreeSet::from(["no-debugging-utils"]));
    assert_eq!(result.diagnostics[0].severity, Severity::Error);

    let legacy = dir.join("legacy/panel.test.tsx");
    let result = Linter::for_file(&config, &legacy)
        .unwrap()
        .lint_file(&legacy)
        .unwrap();
    assert!(result.diagnostics.is_empty());
}

#[test]
fn missing_file_is_an_io_error() {
    let linter = Linter::from_config(&Config::default()).unwrap();
    let err = linter.lint_file(&fixture("missing.test.tsx")).unwrap_err();
    assert!(matches!(err, tlint::LintError::Io { .. }));
}
