//! Shared harness for rule tests

use crate::analyzer::Linter;
use crate::detector::Settings;
use crate::{Diagnostic, Severity};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub const TEST_PATH: &str = "component.test.tsx";

fn linter(rule: &str, options: Option<Value>, settings: Settings) -> Linter {
    Linter::new(settings)
        .with_rule(rule, Severity::Error, options.into_iter().collect())
        .unwrap()
}

/// Settings from a JSON object of `testing-library/*` keys
pub fn settings(value: Value) -> Settings {
    let map: BTreeMap<String, Value> = serde_json::from_value(value).unwrap();
    Settings::from_map(&map).unwrap()
}

pub fn lint(rule: &str, source: &str) -> Vec<Diagnostic> {
    lint_with(rule, None, source)
}

pub fn lint_with(rule: &str, options: Option<Value>, source: &str) -> Vec<Diagnostic> {
    linter(rule, options, Settings::default())
        .lint_source(source, Path::new(TEST_PATH))
        .unwrap()
}

pub fn lint_with_settings(rule: &str, settings: Settings, source: &str) -> Vec<Diagnostic> {
    linter(rule, None, settings)
        .lint_source(source, Path::new(TEST_PATH))
        .unwrap()
}

pub fn lint_at(rule: &str, options: Option<Value>, path: &str, source: &str) -> Vec<Diagnostic> {
    linter(rule, options, Settings::default())
        .lint_source(source, Path::new(path))
        .unwrap()
}

/// Source after applying every fix the rule offers
pub fn fix(rule: &str, source: &str) -> String {
    fix_with(rule, None, source)
}

pub fn fix_with(rule: &str, options: Option<Value>, source: &str) -> String {
    linter(rule, options, Settings::default())
        .fix_source(source, Path::new(TEST_PATH))
        .unwrap()
        .output
}

pub fn message_ids(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message_id.as_str()).collect()
}

/// Source text each diagnostic is anchored on
pub fn reported<'s>(diagnostics: &[Diagnostic], source: &'s str) -> Vec<&'s str> {
    diagnostics
        .iter()
        .map(|d| &source[d.span.start..d.span.end])
        .collect()
}
