//! Linter - parses a file once and drives every enabled rule over it

use super::rules::{all_rules, find_rule, Rule};
use super::wrapper::RuleWrapper;
use crate::config::{Config, RuleSeverity};
use crate::detector::Settings;
use crate::fixer::{apply_fixes, FixedSource};
use crate::parser::{IgnoreDirectives, NodeKind, Selector, TypeScriptParser};
use crate::{Diagnostic, LintError, LintResult, Severity};
use log::{debug, trace};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tree_sitter::Node;

/// Upper bound on fix passes over one file
const MAX_FIX_PASSES: usize = 10;

/// A rule enabled at a severity with its options
#[derive(Clone)]
pub struct ConfiguredRule {
    pub rule: &'static dyn Rule,
    pub severity: Severity,
    pub options: Vec<Value>,
}

/// Runs a set of configured rules over source files
pub struct Linter {
    rules: Vec<ConfiguredRule>,
    settings: Settings,
}

impl Linter {
    /// A linter with no rules enabled
    pub fn new(settings: Settings) -> Self {
        Self {
            rules: Vec::new(),
            settings,
        }
    }

    /// Enable `name` at `severity`. Options are validated here so a bad
    /// config fails before any file is read.
    pub fn with_rule(mut self, name: &str, severity: Severity, options: Vec<Value>) -> Result<Self, LintError> {
        let rule = find_rule(name).ok_or_else(|| LintError::UnknownRule(name.to_string()))?;
        rule.create(&options)?;
        self.rules.retain(|r| r.rule.meta().name != rule.meta().name);
        self.rules.push(ConfiguredRule {
            rule,
            severity,
            options,
        });
        Ok(self)
    }

    /// Rules for the config's preset, then the config's own rule entries
    pub fn from_config(config: &Config) -> Result<Self, LintError> {
        Self::for_file(config, Path::new(""))
    }

    /// Like [`Linter::from_config`], with the overrides matching `path` applied
    pub fn for_file(config: &Config, path: &Path) -> Result<Self, LintError> {
        let settings = Settings::from_map(&config.settings)?;
        let effective = config.effective_for_file(path);
        let preset = effective.preset;

        for name in effective.rules.keys() {
            if find_rule(name).is_none() {
                return Err(LintError::UnknownRule(name.clone()));
            }
        }

        let mut linter = Self::new(settings);
        for rule in all_rules() {
            let name = rule.meta().name;
            let entry = effective.rules.get(name).or_else(|| {
                effective
                    .rules
                    .iter()
                    .find(|(key, _)| find_rule(key).is_some_and(|r| r.meta().name == name))
                    .map(|(_, entry)| entry)
            });
            let (severity, options) = match entry {
                Some(entry) => {
                    let severity = entry.severity().map_err(|message| {
                        LintError::Config(format!("rule `{}`: {}", name, message))
                    })?;
                    match severity {
                        RuleSeverity::Off => continue,
                        _ => (severity.to_severity(), entry.options().to_vec()),
                    }
                }
                None => (
                    rule.meta().recommendation.severity_for(preset),
                    rule.preset_options(preset),
                ),
            };
            if let Some(severity) = severity {
                linter = linter.with_rule(name, severity, options)?;
            }
        }
        Ok(linter)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn rules(&self) -> &[ConfiguredRule] {
        &self.rules
    }

    /// Lint `source` as if read from `path`. The extension picks the grammar.
    pub fn lint_source(&self, source: &str, path: &Path) -> Result<Vec<Diagnostic>, LintError> {
        let started = Instant::now();
        let mut parser =
            TypeScriptParser::for_file(path).map_err(|e| LintError::Parse(format!("{:#}", e)))?;
        let tree = parser
            .parse(source)
            .map_err(|e| LintError::Parse(format!("{}: {:#}", path.display(), e)))?;

        let mut wrappers = self
            .rules
            .iter()
            .map(|configured| {
                RuleWrapper::new(
                    configured.rule,
                    configured.severity,
                    &configured.options,
                    source,
                    &self.settings,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut dispatch: HashMap<Selector, Vec<usize>> = HashMap::new();
        for (index, wrapper) in wrappers.iter().enumerate() {
            for selector in wrapper.selectors() {
                dispatch.entry(selector).or_default().push(index);
            }
        }

        let mut diagnostics = Vec::new();

        // Pre-order walk emitting enter and exit events
        let mut cursor = tree.walk();
        'walk: loop {
            let node = cursor.node();
            if node.is_named() {
                let selector = Selector::Enter(NodeKind::of(node));
                dispatch_event(&dispatch, &mut wrappers, selector, node, path, &mut diagnostics);
            }
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                let node = cursor.node();
                if node.is_named() {
                    let selector = Selector::Exit(NodeKind::of(node));
                    dispatch_event(&dispatch, &mut wrappers, selector, node, path, &mut diagnostics);
                }
                if cursor.goto_next_sibling() {
                    continue 'walk;
                }
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }

        let directives = IgnoreDirectives::parse(source);
        diagnostics.retain(|d| !directives.is_ignored(d.location.line, &d.rule));
        diagnostics.sort_by(|a, b| {
            (a.span.start, a.span.end, &a.rule).cmp(&(b.span.start, b.span.end, &b.rule))
        });

        debug!(
            "linted {} with {} rules in {:?}: {} diagnostics",
            path.display(),
            self.rules.len(),
            started.elapsed(),
            diagnostics.len()
        );
        Ok(diagnostics)
    }

    pub fn lint_file(&self, path: &Path) -> Result<LintResult, LintError> {
        let source = read_source(path)?;
        Ok(LintResult {
            file_path: path.to_path_buf(),
            diagnostics: self.lint_source(&source, path)?,
        })
    }

    /// Apply fixes until none are left or the pass limit is hit
    pub fn fix_source(&self, source: &str, path: &Path) -> Result<FixedSource, LintError> {
        let mut output = source.to_string();
        let mut fixes_applied = 0;
        let mut diagnostics = self.lint_source(&output, path)?;

        for pass in 0..MAX_FIX_PASSES {
            let outcome = apply_fixes(&output, &diagnostics);
            if outcome.applied == 0 {
                break;
            }
            debug!(
                "fix pass {} on {}: {} applied, {} deferred",
                pass + 1,
                path.display(),
                outcome.applied,
                outcome.remaining
            );
            fixes_applied += outcome.applied;
            output = outcome.output;
            diagnostics = self.lint_source(&output, path)?;
        }

        Ok(FixedSource {
            output,
            fixes_applied,
            diagnostics,
        })
    }

    pub fn fix_file(&self, path: &Path) -> Result<FixedSource, LintError> {
        let source = read_source(path)?;
        self.fix_source(&source, path)
    }
}

fn dispatch_event<'a>(
    dispatch: &HashMap<Selector, Vec<usize>>,
    wrappers: &mut [RuleWrapper<'a>],
    selector: Selector,
    node: Node<'a>,
    path: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(targets) = dispatch.get(&selector) else {
        return;
    };
    trace!("{:?} at byte {}", selector, node.start_byte());
    for index in targets {
        wrappers[*index].visit(selector, node, path, diagnostics);
    }
}

fn read_source(path: &Path) -> Result<String, LintError> {
    fs::read_to_string(path).map_err(|source| LintError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn linter(rules: &[&str]) -> Linter {
        rules.iter().fold(Linter::new(Settings::default()), |linter, name| {
            linter.with_rule(name, Severity::Error, Vec::new()).unwrap()
        })
    }

    #[test]
    fn unknown_rule_is_an_error() {
        let err = Linter::new(Settings::default())
            .with_rule("no-such-rule", Severity::Error, Vec::new())
            .err()
            .unwrap();
        assert!(matches!(err, LintError::UnknownRule(_)));
    }

    #[test]
    fn preset_enables_recommended_rules() {
        let config = Config::default();
        let linter = Linter::from_config(&config).unwrap();
        let names: Vec<&str> = linter.rules().iter().map(|r| r.rule.meta().name).collect();
        assert!(names.contains(&"await-async-queries"));
        assert!(names.contains(&"no-container"));
        assert!(!names.contains(&"prefer-user-event"));

        let dom: Config = serde_json::from_value(json!({ "preset": "dom" })).unwrap();
        let linter = Linter::from_config(&dom).unwrap();
        assert!(!linter.rules().iter().any(|r| r.rule.meta().name == "no-container"));
    }

    #[test]
    fn config_entries_override_preset() {
        let config: Config = serde_json::from_value(json!({
            "rules": {
                "testing-library/no-container": "off",
                "prefer-user-event": ["warn", { "allowedMethods": ["click"] }]
            }
        }))
        .unwrap();
        let linter = Linter::from_config(&config).unwrap();
        assert!(!linter.rules().iter().any(|r| r.rule.meta().name == "no-container"));
        let user_event = linter
            .rules()
            .iter()
            .find(|r| r.rule.meta().name == "prefer-user-event")
            .unwrap();
        assert_eq!(user_event.severity, Severity::Warning);
        assert_eq!(user_event.options, vec![json!({ "allowedMethods": ["click"] })]);
    }

    #[test]
    fn unknown_rule_in_config() {
        let config: Config =
            serde_json::from_value(json!({ "rules": { "no-such-rule": "error" } })).unwrap();
        assert!(matches!(
            Linter::from_config(&config).err().unwrap(),
            LintError::UnknownRule(_)
        ));
    }

    #[test]
    fn diagnostics_sorted_and_suppressed() {
        let source = r#"import { screen } from '@testing-library/react';
test('x', () => {
  screen.findByText('b');
  // tlint-disable-next-line await-async-queries
  screen.findByText('c');
  screen.findByText('a');
});
"#;
        let diagnostics = linter(&["await-async-queries"])
            .lint_source(source, Path::new("a.test.tsx"))
            .unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].span.start < diagnostics[1].span.start);
        assert_eq!(diagnostics[0].location.line, 3);
        assert_eq!(diagnostics[1].location.line, 6);
    }

    #[test]
    fn fix_source_adds_await_and_async() {
        let source = "import { fireEvent } from '@testing-library/react';\ntest('x', () => {\n  fireEvent.click(el);\n});\n";
        let linter = Linter::new(Settings::default())
            .with_rule(
                "await-async-events",
                Severity::Error,
                vec![json!({ "eventModule": "fireEvent" })],
            )
            .unwrap();
        let fixed = linter.fix_source(source, Path::new("a.test.ts")).unwrap();
        assert_eq!(
            fixed.output,
            "import { fireEvent } from '@testing-library/react';\ntest('x', async () => {\n  await fireEvent.click(el);\n});\n"
        );
        assert!(fixed.diagnostics.is_empty());
        assert_eq!(fixed.fixes_applied, 1);
    }

    #[test]
    fn lint_file_reports_io_errors() {
        let err = linter(&[]).lint_file(Path::new("/nonexistent/a.test.ts")).unwrap_err();
        assert!(matches!(err, LintError::Io { .. }));
    }
}
