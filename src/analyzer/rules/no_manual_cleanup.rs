//! Framework packages that clean up after each test automatically make a
//! manual `cleanup` redundant

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::config::Preset;
use crate::parser::ast_helpers::{
    is_await_expression, is_identifier_named, is_import_declaration, is_import_specifier,
    is_member_expression, is_object_pattern, is_variable_declarator, member_property,
    named_children, property_key_name,
};
use crate::parser::scope::references_of;
use crate::parser::{get_variable_references, NodeKind, Selector};
use crate::{LintError, Severity};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tree_sitter::Node;

const CLEANUP: &str = "cleanup";
const CLEANUP_LIBRARY_PATTERN: &str = r"(@testing-library/(preact|react|svelte|vue))|@marko/testing-library";

fn cleanup_library_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(CLEANUP_LIBRARY_PATTERN).ok())
        .as_ref()
}

pub struct NoManualCleanup;

static META: RuleMeta = RuleMeta {
    name: "no-manual-cleanup",
    description: "Disallow the use of `cleanup`",
    messages: &[(
        "noManualCleanup",
        "`cleanup` is performed automatically by your test runner, you don't need manual cleanups.",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Only(
        &[Preset::React, Preset::Vue, Preset::Svelte, Preset::Marko],
        Severity::Error,
    ),
};

impl Rule for NoManualCleanup {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// `utils.cleanup` usages among `references`
fn report_cleanup_references<'a>(references: Vec<Node<'a>>, cx: &mut RuleContext<'a, '_>) {
    for reference in references {
        let property = reference
            .parent()
            .filter(|p| is_member_expression(*p))
            .and_then(member_property)
            .filter(|p| is_identifier_named(*p, CLEANUP, cx.source()));
        if let Some(property) = property {
            cx.report(Report::new(property, "noManualCleanup"));
        }
    }
}

/// Local bound by `import utils from '...'` or `import utils = require('...')`
fn default_import_binding(statement: Node<'_>) -> Option<Node<'_>> {
    named_children(statement)
        .into_iter()
        .filter(|c| matches!(c.kind(), "import_clause" | "import_require_clause"))
        .flat_map(named_children)
        .find(|n| n.kind() == "identifier")
}

fn report_import_statement<'a>(statement: Node<'a>, cx: &mut RuleContext<'a, '_>) {
    let source = cx.source();
    if let Some(binding) = default_import_binding(statement) {
        report_cleanup_references(references_of(binding, source), cx);
    }
    let cleanup_specifier = named_children(statement)
        .into_iter()
        .filter(|c| c.kind() == "import_clause")
        .flat_map(named_children)
        .filter(|c| c.kind() == "named_imports")
        .flat_map(named_children)
        .find(|s| {
            is_import_specifier(*s)
                && s.child_by_field_name("name")
                    .is_some_and(|n| is_identifier_named(n, CLEANUP, source))
        });
    if let Some(specifier) = cleanup_specifier {
        cx.report(Report::new(specifier, "noManualCleanup"));
    }
}

fn report_require_call<'a>(call: Node<'a>, cx: &mut RuleContext<'a, '_>) {
    let mut declarator = call.parent();
    while let Some(parent) = declarator.filter(|p| is_await_expression(*p)) {
        declarator = parent.parent();
    }
    let Some(declarator) = declarator.filter(|d| is_variable_declarator(*d)) else {
        return;
    };
    let Some(pattern) = declarator.child_by_field_name("name") else {
        return;
    };
    if is_object_pattern(pattern) {
        let cleanup_property = named_children(pattern)
            .into_iter()
            .find(|p| property_key_name(*p, cx.source()) == Some(CLEANUP));
        if let Some(property) = cleanup_property {
            cx.report(Report::new(property, "noManualCleanup"));
        }
        return;
    }
    report_cleanup_references(get_variable_references(declarator, cx.source()), cx);
}

fn report_candidate_module<'a>(module_node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
    if is_import_declaration(module_node) {
        report_import_statement(module_node, cx);
    } else {
        report_require_call(module_node, cx);
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Exit(NodeKind::Program)]
    }

    fn on(&mut self, _selector: Selector, _node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let engine = cx.engine();
        let auto_cleanup = engine
            .testing_library_import_name()
            .zip(cleanup_library_regex())
            .is_some_and(|(name, regex)| regex.is_match(name));

        let mut candidates: Vec<Node<'a>> = Vec::new();
        if auto_cleanup {
            candidates.extend(engine.testing_library_imports().iter().map(|r| r.node));
        }
        candidates.extend(engine.custom_module_import().map(|r| r.node));

        for module_node in candidates {
            report_candidate_module(module_node, cx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, lint_with_settings, message_ids, reported, settings};
    use serde_json::json;

    const RULE: &str = "no-manual-cleanup";

    #[test]
    fn positive_named_cleanup_import() {
        let source = "import { render, cleanup } from '@testing-library/react';\nafterEach(cleanup);\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noManualCleanup"]);
        assert_eq!(reported(&diagnostics, source), vec!["cleanup"]);
        assert_eq!(diagnostics[0].location.line, 1);
    }

    #[test]
    fn positive_default_import_member() {
        let source = "import utils from '@testing-library/vue';\nafterEach(() => utils.cleanup());\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["cleanup"]);
        assert_eq!(diagnostics[0].location.line, 2);
    }

    #[test]
    fn positive_require_forms() {
        let destructured = "const { render, cleanup } = require('@testing-library/svelte');\n";
        assert_eq!(lint(RULE, destructured).len(), 1);

        let namespace = "const rtl = require('@marko/testing-library');\nafterEach(() => rtl.cleanup());\n";
        assert_eq!(lint(RULE, namespace).len(), 1);
    }

    #[test]
    fn negative_packages_without_auto_cleanup() {
        let source = "import { cleanup } from '@testing-library/angular';\nafterEach(cleanup);\n";
        assert!(lint(RULE, source).is_empty());
    }

    #[test]
    fn positive_custom_module_cleanup() {
        let custom = settings(json!({ "testing-library/utils-module": "test-utils" }));
        let source = "import { cleanup } from '../test-utils';\nafterEach(cleanup);\n";
        assert_eq!(lint_with_settings(RULE, custom, source).len(), 1);
    }
}
