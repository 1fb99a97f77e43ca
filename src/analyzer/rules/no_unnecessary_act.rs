//! Testing Library utils are already wrapped in `act`

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::config::Preset;
use crate::detector::DetectionEngine;
use crate::parser::ast_helpers::{
    block_statements, call_of_argument, get_deepest_identifier, get_property_identifier,
    get_statement_call_expression, inner_expression, is_await_expression, is_call_expression,
    is_empty_function, is_expression_statement, is_return_statement,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde::Deserialize;
use serde_json::Value;
use tree_sitter::Node;

pub struct NoUnnecessaryAct;

static META: RuleMeta = RuleMeta {
    name: "no-unnecessary-act",
    description: "Disallow wrapping Testing Library utils or empty callbacks in `act`",
    messages: &[
        (
            "noUnnecessaryActTestingLibraryUtil",
            "Avoid wrapping Testing Library util calls in `act`",
        ),
        (
            "noUnnecessaryActEmptyFunction",
            "Avoid wrapping empty function in `act`",
        ),
    ],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Only(&[Preset::React, Preset::Marko], Severity::Error),
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    is_strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { is_strict: true }
    }
}

impl Rule for NoUnnecessaryAct {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        Ok(Box::new(Listener {
            is_strict: options.is_strict,
        }))
    }
}

struct Listener {
    is_strict: bool,
}

/// Identifier naming what a statement calls or awaits
fn statement_identifier(statement: Node<'_>) -> Option<Node<'_>> {
    if let Some(call) = get_statement_call_expression(statement) {
        return get_deepest_identifier(call);
    }
    if is_expression_statement(statement) {
        return inner_expression(statement)
            .filter(|e| is_await_expression(*e))
            .and_then(inner_expression)
            .and_then(get_property_identifier);
    }
    if is_return_statement(statement) {
        return inner_expression(statement).and_then(get_property_identifier);
    }
    None
}

/// The `act` identifier of the call `function` is passed to
fn act_identifier<'a>(function: Node<'a>, engine: &DetectionEngine<'_>) -> Option<Node<'a>> {
    call_of_argument(function)
        .filter(|c| is_call_expression(*c))
        .and_then(get_deepest_identifier)
        .filter(|identifier| engine.is_act_util(*identifier))
}

impl Listener {
    fn on_block<'a>(&self, block: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(function) = block
            .parent()
            .filter(|f| matches!(NodeKind::of(*f), NodeKind::ArrowFunction | NodeKind::FunctionExpression))
        else {
            return;
        };
        let engine = cx.engine();
        let Some(act) = act_identifier(function, engine) else {
            return;
        };
        if is_empty_function(function) {
            cx.report(Report::new(act, "noUnnecessaryActEmptyFunction"));
            return;
        }
        let mut identifiers = block_statements(block).into_iter().filter_map(statement_identifier);
        let should_report = if self.is_strict {
            identifiers.any(|i| engine.is_testing_library_util(i))
        } else {
            !identifiers.any(|i| !engine.is_testing_library_util(i))
        };
        if should_report {
            cx.report(Report::new(act, "noUnnecessaryActTestingLibraryUtil"));
        }
    }

    /// `act(() => render(...))`
    fn on_implicit_return<'a>(&self, call: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(function) = call.parent().filter(|p| NodeKind::of(*p) == NodeKind::ArrowFunction) else {
            return;
        };
        let Some(identifier) = get_deepest_identifier(call) else {
            return;
        };
        let engine = cx.engine();
        let Some(act) = act_identifier(function, engine) else {
            return;
        };
        if engine.is_testing_library_util(identifier) {
            cx.report(Report::new(act, "noUnnecessaryActTestingLibraryUtil"));
        }
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::BlockStatement),
            Selector::Enter(NodeKind::CallExpression),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::BlockStatement) => self.on_block(node, cx),
            Selector::Enter(NodeKind::CallExpression) => self.on_implicit_return(node, cx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, lint_with, message_ids, reported};
    use serde_json::json;

    const RULE: &str = "no-unnecessary-act";

    const IMPORT: &str = "import { act, render, screen, fireEvent } from '@testing-library/react';\n";

    #[test]
    fn positive_empty_function() {
        let source = format!("{}act(() => {{}});\nact(function () {{}});\n", IMPORT);
        let diagnostics = lint(RULE, &source);
        assert_eq!(
            message_ids(&diagnostics),
            vec!["noUnnecessaryActEmptyFunction", "noUnnecessaryActEmptyFunction"]
        );
        assert_eq!(reported(&diagnostics, &source), vec!["act", "act"]);
    }

    #[test]
    fn positive_wrapped_testing_library_utils() {
        let source = format!(
            "{}act(() => {{\n  fireEvent.click(el);\n}});\nact(() => render(<App />));\nawait act(async () => {{\n  await screen.findByText('a');\n}});\n",
            IMPORT
        );
        let diagnostics = lint(RULE, &source);
        assert_eq!(
            message_ids(&diagnostics),
            vec![
                "noUnnecessaryActTestingLibraryUtil",
                "noUnnecessaryActTestingLibraryUtil",
                "noUnnecessaryActTestingLibraryUtil",
            ]
        );
    }

    #[test]
    fn strict_mode_reports_mixed_bodies() {
        let source = format!(
            "{}act(() => {{\n  fireEvent.click(el);\n  stuffThatDoesNotUseRTL();\n}});\n",
            IMPORT
        );
        assert_eq!(lint(RULE, &source).len(), 1);
        let options = Some(json!({ "isStrict": false }));
        assert!(lint_with(RULE, options, &source).is_empty());
    }

    #[test]
    fn negative_act_around_other_code() {
        let source = format!(
            "{}act(() => {{\n  doOtherStuff();\n}});\nact(() => stuffThatDoesNotUseRTL());\n",
            IMPORT
        );
        assert!(lint(RULE, &source).is_empty());
    }

    #[test]
    fn react_dom_test_utils_act() {
        let source = "import { act } from 'react-dom/test-utils';\nimport { render } from '@testing-library/react';\nact(() => {\n  render(<App />);\n});\n";
        assert_eq!(lint(RULE, source).len(), 1);
    }
}
