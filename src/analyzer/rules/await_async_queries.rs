//! `findBy*` queries return promises that must be handled

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    find_closest_call_expression, find_closest_function, get_deepest_identifier,
    get_wrapper_function_name, is_async_function, is_identifier, is_member_expression,
    is_promise_handled,
};
use crate::parser::{get_variable_references, NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct AwaitAsyncQueries;

static META: RuleMeta = RuleMeta {
    name: "await-async-queries",
    description: "Enforce promises from async queries to be handled",
    messages: &[
        (
            "awaitAsyncQuery",
            "promise returned from `{{ name }}` query must be handled",
        ),
        (
            "asyncQueryWrapper",
            "promise returned from `{{ name }}` wrapper over async query must be handled",
        ),
    ],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for AwaitAsyncQueries {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener::default()))
    }
}

#[derive(Default)]
struct Listener {
    wrapper_names: Vec<String>,
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::CallExpression)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(identifier) = get_deepest_identifier(node) else {
            return;
        };
        let source = cx.source();

        if cx.engine().is_async_query(identifier) {
            if let Some(wrapper) = get_wrapper_function_name(identifier, source) {
                self.wrapper_names.push(wrapper);
            }
            let Some(call) = find_closest_call_expression(node, true) else {
                return;
            };
            let Some(parent) = call.parent() else {
                return;
            };
            let references = get_variable_references(parent, source);
            if references.is_empty() {
                if !is_promise_handled(identifier, source) {
                    report(identifier, "awaitAsyncQuery", cx);
                }
                return;
            }
            // const promise = findByRole('button'); await promise;
            let unhandled = references
                .into_iter()
                .any(|r| is_identifier(r) && !is_promise_handled(r, source));
            if unhandled {
                cx.report(Report::new(identifier, "awaitAsyncQuery").data("name", cx.text(identifier)));
            }
        } else if self.wrapper_names.iter().any(|w| w == cx.text(identifier))
            && !is_promise_handled(identifier, source)
        {
            report(identifier, "asyncQueryWrapper", cx);
        }
    }
}

/// Report with a fix awaiting the call and making its function async
fn report<'a>(identifier: Node<'a>, message_id: &'static str, cx: &mut RuleContext<'a, '_>) {
    let source = cx.source();
    let target = identifier
        .parent()
        .filter(|p| is_member_expression(*p))
        .unwrap_or(identifier);
    let report = Report::new(identifier, message_id)
        .data("name", cx.text(identifier))
        .fix(source, |fixer| {
            fixer.insert_before(target, "await ");
            if let Some(function) = find_closest_function(identifier) {
                if !is_async_function(function) {
                    fixer.insert_before(function, "async ");
                }
            }
        });
    cx.report(report);
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{fix, lint, lint_with_settings, message_ids, reported, settings};
    use serde_json::json;

    const RULE: &str = "await-async-queries";

    #[test]
    fn positive_unhandled_find_query() {
        let source = "test('x', () => {\n  screen.findByText('hello');\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["awaitAsyncQuery"]);
        assert_eq!(reported(&diagnostics, source), vec!["findByText"]);
        assert_eq!(
            diagnostics[0].message,
            "promise returned from `findByText` query must be handled"
        );
        assert_eq!(
            fix(RULE, source),
            "test('x', async () => {\n  await screen.findByText('hello');\n});\n"
        );
    }

    #[test]
    fn negative_handled_queries() {
        let source = r#"test('x', async () => {
  const a = await findByText('a');
  await expect(screen.findByRole('button')).resolves.toBeInTheDocument();
  findAllByText('b').then((els) => els);
  await Promise.all([findByText('c'), findByText('d')]);
  await waitFor(() => findByText('e'));
});
"#;
        assert!(lint(RULE, source).is_empty());
    }

    #[test]
    fn stored_promise_must_be_awaited() {
        let unhandled = "test('x', async () => {\n  const el = findByText('a');\n  expect(el).toBeTruthy();\n});\n";
        assert_eq!(lint(RULE, unhandled).len(), 1);

        let handled = "test('x', async () => {\n  const el = findByText('a');\n  await el;\n});\n";
        assert!(lint(RULE, handled).is_empty());
    }

    #[test]
    fn positive_wrapper_over_async_query() {
        let source = "function findButton() {\n  return screen.findByRole('button');\n}\ntest('x', () => {\n  findButton();\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["asyncQueryWrapper"]);
        assert_eq!(reported(&diagnostics, source), vec!["findButton"]);
    }

    #[test]
    fn negative_unknown_query_outside_aggressive_mode() {
        let strict = settings(json!({ "testing-library/custom-queries": "off" }));
        let source = "import { screen } from '@testing-library/react';\ntest('x', () => {\n  findByIcon('a');\n});\n";
        assert!(lint_with_settings(RULE, strict, source).is_empty());
        assert_eq!(lint(RULE, source).len(), 1);
    }

    #[test]
    fn partial_custom_query_pattern_is_reported() {
        let configured = settings(json!({ "testing-library/custom-queries": ["ByIcon"] }));
        let source = "import { screen } from '@testing-library/react';\ntest('x', () => {\n  screen.findByIcon('x');\n});\n";
        let diagnostics = lint_with_settings(RULE, configured, source);
        assert_eq!(reported(&diagnostics, source), vec!["findByIcon"]);
    }
}
