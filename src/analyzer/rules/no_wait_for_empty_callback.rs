//! `waitFor(() => {})` resolves on the first tick and asserts nothing

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    call_callee, call_of_argument, function_body, get_property_identifier, is_call_expression,
    is_empty_function, is_identifier, is_identifier_named,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

const WAIT_UTILS: &[&str] = &["waitFor", "waitForElementToBeRemoved"];

pub struct NoWaitForEmptyCallback;

static META: RuleMeta = RuleMeta {
    name: "no-wait-for-empty-callback",
    description: "Disallow empty callbacks for `waitFor` and `waitForElementToBeRemoved`",
    messages: &[(
        "noWaitForEmptyCallback",
        "Avoid passing empty callback to `{{ methodName }}`. Insert an assertion instead.",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for NoWaitForEmptyCallback {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// Callee identifier of the wait util `argument` is passed to
fn wait_util_callee<'a>(argument: Node<'a>, cx: &RuleContext<'a, '_>) -> Option<Node<'a>> {
    let call = call_of_argument(argument).filter(|c| is_call_expression(*c))?;
    let root = get_property_identifier(call)?;
    if !cx.engine().is_async_util_named(root, WAIT_UTILS) {
        return None;
    }
    call_callee(call).filter(|c| is_identifier(*c))
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::ArrowFunction),
            Selector::Enter(NodeKind::FunctionExpression),
            Selector::Enter(NodeKind::Identifier),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if selector == Selector::Enter(NodeKind::Identifier)
            && !is_identifier_named(node, "noop", cx.source())
        {
            return;
        }
        let Some(callee) = wait_util_callee(node, cx) else {
            return;
        };
        let method_name = cx.text(callee);
        let report_node = match selector {
            Selector::Enter(NodeKind::Identifier) => node,
            _ if is_empty_function(node) => match function_body(node) {
                Some(body) => body,
                None => return,
            },
            _ => return,
        };
        cx.report(Report::new(report_node, "noWaitForEmptyCallback").data("methodName", method_name));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, message_ids, reported};

    const RULE: &str = "no-wait-for-empty-callback";

    #[test]
    fn positive_empty_callbacks() {
        let source = "test('x', async () => {\n  await waitFor(() => {});\n  await waitForElementToBeRemoved(function () {});\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(
            message_ids(&diagnostics),
            vec!["noWaitForEmptyCallback", "noWaitForEmptyCallback"]
        );
        assert_eq!(reported(&diagnostics, source), vec!["{}", "{}"]);
        assert_eq!(
            diagnostics[0].message,
            "Avoid passing empty callback to `waitFor`. Insert an assertion instead."
        );
        assert_eq!(
            diagnostics[1].message,
            "Avoid passing empty callback to `waitForElementToBeRemoved`. Insert an assertion instead."
        );
    }

    #[test]
    fn positive_noop_callback() {
        let source = "import { waitFor } from '@testing-library/react';\nawait waitFor(noop);\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["noop"]);
    }

    #[test]
    fn negative_callbacks_with_assertions() {
        let source = "test('x', async () => {\n  await waitFor(() => {\n    expect(a).toBe(1);\n  });\n  await waitFor(() => expect(b).toBe(2));\n  await waitForElementToBeRemoved(() => screen.queryByText('x'));\n  somethingElse(() => {});\n});\n";
        assert!(lint(RULE, source).is_empty());
    }
}
