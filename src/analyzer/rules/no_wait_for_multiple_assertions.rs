//! One assertion per `waitFor` callback, so a failure surfaces on time
//!
//! Assertions are grouped by the source text of their `expect(...)` argument.
//! Within a group only the first assertion stays inside the callback; the rest
//! are reported and the fix moves them after the `waitFor` statement.

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    block_statements, call_arguments, call_of_argument, enclosing_statement,
    get_property_identifier, is_call_expression, is_expression_statement, is_identifier_named,
    line_indent, statement_removal_range,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct NoWaitForMultipleAssertions;

static META: RuleMeta = RuleMeta {
    name: "no-wait-for-multiple-assertions",
    description: "Disallow the use of multiple `expect` calls inside `waitFor`",
    messages: &[(
        "noWaitForMultipleAssertion",
        "Avoid using multiple assertions within `waitFor` callback",
    )],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for NoWaitForMultipleAssertions {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// Source text of what an `expect(...)` statement asserts on
fn expect_argument<'s>(statement: Node<'_>, source: &'s str) -> Option<&'s str> {
    if !is_expression_statement(statement) {
        return None;
    }
    let root = get_property_identifier(statement)?;
    if !is_identifier_named(root, "expect", source) {
        return None;
    }
    let call = root.parent().filter(|p| is_call_expression(*p))?;
    let argument = call_arguments(call).into_iter().next();
    Some(argument.map_or("", |a| &source[a.start_byte()..a.end_byte()]))
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::BlockStatement)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(wait_for) = node
            .parent()
            .filter(|f| matches!(NodeKind::of(*f), NodeKind::ArrowFunction | NodeKind::FunctionExpression))
            .and_then(call_of_argument)
            .filter(|c| is_call_expression(*c))
        else {
            return;
        };
        let is_wait_for = get_property_identifier(wait_for)
            .is_some_and(|root| cx.engine().is_async_util_named(root, &["waitFor"]));
        if !is_wait_for {
            return;
        }
        let Some(wait_for_statement) = enclosing_statement(wait_for) else {
            return;
        };

        let source = cx.source();
        let mut seen: Vec<&str> = Vec::new();
        for statement in block_statements(node) {
            let Some(argument) = expect_argument(statement, source) else {
                continue;
            };
            if !seen.contains(&argument) {
                seen.push(argument);
                continue;
            }
            let report = Report::new(statement, "noWaitForMultipleAssertion").fix(source, |fixer| {
                let indent = line_indent(source, wait_for_statement.start_byte());
                let text = &source[statement.start_byte()..statement.end_byte()];
                let (start, end) = statement_removal_range(statement);
                fixer.remove_range(start, end);
                fixer.insert_after(wait_for_statement, format!("\n{}{}", indent, text));
            });
            cx.report(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{fix, lint, message_ids, reported};

    const RULE: &str = "no-wait-for-multiple-assertions";

    #[test]
    fn positive_repeated_assertion_target() {
        let source = r#"test('x', async () => {
  await waitFor(() => {
    expect(a).toBe(1);
    expect(a).not.toBe(2);
    expect(b).toBe(3);
  });
});
"#;
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noWaitForMultipleAssertion"]);
        assert_eq!(reported(&diagnostics, source), vec!["expect(a).not.toBe(2);"]);
        assert_eq!(
            fix(RULE, source),
            r#"test('x', async () => {
  await waitFor(() => {
    expect(a).toBe(1);
    expect(b).toBe(3);
  });
  expect(a).not.toBe(2);
});
"#
        );
    }

    #[test]
    fn textual_comparison_only() {
        let source = "await waitFor(function () {\n  expect(a.b).toBe(1);\n  expect(a['b']).toBe(1);\n});\n";
        assert!(lint(RULE, source).is_empty());
    }

    #[test]
    fn negative_single_or_distinct_assertions() {
        let source = r#"test('x', async () => {
  await waitFor(() => expect(a).toBe(1));
  await waitFor(() => {
    expect(a).toBe(1);
    expect(b).toBe(2);
  });
  somethingElse(() => {
    expect(a).toBe(1);
    expect(a).toBe(2);
  });
});
"#;
        assert!(lint(RULE, source).is_empty());
    }
}
