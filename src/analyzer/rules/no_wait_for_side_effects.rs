//! `waitFor` may run its callback many times; side effects inside it repeat

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::DetectionEngine;
use crate::parser::ast_helpers::{
    block_statements, call_of_argument, declarators, enclosing_statement, get_property_identifier,
    inner_expression, is_assignment_expression, is_await_expression, is_call_expression,
    is_expression_statement, is_variable_declaration, line_indent, named_children,
    statement_removal_range, unwrap_parens,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct NoWaitForSideEffects;

static META: RuleMeta = RuleMeta {
    name: "no-wait-for-side-effects",
    description: "Disallow the use of side effects in `waitFor`",
    messages: &[(
        "noSideEffectsWaitFor",
        "Avoid using side effects within `waitFor` callback",
    )],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for NoWaitForSideEffects {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// `fireEvent.*`, `userEvent.*` or `render*` call, awaited or not
fn is_side_effect_call(expression: Node<'_>, engine: &DetectionEngine<'_>) -> bool {
    let mut expression = unwrap_parens(expression);
    if is_await_expression(expression) {
        match inner_expression(expression) {
            Some(inner) => expression = unwrap_parens(inner),
            None => return false,
        }
    }
    if !is_call_expression(expression) {
        return false;
    }
    get_property_identifier(expression).is_some_and(|root| {
        engine.is_fire_event_util(root) || engine.is_user_event_util(root) || engine.is_render_util(root)
    })
}

fn is_side_effect_statement(statement: Node<'_>, engine: &DetectionEngine<'_>) -> bool {
    if is_variable_declaration(statement) {
        return declarators(statement)
            .into_iter()
            .filter_map(|d| d.child_by_field_name("value"))
            .any(|value| is_side_effect_call(value, engine));
    }
    if !is_expression_statement(statement) {
        return false;
    }
    let Some(expression) = inner_expression(statement) else {
        return false;
    };
    if is_assignment_expression(expression) {
        return expression
            .child_by_field_name("right")
            .is_some_and(|right| is_side_effect_call(right, engine));
    }
    is_side_effect_call(expression, engine)
}

/// The `waitFor(...)` call `function` is the callback of
fn wait_for_call<'a>(function: Node<'a>, engine: &DetectionEngine<'_>) -> Option<Node<'a>> {
    if !matches!(
        NodeKind::of(function),
        NodeKind::ArrowFunction | NodeKind::FunctionExpression
    ) {
        return None;
    }
    call_of_argument(function)
        .filter(|c| is_call_expression(*c))
        .filter(|c| get_property_identifier(*c).is_some_and(|root| engine.is_async_util_named(root, &["waitFor"])))
}

impl Listener {
    fn on_block<'a>(&self, block: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let engine = cx.engine();
        let Some(wait_for) = block.parent().and_then(|f| wait_for_call(f, engine)) else {
            return;
        };
        let Some(wait_for_statement) = enclosing_statement(wait_for) else {
            return;
        };
        let source = cx.source();
        for statement in block_statements(block) {
            if !is_side_effect_statement(statement, engine) {
                continue;
            }
            let report = Report::new(statement, "noSideEffectsWaitFor").fix(source, |fixer| {
                let indent = line_indent(source, wait_for_statement.start_byte());
                let text = &source[statement.start_byte()..statement.end_byte()];
                fixer.insert_before(wait_for_statement, format!("{}\n{}", text, indent));
                let (start, end) = statement_removal_range(statement);
                fixer.remove_range(start, end);
            });
            cx.report(report);
        }
    }

    /// `waitFor(() => fireEvent.click(el))` and `waitFor(() => (render(), check()))`
    fn on_implicit_return<'a>(&self, body: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(function) = body
            .parent()
            .filter(|p| NodeKind::of(*p) == NodeKind::ArrowFunction)
            .filter(|p| p.child_by_field_name("body").map(|b| b.id()) == Some(body.id()))
        else {
            return;
        };
        let engine = cx.engine();
        if wait_for_call(function, engine).is_none() {
            return;
        }
        let is_side_effect = match NodeKind::of(body) {
            NodeKind::SequenceExpression => named_children(body)
                .into_iter()
                .any(|e| is_side_effect_call(e, engine)),
            _ => is_side_effect_call(body, engine),
        };
        if is_side_effect {
            cx.report(Report::new(body, "noSideEffectsWaitFor"));
        }
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::BlockStatement),
            Selector::Enter(NodeKind::CallExpression),
            Selector::Enter(NodeKind::SequenceExpression),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::BlockStatement) => self.on_block(node, cx),
            Selector::Enter(NodeKind::CallExpression | NodeKind::SequenceExpression) => {
                self.on_implicit_return(node, cx)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{fix, lint, message_ids, reported};

    const RULE: &str = "no-wait-for-side-effects";

    #[test]
    fn positive_render_is_hoisted() {
        let source = r#"test('x', async () => {
  await waitFor(() => {
    render(<App />);
    expect(a).toBe(1);
  });
});
"#;
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noSideEffectsWaitFor"]);
        assert_eq!(reported(&diagnostics, source), vec!["render(<App />);"]);
        assert_eq!(
            fix(RULE, source),
            r#"test('x', async () => {
  render(<App />);
  await waitFor(() => {
    expect(a).toBe(1);
  });
});
"#
        );
    }

    #[test]
    fn positive_event_statements_and_declarations() {
        let source = r#"import { waitFor, fireEvent, render } from '@testing-library/react';
import userEvent from '@testing-library/user-event';
test('x', async () => {
  await waitFor(async function () {
    fireEvent.keyDown(input, { key: 'ArrowDown' });
    const view = render(<App />);
    await userEvent.click(button);
    expect(b).toEqual('b');
  });
});
"#;
        let diagnostics = lint(RULE, source);
        assert_eq!(
            reported(&diagnostics, source),
            vec![
                "fireEvent.keyDown(input, { key: 'ArrowDown' });",
                "const view = render(<App />);",
                "await userEvent.click(button);",
            ]
        );
    }

    #[test]
    fn positive_implicit_return_has_no_fix() {
        let source = "test('x', async () => {\n  await waitFor(() => fireEvent.click(button));\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["fireEvent.click(button)"]);
        assert!(diagnostics[0].fix.is_none());
    }

    #[test]
    fn negative_assertions_only() {
        let source = r#"test('x', async () => {
  fireEvent.click(button);
  await waitFor(() => {
    expect(a).toBe(1);
  });
  await waitFor(() => expect(b).toBe(2));
  other(() => {
    render(<App />);
  });
});
"#;
        assert!(lint(RULE, source).is_empty());
    }
}
