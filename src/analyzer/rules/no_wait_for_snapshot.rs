//! Snapshots taken inside `waitFor` are never regenerated reliably

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    call_callee, find_closest_call_expression, identifier_name, is_identifier, is_member_expression,
    member_property,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

const SNAPSHOT_MATCHERS: &[&str] = &["toMatchSnapshot", "toMatchInlineSnapshot"];

pub struct NoWaitForSnapshot;

static META: RuleMeta = RuleMeta {
    name: "no-wait-for-snapshot",
    description: "Ensures no snapshot is generated inside of a `waitFor` call",
    messages: &[(
        "noWaitForSnapshot",
        "A snapshot can't be generated inside of a `{{ name }}` call",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for NoWaitForSnapshot {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// Identifier of the nearest enclosing async util call, `waitFor` in
/// `waitFor(...)` or `asyncUtils.waitFor(...)`
fn closest_async_util<'a>(node: Node<'a>, cx: &RuleContext<'a, '_>) -> Option<Node<'a>> {
    let engine = cx.engine();
    let mut current = node;
    loop {
        let call = find_closest_call_expression(current, false)?;
        let callee = call_callee(call)?;
        let identifier = if is_member_expression(callee) {
            member_property(callee).filter(|p| is_identifier(*p))
        } else {
            Some(callee).filter(|c| is_identifier(*c))
        };
        if let Some(identifier) = identifier.filter(|i| engine.is_async_util(*i)) {
            return Some(identifier);
        }
        current = call.parent()?;
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::Identifier)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let is_snapshot_matcher =
            identifier_name(node, cx.source()).is_some_and(|name| SNAPSHOT_MATCHERS.contains(&name));
        if !is_snapshot_matcher {
            return;
        }
        if let Some(util) = closest_async_util(node, cx) {
            cx.report(Report::new(node, "noWaitForSnapshot").data("name", cx.text(util)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, message_ids, reported};

    const RULE: &str = "no-wait-for-snapshot";

    #[test]
    fn positive_snapshot_in_wait_for() {
        let source = r#"test('x', async () => {
  await waitFor(() => expect(container).toMatchSnapshot());
  await asyncUtils.waitForElementToBeRemoved(() => {
    expect(container).toMatchInlineSnapshot();
  });
});
"#;
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noWaitForSnapshot", "noWaitForSnapshot"]);
        assert_eq!(
            reported(&diagnostics, source),
            vec!["toMatchSnapshot", "toMatchInlineSnapshot"]
        );
        assert_eq!(
            diagnostics[0].message,
            "A snapshot can't be generated inside of a `waitFor` call"
        );
        assert_eq!(
            diagnostics[1].message,
            "A snapshot can't be generated inside of a `waitForElementToBeRemoved` call"
        );
    }

    #[test]
    fn negative_snapshot_outside_wait() {
        let source = r#"test('x', async () => {
  await waitFor(() => expect(a).toBe(1));
  expect(container).toMatchSnapshot();
});
"#;
        assert!(lint(RULE, source).is_empty());
    }
}
