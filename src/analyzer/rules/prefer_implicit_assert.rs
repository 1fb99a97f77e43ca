//! `getBy*` and `findBy*` already fail when nothing matches, so wrapping them
//! in a presence assertion only repeats that check

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    call_of_argument, find_closest_call_named, is_await_expression, is_callee, is_identifier,
    is_member_expression, member_object, member_property,
};
use crate::parser::{NodeKind, Selector};
use crate::LintError;
use serde_json::Value;
use tree_sitter::Node;

pub struct PreferImplicitAssert;

static META: RuleMeta = RuleMeta {
    name: "prefer-implicit-assert",
    description: "Suggest using implicit assertions for getBy* & findBy* queries",
    messages: &[(
        "preferImplicitAssert",
        "Don't wrap `{{queryType}}` query with `expect` & presence matchers like `toBeInTheDocument` or `not.toBeNull` as `{{queryType}}` queries fail implicitly when element is not found",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Off,
};

impl Rule for PreferImplicitAssert {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// `screen.getByText` when the query hangs off an object, else the identifier
/// itself. Queries on anything but a plain identifier are not followed.
fn query_expression(identifier: Node<'_>) -> Option<Node<'_>> {
    let Some(member) = identifier.parent().filter(|p| is_member_expression(*p)) else {
        return Some(identifier);
    };
    let is_property = member_property(member).is_some_and(|p| p.id() == identifier.id());
    let on_identifier = member_object(member).is_some_and(is_identifier);
    (is_property && on_identifier).then_some(member)
}

/// The `expect(...)` call taking the query call (or its awaited value) directly
fn wrapping_expect<'a>(query_call: Node<'a>, is_async: bool, source: &str) -> Option<Node<'a>> {
    let argument = if is_async {
        query_call.parent().filter(|p| is_await_expression(*p))?
    } else {
        query_call
    };
    let expect = call_of_argument(argument)?;
    let closest = find_closest_call_named(argument, "expect", source)?;
    (closest.id() == expect.id()).then_some(expect)
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::Identifier)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let engine = cx.engine();
        let query_type = if engine.is_find_query_variant(node) {
            "findBy*"
        } else if engine.is_get_query_variant(node) {
            "getBy*"
        } else {
            return;
        };
        let Some(expression) = query_expression(node).filter(|e| is_callee(*e)) else {
            return;
        };
        let Some(query_call) = expression.parent() else {
            return;
        };
        let Some(expect) = wrapping_expect(query_call, query_type == "findBy*", cx.source()) else {
            return;
        };
        let is_presence_assert = expect
            .parent()
            .filter(|p| is_member_expression(*p))
            .is_some_and(|member| engine.is_presence_assert(member));
        if is_presence_assert {
            cx.report(Report::new(expression, "preferImplicitAssert").data("queryType", query_type));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, message_ids, reported};

    const RULE: &str = "prefer-implicit-assert";

    #[test]
    fn positive_presence_assertions_on_throwing_queries() {
        let source = r#"test('x', async () => {
  expect(getByText('a')).toBeInTheDocument();
  expect(screen.getByRole('button')).toBeTruthy();
  expect(await findByText('b')).not.toBeNull();
  expect(await screen.findAllByRole('row')).toBeDefined();
});
"#;
        let diagnostics = lint(RULE, source);
        assert_eq!(
            message_ids(&diagnostics),
            vec![
                "preferImplicitAssert",
                "preferImplicitAssert",
                "preferImplicitAssert",
                "preferImplicitAssert",
            ]
        );
        assert_eq!(
            reported(&diagnostics, source),
            vec!["getByText", "screen.getByRole", "findByText", "screen.findAllByRole"]
        );
        assert_eq!(
            diagnostics[2].message,
            "Don't wrap `findBy*` query with `expect` & presence matchers like `toBeInTheDocument` or `not.toBeNull` as `findBy*` queries fail implicitly when element is not found"
        );
    }

    #[test]
    fn negative_implicit_and_other_assertions() {
        let source = r#"test('x', async () => {
  getByText('a');
  await screen.findByRole('button');
  expect(queryByText('c')).toBeInTheDocument();
  expect(getByText('d')).toHaveTextContent('e');
  expect(getByRole('dialog')).not.toBeInTheDocument();
  expect(within(list).getByText('f')).toBeInTheDocument();
  expect(findByText('g')).toBeDefined();
});
"#;
        assert!(lint(RULE, source).is_empty());
    }
}
