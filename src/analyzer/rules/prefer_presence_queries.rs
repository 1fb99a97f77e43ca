//! `getBy*` throws when the element is missing, `queryBy*` returns null;
//! each fits one kind of assertion

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{find_closest_call_named, has_call_ancestor, is_member_expression};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde::Deserialize;
use serde_json::Value;
use tree_sitter::Node;

pub struct PreferPresenceQueries;

static META: RuleMeta = RuleMeta {
    name: "prefer-presence-queries",
    description: "Ensure appropriate `get*`/`query*` queries are used with their respective matchers",
    messages: &[
        (
            "wrongPresenceQuery",
            "Use `getBy*` queries rather than `queryBy*` for checking element is present",
        ),
        (
            "wrongAbsenceQuery",
            "Use `queryBy*` queries rather than `getBy*` for checking element is NOT present",
        ),
    ],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    presence: bool,
    absence: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            presence: true,
            absence: true,
        }
    }
}

impl Rule for PreferPresenceQueries {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        Ok(Box::new(Listener { options }))
    }
}

struct Listener {
    options: Options,
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::Identifier)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if !has_call_ancestor(node) {
            return;
        }
        let engine = cx.engine();
        let source = cx.source();
        let Some(expect_member) = find_closest_call_named(node, "expect", source)
            .and_then(|call| call.parent())
            .filter(|p| is_member_expression(*p))
        else {
            return;
        };
        if !engine.is_sync_query(node) {
            return;
        }
        let within = find_closest_call_named(node, "within", source).is_some();
        let is_presence_query = engine.is_get_query_variant(node);
        let is_presence_assert = engine.is_presence_assert(expect_member);
        let is_absence_assert = engine.is_absence_assert(expect_member);
        if !is_presence_assert && !is_absence_assert {
            return;
        }

        if self.options.presence && (within || is_presence_assert) && !is_presence_query {
            cx.report(Report::new(node, "wrongPresenceQuery"));
        } else if self.options.absence && !within && is_absence_assert && is_presence_query {
            cx.report(Report::new(node, "wrongAbsenceQuery"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, lint_with, message_ids, reported};
    use serde_json::json;

    const RULE: &str = "prefer-presence-queries";

    #[test]
    fn positive_query_for_presence() {
        let source = "expect(screen.queryByText('a')).toBeInTheDocument();\nexpect(queryAllByRole('row')).not.toBeNull();\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(
            message_ids(&diagnostics),
            vec!["wrongPresenceQuery", "wrongPresenceQuery"]
        );
        assert_eq!(reported(&diagnostics, source), vec!["queryByText", "queryAllByRole"]);
    }

    #[test]
    fn positive_get_for_absence() {
        let source = "expect(screen.getByText('a')).not.toBeInTheDocument();\nexpect(getByRole('dialog')).toBeNull();\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(
            message_ids(&diagnostics),
            vec!["wrongAbsenceQuery", "wrongAbsenceQuery"]
        );
    }

    #[test]
    fn checks_can_be_disabled() {
        let source = "expect(screen.queryByText('a')).toBeInTheDocument();\nexpect(getByRole('dialog')).toBeNull();\n";
        let only_absence = Some(json!({ "presence": false }));
        assert_eq!(
            message_ids(&lint_with(RULE, only_absence, source)),
            vec!["wrongAbsenceQuery"]
        );
        let only_presence = Some(json!({ "absence": false }));
        assert_eq!(
            message_ids(&lint_with(RULE, only_presence, source)),
            vec!["wrongPresenceQuery"]
        );
    }

    #[test]
    fn negative_matching_queries() {
        let source = "expect(screen.getByText('a')).toBeInTheDocument();\nexpect(queryByRole('dialog')).not.toBeInTheDocument();\nexpect(getByText('a')).toHaveTextContent('b');\nexpect(await findByText('a')).toBeInTheDocument();\n";
        assert!(lint(RULE, source).is_empty());
    }
}
