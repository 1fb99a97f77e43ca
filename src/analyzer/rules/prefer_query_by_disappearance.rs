//! `waitForElementToBeRemoved` needs a query that can return null

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::DetectionEngine;
use crate::parser::ast_helpers::{
    block_statements, call_arguments, function_body, get_deepest_identifier,
    get_property_identifier, inner_expression, is_block_statement, is_call_expression,
    is_expression_statement, is_return_statement,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct PreferQueryByDisappearance;

static META: RuleMeta = RuleMeta {
    name: "prefer-query-by-disappearance",
    description: "Suggest using `queryBy*` queries when waiting for disappearance",
    messages: &[(
        "preferQueryByDisappearance",
        "Prefer using queryBy* when waiting for disappearance",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for PreferQueryByDisappearance {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// A `getBy*` / `findBy*` call, which throws instead of returning null
fn is_throwing_query_call(node: Node<'_>, engine: &DetectionEngine<'_>) -> bool {
    is_call_expression(node)
        && get_deepest_identifier(node)
            .is_some_and(|q| engine.is_get_query_variant(q) || engine.is_find_query_variant(q))
}

fn is_statement_violation(statement: Node<'_>, engine: &DetectionEngine<'_>) -> bool {
    (is_return_statement(statement) || is_expression_statement(statement))
        && inner_expression(statement).is_some_and(|e| is_throwing_query_call(e, engine))
}

fn is_violation(argument: Node<'_>, engine: &DetectionEngine<'_>) -> bool {
    match NodeKind::of(argument) {
        NodeKind::CallExpression => is_throwing_query_call(argument, engine),
        NodeKind::ArrowFunction | NodeKind::FunctionExpression => {
            let Some(body) = function_body(argument) else {
                return false;
            };
            if is_block_statement(body) {
                block_statements(body)
                    .into_iter()
                    .any(|s| is_statement_violation(s, engine))
            } else {
                is_throwing_query_call(body, engine)
            }
        }
        _ => false,
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::CallExpression)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let engine = cx.engine();
        let is_wait_for_removal = get_property_identifier(node)
            .is_some_and(|root| engine.is_async_util_named(root, &["waitForElementToBeRemoved"]));
        if !is_wait_for_removal {
            return;
        }
        let Some(argument) = call_arguments(node).into_iter().next() else {
            return;
        };
        if is_violation(argument, engine) {
            cx.report(Report::new(argument, "preferQueryByDisappearance"));
        }
    }
}
