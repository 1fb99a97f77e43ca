//! `fireEvent` needs a DOM element, not a promise of one

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    call_arguments, call_callee, find_closest_call_expression, get_deepest_identifier,
    get_property_identifier, has_call_ancestor, is_await_expression, is_call_expression,
    is_identifier, is_identifier_named, is_new_expression, unwrap_parens,
};
use crate::parser::{find_declaration, DeclarationKind, NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

const PROMISE: &str = "Promise";

pub struct NoPromiseInFireEvent;

static META: RuleMeta = RuleMeta {
    name: "no-promise-in-fire-event",
    description: "Disallow the use of promises passed to a `fireEvent` method",
    messages: &[(
        "noPromiseInFireEvent",
        "A promise shouldn't be passed to a `fireEvent` method, instead pass the DOM element",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for NoPromiseInFireEvent {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// Check whether `node` evaluates to a promise, following variables to their
/// initializers. Reports on `original` (the argument as written) when set.
fn check_suspicious_node<'a>(
    node: Node<'a>,
    original: Option<Node<'a>>,
    visited: &mut Vec<usize>,
    cx: &mut RuleContext<'a, '_>,
) {
    let node = unwrap_parens(node);
    let source = cx.source();
    if is_await_expression(node) {
        return;
    }
    let report_node = original.unwrap_or(node);

    if is_new_expression(node) {
        if call_callee(node).is_some_and(|c| is_identifier_named(c, PROMISE, source)) {
            cx.report(Report::new(report_node, "noPromiseInFireEvent"));
        }
        return;
    }
    if is_call_expression(node) {
        let Some(identifier) = get_deepest_identifier(node) else {
            return;
        };
        let is_promise = is_identifier_named(identifier, PROMISE, source)
            || get_property_identifier(node).is_some_and(|root| is_identifier_named(root, PROMISE, source));
        if cx.engine().is_async_query(identifier) || is_promise {
            cx.report(Report::new(report_node, "noPromiseInFireEvent"));
        }
        return;
    }
    if is_identifier(node) {
        let Some(declaration) = find_declaration(node, source) else {
            return;
        };
        let DeclarationKind::Variable { declarator } = declaration.kind else {
            return;
        };
        if visited.contains(&declarator.id()) {
            return;
        }
        visited.push(declarator.id());
        if let Some(init) = declarator.child_by_field_name("value") {
            check_suspicious_node(init, Some(original.unwrap_or(node)), visited, cx);
        }
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::Identifier)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if !has_call_ancestor(node) || !cx.engine().is_fire_event_method(node) {
            return;
        }
        let Some(call) = find_closest_call_expression(node, true) else {
            return;
        };
        if let Some(element) = call_arguments(call).into_iter().next() {
            check_suspicious_node(element, None, &mut Vec::new(), cx);
        }
    }
}
