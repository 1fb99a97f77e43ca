//! `await waitFor(() => getBy...)` is what `findBy*` already does
//!
//! Handles a callback that is the query call itself, or a presence assertion
//! (possibly negated) on it. The fix rewrites the whole `waitFor` call and,
//! for queries destructured from `render`, adds the `findBy*` binding too.

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::WAIT_METHODS;
use crate::detector::DetectionEngine;
use crate::parser::ast_helpers::{
    call_arguments, call_callee, function_body, is_arrow_function, is_await_expression,
    is_call_expression, is_identifier, is_member_expression, is_object_expression,
    is_object_pattern, member_object, member_property, named_children, property_key_name, text,
};
use crate::parser::{find_declaration, DeclarationKind, NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct PreferFindBy;

static META: RuleMeta = RuleMeta {
    name: "prefer-find-by",
    description: "Suggest using `find(All)By*` query instead of `waitFor` + `get(All)By*` to wait for elements",
    messages: &[(
        "preferFindBy",
        "Prefer `{{queryVariant}}{{queryMethod}}` query over using `{{waitForMethodName}}` + `{{prevQuery}}`",
    )],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for PreferFindBy {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

/// A sync query call found in a `waitFor` callback
struct WaitedQuery<'a> {
    call: Node<'a>,
    identifier: Node<'a>,
    /// `screen` in `screen.getByText(...)`
    caller: Option<Node<'a>>,
}

/// `getByText(...)` or `screen.getByText(...)` when the name is a sync query
fn sync_query_call<'a>(call: Node<'a>, engine: &DetectionEngine<'_>) -> Option<WaitedQuery<'a>> {
    if !is_call_expression(call) {
        return None;
    }
    let callee = call_callee(call)?;
    let (identifier, caller) = if is_identifier(callee) {
        (callee, None)
    } else if is_member_expression(callee) {
        let object = member_object(callee).filter(|o| is_identifier(*o))?;
        (member_property(callee)?, Some(object))
    } else {
        return None;
    };
    engine.is_sync_query(identifier).then_some(WaitedQuery {
        call,
        identifier,
        caller,
    })
}

/// Query inside `expect(query).toBeInTheDocument()` or `expect(query).not.toBeNull()`
fn asserted_query<'a>(assertion: Node<'a>, engine: &DetectionEngine<'_>) -> Option<WaitedQuery<'a>> {
    let matcher = call_callee(assertion).filter(|c| is_member_expression(*c))?;
    let object = member_object(matcher)?;
    let (expect_call, asserted_member) = if is_member_expression(object) {
        (member_object(object)?, object)
    } else {
        (object, matcher)
    };
    if !is_call_expression(expect_call) || !engine.is_presence_assert(asserted_member) {
        return None;
    }
    let query = call_arguments(expect_call).into_iter().next()?;
    sync_query_call(query, engine)
}

fn find_by_variant(query_name: &str) -> &'static str {
    if query_name.contains("All") {
        "findAllBy"
    } else {
        "findBy"
    }
}

/// `{ getByText }` pattern `identifier` was destructured from, with
/// `find_method` appended, unless already there
fn extended_destructuring<'a>(
    identifier: Node<'a>,
    find_method: &str,
    source: &str,
) -> Option<(Node<'a>, String)> {
    let declaration = find_declaration(identifier, source)?;
    let DeclarationKind::Variable { .. } = declaration.kind else {
        return None;
    };
    let pattern = declaration.name.parent().filter(|p| is_object_pattern(*p))?;
    let already_declared = named_children(pattern)
        .into_iter()
        .any(|p| property_key_name(p, source) == Some(find_method));
    if already_declared {
        return None;
    }
    let pattern_text = text(pattern, source);
    let head = pattern_text.strip_suffix('}')?.trim_end();
    Some((pattern, format!("{}, {} }}", head, find_method)))
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::CallExpression)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if !is_await_expression(node.parent()) {
            return;
        }
        let engine = cx.engine();
        let source = cx.source();
        let Some(wait_callee) = call_callee(node).filter(|c| is_identifier(*c)) else {
            return;
        };
        if !engine.is_async_util_named(wait_callee, WAIT_METHODS) {
            return;
        }
        let arguments = call_arguments(node);
        let Some(body) = arguments
            .first()
            .filter(|a| is_arrow_function(**a))
            .and_then(|a| function_body(*a))
            .filter(|b| is_call_expression(*b))
        else {
            return;
        };
        let Some(query) = sync_query_call(body, engine).or_else(|| asserted_query(body, engine)) else {
            return;
        };

        let prev_query = cx.text(query.identifier);
        let Some(query_method) = prev_query.split("By").nth(1).filter(|m| !m.is_empty()) else {
            return;
        };
        let query_variant = find_by_variant(prev_query);
        let find_method = format!("{}{}", query_variant, query_method);
        let wait_options = arguments
            .get(1)
            .filter(|o| is_object_expression(**o))
            .map(|o| format!(", {}", text(*o, source)))
            .unwrap_or_default();
        let query_arguments = call_arguments(query.call)
            .into_iter()
            .map(|a| text(a, source))
            .collect::<Vec<_>>()
            .join(", ");
        let is_custom_query = engine.is_custom_query(query.identifier);

        let report = Report::new(node, "preferFindBy")
            .data("queryVariant", query_variant)
            .data("queryMethod", query_method)
            .data("prevQuery", prev_query)
            .data("waitForMethodName", cx.text(wait_callee))
            .fix(source, |fixer| {
                if is_custom_query {
                    return;
                }
                let call = format!("{}({}{})", find_method, query_arguments, wait_options);
                match query.caller {
                    Some(caller) => fixer.replace(node, format!("{}.{}", text(caller, source), call)),
                    None => {
                        fixer.replace(node, call);
                        if let Some((pattern, extended)) =
                            extended_destructuring(query.identifier, &find_method, source)
                        {
                            fixer.replace(pattern, extended);
                        }
                    }
                }
            });
        cx.report(report);
    }
}
