//! Stand-alone `getBy*` calls assert implicitly; make the assertion visible

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::{ABSENCE_MATCHERS, PRESENCE_MATCHERS};
use crate::parser::ast_helpers::{
    find_closest_call_named, get_assert_node_info, has_call_ancestor, is_await_expression,
    is_call_expression, is_expression_statement, is_member_expression, is_variable_declarator,
    member_property,
};
use crate::parser::{NodeKind, Selector};
use crate::LintError;
use serde::Deserialize;
use serde_json::Value;
use tree_sitter::Node;

pub struct PreferExplicitAssert;

static META: RuleMeta = RuleMeta {
    name: "prefer-explicit-assert",
    description: "Suggest using explicit assertions rather than standalone queries",
    messages: &[
        (
            "preferExplicitAssert",
            "Wrap stand-alone `getBy*` query with `expect` function for better explicit assertion",
        ),
        (
            "preferExplicitAssertAssertion",
            "`getBy*` queries must be asserted with `{{assertion}}`",
        ),
    ],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Off,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    assertion: Option<String>,
    include_find_queries: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            assertion: None,
            include_find_queries: true,
        }
    }
}

impl Rule for PreferExplicitAssert {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        if let Some(assertion) = &options.assertion {
            let known = PRESENCE_MATCHERS.contains(&assertion.as_str())
                || ABSENCE_MATCHERS.contains(&assertion.as_str());
            if !known {
                return Err(LintError::InvalidOptions {
                    rule: META.name.to_string(),
                    message: format!("unknown assertion `{}`", assertion),
                });
            }
        }
        Ok(Box::new(Listener {
            options,
            get_queries: Vec::new(),
            find_queries: Vec::new(),
        }))
    }
}

struct Listener<'a> {
    options: Options,
    get_queries: Vec<Node<'a>>,
    find_queries: Vec<Node<'a>>,
}

/// `screen.getByText` for the `getByText` of a member call, else the identifier
fn query_expression(identifier: Node<'_>) -> Node<'_> {
    identifier
        .parent()
        .filter(|p| is_member_expression(*p))
        .unwrap_or(identifier)
}

/// The query call is a statement of its own, awaited or not
fn is_at_top_level(expression: Node<'_>) -> bool {
    let Some(grandparent) = expression.parent().and_then(|p| p.parent()) else {
        return false;
    };
    if is_expression_statement(grandparent) {
        return true;
    }
    is_await_expression(grandparent) && is_expression_statement(grandparent.parent())
}

/// `const el = getBy...()` or `const el = await findBy...()`
fn is_assigned_to_variable(identifier: Node<'_>) -> bool {
    let Some(call) = query_expression(identifier)
        .parent()
        .filter(|p| is_call_expression(*p))
    else {
        return false;
    };
    let mut parent = call.parent();
    if let Some(awaited) = parent.filter(|p| is_await_expression(*p)) {
        parent = awaited.parent();
    }
    is_variable_declarator(parent)
}

impl<'a> Listener<'a> {
    fn check_assertion(&self, query: Node<'a>, assertion: &str, cx: &mut RuleContext<'a, '_>) {
        let source = cx.source();
        let Some(expect_member) = find_closest_call_named(query_expression(query), "expect", source)
            .and_then(|call| call.parent())
            .filter(|p| is_member_expression(*p))
        else {
            return;
        };
        let Some(info) = get_assert_node_info(expect_member, source) else {
            return;
        };
        let should_enforce = if info.is_negated {
            ABSENCE_MATCHERS.contains(&info.matcher)
        } else {
            PRESENCE_MATCHERS.contains(&info.matcher)
        };
        if !should_enforce || info.matcher == assertion {
            return;
        }
        if let Some(property) = member_property(expect_member) {
            cx.report(Report::new(property, "preferExplicitAssertAssertion").data("assertion", assertion));
        }
    }

    fn on_program_exit(&mut self, cx: &mut RuleContext<'a, '_>) {
        if self.options.include_find_queries {
            for &query in &self.find_queries {
                if !is_assigned_to_variable(query) && is_at_top_level(query_expression(query)) {
                    cx.report(Report::new(query, "preferExplicitAssert"));
                }
            }
        }
        for &query in &self.get_queries {
            if is_at_top_level(query_expression(query)) {
                cx.report(Report::new(query, "preferExplicitAssert"));
            }
            if let Some(assertion) = &self.options.assertion {
                self.check_assertion(query, assertion, cx);
            }
        }
    }
}

impl<'a> RuleListener<'a> for Listener<'a> {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::Identifier),
            Selector::Exit(NodeKind::Program),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::Identifier) => {
                if !has_call_ancestor(node) {
                    return;
                }
                let engine = cx.engine();
                if engine.is_get_query_variant(node) {
                    self.get_queries.push(node);
                }
                if engine.is_find_query_variant(node) {
                    self.find_queries.push(node);
                }
            }
            Selector::Exit(NodeKind::Program) => self.on_program_exit(cx),
            _ => {}
        }
    }
}
