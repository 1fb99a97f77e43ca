//! Queries should come from `screen`, not from the `render` result

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::is_built_in_query_name;
use crate::parser::ast_helpers::{
    call_arguments, call_callee, get_deepest_identifier, get_wrapper_function_name,
    is_call_expression, is_identifier, is_member_expression, is_object_expression,
    is_object_pattern, member_object, named_children, property_key_name, text,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

/// Render options that scope queries to a custom root
const SCOPING_RENDER_OPTIONS: &[&str] = &["container", "baseElement"];

pub struct PreferScreenQueries;

static META: RuleMeta = RuleMeta {
    name: "prefer-screen-queries",
    description: "Suggest using `screen` while querying",
    messages: &[(
        "preferScreenQueries",
        "Avoid destructuring queries from `render` result, use `screen.{{ name }}` instead",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for PreferScreenQueries {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener::default()))
    }
}

/// `render(ui, { container })` style call
fn uses_scoping_options(call: Node<'_>, source: &str) -> bool {
    call_arguments(call)
        .get(1)
        .filter(|o| is_object_expression(**o))
        .is_some_and(|options| {
            named_children(*options).into_iter().any(|p| {
                property_key_name(p, source).is_some_and(|key| SCOPING_RENDER_OPTIONS.contains(&key))
            })
        })
}

#[derive(Default)]
struct Listener<'a> {
    render_wrapper_names: Vec<String>,
    /// Destructured query names bound to something other than a Testing
    /// Library render, or scoped by `within`/`container`
    safe_destructured_queries: Vec<&'a str>,
    /// Variables holding `within(...)` results
    within_variables: Vec<&'a str>,
}

impl<'a> Listener<'a> {
    fn is_reportable_render(&self, identifier: Node<'_>, cx: &RuleContext<'a, '_>) -> bool {
        let name = cx.text(identifier);
        cx.engine().is_render_util(identifier) || self.render_wrapper_names.iter().any(|w| w == name)
    }

    fn save_safe_destructured_queries(&mut self, pattern: Node<'a>, source: &'a str) {
        if !is_object_pattern(pattern) {
            return;
        }
        let queries = named_children(pattern)
            .into_iter()
            .filter_map(|p| property_key_name(p, source))
            .filter(|key| is_built_in_query_name(key));
        self.safe_destructured_queries.extend(queries);
    }

    fn on_declarator(&mut self, declarator: Node<'a>, cx: &RuleContext<'a, '_>) {
        let source = cx.source();
        let Some(init) = declarator
            .child_by_field_name("value")
            .filter(|v| is_call_expression(*v))
        else {
            return;
        };
        let Some(callee) = call_callee(init).filter(|c| is_identifier(*c)) else {
            return;
        };
        let Some(pattern) = declarator.child_by_field_name("name") else {
            return;
        };
        let is_valid_render = self.is_reportable_render(callee, cx);
        if !is_valid_render {
            self.save_safe_destructured_queries(pattern, source);
        }
        let is_within = text(callee, source) == "within";
        let uses_options = is_valid_render && uses_scoping_options(init, source);
        if !is_within && !uses_options {
            return;
        }
        if is_object_pattern(pattern) {
            self.save_safe_destructured_queries(pattern, source);
        } else if is_identifier(pattern) {
            self.within_variables.push(text(pattern, source));
        }
    }

    fn on_call(&mut self, call: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(identifier) = get_deepest_identifier(call) else {
            return;
        };
        let engine = cx.engine();
        let source = cx.source();
        if engine.is_render_util(identifier) {
            if let Some(wrapper) = get_wrapper_function_name(identifier, source) {
                self.render_wrapper_names.push(wrapper);
            }
        }
        if !engine.is_built_in_query(identifier) {
            return;
        }
        let name = cx.text(identifier);
        let report = || Report::new(identifier, "preferScreenQueries").data("name", name);

        let Some(member) = identifier.parent().filter(|p| is_member_expression(*p)) else {
            if !self.safe_destructured_queries.contains(&name) {
                cx.report(report());
            }
            return;
        };
        let Some(object) = member_object(member) else {
            return;
        };
        if is_call_expression(object) {
            let from_render = call_callee(object)
                .filter(|c| is_identifier(*c) && text(*c, source) != "within")
                .is_some_and(|c| self.is_reportable_render(c, cx));
            if from_render && !uses_scoping_options(object, source) {
                cx.report(report());
            }
            return;
        }
        if is_identifier(object) {
            let object_name = text(object, source);
            if object_name != "screen" && !self.within_variables.contains(&object_name) {
                cx.report(report());
            }
        }
    }
}

impl<'a> RuleListener<'a> for Listener<'a> {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::VariableDeclarator),
            Selector::Enter(NodeKind::CallExpression),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::VariableDeclarator) => self.on_declarator(node, cx),
            Selector::Enter(NodeKind::CallExpression) => self.on_call(node, cx),
            _ => {}
        }
    }
}
