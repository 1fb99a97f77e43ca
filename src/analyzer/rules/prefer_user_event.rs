//! `userEvent` simulates full interactions where `fireEvent` dispatches a
//! single DOM event

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::{user_event_alternatives, MAPPING_TO_USER_EVENT};
use crate::parser::ast_helpers::{
    call_arguments, call_callee, find_closest_call_expression, has_call_ancestor, is_call_expression,
    is_identifier, is_member_expression, member_property_name, string_value,
};
use crate::parser::{NodeKind, Selector};
use crate::LintError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tree_sitter::Node;

pub struct PreferUserEvent;

static META: RuleMeta = RuleMeta {
    name: "prefer-user-event",
    description: "Suggest using `userEvent` over `fireEvent` for simulating user interactions",
    messages: &[(
        "preferUserEvent",
        "Prefer using {{userEventMethods}} over fireEvent.{{fireEventMethod}}",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Off,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    allowed_methods: Vec<String>,
}

impl Rule for PreferUserEvent {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        Ok(Box::new(Listener {
            options,
            create_event_variables: HashMap::new(),
        }))
    }
}

/// `userEvent.a, userEvent.b, or userEvent.c`
fn user_event_methods_list(alternatives: &[&str]) -> String {
    let methods: Vec<String> = alternatives
        .iter()
        .map(|m| format!("userEvent.{}", m))
        .collect();
    match methods.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        _ => methods.join(", "),
    }
}

struct Listener<'a> {
    options: Options,
    /// `const ev = createEvent.click(el)`: variable name to event name
    create_event_variables: HashMap<&'a str, &'a str>,
}

impl<'a> Listener<'a> {
    fn is_method_allowed(&self, method: &str) -> bool {
        !MAPPING_TO_USER_EVENT.iter().any(|(m, _)| *m == method)
            || self.options.allowed_methods.iter().any(|m| m == method)
    }

    /// Event name of `createEvent.click(el)` or `createEvent('click', el)`
    fn created_event_name(call: Node<'_>, source: &'a str) -> Option<&'a str> {
        let callee = call_callee(call)?;
        if is_member_expression(callee) {
            return member_property_name(callee, source);
        }
        call_arguments(call)
            .into_iter()
            .next()
            .and_then(|a| string_value(a, source))
    }

    /// `click` for `fireEvent.click(el)`, or the event built by `createEvent`
    /// for `fireEvent(el, event)`
    fn fire_event_method_name(
        &self,
        call: Node<'a>,
        identifier: Node<'a>,
        cx: &RuleContext<'a, '_>,
    ) -> Option<&'a str> {
        let name = cx.text(identifier);
        let Some(event) = call_arguments(call).into_iter().nth(1) else {
            return Some(name);
        };
        if is_identifier(event) {
            if let Some(method) = self.create_event_variables.get(cx.text(event)) {
                return Some(*method);
            }
        }
        if !is_call_expression(event) || !cx.engine().is_create_event_util(event) {
            return Some(name);
        }
        Self::created_event_name(event, cx.source())
    }

    fn on_identifier(&mut self, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if !has_call_ancestor(node) || !cx.engine().is_fire_event_method(node) {
            return;
        }
        let Some(call) = find_closest_call_expression(node, true) else {
            return;
        };
        let Some(method) = self.fire_event_method_name(call, node, cx) else {
            return;
        };
        if method.is_empty() || self.is_method_allowed(method) {
            return;
        }
        let (Some(callee), Some(alternatives)) = (call_callee(call), user_event_alternatives(method)) else {
            return;
        };
        cx.report(
            Report::new(callee, "preferUserEvent")
                .data("userEventMethods", user_event_methods_list(alternatives))
                .data("fireEventMethod", method),
        );
    }

    fn on_declarator(&mut self, declarator: Node<'a>, cx: &RuleContext<'a, '_>) {
        let (Some(name), Some(init)) = (
            declarator.child_by_field_name("name").filter(|n| is_identifier(*n)),
            declarator.child_by_field_name("value").filter(|v| is_call_expression(*v)),
        ) else {
            return;
        };
        if !cx.engine().is_create_event_util(init) {
            return;
        }
        let method = Self::created_event_name(init, cx.source()).unwrap_or("");
        if !self.is_method_allowed(method) {
            self.create_event_variables.insert(cx.text(name), method);
        }
    }
}

impl<'a> RuleListener<'a> for Listener<'a> {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::Identifier),
            Selector::Enter(NodeKind::VariableDeclarator),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::Identifier) => self.on_identifier(node, cx),
            Selector::Enter(NodeKind::VariableDeclarator) => self.on_declarator(node, cx),
            _ => {}
        }
    }
}
