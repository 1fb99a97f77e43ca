//! Sync event methods should not be awaited.
//!
//! `userEvent.type` and `userEvent.keyboard` are exempt when called with a
//! positive `delay`, since the delay makes them resolve asynchronously.

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::config::Preset;
use crate::detector::constants::USER_EVENT_ASYNC_EXCEPTIONS;
use crate::parser::ast_helpers::{
    call_arguments, declarators, get_deepest_identifier, get_property_identifier, is_await_expression,
    is_identifier, is_identifier_named, is_object_expression, named_children, property_key_name,
    property_value, text,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde::Deserialize;
use serde_json::{json, Value};
use tree_sitter::Node;

const DELAY: &str = "delay";

pub struct NoAwaitSyncEvents;

static META: RuleMeta = RuleMeta {
    name: "no-await-sync-events",
    description: "Disallow unnecessary `await` for sync events",
    messages: &[(
        "noAwaitSyncEvents",
        "`{{ name }}` is sync and does not need `await` operator",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum EventModule {
    FireEvent,
    UserEvent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    event_modules: Vec<EventModule>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            event_modules: vec![EventModule::FireEvent],
        }
    }
}

impl Rule for NoAwaitSyncEvents {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        Ok(Box::new(Listener {
            options,
            has_positive_delay_variable: false,
        }))
    }

    fn preset_options(&self, _preset: Preset) -> Vec<Value> {
        vec![json!({ "eventModules": ["fire-event"] })]
    }
}

struct Listener {
    options: Options,
    /// Last `delay` declared or assigned outside a call was a positive number
    has_positive_delay_variable: bool,
}

fn positive_number(node: Node<'_>, source: &str) -> Option<bool> {
    if NodeKind::of(node) != NodeKind::NumberLiteral {
        return None;
    }
    text(node, source).parse::<f64>().ok().map(|n| n > 0.0)
}

impl Listener {
    fn on_declaration(&mut self, declaration: Node<'_>, source: &str) {
        for declarator in declarators(declaration) {
            let declares_delay = declarator
                .child_by_field_name("name")
                .is_some_and(|n| is_identifier_named(n, DELAY, source));
            if declares_delay {
                self.has_positive_delay_variable = declarator
                    .child_by_field_name("value")
                    .and_then(|v| positive_number(v, source))
                    .unwrap_or(false);
            }
        }
    }

    fn on_assignment(&mut self, assignment: Node<'_>, source: &str) {
        let assigns_delay = assignment
            .child_by_field_name("left")
            .is_some_and(|l| is_identifier_named(l, DELAY, source));
        if !assigns_delay {
            return;
        }
        if let Some(positive) = assignment
            .child_by_field_name("right")
            .and_then(|r| positive_number(r, source))
        {
            self.has_positive_delay_variable = positive;
        }
    }

    /// `{ delay: 10 }`, `{ delay }` with a positive `delay` in scope, or a
    /// delay computed at runtime
    fn has_delay(&self, call: Node<'_>, source: &str) -> bool {
        let Some(last) = call_arguments(call).pop().filter(|a| is_object_expression(*a)) else {
            return false;
        };
        named_children(last).into_iter().any(|property| {
            if property_key_name(property, source) != Some(DELAY) {
                return false;
            }
            let Some(value) = property_value(property) else {
                return false;
            };
            if is_identifier(value) {
                return self.has_positive_delay_variable;
            }
            positive_number(value, source).unwrap_or(true)
        })
    }

    fn on_call<'a>(&self, call: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if !is_await_expression(call.parent()) {
            return;
        }
        let Some(identifier) = get_deepest_identifier(call) else {
            return;
        };
        let engine = cx.engine();
        let is_user_event_method = engine.is_user_event_method(identifier, None);
        let is_fire_event_method = engine.is_fire_event_method(identifier);
        let modules = &self.options.event_modules;
        if is_fire_event_method && !modules.contains(&EventModule::FireEvent) {
            return;
        }
        if is_user_event_method && !modules.contains(&EventModule::UserEvent) {
            return;
        }
        if !is_fire_event_method && !is_user_event_method {
            return;
        }

        let name = cx.text(identifier);
        if is_user_event_method
            && USER_EVENT_ASYNC_EXCEPTIONS.contains(&name)
            && self.has_delay(call, cx.source())
        {
            return;
        }

        let qualified = match get_property_identifier(call).filter(|root| root.id() != identifier.id()) {
            Some(root) => format!("{}.{}", cx.text(root), name),
            None => name.to_string(),
        };
        cx.report(Report::new(call, "noAwaitSyncEvents").data("name", qualified));
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::VariableDeclaration),
            Selector::Enter(NodeKind::AssignmentExpression),
            Selector::Enter(NodeKind::CallExpression),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::VariableDeclaration) => self.on_declaration(node, cx.source()),
            Selector::Enter(NodeKind::AssignmentExpression) => self.on_assignment(node, cx.source()),
            Selector::Enter(NodeKind::CallExpression) => self.on_call(node, cx),
            _ => {}
        }
    }
}
