//! Promises returned by `fireEvent`/`userEvent` methods must be handled.
//!
//! Wrapper functions that return an event call are remembered, and calls to
//! them are held to the same standard.

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::config::Preset;
use crate::detector::DetectionEngine;
use crate::parser::ast_helpers::{
    call_callee, find_closest_call_expression, find_closest_function, get_deepest_identifier,
    get_wrapper_function_name, has_call_ancestor, is_async_function, is_identifier,
    is_member_expression, is_promise_handled, member_object, unwrap_parens,
};
use crate::parser::{get_variable_references, NodeKind, Selector};
use crate::{LintError, Severity};
use serde::Deserialize;
use serde_json::{json, Value};
use tree_sitter::Node;

const USER_EVENT_SETUP: &str = "setup";

pub struct AwaitAsyncEvents;

static META: RuleMeta = RuleMeta {
    name: "await-async-events",
    description: "Enforce promises from async event methods are handled",
    messages: &[
        (
            "awaitAsyncEvent",
            "Promise returned from async event method `{{ name }}` must be handled",
        ),
        (
            "awaitAsyncEventWrapper",
            "Promise returned from `{{ name }}` wrapper over async event method must be handled",
        ),
    ],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum EventModule {
    #[serde(rename = "fireEvent")]
    FireEvent,
    #[serde(rename = "userEvent")]
    UserEvent,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventModules {
    One(EventModule),
    Many(Vec<EventModule>),
}

impl EventModules {
    fn contains(&self, module: EventModule) -> bool {
        match self {
            EventModules::One(one) => *one == module,
            EventModules::Many(many) => many.contains(&module),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    event_module: EventModules,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            event_module: EventModules::One(EventModule::UserEvent),
        }
    }
}

impl Rule for AwaitAsyncEvents {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        Ok(Box::new(Listener {
            fire_event: options.event_module.contains(EventModule::FireEvent),
            user_event: options.event_module.contains(EventModule::UserEvent),
            wrapper_names: Vec::new(),
            user_sessions: Vec::new(),
        }))
    }

    fn preset_options(&self, _preset: Preset) -> Vec<Value> {
        vec![json!({ "eventModule": "userEvent" })]
    }
}

struct Listener<'a> {
    fire_event: bool,
    user_event: bool,
    wrapper_names: Vec<String>,
    /// Locals holding a `userEvent.setup()` session
    user_sessions: Vec<&'a str>,
}

impl<'a> Listener<'a> {
    fn is_user_event_method(&self, engine: &DetectionEngine<'a>, node: Node<'a>) -> bool {
        engine.is_user_event_method(node, None)
            || self
                .user_sessions
                .iter()
                .any(|session| engine.is_user_event_method(node, Some(session)))
    }

    fn track_session(&mut self, declarator: Node<'a>, cx: &RuleContext<'a, '_>) {
        let Some(name) = declarator.child_by_field_name("name").filter(|n| is_identifier(*n)) else {
            return;
        };
        let Some(value) = declarator.child_by_field_name("value").map(unwrap_parens) else {
            return;
        };
        let Some(setup) = get_deepest_identifier(value) else {
            return;
        };
        let is_setup_call = cx.text(setup) == USER_EVENT_SETUP
            && setup
                .parent()
                .filter(|p| is_member_expression(*p))
                .and_then(member_object)
                .is_some_and(|object| cx.engine().is_user_event_util(object));
        if is_setup_call {
            self.user_sessions.push(cx.text(name));
        }
    }

    fn check_identifier(&mut self, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if !has_call_ancestor(node) {
            return;
        }
        let engine = cx.engine();
        let name = cx.text(node);
        let is_event_method = (self.fire_event && engine.is_fire_event_method(node))
            || (self.user_event && self.is_user_event_method(engine, node));

        if is_event_method {
            if name == USER_EVENT_SETUP {
                return;
            }
            if let Some(wrapper) = get_wrapper_function_name(node, cx.source()) {
                self.wrapper_names.push(wrapper);
            }
            let Some(call) = find_closest_call_expression(node, true) else {
                return;
            };
            let Some(parent) = call.parent() else {
                return;
            };
            let references = get_variable_references(parent, cx.source());
            if references.is_empty() {
                report_unhandled(node, call, "awaitAsyncEvent", cx);
            } else {
                for reference in references.into_iter().filter(|r| is_identifier(*r)) {
                    report_unhandled(reference, call, "awaitAsyncEvent", cx);
                }
            }
        } else if self.wrapper_names.iter().any(|w| w == name) {
            if let Some(call) = find_closest_call_expression(node, true) {
                report_unhandled(node, call, "awaitAsyncEventWrapper", cx);
            }
        }
    }
}

fn report_unhandled<'a>(
    node: Node<'a>,
    call: Node<'a>,
    message_id: &'static str,
    cx: &mut RuleContext<'a, '_>,
) {
    let source = cx.source();
    if is_promise_handled(node, source) {
        return;
    }
    let Some(callee) = call_callee(call) else {
        return;
    };
    let member = node.parent().filter(|p| is_member_expression(*p));
    let report = Report::new(callee, message_id)
        .data("name", cx.text(node))
        .fix(source, |fixer| {
            let (Some(member), Some(function)) = (member, find_closest_function(node)) else {
                return;
            };
            fixer.insert_before(member, "await ");
            if !is_async_function(function) {
                fixer.insert_before(function, "async ");
            }
        });
    cx.report(report);
}

impl<'a> RuleListener<'a> for Listener<'a> {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::VariableDeclarator),
            Selector::Enter(NodeKind::Identifier),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::VariableDeclarator) if self.user_event => {
                self.track_session(node, cx)
            }
            Selector::Enter(NodeKind::Identifier) => self.check_identifier(node, cx),
            _ => {}
        }
    }
}
