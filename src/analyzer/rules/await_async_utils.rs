//! Async utils like `waitFor` return promises that must be handled

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    find_closest_call_expression, get_deepest_identifier, get_wrapper_function_name,
    has_call_ancestor, is_identifier, is_object_pattern, is_promise_handled, named_children,
    property_key_name, property_value, text,
};
use crate::parser::{get_variable_references, NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct AwaitAsyncUtils;

static META: RuleMeta = RuleMeta {
    name: "await-async-utils",
    description: "Enforce promises from async utils to be awaited properly",
    messages: &[
        ("awaitAsyncUtil", "Promise returned from `{{ name }}` must be handled"),
        (
            "asyncUtilWrapper",
            "Promise returned from `{{ name }}` wrapper over async util must be handled",
        ),
    ],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for AwaitAsyncUtils {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener::default()))
    }
}

#[derive(Default)]
struct Listener {
    wrapper_names: Vec<String>,
}

impl Listener {
    fn is_wrapper(&self, name: &str) -> bool {
        self.wrapper_names.iter().any(|w| w == name)
    }

    /// `const { waitForThing: renamed } = helpers` makes `renamed` a wrapper too
    fn track_renamed_wrappers(&mut self, pattern: Node<'_>, source: &str) {
        for property in named_children(pattern) {
            let Some(key) = property_key_name(property, source) else {
                continue;
            };
            let Some(value) = property_value(property).filter(|v| is_identifier(*v)) else {
                continue;
            };
            let local = text(value, source);
            if self.is_wrapper(key) && key != local {
                self.wrapper_names.push(local.to_string());
            }
        }
    }

    fn on_declarator(&mut self, declarator: Node<'_>, source: &str) {
        let Some(name) = declarator.child_by_field_name("name") else {
            return;
        };
        if is_object_pattern(name) {
            self.track_renamed_wrappers(name, source);
            return;
        }
        // const alias = knownWrapper
        let assigns_wrapper = is_identifier(name)
            && declarator
                .child_by_field_name("value")
                .and_then(get_deepest_identifier)
                .is_some_and(|init| self.is_wrapper(text(init, source)));
        if assigns_wrapper {
            self.wrapper_names.push(text(name, source).to_string());
        }
    }

    fn on_identifier<'a>(&mut self, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if !has_call_ancestor(node) {
            return;
        }
        let source = cx.source();
        let name = cx.text(node);
        let is_async_util = cx.engine().is_async_util(node);
        if !is_async_util && !self.is_wrapper(name) {
            return;
        }
        if is_async_util {
            if let Some(wrapper) = get_wrapper_function_name(node, source) {
                self.wrapper_names.push(wrapper);
            }
        }
        let message_id = if is_async_util {
            "awaitAsyncUtil"
        } else {
            "asyncUtilWrapper"
        };

        let Some(call) = find_closest_call_expression(node, true) else {
            return;
        };
        let Some(parent) = call.parent() else {
            return;
        };
        let references = get_variable_references(parent, source);
        let unhandled = if references.is_empty() {
            !is_promise_handled(node, source)
        } else {
            references.into_iter().any(|r| !is_promise_handled(r, source))
        };
        if unhandled {
            cx.report(Report::new(node, message_id).data("name", name));
        }
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::VariableDeclarator),
            Selector::Enter(NodeKind::Identifier),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::VariableDeclarator) => self.on_declarator(node, cx.source()),
            Selector::Enter(NodeKind::Identifier) => self.on_identifier(node, cx),
            _ => {}
        }
    }
}
