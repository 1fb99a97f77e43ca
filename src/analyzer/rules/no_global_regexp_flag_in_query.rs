//! A global regex keeps `lastIndex` between matches, so queries using one
//! match every other element

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    call_arguments, get_deepest_identifier, is_call_expression, is_identifier, is_member_expression,
    is_object_expression, is_regex_literal, named_children, property_key_name, property_value,
    regex_flags, text,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct NoGlobalRegexpFlagInQuery;

static META: RuleMeta = RuleMeta {
    name: "no-global-regexp-flag-in-query",
    description: "Disallow the use of the global RegExp flag (/g) in queries",
    messages: &[(
        "noGlobalRegExpFlagInQuery",
        "Avoid using the global RegExp flag (/g) in queries",
    )],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for NoGlobalRegexpFlagInQuery {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener::default()))
    }
}

fn is_global_regex(node: Node<'_>, source: &str) -> bool {
    regex_flags(node, source).is_some_and(|flags| flags.contains('g'))
}

/// Arguments of the query call `identifier` names
fn query_arguments(identifier: Node<'_>) -> Vec<Node<'_>> {
    let Some(parent) = identifier.parent() else {
        return Vec::new();
    };
    if is_call_expression(parent) {
        return call_arguments(parent);
    }
    match parent.parent() {
        Some(call) if is_member_expression(parent) && is_call_expression(call) => call_arguments(call),
        _ => Vec::new(),
    }
}

#[derive(Default)]
struct Listener<'a> {
    /// `const matcher = /x/g` declarations: (name, regex literal)
    global_regex_variables: Vec<(&'a str, Node<'a>)>,
    reported: Vec<usize>,
}

impl<'a> Listener<'a> {
    /// Report `node` if it is a global regex literal
    fn report(&mut self, node: Node<'a>, cx: &mut RuleContext<'a, '_>) -> bool {
        if !is_global_regex(node, cx.source()) {
            return false;
        }
        if self.reported.contains(&node.id()) {
            return true;
        }
        self.reported.push(node.id());
        let flags = node.child_by_field_name("flags");
        let report = Report::new(node, "noGlobalRegExpFlagInQuery").fix(cx.source(), |fixer| {
            let Some(flags) = flags else {
                return;
            };
            if let Some(offset) = text(flags, fixer.source()).find('g') {
                let start = flags.start_byte() + offset;
                fixer.remove_range(start, start + 1);
            }
        });
        cx.report(report);
        true
    }

    fn on_declarator(&mut self, declarator: Node<'a>, cx: &RuleContext<'a, '_>) {
        let (Some(name), Some(value)) = (
            declarator.child_by_field_name("name").filter(|n| is_identifier(*n)),
            declarator.child_by_field_name("value"),
        ) else {
            return;
        };
        if is_global_regex(value, cx.source()) {
            self.global_regex_variables.push((cx.text(name), value));
        }
    }

    fn on_call(&mut self, call: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(identifier) = get_deepest_identifier(call) else {
            return;
        };
        if !cx.engine().is_query(identifier) {
            return;
        }
        let arguments = query_arguments(identifier);
        let mut arguments = arguments.into_iter();
        let (first, second) = (arguments.next(), arguments.next());

        let Some(first) = first else {
            return;
        };
        if self.report(first, cx) {
            return;
        }
        if is_identifier(first) {
            let name = cx.text(first);
            let variable = self
                .global_regex_variables
                .iter()
                .find(|(variable, _)| *variable == name)
                .map(|(_, regex)| *regex);
            if let Some(regex) = variable {
                self.report(regex, cx);
            }
        }

        let name_option = second
            .filter(|s| is_object_expression(*s))
            .and_then(|options| {
                named_children(options)
                    .into_iter()
                    .find(|p| property_key_name(*p, cx.source()) == Some("name"))
            })
            .and_then(property_value)
            .filter(|v| is_regex_literal(*v));
        if let Some(name_option) = name_option {
            self.report(name_option, cx);
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

#[cfg(test)]
mod tests {
    use super::super::test_util::{fix, lint, message_ids, reported};

    const RULE: &str = "no-global-regexp-flag-in-query";

    #[test]
    fn positive_global_flag_in_text_matcher() {
        let source = "screen.getByText(/hello/g);\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noGlobalRegExpFlagInQuery"]);
        assert_eq!(reported(&diagnostics, source), vec!["/hello/g"]);
        assert_eq!(fix(RULE, source), "screen.getByText(/hello/);\n");
    }

    #[test]
    fn positive_global_flag_in_name_option() {
        let source = "screen.getByRole('button', { name: /submit/gi });\n";
        assert_eq!(
            fix(RULE, source),
            "screen.getByRole('button', { name: /submit/i });\n"
        );
    }

    #[test]
    fn positive_global_regex_variable() {
        let source = "const matcher = /hello/g;\nscreen.findByText(matcher);\nqueryAllByText(matcher);\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["/hello/g"]);
    }

    #[test]
    fn negative_non_global_and_non_query() {
        let source = "screen.getByText(/hello/i);\n'abc'.match(/b/g);\nscreen.getByRole('button', { name: 'x' });\n";
        assert!(lint(RULE, source).is_empty());
    }
}
