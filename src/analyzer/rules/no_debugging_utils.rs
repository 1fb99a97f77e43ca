//! Debugging helpers like `screen.debug()` should not be left in tests.
//!
//! Besides the helpers themselves, `debug` destructured from a render result
//! and `renderResult.debug()` are caught. Names bound from `console` are not.

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::DEBUG_UTILS;
use crate::parser::ast_helpers::{
    get_deepest_identifier, get_property_identifier, get_reference_node, get_wrapper_function_name,
    is_call_expression, is_identifier, is_object_pattern, named_children, property_key_name,
    property_value,
};
use crate::parser::scope::pattern_bindings;
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tree_sitter::Node;

pub struct NoDebuggingUtils;

static META: RuleMeta = RuleMeta {
    name: "no-debugging-utils",
    description: "Disallow the use of debugging utilities like `debug`",
    messages: &[("noDebugging", "Remove debugging utility `{{ name }}`")],
    fixable: false,
    skip_reporting_check: true,
    recommendation: Recommendation::Frameworks(Severity::Warning),
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    /// Overrides on top of "check every debug util"
    utils_to_check_for: BTreeMap<String, bool>,
}

impl Rule for NoDebuggingUtils {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        if let Some(unknown) = options
            .utils_to_check_for
            .keys()
            .find(|k| !DEBUG_UTILS.contains(&k.as_str()))
        {
            return Err(LintError::InvalidOptions {
                rule: META.name.to_string(),
                message: format!("unknown debugging utility `{}`", unknown),
            });
        }
        let utils_to_report = DEBUG_UTILS
            .iter()
            .copied()
            .filter(|util| options.utils_to_check_for.get(*util).copied().unwrap_or(true))
            .collect();
        Ok(Box::new(Listener {
            utils_to_report,
            debug_variable_names: Vec::new(),
            render_result_names: Vec::new(),
            render_wrapper_names: Vec::new(),
            console_bindings: Vec::new(),
        }))
    }
}

struct Listener<'a> {
    utils_to_report: Vec<&'static str>,
    /// Locals holding a debug util taken from a render result
    debug_variable_names: Vec<&'a str>,
    /// `const utils = render(...)`
    render_result_names: Vec<&'a str>,
    render_wrapper_names: Vec<String>,
    /// Names destructured from `console`
    console_bindings: Vec<&'a str>,
}

impl<'a> Listener<'a> {
    fn on_declarator(&mut self, declarator: Node<'a>, cx: &RuleContext<'a, '_>) {
        let (Some(name), Some(init)) = (
            declarator.child_by_field_name("name"),
            declarator.child_by_field_name("value"),
        ) else {
            return;
        };
        let Some(init_identifier) = get_deepest_identifier(init) else {
            return;
        };
        let init_name = cx.text(init_identifier);
        if init_name == "console" {
            self.console_bindings
                .extend(pattern_bindings(name).into_iter().map(|b| cx.text(b)));
            return;
        }
        let calls_render_wrapper = self.render_wrapper_names.iter().any(|w| w == init_name);
        if !cx.engine().is_render_variable_declarator(declarator) && !calls_render_wrapper {
            return;
        }
        if is_object_pattern(name) {
            for property in named_children(name) {
                let is_reported_util = property_key_name(property, cx.source())
                    .is_some_and(|key| self.utils_to_report.contains(&key));
                if !is_reported_util {
                    continue;
                }
                if let Some(local) = property_value(property).and_then(get_deepest_identifier) {
                    self.debug_variable_names.push(cx.text(local));
                }
            }
        } else if is_identifier(name) {
            self.render_result_names.push(cx.text(name));
        }
    }

    fn on_call(&mut self, call: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(identifier) = get_deepest_identifier(call) else {
            return;
        };
        let engine = cx.engine();
        if engine.is_render_util(identifier) {
            if let Some(wrapper) = get_wrapper_function_name(identifier, cx.source()) {
                self.render_wrapper_names.push(wrapper);
            }
        }
        let Some(reference_identifier) = get_property_identifier(get_reference_node(call)) else {
            return;
        };
        let name = cx.text(identifier);

        let is_debug_util = engine.is_debug_util_named(identifier, &self.utils_to_report);
        let is_declared_debug_variable = self.debug_variable_names.contains(&name);
        let is_chained_reference_debug = name == "debug"
            && self
                .render_result_names
                .contains(&cx.text(reference_identifier));
        let is_from_console =
            self.console_bindings.contains(&name) && is_call_expression(identifier.parent());

        if !is_from_console && (is_debug_util || is_declared_debug_variable || is_chained_reference_debug) {
            cx.report(Report::new(identifier, "noDebugging").data("name", name));
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
    use super::super::test_util::{lint, lint_with, message_ids, reported};
    use serde_json::json;

    const RULE: &str = "no-debugging-utils";

    #[test]
    fn positive_debug_utils() {
        let source = r#"test('x', () => {
  const { debug } = render(<Hello />);
  debug();
  screen.debug();
  logRoles(container);
  prettyFormat(node);
});
"#;
        let diagnostics = lint(RULE, source);
        assert_eq!(
            message_ids(&diagnostics),
            vec!["noDebugging", "noDebugging", "noDebugging", "noDebugging"]
        );
        assert_eq!(
            reported(&diagnostics, source),
            vec!["debug", "debug", "logRoles", "prettyFormat"]
        );
        assert_eq!(diagnostics[2].message, "Remove debugging utility `logRoles`");
    }

    #[test]
    fn positive_renamed_and_render_result() {
        let source = "test('x', () => {\n  const { debug: show } = render(<Hello />);\n  show();\n  const utils = render(<Hello />);\n  utils.debug();\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["show", "debug"]);
    }

    #[test]
    fn negative_console_debugging() {
        let source = "test('x', () => {\n  console.debug('x');\n  const { debug } = console;\n  debug('y');\n});\n";
        assert!(lint(RULE, source).is_empty());
    }

    #[test]
    fn utils_can_be_turned_off() {
        let source = "test('x', () => {\n  screen.debug();\n  logDOM();\n});\n";
        let options = Some(json!({ "utilsToCheckFor": { "debug": false } }));
        let diagnostics = lint_with(RULE, options, source);
        assert_eq!(reported(&diagnostics, source), vec!["logDOM"]);
    }

    #[test]
    fn rejects_unknown_util() {
        let rule = super::super::find_rule(RULE).unwrap();
        assert!(rule
            .create(&[json!({ "utilsToCheckFor": { "printAll": true } })])
            .is_err());
    }
}
