//! Rendering belongs in the test body, not in `beforeEach`/`beforeAll`

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::TESTING_FRAMEWORK_SETUP_HOOKS;
use crate::parser::ast_helpers::{
    ancestors, call_callee, get_deepest_identifier, get_wrapper_function_name, is_call_expression,
    is_identifier, text,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde::Deserialize;
use serde_json::Value;
use tree_sitter::Node;

pub struct NoRenderInLifecycle;

static META: RuleMeta = RuleMeta {
    name: "no-render-in-lifecycle",
    description: "Disallow the use of `render` in testing frameworks setup functions",
    messages: &[(
        "noRenderInSetup",
        "Forbidden usage of `render` within testing framework `{{ name }}` setup",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Frameworks(Severity::Error),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum SetupHook {
    BeforeEach,
    BeforeAll,
}

impl SetupHook {
    fn name(self) -> &'static str {
        match self {
            SetupHook::BeforeEach => "beforeEach",
            SetupHook::BeforeAll => "beforeAll",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    allow_testing_framework_setup_hook: Option<SetupHook>,
}

impl Rule for NoRenderInLifecycle {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        let allowed = options.allow_testing_framework_setup_hook.map(SetupHook::name);
        let hooks = TESTING_FRAMEWORK_SETUP_HOOKS
            .iter()
            .copied()
            .filter(|hook| Some(*hook) != allowed)
            .collect();
        Ok(Box::new(Listener {
            hooks,
            render_wrapper_names: Vec::new(),
        }))
    }
}

struct Listener {
    /// Setup hooks render is forbidden in
    hooks: Vec<&'static str>,
    render_wrapper_names: Vec<String>,
}

impl Listener {
    /// Callee of the nearest enclosing setup hook call
    fn closest_setup_hook<'a>(&self, node: Node<'a>, source: &str) -> Option<Node<'a>> {
        ancestors(node)
            .filter(|n| is_call_expression(*n))
            .filter_map(call_callee)
            .find(|callee| {
                is_identifier(*callee) && self.hooks.contains(&text(*callee, source))
            })
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::CallExpression)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(identifier) = get_deepest_identifier(node) else {
            return;
        };
        let is_render = cx.engine().is_render_util(identifier);
        if is_render {
            if let Some(wrapper) = get_wrapper_function_name(identifier, cx.source()) {
                self.render_wrapper_names.push(wrapper);
            }
        }
        let name = cx.text(identifier);
        if !is_render && !self.render_wrapper_names.iter().any(|w| w == name) {
            return;
        }
        if let Some(hook) = self.closest_setup_hook(node, cx.source()) {
            cx.report(Report::new(identifier, "noRenderInSetup").data("name", cx.text(hook)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, lint_with, message_ids, reported};
    use serde_json::json;

    const RULE: &str = "no-render-in-lifecycle";

    #[test]
    fn positive_render_in_before_each() {
        let source = "beforeEach(() => {\n  render(<MyComponent />);\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noRenderInSetup"]);
        assert_eq!(reported(&diagnostics, source), vec!["render"]);
        assert_eq!(
            diagnostics[0].message,
            "Forbidden usage of `render` within testing framework `beforeEach` setup"
        );
    }

    #[test]
    fn positive_render_wrapper_in_before_all() {
        let source = "function setup() {\n  return render(<MyComponent />);\n}\nbeforeAll(async () => {\n  await setup();\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["setup"]);
        assert_eq!(
            diagnostics[0].message,
            "Forbidden usage of `render` within testing framework `beforeAll` setup"
        );
    }

    #[test]
    fn allowed_hook_is_skipped() {
        let source = "beforeEach(() => {\n  render(<A />);\n});\nbeforeAll(() => {\n  render(<B />);\n});\n";
        let options = Some(json!({ "allowTestingFrameworkSetupHook": "beforeEach" }));
        let diagnostics = lint_with(RULE, options, source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.line, 5);
    }

    #[test]
    fn negative_render_in_test_body() {
        let source = "it('renders', () => {\n  render(<MyComponent />);\n});\n";
        assert!(lint(RULE, source).is_empty());
    }
}
