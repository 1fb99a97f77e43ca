//! Name the value returned by `render` consistently, or destructure it

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::ALLOWED_RENDER_RESULT_NAMES;
use crate::parser::ast_helpers::{get_deepest_identifier, get_wrapper_function_name, is_identifier};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct RenderResultNamingConvention;

static META: RuleMeta = RuleMeta {
    name: "render-result-naming-convention",
    description: "Enforce a valid naming for return value from `render`",
    messages: &[(
        "renderResultNamingConvention",
        "`{{ renderResultName }}` is not a recommended name for `render` returned value. Instead, you should destructure it, or name it using one of: `view`, or `utils`",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Frameworks(Severity::Error),
};

impl Rule for RenderResultNamingConvention {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener::default()))
    }
}

#[derive(Default)]
struct Listener {
    render_wrapper_names: Vec<String>,
}

impl Listener {
    fn on_call(&mut self, call: Node<'_>, cx: &RuleContext<'_, '_>) {
        let Some(identifier) = get_deepest_identifier(call) else {
            return;
        };
        if !cx.engine().is_render_util(identifier) {
            return;
        }
        if let Some(wrapper) = get_wrapper_function_name(identifier, cx.source()) {
            self.render_wrapper_names.push(wrapper);
        }
    }

    fn on_declarator<'a>(&self, declarator: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(init_identifier) = declarator
            .child_by_field_name("value")
            .and_then(get_deepest_identifier)
        else {
            return;
        };
        let init_name = cx.text(init_identifier);
        let is_render_result = cx.engine().is_render_variable_declarator(declarator)
            || self.render_wrapper_names.iter().any(|w| w == init_name);
        if !is_render_result {
            return;
        }
        let Some(name) = declarator.child_by_field_name("name").filter(|n| is_identifier(*n)) else {
            return;
        };
        let render_result_name = cx.text(name);
        if ALLOWED_RENDER_RESULT_NAMES.contains(&render_result_name) {
            return;
        }
        cx.report(
            Report::new(declarator, "renderResultNamingConvention")
                .data("renderResultName", render_result_name),
        );
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[
            Selector::Enter(NodeKind::CallExpression),
            Selector::Enter(NodeKind::VariableDeclarator),
        ]
    }

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        match selector {
            Selector::Enter(NodeKind::CallExpression) => self.on_call(node, cx),
            Selector::Enter(NodeKind::VariableDeclarator) => self.on_declarator(node, cx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, message_ids, reported};

    const RULE: &str = "render-result-naming-convention";

    #[test]
    fn positive_unconventional_names() {
        let source = "test('x', async () => {\n  const wrapper = render(<App />);\n  const component = await renderAsync(<App />);\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(
            message_ids(&diagnostics),
            vec!["renderResultNamingConvention", "renderResultNamingConvention"]
        );
        assert_eq!(
            reported(&diagnostics, source),
            vec!["wrapper = render(<App />)", "component = await renderAsync(<App />)"]
        );
        assert_eq!(
            diagnostics[0].message,
            "`wrapper` is not a recommended name for `render` returned value. Instead, you should destructure it, or name it using one of: `view`, or `utils`"
        );
    }

    #[test]
    fn positive_render_wrapper_result() {
        let source = "const setup = () => render(<App />);\ntest('x', () => {\n  const result = setup();\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["result = setup()"]);
    }

    #[test]
    fn negative_conventional_names() {
        let source = "test('x', () => {\n  const { getByText } = render(<App />);\n  const view = render(<App />);\n  const utils = render(<App />);\n  const result = doSomething();\n});\n";
        assert!(lint(RULE, source).is_empty());
    }
}
