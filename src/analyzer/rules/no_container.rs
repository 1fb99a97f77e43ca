//! Querying through `container` bypasses Testing Library's queries

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{
    call_callee, get_deepest_identifier, get_wrapper_function_name, is_identifier,
    is_identifier_named, is_member_expression, is_object_pattern, member_object, member_property,
    named_children, property_key_name, property_value,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

const CONTAINER: &str = "container";

pub struct NoContainer;

static META: RuleMeta = RuleMeta {
    name: "no-container",
    description: "Disallow the use of `container` methods",
    messages: &[(
        "noContainer",
        "Avoid using container methods. Prefer using the methods from the Testing Library, such as \"getByRole()\"",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Frameworks(Severity::Error),
};

impl Rule for NoContainer {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener::default()))
    }
}

#[derive(Default)]
struct Listener<'a> {
    render_wrapper_names: Vec<String>,
    /// Methods destructured out of `container`: `{ container: { querySelector } }`
    destructured_container_methods: Vec<&'a str>,
    render_result_name: Option<&'a str>,
    container_name: Option<&'a str>,
}

impl<'a> Listener<'a> {
    fn on_declarator(&mut self, declarator: Node<'a>, cx: &RuleContext<'a, '_>) {
        let Some(init) = declarator.child_by_field_name("value") else {
            return;
        };
        let Some(init_identifier) = get_deepest_identifier(init) else {
            return;
        };
        let calls_render_wrapper = self
            .render_wrapper_names
            .iter()
            .any(|w| w == cx.text(init_identifier));
        if !cx.engine().is_render_variable_declarator(declarator) && !calls_render_wrapper {
            return;
        }
        let Some(name) = declarator.child_by_field_name("name") else {
            return;
        };
        if is_identifier(name) {
            self.render_result_name = Some(cx.text(name));
            return;
        }
        if !is_object_pattern(name) {
            return;
        }
        let container_value = named_children(name)
            .into_iter()
            .find(|p| property_key_name(*p, cx.source()) == Some(CONTAINER))
            .and_then(property_value);
        let Some(value) = container_value else {
            return;
        };
        if is_identifier(value) {
            self.container_name = Some(cx.text(value));
        } else if is_object_pattern(value) {
            let source = cx.source();
            self.destructured_container_methods.extend(
                named_children(value)
                    .into_iter()
                    .filter_map(|p| property_key_name(p, source)),
            );
        }
    }

    /// Walk a callee chain down to its root, reporting the first
    /// `container.x` or `renderResult.container` link
    fn report_chained_container_method(&self, member: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let mut current = member;
        while is_member_expression(current) {
            let Some(object) = member_object(current) else {
                return;
            };
            if is_identifier(object) {
                let object_name = cx.text(object);
                if Some(object_name) == self.container_name {
                    cx.report(Report::new(current, "noContainer"));
                    return;
                }
                let property = member_property(current)
                    .filter(|p| is_identifier_named(*p, CONTAINER, cx.source()));
                if let Some(property) = property {
                    if Some(object_name) == self.render_result_name {
                        cx.report(Report::new(property, "noContainer"));
                        return;
                    }
                }
            }
            current = object;
        }
    }

    fn on_call(&mut self, call: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(identifier) = get_deepest_identifier(call) else {
            return;
        };
        if cx.engine().is_render_util(identifier) {
            if let Some(wrapper) = get_wrapper_function_name(identifier, cx.source()) {
                self.render_wrapper_names.push(wrapper);
            }
        }
        let Some(callee) = call_callee(call) else {
            return;
        };
        if is_member_expression(callee) {
            self.report_chained_container_method(callee, cx);
        } else if is_identifier(callee)
            && self.destructured_container_methods.contains(&cx.text(callee))
        {
            cx.report(Report::new(call, "noContainer"));
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
    use super::super::test_util::{lint, message_ids, reported};

    const RULE: &str = "no-container";

    #[test]
    fn positive_destructured_container() {
        let source = "test('x', () => {\n  const { container } = render(<Example />);\n  const button = container.querySelector('.btn-primary');\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noContainer"]);
        assert_eq!(reported(&diagnostics, source), vec!["container.querySelector"]);
    }

    #[test]
    fn positive_render_result_container() {
        let source = "test('x', () => {\n  const view = render(<Example />);\n  view.container.querySelector('.btn');\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["container"]);
    }

    #[test]
    fn positive_renamed_and_nested_destructuring() {
        let source = r#"test('x', () => {
  const { container: root } = render(<Example />);
  root.querySelector('a');
  const { container: { querySelector } } = render(<Example />);
  querySelector('b');
});
"#;
        let diagnostics = lint(RULE, source);
        assert_eq!(
            reported(&diagnostics, source),
            vec!["root.querySelector", "querySelector('b')"]
        );
    }

    #[test]
    fn positive_through_render_wrapper() {
        let source = "function setup() {\n  return render(<Example />);\n}\ntest('x', () => {\n  const { container } = setup();\n  container.firstChild;\n  container.querySelector('a');\n});\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(reported(&diagnostics, source), vec!["container.querySelector"]);
    }

    #[test]
    fn negative_container_not_from_render() {
        let source = "test('x', () => {\n  const container = document.body;\n  container.querySelector('a');\n  render(<Example />);\n  screen.getByRole('button');\n});\n";
        assert!(lint(RULE, source).is_empty());
    }
}
