//! Direct DOM traversal (`firstChild`, `closest`, `querySelector`, ...)
//! instead of Testing Library queries.
//!
//! Name matching alone would flag plenty of non-test code, so this rule only
//! reports in files that really import a Testing Library module, whatever the
//! aggressive reporting settings say.

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::detector::constants::is_node_returning_name;
use crate::parser::ast_helpers::{
    ancestors, is_expression_statement, is_identifier_named, is_variable_declarator, member_object,
    member_property, member_property_name,
};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde::Deserialize;
use serde_json::Value;
use tree_sitter::Node;

pub struct NoNodeAccess;

static META: RuleMeta = RuleMeta {
    name: "no-node-access",
    description: "Disallow direct Node access",
    messages: &[(
        "noNodeAccess",
        "Avoid direct Node access. Prefer using the methods from Testing Library.",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    allow_container_first_child: bool,
}

impl Rule for NoNodeAccess {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        Ok(Box::new(Listener { options }))
    }
}

struct Listener {
    options: Options,
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::MemberExpression)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let in_statement_or_declaration =
            ancestors(node).any(|a| is_expression_statement(a) || is_variable_declarator(a));
        if !in_statement_or_declaration || !cx.engine().is_testing_library_imported(true) {
            return;
        }
        let source = cx.source();
        let Some(property_name) = member_property_name(node, source) else {
            return;
        };
        if !is_node_returning_name(property_name) {
            return;
        }
        if self.options.allow_container_first_child && property_name == "firstChild" {
            return;
        }
        if member_object(node).is_some_and(|o| is_identifier_named(o, "props", source)) {
            return;
        }
        if let Some(property) = member_property(node) {
            cx.report(Report::new(property, "noNodeAccess"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{lint, lint_with, message_ids, reported};
    use serde_json::json;

    const RULE: &str = "no-node-access";

    const IMPORT: &str = "import { screen } from '@testing-library/react';\n";

    #[test]
    fn positive_node_traversal() {
        let source = format!(
            "{}test('x', () => {{\n  const buttons = screen.getAllByRole('button');\n  const text = buttons[1].firstChild;\n  screen.getByText('a').closest('li');\n  document.querySelector('.b');\n}});\n",
            IMPORT
        );
        let diagnostics = lint(RULE, &source);
        assert_eq!(
            message_ids(&diagnostics),
            vec!["noNodeAccess", "noNodeAccess", "noNodeAccess"]
        );
        assert_eq!(
            reported(&diagnostics, &source),
            vec!["firstChild", "closest", "querySelector"]
        );
    }

    #[test]
    fn container_first_child_can_be_allowed() {
        let source = format!("{}const {{ container }} = render(<A />);\ncontainer.firstChild;\n", IMPORT);
        assert_eq!(lint(RULE, &source).len(), 1);
        let options = Some(json!({ "allowContainerFirstChild": true }));
        assert!(lint_with(RULE, options, &source).is_empty());
    }

    #[test]
    fn negative_props_and_files_without_testing_library() {
        let with_import = format!("{}const child = props.children;\n", IMPORT);
        assert!(lint(RULE, &with_import).is_empty());

        let no_import = "const el = document.querySelector('a');\nel.firstChild;\n";
        assert!(lint(RULE, no_import).is_empty());
    }
}
