//! Framework projects should import from their own Testing Library package,
//! not from the DOM core it re-exports

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::config::Preset;
use crate::detector::constants::DOM_TESTING_LIBRARY_MODULES;
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct NoDomImport;

static META: RuleMeta = RuleMeta {
    name: "no-dom-import",
    description: "Disallow importing from DOM Testing Library",
    messages: &[
        (
            "noDomImport",
            "import from DOM Testing Library is restricted, import from corresponding Testing Library framework instead",
        ),
        (
            "noDomImportFramework",
            "import from DOM Testing Library is restricted, import from {{module}} instead",
        ),
    ],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::Frameworks(Severity::Error),
};

/// Package replacing `dom_module` for `framework`
fn framework_module(dom_module: &str, framework: &str) -> String {
    match framework {
        "angular" => "@testing-library/angular".to_string(),
        "marko" => "@marko/testing-library".to_string(),
        _ => dom_module.replacen("dom", framework, 1),
    }
}

impl Rule for NoDomImport {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let framework: Option<String> = parse_options(&META, options)?;
        Ok(Box::new(Listener { framework }))
    }

    fn preset_options(&self, preset: Preset) -> Vec<Value> {
        match preset {
            Preset::Dom => Vec::new(),
            framework => vec![Value::String(framework.as_str().to_string())],
        }
    }
}

struct Listener {
    framework: Option<String>,
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Exit(NodeKind::Program)]
    }

    fn on(&mut self, _selector: Selector, _node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let dom_imports: Vec<(Node<'a>, Node<'a>, &'static str)> = cx
            .engine()
            .testing_library_imports()
            .iter()
            .filter_map(|record| {
                DOM_TESTING_LIBRARY_MODULES
                    .iter()
                    .find(|m| **m == record.source)
                    .map(|m| (record.node, record.source_node, *m))
            })
            .collect();

        for (node, source_node, dom_module) in dom_imports {
            let Some(framework) = &self.framework else {
                cx.report(Report::new(node, "noDomImport"));
                continue;
            };
            let module = framework_module(dom_module, framework);
            let raw = cx.text(source_node);
            let report = Report::new(node, "noDomImportFramework")
                .data("module", module.as_str())
                .fix(cx.source(), |fixer| {
                    fixer.replace(source_node, raw.replacen(dom_module, &module, 1));
                });
            cx.report(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{fix_with, lint, lint_with, message_ids};
    use super::framework_module;
    use serde_json::json;

    const RULE: &str = "no-dom-import";

    #[test]
    fn positive_dom_import_without_framework() {
        let source = "import { fireEvent } from 'dom-testing-library';\n";
        let diagnostics = lint(RULE, source);
        assert_eq!(message_ids(&diagnostics), vec!["noDomImport"]);
        assert!(diagnostics[0].fix.is_none());
    }

    #[test]
    fn positive_dom_import_is_rewritten_for_framework() {
        let source = "import { fireEvent } from '@testing-library/dom';\n";
        let diagnostics = lint_with(RULE, Some(json!("react")), source);
        assert_eq!(message_ids(&diagnostics), vec!["noDomImportFramework"]);
        assert_eq!(
            diagnostics[0].message,
            "import from DOM Testing Library is restricted, import from @testing-library/react instead"
        );
        assert_eq!(
            fix_with(RULE, Some(json!("react")), source),
            "import { fireEvent } from '@testing-library/react';\n"
        );
    }

    #[test]
    fn positive_require_is_rewritten() {
        let source = "const { fireEvent } = require(\"dom-testing-library\");\n";
        assert_eq!(
            fix_with(RULE, Some(json!("angular")), source),
            "const { fireEvent } = require(\"@testing-library/angular\");\n"
        );
    }

    #[test]
    fn negative_framework_imports() {
        let source = "import { render } from '@testing-library/react';\nimport { screen } from '@testing-library/vue';\n";
        assert!(lint_with(RULE, Some(json!("react")), source).is_empty());
    }

    #[test]
    fn module_names_per_framework() {
        assert_eq!(framework_module("dom-testing-library", "vue"), "vue-testing-library");
        assert_eq!(framework_module("@testing-library/dom", "svelte"), "@testing-library/svelte");
        assert_eq!(framework_module("@testing-library/dom", "marko"), "@marko/testing-library");
    }
}
