//! `getBy*` and `queryBy*` queries are sync; awaiting them is noise

use super::{Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{get_deepest_identifier, is_await_expression};
use crate::parser::{NodeKind, Selector};
use crate::{LintError, Severity};
use serde_json::Value;
use tree_sitter::Node;

pub struct NoAwaitSyncQueries;

static META: RuleMeta = RuleMeta {
    name: "no-await-sync-queries",
    description: "Disallow unnecessary `await` for sync queries",
    messages: &[(
        "noAwaitSyncQuery",
        "`{{ name }}` query is sync so it does not need to be awaited",
    )],
    fixable: true,
    skip_reporting_check: false,
    recommendation: Recommendation::All(Severity::Error),
};

impl Rule for NoAwaitSyncQueries {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        Ok(Box::new(Listener))
    }
}

struct Listener;

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::CallExpression)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let Some(await_expression) = node.parent().filter(|p| is_await_expression(*p)) else {
            return;
        };
        let Some(identifier) = get_deepest_identifier(node) else {
            return;
        };
        if !cx.engine().is_sync_query(identifier) {
            return;
        }
        let report = Report::new(identifier, "noAwaitSyncQuery")
            .data("name", cx.text(identifier))
            .fix(cx.source(), |fixer| {
                fixer.remove_range(await_expression.start_byte(), node.start_byte());
            });
        cx.report(report);
    }
}
