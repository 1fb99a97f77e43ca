//! Pins matchers to the query variant they should be asserted on

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{find_closest_call_named, has_call_ancestor, is_member_expression};
use crate::parser::{NodeKind, Selector};
use crate::LintError;
use serde::Deserialize;
use serde_json::Value;
use tree_sitter::Node;

pub struct PreferQueryMatchers;

static META: RuleMeta = RuleMeta {
    name: "prefer-query-matchers",
    description: "Ensure the configured `get*`/`query*` query is used with the corresponding matchers",
    messages: &[(
        "wrongQueryForMatcher",
        "Use `{{query}}By*` queries for {{matcher}}",
    )],
    fixable: false,
    skip_reporting_check: false,
    recommendation: Recommendation::Off,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum QueryKind {
    Get,
    Query,
}

impl QueryKind {
    fn as_str(self) -> &'static str {
        match self {
            QueryKind::Get => "get",
            QueryKind::Query => "query",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidEntry {
    query: QueryKind,
    matcher: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    valid_entries: Vec<ValidEntry>,
}

impl Rule for PreferQueryMatchers {
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
        &[Selector::Enter(NodeKind::Identifier)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        if self.options.valid_entries.is_empty() || !has_call_ancestor(node) {
            return;
        }
        let engine = cx.engine();
        let Some(expect_member) = find_closest_call_named(node, "expect", cx.source())
            .and_then(|call| call.parent())
            .filter(|p| is_member_expression(*p))
        else {
            return;
        };
        if !engine.is_sync_query(node) {
            return;
        }
        let used = if engine.is_get_query_variant(node) {
            QueryKind::Get
        } else {
            QueryKind::Query
        };

        for entry in &self.options.valid_entries {
            if entry.query != used && engine.is_matching_assert(expect_member, &entry.matcher) {
                cx.report(
                    Report::new(node, "wrongQueryForMatcher")
                        .data("query", entry.query.as_str())
                        .data("matcher", entry.matcher.as_str()),
                );
            }
        }
    }
}
