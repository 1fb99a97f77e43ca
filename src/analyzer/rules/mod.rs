//! Testing Library lint rules
//!
//! Each rule is a unit struct implementing [`Rule`]. `create` parses the
//! rule's options and returns a [`RuleListener`] that lives for one file and
//! receives the traversal events it asked for.

pub mod await_async_events;
pub mod await_async_queries;
pub mod await_async_utils;
pub mod consistent_data_testid;
pub mod no_await_sync_events;
pub mod no_await_sync_queries;
pub mod no_container;
pub mod no_debugging_utils;
pub mod no_dom_import;
pub mod no_global_regexp_flag_in_query;
pub mod no_manual_cleanup;
pub mod no_node_access;
pub mod no_promise_in_fire_event;
pub mod no_render_in_lifecycle;
pub mod no_unnecessary_act;
pub mod no_wait_for_empty_callback;
pub mod no_wait_for_multiple_assertions;
pub mod no_wait_for_side_effects;
pub mod no_wait_for_snapshot;
pub mod prefer_explicit_assert;
pub mod prefer_find_by;
pub mod prefer_implicit_assert;
pub mod prefer_presence_queries;
pub mod prefer_query_matchers;
pub mod prefer_query_by_disappearance;
pub mod prefer_screen_queries;
pub mod prefer_user_event;
pub mod render_result_naming_convention;

#[cfg(test)]
pub(crate) mod test_util;

pub use await_async_events::AwaitAsyncEvents;
pub use await_async_queries::AwaitAsyncQueries;
pub use await_async_utils::AwaitAsyncUtils;
pub use consistent_data_testid::ConsistentDataTestid;
pub use no_await_sync_events::NoAwaitSyncEvents;
pub use no_await_sync_queries::NoAwaitSyncQueries;
pub use no_container::NoContainer;
pub use no_debugging_utils::NoDebuggingUtils;
pub use no_dom_import::NoDomImport;
pub use no_global_regexp_flag_in_query::NoGlobalRegexpFlagInQuery;
pub use no_manual_cleanup::NoManualCleanup;
pub use no_node_access::NoNodeAccess;
pub use no_promise_in_fire_event::NoPromiseInFireEvent;
pub use no_render_in_lifecycle::NoRenderInLifecycle;
pub use no_unnecessary_act::NoUnnecessaryAct;
pub use no_wait_for_empty_callback::NoWaitForEmptyCallback;
pub use no_wait_for_multiple_assertions::NoWaitForMultipleAssertions;
pub use no_wait_for_side_effects::NoWaitForSideEffects;
pub use no_wait_for_snapshot::NoWaitForSnapshot;
pub use prefer_explicit_assert::PreferExplicitAssert;
pub use prefer_find_by::PreferFindBy;
pub use prefer_implicit_assert::PreferImplicitAssert;
pub use prefer_presence_queries::PreferPresenceQueries;
pub use prefer_query_matchers::PreferQueryMatchers;
pub use prefer_query_by_disappearance::PreferQueryByDisappearance;
pub use prefer_screen_queries::PreferScreenQueries;
pub use prefer_user_event::PreferUserEvent;
pub use render_result_naming_convention::RenderResultNamingConvention;

use super::context::RuleContext;
use crate::config::Preset;
use crate::parser::Selector;
use crate::{LintError, Severity};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tree_sitter::Node;

/// Prefix rules carry in ESLint configs, accepted in ours too
pub const PLUGIN_PREFIX: &str = "testing-library/";

/// Per-file visitor created by a rule
pub trait RuleListener<'a> {
    /// Events this listener wants
    fn selectors(&self) -> &'static [Selector];

    fn on(&mut self, selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>);
}

/// A lint rule
pub trait Rule: Send + Sync {
    fn meta(&self) -> &'static RuleMeta;

    /// Build the listener for one file from the rule's options
    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError>;

    /// Options a preset enables the rule with
    fn preset_options(&self, _preset: Preset) -> Vec<Value> {
        Vec::new()
    }
}

/// Which presets turn a rule on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    /// Every preset
    All(Severity),
    /// Every framework preset, i.e. all but `dom`
    Frameworks(Severity),
    Only(&'static [Preset], Severity),
    Off,
}

impl Recommendation {
    pub fn severity_for(self, preset: Preset) -> Option<Severity> {
        match self {
            Recommendation::All(severity) => Some(severity),
            Recommendation::Frameworks(severity) => (preset != Preset::Dom).then_some(severity),
            Recommendation::Only(presets, severity) => presets.contains(&preset).then_some(severity),
            Recommendation::Off => None,
        }
    }
}

/// Static description of a rule
#[derive(Debug)]
pub struct RuleMeta {
    pub name: &'static str,
    pub description: &'static str,
    /// `(message id, template)` pairs; templates use `{{ name }}` placeholders
    pub messages: &'static [(&'static str, &'static str)],
    pub fixable: bool,
    /// Report even in files that never import Testing Library
    pub skip_reporting_check: bool,
    pub recommendation: Recommendation,
}

impl RuleMeta {
    pub fn message(&self, id: &str) -> Option<&'static str> {
        self.messages
            .iter()
            .find(|(message_id, _)| *message_id == id)
            .map(|(_, template)| *template)
    }
}

static RULES: &[&dyn Rule] = &[
    &AwaitAsyncEvents,
    &AwaitAsyncQueries,
    &AwaitAsyncUtils,
    &ConsistentDataTestid,
    &NoAwaitSyncEvents,
    &NoAwaitSyncQueries,
    &NoContainer,
    &NoDebuggingUtils,
    &NoDomImport,
    &NoGlobalRegexpFlagInQuery,
    &NoManualCleanup,
    &NoNodeAccess,
    &NoPromiseInFireEvent,
    &NoRenderInLifecycle,
    &NoUnnecessaryAct,
    &NoWaitForEmptyCallback,
    &NoWaitForMultipleAssertions,
    &NoWaitForSideEffects,
    &NoWaitForSnapshot,
    &PreferExplicitAssert,
    &PreferFindBy,
    &PreferImplicitAssert,
    &PreferPresenceQueries,
    &PreferQueryMatchers,
    &PreferQueryByDisappearance,
    &PreferScreenQueries,
    &PreferUserEvent,
    &RenderResultNamingConvention,
];

/// Every rule, sorted by name
pub fn all_rules() -> &'static [&'static dyn Rule] {
    RULES
}

/// Look a rule up by name, with or without the `testing-library/` prefix
pub fn find_rule(name: &str) -> Option<&'static dyn Rule> {
    let name = name.strip_prefix(PLUGIN_PREFIX).unwrap_or(name);
    RULES.iter().copied().find(|rule| rule.meta().name == name)
}

/// Deserialize the first option of a rule, or its default when none is given
pub fn parse_options<T>(meta: &RuleMeta, options: &[Value]) -> Result<T, LintError>
where
    T: DeserializeOwned + Default,
{
    match options.first() {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| LintError::InvalidOptions {
            rule: meta.name.to_string(),
            message: e.to_string(),
        }),
    }
}
