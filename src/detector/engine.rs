//! Per-file detection engine.
//!
//! The engine watches imports as the tree is walked and answers classification
//! questions about identifiers and calls: is this a query, an async util, a
//! render call, a `fireEvent`/`userEvent` method, `act`, a debug helper, a
//! presence or absence assertion. Every provenance check combines a name
//! pattern with the tracked imports, unless the settings leave the category in
//! aggressive mode.

use super::constants::{
    is_built_in_query_name, ABSENCE_MATCHERS, ASYNC_UTILS, DEBUG_UTILS, PRESENCE_MATCHERS,
    REACT_DOM_TEST_UTILS_MODULE, USER_EVENT_MODULE,
};
use super::imports::{BindingKind, ImportBinding, ImportRecord};
use super::resolver::{resolve_import_of, Provenance};
use super::settings::Settings;
use crate::parser::ast_helpers::{
    call_callee, get_assert_node_info, get_deepest_identifier, get_property_identifier,
    get_reference_node, identifier_name, is_call_expression, is_callee, is_identifier,
    is_identifier_named, is_member_expression, member_object, member_property, text,
};
use crate::parser::{NodeKind, Selector};
use log::debug;
use tree_sitter::Node;

const FIRE_EVENT_NAME: &str = "fireEvent";
const USER_EVENT_NAME: &str = "userEvent";
const RENDER_NAME: &str = "render";
const ACT_NAME: &str = "act";
const CREATE_EVENT_NAME: &str = "createEvent";

/// Selectors the engine tracks imports on
pub const TRACKED_SELECTORS: &[Selector] = &[
    Selector::Enter(NodeKind::ImportDeclaration),
    Selector::Enter(NodeKind::CallExpression),
];

/// Which prefix a query name carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryVariant {
    Get,
    Query,
    Find,
}

impl QueryVariant {
    /// Variant of a name shaped like `^(get|query|find)(All)?By.+$`
    pub fn of(name: &str) -> Option<Self> {
        let (variant, rest) = if let Some(rest) = name.strip_prefix("get") {
            (QueryVariant::Get, rest)
        } else if let Some(rest) = name.strip_prefix("query") {
            (QueryVariant::Query, rest)
        } else if let Some(rest) = name.strip_prefix("find") {
            (QueryVariant::Find, rest)
        } else {
            return None;
        };
        let rest = rest.strip_prefix("All").unwrap_or(rest);
        let suffix = rest.strip_prefix("By")?;
        (!suffix.is_empty()).then_some(variant)
    }
}

/// Imports seen so far in the file
#[derive(Debug, Default)]
pub struct DetectionState<'a> {
    /// Every import whose module mentions testing-library
    pub testing_library: Vec<ImportRecord<'a>>,
    pub custom_module: Option<ImportRecord<'a>>,
    pub user_event: Option<ImportRecord<'a>>,
    pub react_dom_test_utils: Option<ImportRecord<'a>>,
}

pub struct DetectionEngine<'a> {
    source: &'a str,
    settings: &'a Settings,
    skip_reporting_check: bool,
    state: DetectionState<'a>,
}

impl<'a> DetectionEngine<'a> {
    pub fn new(source: &'a str, settings: &'a Settings, skip_reporting_check: bool) -> Self {
        Self {
            source,
            settings,
            skip_reporting_check,
            state: DetectionState::default(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn state(&self) -> &DetectionState<'a> {
        &self.state
    }

    /// Feed one traversal event. Only import statements and
    /// `require`/`import()` calls change state.
    pub fn track(&mut self, selector: Selector, node: Node<'a>) {
        let record = match selector {
            Selector::Enter(NodeKind::ImportDeclaration) => {
                ImportRecord::from_import_declaration(node, self.source)
            }
            Selector::Enter(NodeKind::CallExpression)
                if ImportRecord::is_import_call(node, self.source) =>
            {
                ImportRecord::from_call(node, self.source)
            }
            _ => None,
        };
        if let Some(record) = record {
            self.record(record);
        }
    }

    fn record(&mut self, record: ImportRecord<'a>) {
        let module = record.source.as_str();
        if module.contains("testing-library") {
            debug!("tracked testing-library import `{}`", module);
            self.state.testing_library.push(record.clone());
        }
        if self.state.custom_module.is_none()
            && self
                .settings
                .custom_module()
                .is_some_and(|custom| module.ends_with(custom))
        {
            debug!("tracked custom module import `{}`", module);
            self.state.custom_module = Some(record.clone());
        }
        if self.state.user_event.is_none() && module == USER_EVENT_MODULE {
            self.state.user_event = Some(record.clone());
        }
        if self.state.react_dom_test_utils.is_none() && module == REACT_DOM_TEST_UTILS_MODULE {
            self.state.react_dom_test_utils = Some(record);
        }
    }

    fn name(&self, node: Node<'_>) -> &'a str {
        text(node, self.source)
    }

    // settings

    pub fn is_aggressive_module_reporting_enabled(&self) -> bool {
        self.settings.is_aggressive_module_reporting_enabled()
    }

    pub fn is_aggressive_render_reporting_enabled(&self) -> bool {
        self.settings.is_aggressive_render_reporting_enabled()
    }

    pub fn is_aggressive_query_reporting_enabled(&self) -> bool {
        self.settings.is_aggressive_query_reporting_enabled()
    }

    pub fn custom_module(&self) -> Option<&'a str> {
        self.settings.custom_module()
    }

    // import state

    pub fn testing_library_imports(&self) -> &[ImportRecord<'a>] {
        &self.state.testing_library
    }

    pub fn custom_module_import(&self) -> Option<&ImportRecord<'a>> {
        self.state.custom_module.as_ref()
    }

    /// Module string of the first testing-library import
    pub fn testing_library_import_name(&self) -> Option<&str> {
        self.state.testing_library.first().map(|r| r.source.as_str())
    }

    /// Records that count as Testing Library: the custom module first
    fn provenance_records(&self) -> impl Iterator<Item = &ImportRecord<'a>> {
        self.state
            .custom_module
            .iter()
            .chain(self.state.testing_library.iter())
    }

    /// Import binding for a util name, matching imported or local names of
    /// named bindings, and the local name of default/namespace bindings.
    pub fn find_imported_util_specifier(&self, name: &str) -> Option<(&ImportRecord<'a>, &ImportBinding)> {
        self.provenance_records().find_map(|record| {
            record
                .find_named(name)
                .or_else(|| {
                    record.specifiers.iter().find(|b| {
                        matches!(b.kind, BindingKind::Default | BindingKind::Namespace)
                            && b.local == name
                    })
                })
                .map(|binding| (record, binding))
        })
    }

    fn is_testing_library_module(&self, module: &str) -> bool {
        module.contains("testing-library")
            || self
                .custom_module()
                .is_some_and(|custom| module.ends_with(custom))
    }

    /// Strict provenance: the root identifier of `node`'s reference chain is
    /// bound by a tracked import from a testing-library or custom module, and
    /// no local declaration shadows it.
    pub fn is_node_coming_from_testing_library(&self, node: Node<'_>) -> bool {
        let reference = get_reference_node(node);
        let Some(root) = get_property_identifier(reference) else {
            return false;
        };
        let root_name = self.name(root);
        let Some((record, binding)) = self.find_imported_util_specifier(root_name) else {
            return false;
        };
        binding.local == root_name
            && self.is_testing_library_module(&record.source)
            && resolve_import_of(root, self.source) != Provenance::Local
    }

    /// Name check through `matches(name, original_name)`, then provenance
    /// unless aggressive module mode is on
    fn is_potential_testing_library_function(
        &self,
        node: Option<Node<'_>>,
        matches: impl Fn(&str, Option<&str>) -> bool,
    ) -> bool {
        let Some(node) = node else {
            return false;
        };
        let reference = get_reference_node(node);
        let Some(root) = get_property_identifier(reference) else {
            return false;
        };
        let original_name = self
            .find_imported_util_specifier(self.name(root))
            .and_then(|(_, binding)| binding.original_name());
        if !matches(self.name(node), original_name) {
            return false;
        }
        if self.is_aggressive_module_reporting_enabled() {
            return true;
        }
        self.is_node_coming_from_testing_library(root)
    }

    pub fn is_testing_library_imported(&self, strict: bool) -> bool {
        let is_some_module_imported =
            !self.state.testing_library.is_empty() || self.state.custom_module.is_some();
        (!strict && self.is_aggressive_module_reporting_enabled()) || is_some_module_imported
    }

    /// Whether rules may report in this file
    pub fn can_report_errors(&self) -> bool {
        self.skip_reporting_check || self.is_testing_library_imported(false)
    }

    // queries

    pub fn is_query(&self, node: Node<'_>) -> bool {
        let Some(name) = identifier_name(node, self.source) else {
            return false;
        };
        if QueryVariant::of(name).is_none() {
            return false;
        }
        if self.is_aggressive_query_reporting_enabled() {
            return true;
        }
        is_built_in_query_name(name) || self.settings.matches_custom_query(name)
    }

    fn query_variant(&self, node: Node<'_>) -> Option<QueryVariant> {
        if !self.is_query(node) {
            return None;
        }
        QueryVariant::of(self.name(node))
    }

    pub fn is_get_query_variant(&self, node: Node<'_>) -> bool {
        self.query_variant(node) == Some(QueryVariant::Get)
    }

    pub fn is_query_query_variant(&self, node: Node<'_>) -> bool {
        self.query_variant(node) == Some(QueryVariant::Query)
    }

    pub fn is_find_query_variant(&self, node: Node<'_>) -> bool {
        self.query_variant(node) == Some(QueryVariant::Find)
    }

    pub fn is_sync_query(&self, node: Node<'_>) -> bool {
        matches!(
            self.query_variant(node),
            Some(QueryVariant::Get | QueryVariant::Query)
        )
    }

    pub fn is_async_query(&self, node: Node<'_>) -> bool {
        self.is_find_query_variant(node)
    }

    pub fn is_custom_query(&self, node: Node<'_>) -> bool {
        self.is_query(node) && !is_built_in_query_name(self.name(node))
    }

    pub fn is_built_in_query(&self, node: Node<'_>) -> bool {
        self.is_query(node) && is_built_in_query_name(self.name(node))
    }

    // utils

    pub fn is_async_util(&self, node: Node<'_>) -> bool {
        self.is_async_util_named(node, ASYNC_UTILS)
    }

    /// `is_async_util` narrowed to `valid_names`
    pub fn is_async_util_named(&self, node: Node<'_>, valid_names: &[&str]) -> bool {
        self.is_potential_testing_library_function(Some(node), |name, original| {
            valid_names.contains(&name) || original.is_some_and(|o| valid_names.contains(&o))
        })
    }

    pub fn is_fire_event_util(&self, node: Node<'_>) -> bool {
        self.is_potential_testing_library_function(Some(node), |name, original| {
            name == FIRE_EVENT_NAME || original == Some(FIRE_EVENT_NAME)
        })
    }

    /// Local name of the default `userEvent` import or `require`
    fn imported_user_event_name(&self) -> Option<&str> {
        self.state
            .user_event
            .as_ref()
            .and_then(|record| record.default_or_namespace())
            .map(|binding| binding.local.as_str())
    }

    pub fn is_user_event_util(&self, node: Node<'_>) -> bool {
        let name = self.name(node);
        if let Some(user_event) = self.imported_user_event_name() {
            return name == user_event;
        }
        self.is_aggressive_module_reporting_enabled() && name == USER_EVENT_NAME
    }

    pub fn is_render_util(&self, node: Node<'_>) -> bool {
        self.is_potential_testing_library_function(Some(node), |name, original| {
            if self.is_aggressive_render_reporting_enabled() {
                return name.to_lowercase().contains(RENDER_NAME);
            }
            std::iter::once(RENDER_NAME)
                .chain(self.settings.custom_render_names().iter().map(String::as_str))
                .any(|valid| valid == name || original == Some(valid))
        })
    }

    /// `const x = render(...)` / `const x = await renderAsync(...)`
    pub fn is_render_variable_declarator(&self, declarator: Node<'_>) -> bool {
        declarator
            .child_by_field_name("value")
            .and_then(get_deepest_identifier)
            .is_some_and(|identifier| self.is_render_util(identifier))
    }

    /// Local name `fireEvent` is bound to, or `fireEvent` itself in
    /// aggressive module mode
    fn fire_event_util_name(&self) -> Option<&str> {
        match self.find_imported_util_specifier(FIRE_EVENT_NAME) {
            Some((_, binding)) => Some(binding.local.as_str()),
            None if self.is_aggressive_module_reporting_enabled() => Some(FIRE_EVENT_NAME),
            None => None,
        }
    }

    /// `fireEvent.click(...)`, `rtl.fireEvent.click(...)` or
    /// `fireEvent('click', ...)`
    pub fn is_fire_event_method(&self, node: Node<'_>) -> bool {
        let Some(util_name) = self.fire_event_util_name() else {
            return false;
        };
        let name = self.name(node);
        let Some(parent) = node.parent() else {
            return false;
        };

        if is_callee(node) {
            return name == util_name || name == FIRE_EVENT_NAME;
        }
        if !is_member_expression(parent)
            || member_property(parent).map(|p| p.id()) != Some(node.id())
        {
            return false;
        }
        if name == FIRE_EVENT_NAME || name == util_name {
            return false;
        }
        let Some(object) = member_object(parent) else {
            return false;
        };

        let regular_call = is_identifier_named(object, util_name, self.source)
            && is_call_expression(parent.parent());

        let wildcard_call = is_member_expression(object)
            && member_property(object).is_some_and(|p| is_identifier_named(p, FIRE_EVENT_NAME, self.source))
            && member_object(object)
                .and_then(|ns| identifier_name(ns, self.source))
                .is_some_and(|ns| {
                    ns == util_name
                        || self
                            .provenance_records()
                            .any(|record| record.namespace_locals().any(|local| local == ns))
                });

        regular_call || wildcard_call
    }

    /// `userEvent.click(...)`, or `user.click(...)` for a session named by
    /// `user_event_session`
    pub fn is_user_event_method(&self, node: Node<'_>, user_event_session: Option<&str>) -> bool {
        let user_event_name = match self.imported_user_event_name() {
            Some(name) => Some(name),
            None if self.is_aggressive_module_reporting_enabled() => Some(USER_EVENT_NAME),
            None => None,
        };
        if user_event_name.is_none() && user_event_session.is_none() {
            return false;
        }
        let Some(parent) = node.parent().filter(|p| is_member_expression(*p)) else {
            return false;
        };
        let name = self.name(node);
        if Some(name) == user_event_name || name == USER_EVENT_NAME {
            return false;
        }
        let Some(object) = member_object(parent).filter(|o| is_identifier(*o)) else {
            return false;
        };
        if object.id() == node.id() {
            return false;
        }
        let object_name = self.name(object);
        Some(object_name) == user_event_name || Some(object_name) == user_event_session
    }

    pub fn is_debug_util(&self, node: Node<'_>) -> bool {
        self.is_debug_util_named(node, DEBUG_UTILS)
    }

    /// Debug helper among `valid_names`, never `console.*`
    pub fn is_debug_util_named(&self, node: Node<'_>, valid_names: &[&str]) -> bool {
        let is_built_in_console = node
            .parent()
            .filter(|p| is_member_expression(*p))
            .and_then(member_object)
            .is_some_and(|o| is_identifier_named(o, "console", self.source));
        !is_built_in_console
            && self.is_potential_testing_library_function(Some(node), |name, original| {
                valid_names.contains(&name) || original.is_some_and(|o| valid_names.contains(&o))
            })
    }

    /// `act` from Testing Library, or from `react-dom/test-utils`
    pub fn is_act_util(&self, node: Node<'_>) -> bool {
        let is_testing_library_act = self
            .is_potential_testing_library_function(Some(node), |name, original| {
                name == ACT_NAME || original == Some(ACT_NAME)
            });
        is_testing_library_act || self.is_react_dom_test_utils_act(node)
    }

    fn is_react_dom_test_utils_act(&self, node: Node<'_>) -> bool {
        let Some(record) = self.state.react_dom_test_utils.as_ref() else {
            return false;
        };
        let reference = get_reference_node(node);
        let Some(root) = get_property_identifier(reference) else {
            return false;
        };
        let name = self.name(node);
        let root_name = self.name(root);
        let binding = record
            .find_named(name)
            .filter(|b| b.imported.as_deref() == Some(ACT_NAME))
            .or_else(|| {
                record.specifiers.iter().find(|b| {
                    matches!(b.kind, BindingKind::Default | BindingKind::Namespace)
                        && name == ACT_NAME
                })
            });
        binding.is_some_and(|b| b.local == root_name)
    }

    /// `createEvent(...)`, `createEvent.click(...)` or `rtl.createEvent.click(...)`
    pub fn is_create_event_util(&self, node: Node<'_>) -> bool {
        fn is_create_event(name: &str, original: Option<&str>) -> bool {
            name == CREATE_EVENT_NAME || original == Some(CREATE_EVENT_NAME)
        }

        if is_call_expression(node) {
            if let Some(callee) = call_callee(node).filter(|c| is_member_expression(*c)) {
                if let Some(object) = member_object(callee) {
                    if is_identifier(object) {
                        return self.is_potential_testing_library_function(Some(object), is_create_event);
                    }
                    if let Some(property) = member_property(object).filter(|p| is_identifier(*p)) {
                        return self
                            .is_potential_testing_library_function(Some(property), is_create_event);
                    }
                }
            }
        }
        self.is_potential_testing_library_function(get_deepest_identifier(node), is_create_event)
    }

    /// Any Testing Library construct
    pub fn is_testing_library_util(&self, node: Node<'_>) -> bool {
        self.is_async_util(node)
            || self.is_query(node)
            || self.is_render_util(node)
            || self.is_fire_event_method(node)
            || self.is_user_event_method(node, None)
            || self.is_act_util(node)
            || self.is_create_event_util(node)
    }

    // assertions

    pub fn is_presence_assert(&self, member: Node<'_>) -> bool {
        get_assert_node_info(member, self.source).is_some_and(|info| {
            if info.is_negated {
                ABSENCE_MATCHERS.contains(&info.matcher)
            } else {
                PRESENCE_MATCHERS.contains(&info.matcher)
            }
        })
    }

    pub fn is_absence_assert(&self, member: Node<'_>) -> bool {
        get_assert_node_info(member, self.source).is_some_and(|info| {
            if info.is_negated {
                PRESENCE_MATCHERS.contains(&info.matcher)
            } else {
                ABSENCE_MATCHERS.contains(&info.matcher)
            }
        })
    }

    pub fn is_matching_assert(&self, member: Node<'_>, matcher: &str) -> bool {
        get_assert_node_info(member, self.source).is_some_and(|info| info.matcher == matcher)
    }
}
