//! Shared detection settings: custom module, custom renders, custom queries.
//!
//! Each setting is absent by default, which keeps the matching category in
//! aggressive mode (name patterns alone classify a node).

use crate::error::LintError;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

pub const UTILS_MODULE_KEY: &str = "testing-library/utils-module";
pub const CUSTOM_RENDERS_KEY: &str = "testing-library/custom-renders";
pub const CUSTOM_QUERIES_KEY: &str = "testing-library/custom-queries";

const OFF: &str = "off";

/// `utils-module` setting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UtilsModule {
    /// Any import (or none) may provide Testing Library utils
    #[default]
    Aggressive,
    /// Only the official packages count
    Off,
    /// This module counts alongside the official packages
    Module(String),
}

/// `custom-renders` setting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CustomRenders {
    /// Anything whose name contains "render"
    #[default]
    Aggressive,
    /// Only `render` itself
    Off,
    /// `render` plus these names
    Names(Vec<String>),
}

/// `custom-queries` setting
#[derive(Debug, Clone, Default)]
pub enum CustomQueries {
    /// Anything shaped like a query
    #[default]
    Aggressive,
    /// Built-in queries only
    Off,
    /// Built-in queries plus names matching these patterns
    Patterns(Vec<Regex>),
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub utils_module: UtilsModule,
    pub custom_renders: CustomRenders,
    pub custom_queries: CustomQueries,
}

impl Settings {
    /// Read settings from a config `settings` table. Both the prefixed
    /// (`testing-library/utils-module`) and short (`utils-module`) keys work.
    pub fn from_map(map: &BTreeMap<String, Value>) -> Result<Self, LintError> {
        let lookup = |key: &str| {
            map.get(key)
                .or_else(|| key.strip_prefix("testing-library/").and_then(|k| map.get(k)))
        };

        let utils_module = match lookup(UTILS_MODULE_KEY) {
            None | Some(Value::Null) => UtilsModule::Aggressive,
            Some(Value::String(s)) if s.is_empty() => UtilsModule::Aggressive,
            Some(Value::String(s)) if s == OFF => UtilsModule::Off,
            Some(Value::String(s)) => UtilsModule::Module(s.clone()),
            Some(other) => {
                return Err(invalid(UTILS_MODULE_KEY, "expected a module name or \"off\"", other))
            }
        };

        let custom_renders = match name_list(CUSTOM_RENDERS_KEY, lookup(CUSTOM_RENDERS_KEY))? {
            NameList::Absent => CustomRenders::Aggressive,
            NameList::Off => CustomRenders::Off,
            NameList::Names(names) => CustomRenders::Names(names),
        };

        let custom_queries = match name_list(CUSTOM_QUERIES_KEY, lookup(CUSTOM_QUERIES_KEY))? {
            NameList::Absent => CustomQueries::Aggressive,
            NameList::Off => CustomQueries::Off,
            NameList::Names(names) => CustomQueries::Patterns(
                names
                    .iter()
                    .map(|pattern| {
                        Regex::new(pattern).map_err(|e| {
                            LintError::InvalidSettings {
                                key: CUSTOM_QUERIES_KEY.to_string(),
                                message: format!("invalid pattern `{}`: {}", pattern, e),
                            }
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(Self {
            utils_module,
            custom_renders,
            custom_queries,
        })
    }

    /// Custom module name when one is configured (not "off")
    pub fn custom_module(&self) -> Option<&str> {
        match &self.utils_module {
            UtilsModule::Module(name) => Some(name),
            _ => None,
        }
    }

    pub fn custom_render_names(&self) -> &[String] {
        match &self.custom_renders {
            CustomRenders::Names(names) => names,
            _ => &[],
        }
    }

    pub fn is_aggressive_module_reporting_enabled(&self) -> bool {
        self.utils_module == UtilsModule::Aggressive
    }

    pub fn is_aggressive_render_reporting_enabled(&self) -> bool {
        self.custom_renders == CustomRenders::Aggressive
    }

    pub fn is_aggressive_query_reporting_enabled(&self) -> bool {
        matches!(self.custom_queries, CustomQueries::Aggressive)
    }

    /// True if `name` matches one of the configured custom query patterns
    pub fn matches_custom_query(&self, name: &str) -> bool {
        match &self.custom_queries {
            CustomQueries::Patterns(patterns) => patterns.iter().any(|p| p.is_match(name)),
            _ => false,
        }
    }
}

enum NameList {
    Absent,
    Off,
    Names(Vec<String>),
}

/// `"off"`, a list of names, or nothing. An empty list behaves as unset.
fn name_list(key: &str, value: Option<&Value>) -> Result<NameList, LintError> {
    match value {
        None | Some(Value::Null) => Ok(NameList::Absent),
        Some(Value::String(s)) if s == OFF => Ok(NameList::Off),
        Some(Value::Array(items)) if items.is_empty() => Ok(NameList::Absent),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(invalid(key, "expected a list of strings", other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(NameList::Names),
        Some(other) => Err(invalid(key, "expected a list of names or \"off\"", other)),
    }
}

fn invalid(key: &str, expected: &str, got: &Value) -> LintError {
    LintError::InvalidSettings {
        key: key.to_string(),
        message: format!("{}, got {}", expected, got),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> Result<Settings, LintError> {
        let map: BTreeMap<String, Value> = serde_json::from_value(value).unwrap();
        Settings::from_map(&map)
    }

    #[test]
    fn defaults_are_aggressive() {
        let s = settings(json!({})).unwrap();
        assert!(s.is_aggressive_module_reporting_enabled());
        assert!(s.is_aggressive_render_reporting_enabled());
        assert!(s.is_aggressive_query_reporting_enabled());
        assert_eq!(s.custom_module(), None);
    }

    #[test]
    fn reads_prefixed_and_short_keys() {
        let s = settings(json!({
            "testing-library/utils-module": "test-utils",
            "custom-renders": ["renderWithRedux"],
            "testing-library/custom-queries": "off"
        }))
        .unwrap();
        assert_eq!(s.custom_module(), Some("test-utils"));
        assert_eq!(s.custom_render_names(), ["renderWithRedux".to_string()]);
        assert!(!s.is_aggressive_query_reporting_enabled());
        assert!(!s.matches_custom_query("getByIcon"));
    }

    #[test]
    fn off_disables_aggressive_module_mode_without_custom_module() {
        let s = settings(json!({ "utils-module": "off" })).unwrap();
        assert!(!s.is_aggressive_module_reporting_enabled());
        assert_eq!(s.custom_module(), None);
    }

    #[test]
    fn empty_render_list_stays_aggressive() {
        let s = settings(json!({ "custom-renders": [] })).unwrap();
        assert!(s.is_aggressive_render_reporting_enabled());
    }

    #[test]
    fn custom_query_patterns_match_anywhere_in_the_name() {
        let s = settings(json!({ "custom-queries": ["ByIcon", "^queryByComponent$"] })).unwrap();
        assert!(s.matches_custom_query("getByIcon"));
        assert!(s.matches_custom_query("findAllByIcon"));
        assert!(s.matches_custom_query("queryByComponent"));
        assert!(!s.matches_custom_query("getByComponent"));
        assert!(!s.matches_custom_query("getByText"));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            settings(json!({ "utils-module": 3 })),
            Err(LintError::InvalidSettings { .. })
        ));
        assert!(settings(json!({ "custom-renders": [1] })).is_err());
        assert!(settings(json!({ "custom-queries": ["("] })).is_err());
    }
}
