//! Test id attributes must follow a naming pattern.
//!
//! `{fileName}` in the pattern stands for the linted file's name without
//! extension, or its directory name for `index` files.

use super::{parse_options, Recommendation, Rule, RuleListener, RuleMeta};
use crate::analyzer::context::{Report, RuleContext};
use crate::parser::ast_helpers::{named_children, string_value};
use crate::parser::{NodeKind, Selector};
use crate::LintError;
use log::warn;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tree_sitter::Node;

const FILENAME_PLACEHOLDER: &str = "{fileName}";

pub struct ConsistentDataTestid;

static META: RuleMeta = RuleMeta {
    name: "consistent-data-testid",
    description: "Ensures consistent usage of `data-testid`",
    messages: &[
        (
            "consistentDataTestId",
            "`{{attr}}` \"{{value}}\" should match `{{regex}}`",
        ),
        ("consistentDataTestIdCustomMessage", "{{message}}"),
    ],
    fixable: false,
    skip_reporting_check: true,
    recommendation: Recommendation::Off,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Attributes {
    One(String),
    Many(Vec<String>),
}

impl Attributes {
    fn contains(&self, name: &str) -> bool {
        match self {
            Attributes::One(one) => one == name,
            Attributes::Many(many) => many.iter().any(|a| a == name),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct Options {
    test_id_pattern: String,
    test_id_attribute: Attributes,
    custom_message: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            test_id_pattern: String::new(),
            test_id_attribute: Attributes::One("data-testid".to_string()),
            custom_message: None,
        }
    }
}

impl Rule for ConsistentDataTestid {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, options: &[Value]) -> Result<Box<dyn RuleListener<'a> + 'a>, LintError> {
        let options: Options = parse_options(&META, options)?;
        let sample = options.test_id_pattern.replacen(FILENAME_PLACEHOLDER, "name", 1);
        if let Err(e) = Regex::new(&sample) {
            return Err(LintError::InvalidOptions {
                rule: META.name.to_string(),
                message: format!("invalid testIdPattern: {}", e),
            });
        }
        Ok(Box::new(Listener {
            options,
            validator: None,
        }))
    }
}

/// Name `{fileName}` expands to, or `None` for bracketed route files
/// like `[id].tsx`
fn file_name_of(path: &Path) -> Option<String> {
    let with_extension = path.file_name()?.to_str()?;
    if with_extension.contains('[') || with_extension.contains(']') {
        return None;
    }
    let stem = with_extension.split('.').next().unwrap_or(with_extension);
    if stem == "index" {
        return path
            .parent()
            .and_then(Path::file_name)
            .and_then(|p| p.to_str())
            .map(str::to_string);
    }
    Some(stem.to_string())
}

struct Listener {
    options: Options,
    /// Compiled on first use, once the file name is known
    validator: Option<Regex>,
}

impl Listener {
    fn validator(&mut self, path: &Path) -> Option<&Regex> {
        if self.validator.is_none() {
            let file_name = file_name_of(path).unwrap_or_default();
            let pattern = self
                .options
                .test_id_pattern
                .replacen(FILENAME_PLACEHOLDER, &file_name, 1);
            match Regex::new(&pattern) {
                Ok(regex) => self.validator = Some(regex),
                Err(e) => {
                    warn!("{}: test id pattern `{}` is invalid: {}", path.display(), pattern, e);
                    return None;
                }
            }
        }
        self.validator.as_ref()
    }
}

impl<'a> RuleListener<'a> for Listener {
    fn selectors(&self) -> &'static [Selector] {
        &[Selector::Enter(NodeKind::JsxAttribute)]
    }

    fn on(&mut self, _selector: Selector, node: Node<'a>, cx: &mut RuleContext<'a, '_>) {
        let children = named_children(node);
        let (Some(name), Some(value)) = (children.first(), children.get(1)) else {
            return;
        };
        let attr = cx.text(*name);
        if !self.options.test_id_attribute.contains(attr) {
            return;
        }
        let Some(value) = string_value(*value, cx.source()).filter(|v| !v.is_empty()) else {
            return;
        };
        let file_path = cx.file_path();
        let pattern = match self.validator(file_path) {
            Some(regex) if regex.is_match(value) => return,
            Some(regex) => regex.as_str().to_string(),
            None => return,
        };
        let report = match &self.options.custom_message {
            Some(message) => {
                Report::new(*name, "consistentDataTestIdCustomMessage").data("message", message.as_str())
            }
            None => Report::new(*name, "consistentDataTestId")
                .data("attr", attr)
                .data("value", value)
                .data("regex", format!("/{}/", pattern)),
        };
        cx.report(report);
    }
}
