//! What a rule sees while it runs: the detection engine, the source, and a
//! way to report diagnostics with optional fixes.

use super::rules::RuleMeta;
use crate::detector::DetectionEngine;
use crate::parser::ast_helpers::text;
use crate::parser::node_to_location;
use crate::{Diagnostic, Edit, Fix, Severity, Span};
use log::trace;
use std::path::Path;
use tree_sitter::Node;

pub struct RuleContext<'a, 'c> {
    engine: &'c DetectionEngine<'a>,
    meta: &'static RuleMeta,
    severity: Severity,
    file_path: &'c Path,
    diagnostics: &'c mut Vec<Diagnostic>,
}

impl<'a, 'c> RuleContext<'a, 'c> {
    pub fn new(
        engine: &'c DetectionEngine<'a>,
        meta: &'static RuleMeta,
        severity: Severity,
        file_path: &'c Path,
        diagnostics: &'c mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            engine,
            meta,
            severity,
            file_path,
            diagnostics,
        }
    }

    pub fn engine(&self) -> &'c DetectionEngine<'a> {
        self.engine
    }

    pub fn source(&self) -> &'a str {
        self.engine.source()
    }

    pub fn file_path(&self) -> &'c Path {
        self.file_path
    }

    /// Source text of `node`
    pub fn text(&self, node: Node<'_>) -> &'a str {
        text(node, self.engine.source())
    }

    pub fn report(&mut self, report: Report<'a>) {
        let template = self.meta.message(report.message_id).unwrap_or(report.message_id);
        let message = interpolate(template, &report.data);
        trace!(
            "{} reported {} at byte {}",
            self.meta.name,
            report.message_id,
            report.node.start_byte()
        );
        self.diagnostics.push(Diagnostic {
            rule: self.meta.name.to_string(),
            message_id: report.message_id.to_string(),
            severity: self.severity,
            message,
            location: node_to_location(report.node),
            span: Span {
                start: report.node.start_byte(),
                end: report.node.end_byte(),
            },
            fix: report.fix,
        });
    }
}

/// A diagnostic under construction
pub struct Report<'a> {
    node: Node<'a>,
    message_id: &'static str,
    data: Vec<(&'static str, String)>,
    fix: Option<Fix>,
}

impl<'a> Report<'a> {
    pub fn new(node: Node<'a>, message_id: &'static str) -> Self {
        Self {
            node,
            message_id,
            data: Vec::new(),
            fix: None,
        }
    }

    /// Value for a `{{ key }}` placeholder in the message
    pub fn data(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.data.push((key, value.into()));
        self
    }

    /// Attach a fix built by `build`. A fixer left empty attaches nothing.
    pub fn fix(mut self, source: &str, build: impl FnOnce(&mut Fixer<'_>)) -> Self {
        let mut fixer = Fixer::new(source);
        build(&mut fixer);
        if !fixer.edits.is_empty() {
            self.fix = Some(Fix { edits: fixer.edits });
        }
        self
    }
}

/// Collects the edits of one fix
pub struct Fixer<'s> {
    source: &'s str,
    edits: Vec<Edit>,
}

impl<'s> Fixer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn replace(&mut self, node: Node<'_>, replacement: impl Into<String>) {
        self.replace_range(node.start_byte(), node.end_byte(), replacement);
    }

    pub fn replace_range(&mut self, start: usize, end: usize, replacement: impl Into<String>) {
        self.edits.push(Edit {
            start,
            end,
            replacement: replacement.into(),
        });
    }

    pub fn insert_before(&mut self, node: Node<'_>, content: impl Into<String>) {
        self.insert_at(node.start_byte(), content);
    }

    pub fn insert_after(&mut self, node: Node<'_>, content: impl Into<String>) {
        self.insert_at(node.end_byte(), content);
    }

    pub fn insert_at(&mut self, offset: usize, content: impl Into<String>) {
        self.replace_range(offset, offset, content);
    }

    pub fn remove(&mut self, node: Node<'_>) {
        self.remove_range(node.start_byte(), node.end_byte());
    }

    pub fn remove_range(&mut self, start: usize, end: usize) {
        self.replace_range(start, end, "");
    }
}

/// Fill `{{ key }}` placeholders
pub fn interpolate(template: &str, data: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in data {
        out = out
            .replace(&format!("{{{{ {} }}}}", key), value)
            .replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}
