//! Pairs one rule listener with its own detection engine.
//!
//! Import tracking always runs first so provenance is current; the listener
//! only runs while the engine says the file may be reported on.

use super::context::RuleContext;
use super::rules::{Rule, RuleListener, RuleMeta};
use crate::detector::{DetectionEngine, Settings, TRACKED_SELECTORS};
use crate::parser::Selector;
use crate::{Diagnostic, LintError, Severity};
use serde_json::Value;
use std::path::Path;
use tree_sitter::Node;

pub struct RuleWrapper<'a> {
    meta: &'static RuleMeta,
    severity: Severity,
    engine: DetectionEngine<'a>,
    listener: Box<dyn RuleListener<'a> + 'a>,
    /// Events the listener asked for, read once at creation
    listener_selectors: &'static [Selector],
}

impl<'a> RuleWrapper<'a> {
    pub fn new(
        rule: &dyn Rule,
        severity: Severity,
        options: &[Value],
        source: &'a str,
        settings: &'a Settings,
    ) -> Result<Self, LintError> {
        let meta = rule.meta();
        let listener = rule.create(options)?;
        Ok(Self {
            meta,
            severity,
            engine: DetectionEngine::new(source, settings, meta.skip_reporting_check),
            listener_selectors: listener.selectors(),
            listener,
        })
    }

    pub fn meta(&self) -> &'static RuleMeta {
        self.meta
    }

    /// Union of the engine's tracking selectors and the listener's
    pub fn selectors(&self) -> Vec<Selector> {
        let mut selectors = TRACKED_SELECTORS.to_vec();
        for selector in self.listener_selectors {
            if !selectors.contains(selector) {
                selectors.push(*selector);
            }
        }
        selectors
    }

    pub fn visit(
        &mut self,
        selector: Selector,
        node: Node<'a>,
        file_path: &Path,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if TRACKED_SELECTORS.contains(&selector) {
            self.engine.track(selector, node);
        }
        if !self.listener_selectors.contains(&selector) || !self.engine.can_report_errors() {
            return;
        }
        let mut cx = RuleContext::new(&self.engine, self.meta, self.severity, file_path, diagnostics);
        self.listener.on(selector, node, &mut cx);
    }
}
