//! Analyzer module - rules, the per-rule wrapper and the linter driving them

pub mod context;
pub mod engine;
pub mod rules;
pub mod wrapper;

pub use context::{Fixer, Report, RuleContext};
pub use engine::{ConfiguredRule, Linter};
pub use rules::{all_rules, find_rule, Recommendation, Rule, RuleListener, RuleMeta};
pub use wrapper::RuleWrapper;
