//! Config schema and deserialization

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Rule severity override (error, warning, info, off)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    #[serde(alias = "warn")]
    Warning,
    Info,
    /// Disable the rule entirely
    Off,
}

impl RuleSeverity {
    /// Convert to crate::Severity if not Off
    pub fn to_severity(self) -> Option<crate::Severity> {
        match self {
            RuleSeverity::Error => Some(crate::Severity::Error),
            RuleSeverity::Warning => Some(crate::Severity::Warning),
            RuleSeverity::Info => Some(crate::Severity::Info),
            RuleSeverity::Off => None,
        }
    }
}

/// Which framework flavour of Testing Library the project uses. Decides the
/// default rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Dom,
    Angular,
    #[default]
    React,
    Vue,
    Svelte,
    Marko,
}

impl Preset {
    pub const ALL: &'static [Preset] = &[
        Preset::Dom,
        Preset::Angular,
        Preset::React,
        Preset::Vue,
        Preset::Svelte,
        Preset::Marko,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Dom => "dom",
            Preset::Angular => "angular",
            Preset::React => "react",
            Preset::Vue => "vue",
            Preset::Svelte => "svelte",
            Preset::Marko => "marko",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule entry: `"error"` or `["error", { ...options }]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    Level(RuleSeverity),
    Configured(Vec<Value>),
}

impl RuleEntry {
    /// Severity of the entry. A configured entry carries it first.
    pub fn severity(&self) -> Result<RuleSeverity, String> {
        match self {
            RuleEntry::Level(severity) => Ok(*severity),
            RuleEntry::Configured(values) => {
                let first = values
                    .first()
                    .ok_or_else(|| "empty rule entry".to_string())?;
                serde_json::from_value(first.clone()).map_err(|e| e.to_string())
            }
        }
    }

    /// Options after the severity
    pub fn options(&self) -> &[Value] {
        match self {
            RuleEntry::Level(_) => &[],
            RuleEntry::Configured(values) => values.get(1..).unwrap_or(&[]),
        }
    }
}

/// Per-path override configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    /// Glob patterns this override applies to
    pub files: Vec<String>,

    /// Rule entries for matched files
    #[serde(default)]
    pub rules: BTreeMap<String, RuleEntry>,
}

/// Root config structure for .tlintrc.json
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config, or package name)
    #[serde(default)]
    pub extends: Option<String>,

    /// Rule set used for rules the config does not mention
    #[serde(default)]
    pub preset: Option<Preset>,

    /// Shared settings such as `testing-library/utils-module`
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,

    /// Per-rule entries. Key is rule name in kebab-case.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleEntry>,

    /// Glob patterns for files/directories to exclude from linting
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Custom test file patterns (default: *.test.ts, *.spec.ts, etc.)
    #[serde(default)]
    pub test_patterns: Vec<String>,

    /// Per-path configuration overrides
    #[serde(default)]
    pub overrides: Vec<ConfigOverride>,
}

impl Config {
    pub fn preset(&self) -> Preset {
        self.preset.unwrap_or_default()
    }

    /// Rule entries for a specific file path, with matching overrides applied
    /// in order
    pub fn effective_for_file(&self, file_path: &Path) -> EffectiveConfig {
        let mut rules = self.rules.clone();
        for override_cfg in &self.overrides {
            if Self::matches_override(file_path, &override_cfg.files) {
                for (rule, entry) in &override_cfg.rules {
                    rules.insert(rule.clone(), entry.clone());
                }
            }
        }
        EffectiveConfig {
            preset: self.preset(),
            rules,
        }
    }

    /// Check if a file path matches any of the override patterns
    fn matches_override(file_path: &Path, patterns: &[String]) -> bool {
        let path_str = file_path.to_string_lossy();
        patterns.iter().any(|pattern| {
            globset::Glob::new(pattern).is_ok_and(|glob| {
                glob.compile_matcher().is_match(file_path)
                    || path_str.contains(pattern.trim_start_matches("**/"))
            })
        })
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.preset.is_none() {
            self.preset = base.preset;
        }

        for (key, value) in base.settings {
            self.settings.entry(key).or_insert(value);
        }
        for (rule, entry) in base.rules {
            self.rules.entry(rule).or_insert(entry);
        }

        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;

        if self.test_patterns.is_empty() {
            self.test_patterns = base.test_patterns;
        }

        // Base overrides apply first
        let mut all_overrides = base.overrides;
        all_overrides.append(&mut self.overrides);
        self.overrides = all_overrides;
    }

    /// Get test file suffixes, defaulting to the usual Jest/Vitest names
    pub fn get_test_patterns(&self) -> Vec<&str> {
        if self.test_patterns.is_empty() {
            vec![
                ".test.ts",
                ".test.tsx",
                ".spec.ts",
                ".spec.tsx",
                ".test.js",
                ".test.jsx",
                ".spec.js",
                ".spec.jsx",
                ".test.mjs",
                ".test.cjs",
            ]
        } else {
            self.test_patterns.iter().map(|s| s.as_str()).collect()
        }
    }
}

/// Effective configuration for a specific file (after applying overrides)
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub preset: Preset,
    pub rules: BTreeMap<String, RuleEntry>,
}
