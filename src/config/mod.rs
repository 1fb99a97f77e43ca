//! Configuration loading for tlint

mod schema;

pub use schema::{Config, ConfigOverride, EffectiveConfig, Preset, RuleEntry, RuleSeverity};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".tlintrc.json";

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            debug!("loading config {}", path.display());
            load_config_with_extends(&path, &mut HashSet::new())
        }
        None => Ok(Config::default()),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Resolve an extends reference to a config
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));

    let extends_path = if extends.starts_with("./") || extends.starts_with("../") {
        config_dir.join(extends)
    } else if extends.starts_with('/') {
        PathBuf::from(extends)
    } else {
        // Package reference like "@company/tlint-config"
        find_node_modules_config(config_dir, extends).unwrap_or_else(|| config_dir.join(extends))
    };

    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Try to find a config in node_modules
fn find_node_modules_config(start_dir: &Path, package: &str) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let package_dir = dir.join("node_modules").join(package);
        for filename in [CONFIG_FILENAME, "tlint.config.json", "index.json"] {
            let candidate = package_dir.join(filename);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        let direct = dir.join("node_modules").join(format!("{}.json", package));
        if direct.exists() {
            return Some(direct);
        }

        dir = dir.parent()?;
    }
}

/// Search for .tlintrc.json in directory and its parents
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Build a GlobSet from ignore patterns for path matching
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Check if a path should be ignored based on config glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

/// Starter config written by `tlint init`
pub fn starter_config(preset: Preset) -> String {
    format!(
        r#"{{
  "preset": "{preset}",
  "settings": {{}},
  "rules": {{}},
  "ignore": ["**/node_modules/**"]
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_is_ignored_e2e() {
        let set = build_ignore_set(&["**/*.e2e.test.ts".to_string()]).unwrap();
        assert!(is_ignored(Path::new("src/auth.e2e.test.ts"), &set));
        assert!(!is_ignored(Path::new("src/auth.test.ts"), &set));
    }

    #[test]
    fn test_is_ignored_legacy() {
        let set = build_ignore_set(&["**/legacy/**".to_string()]).unwrap();
        assert!(is_ignored(Path::new("foo/legacy/bar.test.ts"), &set));
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir(&nested).unwrap();
        // A config further up the real filesystem would be picked up, so only
        // check the explicit path error here
        let err = load_config(&nested, Some(Path::new("missing.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_rule_entries() {
        let config: Config = serde_json::from_value(json!({
            "preset": "vue",
            "rules": {
                "await-async-events": ["error", { "eventModule": "fireEvent" }],
                "no-container": "warn",
                "prefer-screen-queries": "off"
            }
        }))
        .unwrap();
        assert_eq!(config.preset(), Preset::Vue);
        let entry = &config.rules["await-async-events"];
        assert_eq!(entry.severity().unwrap(), RuleSeverity::Error);
        assert_eq!(entry.options(), &[json!({ "eventModule": "fireEvent" })]);
        assert_eq!(
            config.rules["no-container"].severity().unwrap(),
            RuleSeverity::Warning
        );
        assert!(config.rules["prefer-screen-queries"].options().is_empty());
    }

    #[test]
    fn test_bad_configured_severity() {
        let entry = RuleEntry::Configured(vec![json!("loud")]);
        assert!(entry.severity().is_err());
        assert!(RuleEntry::Configured(vec![]).severity().is_err());
    }

    #[test]
    fn test_config_extends() {
        let dir = TempDir::new().unwrap();

        let base_path = dir.path().join("base.json");
        let mut base_file = fs::File::create(&base_path).unwrap();
        writeln!(
            base_file,
            r#"{{
                "preset": "angular",
                "settings": {{ "testing-library/utils-module": "test-utils" }},
                "rules": {{ "no-node-access": "error" }},
                "ignore": ["**/legacy/**"]
            }}"#
        )
        .unwrap();

        let child_path = dir.path().join(CONFIG_FILENAME);
        let mut child_file = fs::File::create(&child_path).unwrap();
        writeln!(
            child_file,
            r#"{{
                "extends": "./base.json",
                "rules": {{ "no-container": "warn" }}
            }}"#
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();

        assert_eq!(config.preset(), Preset::Angular);
        assert!(config.rules.contains_key("no-container"));
        assert!(config.rules.contains_key("no-node-access"));
        assert_eq!(
            config.settings["testing-library/utils-module"],
            json!("test-utils")
        );
        assert!(config.ignore.contains(&"**/legacy/**".to_string()));
    }

    #[test]
    fn test_circular_extends() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();
        let err = load_config(dir.path(), Some(Path::new("a.json"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Circular extends"));
    }

    #[test]
    fn test_node_modules_extends() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("node_modules").join("@acme").join("tlint-config");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join(CONFIG_FILENAME), r#"{ "preset": "svelte" }"#).unwrap();
        fs::write(
            dir.path().join("custom.json"),
            r#"{ "extends": "@acme/tlint-config" }"#,
        )
        .unwrap();
        let config = load_config(dir.path(), Some(Path::new("custom.json"))).unwrap();
        assert_eq!(config.preset(), Preset::Svelte);
    }

    #[test]
    fn test_config_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "rules": { "no-node-access": "error" },
                "overrides": [
                    {
                        "files": ["**/legacy/**"],
                        "rules": { "no-node-access": "off" }
                    }
                ]
            }"#,
        )
        .unwrap();

        let effective = config.effective_for_file(Path::new("src/auth.test.ts"));
        assert_eq!(
            effective.rules["no-node-access"].severity().unwrap(),
            RuleSeverity::Error
        );

        let effective = config.effective_for_file(Path::new("src/legacy/old.test.ts"));
        assert_eq!(
            effective.rules["no-node-access"].severity().unwrap(),
            RuleSeverity::Off
        );
    }

    #[test]
    fn test_starter_config_parses() {
        let config: Config = serde_json::from_str(&starter_config(Preset::Dom)).unwrap();
        assert_eq!(config.preset(), Preset::Dom);
    }
}
