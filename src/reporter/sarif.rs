//! SARIF 2.1 reporter for GitHub Code Scanning / VS Code SARIF viewer

use crate::analyzer::all_rules;
use crate::analyzer::rules::PLUGIN_PREFIX;
use crate::{LintResult, Severity};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// SARIF 2.1.0 minimal structure for one run
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    short_description: SarifMessage,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRuleProperties {
    fixable: bool,
    tags: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    rule_index: Option<usize>,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
    start_column: Option<usize>,
    end_line: Option<usize>,
    end_column: Option<usize>,
}

fn severity_to_level(s: Severity) -> &'static str {
    match s {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

/// Convert a path to a URI (file://)
fn path_to_uri(p: &Path) -> String {
    let path = p.to_string_lossy();
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

/// SARIF reporter for GitHub Code Scanning integration
pub struct SarifReporter;

impl SarifReporter {
    pub fn new() -> Self {
        Self
    }

    /// Produce SARIF 2.1 JSON for one or more lint results. The driver lists
    /// the registered rules that produced at least one result.
    pub fn report(&self, results: &[LintResult]) -> String {
        let reported: BTreeSet<&str> = results
            .iter()
            .flat_map(|r| r.diagnostics.iter().map(|d| d.rule.as_str()))
            .collect();

        let rules: Vec<SarifRule> = all_rules()
            .iter()
            .map(|rule| rule.meta())
            .filter(|meta| reported.contains(meta.name))
            .map(|meta| SarifRule {
                id: format!("{}{}", PLUGIN_PREFIX, meta.name),
                short_description: SarifMessage {
                    text: meta.description.to_string(),
                },
                properties: SarifRuleProperties {
                    fixable: meta.fixable,
                    tags: vec!["testing-library".to_string()],
                },
            })
            .collect();

        let mut sarif_results = Vec::new();
        for result in results {
            let file_uri = path_to_uri(&result.file_path);
            for diagnostic in &result.diagnostics {
                let rule_id = format!("{}{}", PLUGIN_PREFIX, diagnostic.rule);
                sarif_results.push(SarifResult {
                    rule_index: rules.iter().position(|r| r.id == rule_id),
                    rule_id,
                    level: severity_to_level(diagnostic.severity).to_string(),
                    message: SarifMessage {
                        text: diagnostic.message.clone(),
                    },
                    locations: vec![SarifLocation {
                        physical_location: SarifPhysicalLocation {
                            artifact_location: SarifArtifactLocation {
                                uri: file_uri.clone(),
                            },
                            region: SarifRegion {
                                start_line: diagnostic.location.line,
                                start_column: Some(diagnostic.location.column),
                                end_line: diagnostic.location.end_line,
                                end_column: diagnostic.location.end_column,
                            },
                        },
                    }],
                });
            }
        }

        let run = SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "tlint".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results: sarif_results,
        };

        let log = SarifLog {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json".to_string(),
            version: "2.1.0".to_string(),
            runs: vec![run],
        };

        serde_json::to_string_pretty(&log).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for SarifReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{diagnostic, result};
    use super::*;

    #[test]
    fn test_sarif_structure() {
        let results = vec![result(
            "src/a.test.tsx",
            vec![
                diagnostic("no-container", Severity::Error, 3, false),
                diagnostic("no-debugging-utils", Severity::Info, 8, false),
            ],
        )];
        let sarif = SarifReporter::new().report(&results);
        let parsed: serde_json::Value = serde_json::from_str(&sarif).unwrap();

        assert_eq!(parsed["version"], "2.1.0");
        let run = &parsed["runs"][0];
        assert_eq!(run["tool"]["driver"]["name"], "tlint");

        let rules = run["tool"]["driver"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["id"], "testing-library/no-container");

        let sarif_results = run["results"].as_array().unwrap();
        assert_eq!(sarif_results[0]["ruleId"], "testing-library/no-container");
        assert_eq!(sarif_results[0]["ruleIndex"], 0);
        assert_eq!(sarif_results[0]["level"], "error");
        assert_eq!(sarif_results[1]["level"], "note");
        assert_eq!(
            sarif_results[0]["locations"][0]["physicalLocation"]["region"]["startLine"],
            3
        );
        assert_eq!(
            sarif_results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "file:///src/a.test.tsx"
        );
    }

    #[test]
    fn test_path_to_uri() {
        assert_eq!(path_to_uri(Path::new("/tmp/a.test.ts")), "file:///tmp/a.test.ts");
    }
}
