//! Parse tlint suppression comments from source

use std::collections::{HashMap, HashSet};

const PLUGIN_PREFIX: &str = "testing-library/";

/// Directive for which rules are ignored on a given line
#[derive(Debug, Clone)]
pub enum LineIgnoreSet {
    /// Ignore all rules on this line
    All,
    /// Ignore only these rules
    Rules(HashSet<String>),
}

impl LineIgnoreSet {
    fn from_rules(rules: HashSet<String>) -> Self {
        if rules.is_empty() {
            LineIgnoreSet::All
        } else {
            LineIgnoreSet::Rules(rules)
        }
    }

    fn merge(self, other: LineIgnoreSet) -> Self {
        match (self, other) {
            (LineIgnoreSet::Rules(mut a), LineIgnoreSet::Rules(b)) => {
                a.extend(b);
                LineIgnoreSet::Rules(a)
            }
            _ => LineIgnoreSet::All,
        }
    }
}

/// Parsed suppression directives from a file
#[derive(Debug, Default)]
pub struct IgnoreDirectives {
    /// Per-line: which rules to ignore (line is 1-indexed)
    line_rules: HashMap<usize, LineIgnoreSet>,
    /// Ranges (start_line, end_line) where all rules are disabled (1-indexed, inclusive)
    disabled_ranges: Vec<(usize, usize)>,
}

impl IgnoreDirectives {
    /// Check if a diagnostic of `rule` at `line` is suppressed
    pub fn is_ignored(&self, line: usize, rule: &str) -> bool {
        if let Some(set) = self.line_rules.get(&line) {
            let matched = match set {
                LineIgnoreSet::All => true,
                LineIgnoreSet::Rules(r) => r.contains(rule),
            };
            if matched {
                return true;
            }
        }
        self.disabled_ranges
            .iter()
            .any(|(start, end)| line >= *start && line <= *end)
    }

    /// Parse source code for `tlint-*` and `eslint-disable-next-line` comments
    pub fn parse(source: &str) -> Self {
        let mut line_rules: HashMap<usize, LineIgnoreSet> = HashMap::new();
        let mut disabled_ranges: Vec<(usize, usize)> = Vec::new();
        let mut disable_start: Option<usize> = None;

        let mut add = |line_no: usize, set: LineIgnoreSet| {
            let merged = match line_rules.remove(&line_no) {
                Some(existing) => existing.merge(set),
                None => set,
            };
            line_rules.insert(line_no, merged);
        };

        for (zero_indexed, line) in source.lines().enumerate() {
            let line_no = zero_indexed + 1;
            let line = line.trim();

            // // tlint-disable-next-line [rule ...]
            if let Some(rest) = directive_rest(line, "tlint-disable-next-line") {
                add(line_no + 1, LineIgnoreSet::from_rules(parse_rule_list(rest)));
            } else if let Some(rest) = directive_rest(line, "tlint-ignore") {
                add(line_no, LineIgnoreSet::from_rules(parse_rule_list(rest)));
            } else if directive_rest(line, "tlint-disable").is_some() {
                disable_start.get_or_insert(line_no);
            } else if directive_rest(line, "tlint-enable").is_some() {
                if let Some(start) = disable_start.take() {
                    disabled_ranges.push((start, line_no));
                }
            }

            // eslint-disable-next-line testing-library/<rule>
            if let Some(rest) = directive_rest(line, "eslint-disable-next-line") {
                let rest = rest.split("--").next().unwrap_or("");
                let words: Vec<&str> = rest
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|w| !w.is_empty())
                    .collect();
                if words.is_empty() {
                    add(line_no + 1, LineIgnoreSet::All);
                } else {
                    let rules: HashSet<String> = words
                        .iter()
                        .filter_map(|w| w.strip_prefix(PLUGIN_PREFIX))
                        .map(str::to_string)
                        .collect();
                    if !rules.is_empty() {
                        add(line_no + 1, LineIgnoreSet::Rules(rules));
                    }
                }
            }
        }

        // A disable without a matching enable runs to the end of the file
        if let Some(start) = disable_start {
            let end = source.lines().count().max(1);
            disabled_ranges.push((start, end));
        }

        Self {
            line_rules,
            disabled_ranges,
        }
    }
}

/// Text after `directive` when it appears as a whole word in `line`
fn directive_rest<'l>(line: &'l str, directive: &str) -> Option<&'l str> {
    let idx = line.find(directive)?;
    let rest = &line[idx + directive.len()..];
    if rest.starts_with(|c: char| c == '-' || c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(rest.trim_end().trim_end_matches("*/").trim())
}

fn parse_rule_list(s: &str) -> HashSet<String> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| w.strip_prefix(PLUGIN_PREFIX).unwrap_or(w).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disable_next_line() {
        let source = r#"
        // tlint-disable-next-line
        fireEvent.click(el);
        "#;
        let dir = IgnoreDirectives::parse(source);
        assert!(dir.is_ignored(3, "await-async-events"));
        assert!(!dir.is_ignored(1, "await-async-events"));
        assert!(!dir.is_ignored(2, "await-async-events"));
    }

    #[test]
    fn test_ignore_specific_rule() {
        let source = "  fireEvent.click(el); // tlint-ignore await-async-events\n";
        let dir = IgnoreDirectives::parse(source);
        assert!(dir.is_ignored(1, "await-async-events"));
        assert!(!dir.is_ignored(1, "no-node-access"));
    }

    #[test]
    fn test_disable_block() {
        let source = r#"
        /* tlint-disable */
        fireEvent.click(a);
        fireEvent.click(b);
        /* tlint-enable */
        fireEvent.click(c);
        "#;
        let dir = IgnoreDirectives::parse(source);
        assert!(dir.is_ignored(2, "await-async-events"));
        assert!(dir.is_ignored(3, "await-async-events"));
        assert!(dir.is_ignored(4, "await-async-events"));
        assert!(dir.is_ignored(5, "await-async-events"));
        assert!(!dir.is_ignored(6, "await-async-events"));
    }

    #[test]
    fn test_disable_next_line_does_not_open_block() {
        let source = "// tlint-disable-next-line no-container\na;\nb;\n";
        let dir = IgnoreDirectives::parse(source);
        assert!(dir.is_ignored(2, "no-container"));
        assert!(!dir.is_ignored(2, "no-node-access"));
        assert!(!dir.is_ignored(3, "no-container"));
    }

    #[test]
    fn test_eslint_plugin_comment() {
        let source = "// eslint-disable-next-line testing-library/no-node-access -- legacy\nx;\n// eslint-disable-next-line no-console\ny;\n";
        let dir = IgnoreDirectives::parse(source);
        assert!(dir.is_ignored(2, "no-node-access"));
        assert!(!dir.is_ignored(2, "no-container"));
        assert!(!dir.is_ignored(4, "no-container"));
    }
}
