//! Path exclusions given on the command line
//!
//! Each rule reads `PATH[:CHECK,CHECK...]`. A rule without checks silences
//! every check for documents at or below `PATH`.

use crate::checks::CheckId;

/// A single exclusion rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludePattern {
    pub path: String,
    /// Empty means every check
    pub checks: Vec<String>,
}

impl ExcludePattern {
    /// Parse one rule; blank input or a blank path yields `None`
    pub fn parse(rule: &str) -> Option<Self> {
        let (path, checks) = match rule.split_once(':') {
            Some((path, checks)) => (path, Some(checks)),
            None => (rule, None),
        };

        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        let checks = checks
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            path: path.to_string(),
            checks,
        })
    }

    fn covers(&self, id: CheckId) -> bool {
        self.checks.is_empty() || self.checks.iter().any(|c| c == id.as_str())
    }
}

/// Ordered set of exclusion rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeRules {
    patterns: Vec<ExcludePattern>,
}

impl ExcludeRules {
    pub fn new<S: AsRef<str>>(rules: &[S]) -> Self {
        Self {
            patterns: rules
                .iter()
                .filter_map(|rule| ExcludePattern::parse(rule.as_ref()))
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[ExcludePattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether findings of `id` are suppressed for `path`
    pub fn should_exclude(&self, path: &str, id: CheckId) -> bool {
        self.patterns
            .iter()
            .any(|pattern| prefix_matches(path, &pattern.path) && pattern.covers(id))
    }
}

fn normalize(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path).trim_matches('/')
}

/// Exact or parent-directory match after normalising both sides
pub fn prefix_matches(path: &str, pattern: &str) -> bool {
    let path = normalize(path);
    let pattern = normalize(pattern);

    path == pattern
        || path
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with('/'))
}
