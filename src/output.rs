//! Output and Reporting
//!
//! Renders validation results for people (console), issue trackers (JSON)
//! and CI annotations. Only documents with findings are rendered.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::checks::Severity;
use crate::error::{Result, ValidationError};
use crate::validator::{CheckResult, ValidationResult};

/// Default location of the CI annotation file
pub const DEFAULT_ANNOTATIONS_FILE: &str = "annotations.json";

/// Report format written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable list of findings
    #[default]
    Stdout,
    /// Issue records for review date findings
    Json,
}

/// Issue record for a page that needs a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub title: String,
    pub message: String,
    pub owner: Vec<String>,
}

/// CI annotation covering one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub file: String,
    pub line: usize,
    pub end_line: usize,
    pub title: String,
    pub message: String,
    pub annotation_level: String,
}

static TEAM_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_team_regex() -> &'static Regex {
    TEAM_REGEX.get_or_init(|| {
        Regex::new(r"/.*/([^/]+)/?$").expect("Failed to compile team URL regex")
    })
}

/// Team label of an owner URL: last path segment with `-` read as `/`
pub fn team_label(owner_url: &str) -> Option<String> {
    get_team_regex()
        .captures(owner_url)
        .map(|captures| captures[1].replace('-', "/"))
}

fn documents_with_findings(
    results: &BTreeMap<PathBuf, ValidationResult>,
) -> impl Iterator<Item = (&PathBuf, &ValidationResult)> {
    results.iter().filter(|(_, result)| result.has_findings())
}

/// Rendered value of a finding, if its check reports one
fn reported_value(finding: &CheckResult) -> Option<String> {
    finding
        .value
        .as_ref()
        .filter(|value| finding.check.check().has_value && !value.is_empty())
        .map(ToString::to_string)
}

/// Output formatter for validation results
pub struct Output {
    show_colors: bool,
    docs_host: String,
}

impl Output {
    pub fn new(docs_host: impl Into<String>) -> Self {
        Self {
            show_colors: atty::is(atty::Stream::Stdout),
            docs_host: docs_host.into(),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn colorize_severity(&self, severity: Severity) -> String {
        let color = match severity {
            Severity::Fail => "1;31",
            Severity::Warn => "1;33",
        };
        self.colorize(severity.as_str(), color)
    }

    /// Console report: failures before warnings per document, then totals
    pub fn format_stdout(&self, results: &BTreeMap<PathBuf, ValidationResult>) -> String {
        let mut output = String::new();
        let mut total_fails = 0;
        let mut total_warnings = 0;

        for (path, result) in documents_with_findings(results) {
            output.push_str(&format!("\n{}\n", path.display()));

            for severity in [Severity::Fail, Severity::Warn] {
                for finding in result.checks.iter().filter(|c| c.severity() == severity) {
                    output.push_str(&self.format_finding(finding));
                    output.push('\n');
                }
            }

            total_fails += result.count(Severity::Fail);
            total_warnings += result.count(Severity::Warn);
        }

        output.push('\n');
        if total_fails > 0 {
            output.push_str(&format!(
                "Found {} critical problems, marked with {}.\n",
                total_fails,
                self.colorize_severity(Severity::Fail)
            ));
        }
        if total_warnings > 0 {
            output.push_str(&format!(
                "Found {} less severe problems, marked with {}.\n",
                total_warnings,
                self.colorize_severity(Severity::Warn)
            ));
        }

        output
    }

    fn format_finding(&self, finding: &CheckResult) -> String {
        let check = finding.check.check();
        let mut line = format!(
            " - {} - {} - {}",
            self.colorize_severity(check.severity),
            self.colorize(check.id.as_str(), "37"),
            check.description
        );

        if let Some(value) = reported_value(finding) {
            line.push_str(&format!(": {}", self.colorize(&value, "36")));
        }

        line
    }

    /// Issue records, one per finding that carries a page title
    pub fn build_issues(&self, results: &BTreeMap<PathBuf, ValidationResult>) -> Vec<Issue> {
        let mut issues = Vec::new();

        for (path, result) in documents_with_findings(results) {
            let document = path.to_string_lossy();
            let document = document.strip_prefix("./").unwrap_or(&document[..]);

            for finding in &result.checks {
                let Some(title) = finding.title.as_deref().filter(|t| !t.is_empty()) else {
                    continue;
                };

                issues.push(Issue {
                    title: format!("Doc entry \"{}\" needs to be reviewed", title),
                    message: format!(
                        "{} for [this document]({}{}).",
                        finding.check.check().description,
                        self.docs_host,
                        document
                    ),
                    owner: finding
                        .owner
                        .iter()
                        .filter_map(|owner| team_label(owner.as_str()))
                        .collect(),
                });
            }
        }

        issues
    }

    pub fn format_json(&self, results: &BTreeMap<PathBuf, ValidationResult>) -> Result<String> {
        serde_json::to_string(&self.build_issues(results)).map_err(|e| ValidationError::Output {
            details: format!("Failed to serialize issues: {}", e),
        })
    }

    /// One annotation per document with findings
    pub fn build_annotations(
        &self,
        results: &BTreeMap<PathBuf, ValidationResult>,
    ) -> Vec<Annotation> {
        documents_with_findings(results)
            .map(|(path, result)| {
                let fails = result.count(Severity::Fail);
                let warnings = result.count(Severity::Warn);

                let end_line = result
                    .checks
                    .iter()
                    .map(|finding| {
                        let line = finding.line.unwrap_or(0);
                        let end = finding
                            .end_line
                            .unwrap_or(result.num_front_matter_lines + 1);
                        line.max(end)
                    })
                    .fold(1, usize::max);

                let mut message = String::new();
                for finding in &result.checks {
                    let check = finding.check.check();
                    message.push_str(&format!("{} - {}\n", check.severity, check.description));
                    if let Some(value) = reported_value(finding) {
                        message.push_str(&format!(": {}\n", value));
                    }
                    message.push('\n');
                }

                let title = match (fails, warnings) {
                    (0, warnings) => format!("Found {} less severe problems", warnings),
                    (fails, 0) => format!("Found {} severe problems", fails),
                    (fails, warnings) => format!(
                        "Found {} severe and {} less severe problems",
                        fails, warnings
                    ),
                };

                Annotation {
                    file: path.to_string_lossy().into_owned(),
                    line: 1,
                    end_line,
                    title,
                    message,
                    annotation_level: if fails > 0 { "failure" } else { "warning" }.to_string(),
                }
            })
            .collect()
    }

    /// Write the annotation file as indented JSON
    pub async fn write_annotations(
        &self,
        path: &Path,
        results: &BTreeMap<PathBuf, ValidationResult>,
    ) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.build_annotations(results)).map_err(|e| {
            ValidationError::Output {
                details: format!("Failed to serialize annotations: {}", e),
            }
        })?;

        tokio::fs::write(path, json + "\n").await?;
        Ok(())
    }
}
