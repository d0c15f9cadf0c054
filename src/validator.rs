//! Front matter validation engine
//!
//! [`ValidationEngine::validate_at`] is a pure function of the document path,
//! its text, the reference instant and the loaded rules. Batch validation
//! builds on it:
//! - **Async I/O**: documents are read with `tokio::fs`
//! - **Concurrent orchestration**: one `tokio::spawn` task per document
//! - **Bounded concurrency**: a Semaphore caps the number of documents in flight

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::checks::{CheckId, Severity};
use crate::config::{ActiveChecks, ConfigResolver};
use crate::error::{Result, ValidationError};
use crate::exclude::ExcludeRules;
use crate::file_discovery::relative_path;
use crate::frontmatter::{self, Extraction};
use crate::metadata::{self, FrontMatter};
use crate::runbook;

pub const MIN_TITLE_LENGTH: usize = 5;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MIN_DESCRIPTION_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 300;
pub const MAX_LINK_TITLE_LENGTH: usize = 40;
pub const MAX_USER_QUESTION_LENGTH: usize = 100;

/// Which findings a run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Every active check
    #[default]
    All,
    /// Review date checks only
    LastReviewed,
}

impl ValidationMode {
    pub fn reports(self, id: CheckId) -> bool {
        match self {
            ValidationMode::All => true,
            ValidationMode::LastReviewed => {
                id.is_review_check()
                    || matches!(id, CheckId::NoTrailingNewline | CheckId::NoFrontMatter)
            }
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Number of documents validated concurrently in a batch
    pub max_concurrent_validations: usize,
    pub mode: ValidationMode,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_validations: num_cpus::get(),
            mode: ValidationMode::All,
        }
    }
}

/// Offending value attached to a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FindingValue {
    Text(String),
    List(Vec<String>),
}

impl FindingValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FindingValue::Text(text) => text.is_empty(),
            FindingValue::List(items) => items.is_empty(),
        }
    }
}

impl fmt::Display for FindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingValue::Text(text) => f.write_str(text),
            FindingValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<String> for FindingValue {
    fn from(text: String) -> Self {
        FindingValue::Text(text)
    }
}

impl From<&str> for FindingValue {
    fn from(text: &str) -> Self {
        FindingValue::Text(text.to_string())
    }
}

impl From<Vec<String>> for FindingValue {
    fn from(items: Vec<String>) -> Self {
        FindingValue::List(items)
    }
}

/// One reported violation of a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub check: CheckId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FindingValue>,
    /// One-based line hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    /// Page title, carried by review date findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Page owners, carried by review date findings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owner: Vec<String>,
}

impl CheckResult {
    pub fn new(check: CheckId) -> Self {
        Self {
            check,
            value: None,
            line: None,
            end_line: None,
            title: None,
            owner: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<FindingValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    fn for_page(mut self, fm: &FrontMatter) -> Self {
        self.title = Some(fm.title.clone());
        self.owner = fm.owner.clone();
        self
    }

    pub fn severity(&self) -> Severity {
        self.check.severity()
    }
}

/// Findings for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub num_front_matter_lines: usize,
    pub checks: Vec<CheckResult>,
}

impl ValidationResult {
    pub fn has_findings(&self) -> bool {
        !self.checks.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.count(Severity::Fail) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.checks
            .iter()
            .filter(|c| c.severity() == severity)
            .count()
    }

    /// Identifiers of the reported checks, in report order
    pub fn check_ids(&self) -> Vec<CheckId> {
        self.checks.iter().map(|c| c.check).collect()
    }
}

/// Collects findings, dropping those that are not reported for the document
pub(crate) struct Findings<'a> {
    path: &'a str,
    active: ActiveChecks,
    excludes: &'a ExcludeRules,
    mode: ValidationMode,
    checks: Vec<CheckResult>,
}

impl<'a> Findings<'a> {
    fn new(path: &'a str, engine: &'a ValidationEngine) -> Self {
        Self {
            path,
            active: engine.resolver.resolve_active_checks(path),
            excludes: &engine.excludes,
            mode: engine.config.mode,
            checks: Vec::new(),
        }
    }

    fn is_reported(&self, id: CheckId) -> bool {
        self.active.contains(id)
            && self.mode.reports(id)
            && !self.excludes.should_exclude(self.path, id)
    }

    pub(crate) fn push(&mut self, result: CheckResult) {
        if self.is_reported(result.check) {
            self.checks.push(result);
        }
    }

    pub(crate) fn flag(&mut self, id: CheckId) {
        self.push(CheckResult::new(id));
    }

    pub(crate) fn flag_value(&mut self, id: CheckId, value: impl Into<FindingValue>) {
        self.push(CheckResult::new(id).with_value(value));
    }

    fn finish(self, num_front_matter_lines: usize) -> ValidationResult {
        ValidationResult {
            num_front_matter_lines,
            checks: self.checks,
        }
    }
}

/// Front matter validation engine
///
/// Holds only read-only state, so one instance can be shared across tasks
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    resolver: ConfigResolver,
    excludes: ExcludeRules,
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(resolver: ConfigResolver, excludes: ExcludeRules, config: ValidationConfig) -> Self {
        Self {
            resolver,
            excludes,
            config,
        }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a document against the current time
    pub fn validate(&self, path: &str, content: &str) -> ValidationResult {
        self.validate_at(path, content, Utc::now())
    }

    /// Validate a document; `now` is the reference instant for review dates
    pub fn validate_at(&self, path: &str, content: &str, now: DateTime<Utc>) -> ValidationResult {
        let mut findings = Findings::new(path, self);

        if !frontmatter::has_trailing_newline(content) {
            findings.push(
                CheckResult::new(CheckId::NoTrailingNewline)
                    .at_line(frontmatter::last_line_number(content)),
            );
            return findings.finish(0);
        }

        let (front_matter, num_lines) = match frontmatter::extract(content) {
            Extraction::Block(block) => match metadata::parse(block.text) {
                Ok(front_matter) => (front_matter, block.num_lines),
                Err(e) => {
                    debug!(path, error = %e, "Front matter could not be decoded");
                    findings.push(CheckResult::new(CheckId::NoFrontMatter).at_line(1));
                    return findings.finish(0);
                }
            },
            Extraction::Missing | Extraction::Unterminated => {
                findings.push(CheckResult::new(CheckId::NoFrontMatter).at_line(1));
                return findings.finish(0);
            }
        };

        self.check_unknown_attributes(&front_matter, &mut findings);
        check_title(&front_matter, &mut findings);
        check_description(&front_matter, &mut findings);
        check_link_title(&front_matter, &mut findings);
        self.check_owner(&front_matter, &mut findings);
        check_user_questions(path, &front_matter, &mut findings);
        check_last_review_date(&front_matter, now, &mut findings);
        runbook::validate(&front_matter, &mut findings);

        let result = findings.finish(num_lines);
        debug!(path, findings = result.checks.len(), "Validated document");
        result
    }

    fn check_unknown_attributes(&self, fm: &FrontMatter, findings: &mut Findings<'_>) {
        for key in fm.unknown_keys() {
            findings.flag_value(CheckId::UnknownAttribute, key);
        }
    }

    fn check_owner(&self, fm: &FrontMatter, findings: &mut Findings<'_>) {
        if fm.owner.is_empty() {
            findings.flag(CheckId::NoOwner);
            return;
        }

        let prefix = self.resolver.config().owner_url_prefix();
        if fm.owner.iter().any(|owner| !owner.starts_with(prefix)) {
            findings.flag_value(CheckId::InvalidOwner, fm.owner.clone());
        }
    }

    /// Validate documents concurrently.
    ///
    /// Files that are missing, not regular files, or unreadable are skipped.
    /// Results are keyed by path, without a leading `./`, so iteration
    /// order is stable.
    pub async fn validate_files(
        self: &Arc<Self>,
        files: Vec<PathBuf>,
    ) -> Result<BTreeMap<PathBuf, ValidationResult>> {
        if files.is_empty() {
            return Ok(BTreeMap::new());
        }

        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            self.config.max_concurrent_validations.max(1),
        ));

        let validation_tasks: Vec<_> = files
            .into_iter()
            .map(relative_path)
            .map(|file_path| {
                let engine = Arc::clone(self);
                let semaphore = Arc::clone(&semaphore);

                tokio::spawn(async move {
                    let _permit =
                        semaphore
                            .acquire()
                            .await
                            .map_err(|_| ValidationError::Concurrency {
                                details: "Failed to acquire validation semaphore".to_string(),
                            })?;

                    let result = engine.validate_single_file(&file_path).await;
                    Ok::<_, ValidationError>(result.map(|r| (file_path, r)))
                })
            })
            .collect();

        let task_results =
            try_join_all(validation_tasks)
                .await
                .map_err(|e| ValidationError::Concurrency {
                    details: format!("Task join error: {}", e),
                })?;

        let mut results = BTreeMap::new();
        for result in task_results {
            if let Some((path, validation)) = result? {
                results.insert(path, validation);
            }
        }

        Ok(results)
    }

    /// Read and validate one document; `None` when it cannot be read
    pub async fn validate_single_file(&self, file_path: &Path) -> Option<ValidationResult> {
        match tokio::fs::metadata(file_path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                debug!(path = %file_path.display(), "Skipping, not a regular file");
                return None;
            }
            Err(e) => {
                debug!(path = %file_path.display(), error = %e, "Skipping missing file");
                return None;
            }
        }

        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => Some(self.validate(&file_path.to_string_lossy(), &content)),
            Err(e) => {
                warn!(path = %file_path.display(), error = %e, "Could not read file");
                None
            }
        }
    }
}

fn check_title(fm: &FrontMatter, findings: &mut Findings<'_>) {
    if fm.title.is_empty() {
        findings.flag(CheckId::NoTitle);
        return;
    }

    let length = fm.title.chars().count();
    if length < MIN_TITLE_LENGTH {
        findings.flag_value(CheckId::ShortTitle, fm.title.as_str());
    }
    if length > MAX_TITLE_LENGTH {
        findings.flag_value(CheckId::LongTitle, fm.title.as_str());
    }
}

fn check_description(fm: &FrontMatter, findings: &mut Findings<'_>) {
    let description = fm.description.as_str();
    if description.is_empty() {
        findings.flag(CheckId::NoDescription);
        return;
    }

    // A line break rules out the remaining description checks
    if description.trim().contains('\n') {
        findings.flag_value(CheckId::InvalidDescription, description);
        return;
    }

    let length = description.chars().count();
    if length < MIN_DESCRIPTION_LENGTH {
        findings.flag_value(CheckId::ShortDescription, description);
    }
    if length > MAX_DESCRIPTION_LENGTH {
        findings.flag_value(CheckId::LongDescription, description);
    }
    if !description.ends_with('.') {
        findings.flag_value(CheckId::NoFullStopDescription, description);
    }
}

fn check_link_title(fm: &FrontMatter, findings: &mut Findings<'_>) {
    let link_title = if fm.link_title.is_empty() {
        &fm.title
    } else {
        &fm.link_title
    };
    if link_title.chars().count() > MAX_LINK_TITLE_LENGTH {
        findings.flag_value(CheckId::LongLinkTitle, link_title.as_str());
    }

    if fm.has_menu() {
        if fm.link_title.is_empty() && fm.title.is_empty() {
            findings.flag(CheckId::NoLinkTitle);
        }
        if fm.weight.is_none() {
            findings.flag(CheckId::NoWeight);
        }
    }
}

fn check_user_questions(path: &str, fm: &FrontMatter, findings: &mut Findings<'_>) {
    if fm.user_questions.is_empty() {
        // Section index pages never need questions
        if !path.ends_with("_index.md") {
            findings.flag(CheckId::NoUserQuestions);
        }
        return;
    }

    for question in &fm.user_questions {
        if question.chars().count() > MAX_USER_QUESTION_LENGTH {
            findings.flag_value(CheckId::LongUserQuestion, question.as_str());
        }
        if !question.ends_with('?') {
            findings.flag_value(CheckId::NoQuestionMark, question.as_str());
        }
    }
}

fn check_last_review_date(fm: &FrontMatter, now: DateTime<Utc>, findings: &mut Findings<'_>) {
    let Some(date) = fm.last_review_date else {
        findings.flag(CheckId::NoLastReviewDate);
        return;
    };

    if date.as_datetime() > now {
        findings.push(
            CheckResult::new(CheckId::InvalidLastReviewDate)
                .with_value(date.to_string())
                .for_page(fm),
        );
        return;
    }

    // An expiration too large to represent never expires
    let Some(expiration) = TimeDelta::try_days(fm.expiration_days()) else {
        return;
    };
    if now - date.as_datetime() > expiration {
        findings.push(
            CheckResult::new(CheckId::ReviewTooLongAgo)
                .with_value(date.to_string())
                .for_page(fm),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigSource, DirectoryOverride, RuleSet};
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    const VALID_PAGE: &str = "---
title: A perfectly fine page
description: This description is long enough to pass every single length check.
owner:
  - https://github.com/orgs/giantswarm/teams/team-honeybadger
last_review_date: 2024-05-01
user_questions:
  - What does this page explain?
---
# Body
";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn engine() -> ValidationEngine {
        ValidationEngine::new(
            ConfigResolver::builtin(),
            ExcludeRules::default(),
            ValidationConfig::default(),
        )
    }

    fn ids(path: &str, content: &str) -> Vec<CheckId> {
        engine().validate_at(path, content, now()).check_ids()
    }

    fn page(front_matter: &str) -> String {
        format!("---\n{}---\nBody\n", front_matter)
    }

    #[test]
    fn test_valid_page_has_no_findings() {
        let result = engine().validate_at("docs/page.md", VALID_PAGE, now());
        assert!(!result.has_findings(), "{:?}", result.checks);
        assert_eq!(result.num_front_matter_lines, 8);
    }

    #[test]
    fn test_missing_trailing_newline_short_circuits() {
        let result = engine().validate_at("a.md", "no front matter\nat all", now());
        assert_eq!(result.check_ids(), vec![CheckId::NoTrailingNewline]);
        assert_eq!(result.checks[0].line, Some(2));
        assert_eq!(result.num_front_matter_lines, 0);
    }

    #[test]
    fn test_no_front_matter_variants() {
        assert_eq!(ids("a.md", "# Title\n"), vec![CheckId::NoFrontMatter]);
        assert_eq!(ids("a.md", "---\ntitle: x\n"), vec![CheckId::NoFrontMatter]);
        assert_eq!(
            ids("a.md", "---\ntitle: [broken\n---\n"),
            vec![CheckId::NoFrontMatter]
        );
        assert_eq!(
            ids("a.md", "---\nlast_review_date: someday\n---\n"),
            vec![CheckId::NoFrontMatter]
        );
    }

    #[test]
    fn test_unknown_attributes() {
        let content = VALID_PAGE.replacen("title:", "author: me\ntitle:", 1);
        let result = engine().validate_at("a.md", &content, now());
        assert_eq!(result.check_ids(), vec![CheckId::UnknownAttribute]);
        assert_eq!(result.checks[0].value, Some(FindingValue::from("author")));
    }

    #[test]
    fn test_unusual_keys_do_not_hide_front_matter() {
        let content = format!("---\n2024: release\n{}", &VALID_PAGE[4..]);
        let result = engine().validate_at("a.md", &content, now());
        assert_eq!(result.check_ids(), vec![CheckId::UnknownAttribute]);
        assert_eq!(result.checks[0].value, Some(FindingValue::from("2024")));

        let content = VALID_PAGE.replacen("title:", "crd: !custom x\ntitle:", 1);
        assert!(ids("a.md", &content).is_empty());
    }

    #[test]
    fn test_title_length_boundaries() {
        let with_title =
            |title: &str| ids("a.md", &VALID_PAGE.replace("A perfectly fine page", title));
        assert_eq!(with_title("abcd"), vec![CheckId::ShortTitle]);
        assert!(with_title("abcde").is_empty());
        assert_eq!(with_title(""), vec![CheckId::NoTitle]);
        assert!(with_title(&"t".repeat(40)).is_empty());
        assert_eq!(with_title(&"t".repeat(41)), vec![CheckId::LongLinkTitle]);
        assert_eq!(
            with_title(&"t".repeat(101)),
            vec![CheckId::LongTitle, CheckId::LongLinkTitle]
        );
    }

    #[test]
    fn test_title_length_counts_characters() {
        let content = VALID_PAGE.replace("A perfectly fine page", "Über");
        assert_eq!(ids("a.md", &content), vec![CheckId::ShortTitle]);
    }

    #[test]
    fn test_description_checks() {
        let result = ids("a.md", &page("title: Hello world\ndescription: Too short\n"));
        assert!(result.contains(&CheckId::ShortDescription));
        assert!(result.contains(&CheckId::NoFullStopDescription));
        assert!(!result.contains(&CheckId::LongDescription));

        let long = format!("description: {}.\n", "d".repeat(300));
        let result = ids("a.md", &page(&long));
        assert!(result.contains(&CheckId::LongDescription));
        assert!(!result.contains(&CheckId::NoFullStopDescription));

        let result = ids("a.md", &page("title: Hello\n"));
        assert!(result.contains(&CheckId::NoDescription));
    }

    #[test]
    fn test_line_break_in_description_stops_description_checks() {
        let result = ids("a.md", &page("description: \"one\\ntwo\"\n"));
        assert!(result.contains(&CheckId::InvalidDescription));
        assert!(!result.contains(&CheckId::ShortDescription));
        assert!(!result.contains(&CheckId::NoFullStopDescription));
        // Other fields are still checked
        assert!(result.contains(&CheckId::NoTitle));
    }

    #[test]
    fn test_folded_description_trailing_newline_is_not_a_line_break() {
        let content = page(
            "description: >\n  A folded description that is definitely long enough to pass.\n",
        );
        let result = ids("a.md", &content);
        assert!(!result.contains(&CheckId::InvalidDescription));
    }

    #[test]
    fn test_menu_requires_link_title_and_weight() {
        let result = ids("a.md", &page("menu:\n  main: {}\n"));
        assert!(result.contains(&CheckId::NoLinkTitle));
        assert!(result.contains(&CheckId::NoWeight));

        let result = ids("a.md", &page("title: Hello\nweight: 3\nmenu:\n  main: {}\n"));
        assert!(!result.contains(&CheckId::NoLinkTitle));
        assert!(!result.contains(&CheckId::NoWeight));
    }

    #[test]
    fn test_invalid_owner_carries_whole_list() {
        let content = VALID_PAGE.replace(
            "  - https://github.com/orgs/giantswarm/teams/team-honeybadger\n",
            "  - https://github.com/orgs/giantswarm/teams/team-a\n  - someone\n  - another\n",
        );
        let result = engine().validate_at("a.md", &content, now());
        assert_eq!(result.check_ids(), vec![CheckId::InvalidOwner]);
        assert_eq!(
            result.checks[0].value,
            Some(FindingValue::List(vec![
                "https://github.com/orgs/giantswarm/teams/team-a".to_string(),
                "someone".to_string(),
                "another".to_string(),
            ]))
        );
    }

    #[test]
    fn test_owner_prefix_from_config() {
        let config = Config {
            owner_url_prefix: Some("https://github.com/orgs/example/teams/".to_string()),
            ..Config::builtin()
        };
        let engine = ValidationEngine::new(
            ConfigResolver::new(ConfigSource::File(PathBuf::from("c.yaml")), config),
            ExcludeRules::default(),
            ValidationConfig::default(),
        );
        let result = engine.validate_at("a.md", VALID_PAGE, now());
        assert_eq!(result.check_ids(), vec![CheckId::InvalidOwner]);
    }

    #[test]
    fn test_user_questions() {
        let content = VALID_PAGE.replace(
            "  - What does this page explain?\n",
            &format!("  - No question mark\n  - {}?\n", "q".repeat(100)),
        );
        assert_eq!(
            ids("a.md", &content),
            vec![CheckId::NoQuestionMark, CheckId::LongUserQuestion]
        );
    }

    #[test]
    fn test_missing_user_questions_ignored_for_index_pages() {
        let content = page("title: Section index\n");
        assert!(ids("docs/a.md", &content).contains(&CheckId::NoUserQuestions));
        assert!(!ids("docs/_index.md", &content).contains(&CheckId::NoUserQuestions));
    }

    #[test]
    fn test_future_review_date() {
        let content = VALID_PAGE.replace("2024-05-01", "2024-06-02");
        let result = engine().validate_at("a.md", &content, now());
        assert_eq!(result.check_ids(), vec![CheckId::InvalidLastReviewDate]);

        let finding = &result.checks[0];
        assert_eq!(finding.value, Some(FindingValue::from("2024-06-02")));
        assert_eq!(finding.title.as_deref(), Some("A perfectly fine page"));
        assert_eq!(finding.owner.len(), 1);
    }

    #[test]
    fn test_future_date_never_stale() {
        let content = VALID_PAGE.replace(
            "last_review_date: 2024-05-01",
            "last_review_date: 2024-06-02\nexpiration_in_days: -10",
        );
        assert_eq!(ids("a.md", &content), vec![CheckId::InvalidLastReviewDate]);
    }

    #[test]
    fn test_stale_review_date() {
        let content = VALID_PAGE.replace("2024-05-01", "2023-04-28");
        let result = engine().validate_at("a.md", &content, now());
        assert_eq!(result.check_ids(), vec![CheckId::ReviewTooLongAgo]);
        assert_eq!(result.checks[0].title.as_deref(), Some("A perfectly fine page"));

        let content = VALID_PAGE.replace(
            "last_review_date: 2024-05-01",
            "last_review_date: 2023-04-28\nexpiration_in_days: 500",
        );
        assert!(ids("a.md", &content).is_empty());
    }

    #[test]
    fn test_missing_review_date() {
        let content = VALID_PAGE.replace("last_review_date: 2024-05-01\n", "");
        assert_eq!(ids("a.md", &content), vec![CheckId::NoLastReviewDate]);
    }

    #[test]
    fn test_configuration_gates_findings() {
        let config = Config {
            default_rules: RuleSet {
                enabled_checks: vec!["NO_TITLE".to_string(), "NO_DESCRIPTION".to_string()],
                disabled_checks: vec![],
            },
            directory_overrides: vec![DirectoryOverride {
                path: "docs/legacy/**".to_string(),
                enabled_checks: vec![],
                disabled_checks: vec!["NO_DESCRIPTION".to_string()],
            }],
            ..Config::default()
        };
        let engine = ValidationEngine::new(
            ConfigResolver::new(ConfigSource::File(PathBuf::from("c.yaml")), config),
            ExcludeRules::default(),
            ValidationConfig::default(),
        );

        let content = page("weight: 1\n");
        let result = engine.validate_at("docs/legacy/x.md", &content, now());
        assert_eq!(result.check_ids(), vec![CheckId::NoTitle]);

        let result = engine.validate_at("docs/x.md", &content, now());
        assert_eq!(
            result.check_ids(),
            vec![CheckId::NoTitle, CheckId::NoDescription]
        );
    }

    #[test]
    fn test_excludes_suppress_findings() {
        let engine = ValidationEngine::new(
            ConfigResolver::builtin(),
            ExcludeRules::new(&["docs/vintage", "docs/partial:NO_TITLE"]),
            ValidationConfig::default(),
        );
        assert!(
            !engine
                .validate_at("docs/vintage/x.md", "no newline", now())
                .has_findings()
        );

        let result = engine.validate_at("docs/partial/x.md", &page("weight: 1\n"), now());
        assert!(!result.check_ids().contains(&CheckId::NoTitle));
        assert!(result.check_ids().contains(&CheckId::NoDescription));
    }

    #[test]
    fn test_last_reviewed_mode() {
        let engine = ValidationEngine::new(
            ConfigResolver::builtin(),
            ExcludeRules::default(),
            ValidationConfig {
                mode: ValidationMode::LastReviewed,
                ..ValidationConfig::default()
            },
        );

        let result = engine.validate_at("a.md", &page("weight: 1\n"), now());
        assert_eq!(result.check_ids(), vec![CheckId::NoLastReviewDate]);

        let result = engine.validate_at("a.md", "# no front matter\n", now());
        assert_eq!(result.check_ids(), vec![CheckId::NoFrontMatter]);
    }

    #[test]
    fn test_result_counts() {
        let result = engine().validate_at("a.md", &page("menu:\n  main: {}\n"), now());
        assert!(result.has_failures());
        assert_eq!(
            result.count(Severity::Warn),
            3 // NO_LINK_TITLE, NO_WEIGHT, NO_LAST_REVIEW_DATE
        );
        assert_eq!(
            result.count(Severity::Fail) + result.count(Severity::Warn),
            result.checks.len()
        );
    }

    #[test]
    fn test_finding_value_display_and_json() {
        let list = FindingValue::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.to_string(), "[a, b]");
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a","b"]"#);

        let finding = CheckResult::new(CheckId::NoTitle);
        assert_eq!(
            serde_json::to_string(&finding).unwrap(),
            r#"{"check":"NO_TITLE"}"#
        );
    }

    #[tokio::test]
    async fn test_validate_files_concurrently() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.md");
        let bad = temp_dir.path().join("bad.md");
        fs::write(&good, VALID_PAGE).unwrap();
        fs::write(&bad, "no newline").unwrap();
        let missing = temp_dir.path().join("missing.md");

        let engine = Arc::new(ValidationEngine::new(
            ConfigResolver::builtin(),
            ExcludeRules::default(),
            ValidationConfig {
                max_concurrent_validations: 2,
                ..ValidationConfig::default()
            },
        ));

        let results = engine
            .validate_files(vec![good.clone(), bad.clone(), missing, temp_dir.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[&bad].check_ids(),
            vec![CheckId::NoTrailingNewline]
        );
        assert!(results.contains_key(&good));
    }

    #[tokio::test]
    async fn test_validate_no_files() {
        let engine = Arc::new(engine());
        assert!(engine.validate_files(vec![]).await.unwrap().is_empty());
    }
}
