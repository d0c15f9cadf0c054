//! Check Catalog
//!
//! The static, ordered registry of every check the validator knows about.
//! Check identifiers are the stable vocabulary shared with configuration
//! files and downstream tooling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use Severity::{Fail, Warn};

/// Identifier of a single validation check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckId {
    NoFrontMatter,
    NoTrailingNewline,
    UnknownAttribute,
    NoTitle,
    LongTitle,
    ShortTitle,
    NoDescription,
    LongDescription,
    NoFullStopDescription,
    ShortDescription,
    InvalidDescription,
    NoLinkTitle,
    LongLinkTitle,
    NoWeight,
    NoOwner,
    InvalidOwner,
    NoLastReviewDate,
    ReviewTooLongAgo,
    InvalidLastReviewDate,
    NoUserQuestions,
    LongUserQuestion,
    NoQuestionMark,
    RunbookLayoutNotSet,
    InvalidRunbookVariables,
    RunbookVariableWithoutName,
    InvalidRunbookVariableName,
    InvalidRunbookVariable,
    InvalidRunbookDashboards,
    InvalidRunbookDashboard,
    InvalidRunbookDashboardLink,
    InvalidRunbookKnownIssues,
    InvalidRunbookKnownIssue,
    InvalidRunbookKnownIssueUrl,
    RunbookAppearsInMenu,
}

impl CheckId {
    /// Every check identifier, in catalog order
    pub const ALL: [CheckId; 34] = [
        CheckId::NoFrontMatter,
        CheckId::NoTrailingNewline,
        CheckId::UnknownAttribute,
        CheckId::NoTitle,
        CheckId::LongTitle,
        CheckId::ShortTitle,
        CheckId::NoDescription,
        CheckId::LongDescription,
        CheckId::NoFullStopDescription,
        CheckId::ShortDescription,
        CheckId::InvalidDescription,
        CheckId::NoLinkTitle,
        CheckId::LongLinkTitle,
        CheckId::NoWeight,
        CheckId::NoOwner,
        CheckId::InvalidOwner,
        CheckId::NoLastReviewDate,
        CheckId::ReviewTooLongAgo,
        CheckId::InvalidLastReviewDate,
        CheckId::NoUserQuestions,
        CheckId::LongUserQuestion,
        CheckId::NoQuestionMark,
        CheckId::RunbookLayoutNotSet,
        CheckId::InvalidRunbookVariables,
        CheckId::RunbookVariableWithoutName,
        CheckId::InvalidRunbookVariableName,
        CheckId::InvalidRunbookVariable,
        CheckId::InvalidRunbookDashboards,
        CheckId::InvalidRunbookDashboard,
        CheckId::InvalidRunbookDashboardLink,
        CheckId::InvalidRunbookKnownIssues,
        CheckId::InvalidRunbookKnownIssue,
        CheckId::InvalidRunbookKnownIssueUrl,
        CheckId::RunbookAppearsInMenu,
    ];

    /// The stable string form used in configuration and output
    pub fn as_str(self) -> &'static str {
        match self {
            CheckId::NoFrontMatter => "NO_FRONT_MATTER",
            CheckId::NoTrailingNewline => "NO_TRAILING_NEWLINE",
            CheckId::UnknownAttribute => "UNKNOWN_ATTRIBUTE",
            CheckId::NoTitle => "NO_TITLE",
            CheckId::LongTitle => "LONG_TITLE",
            CheckId::ShortTitle => "SHORT_TITLE",
            CheckId::NoDescription => "NO_DESCRIPTION",
            CheckId::LongDescription => "LONG_DESCRIPTION",
            CheckId::NoFullStopDescription => "NO_FULL_STOP_DESCRIPTION",
            CheckId::ShortDescription => "SHORT_DESCRIPTION",
            CheckId::InvalidDescription => "INVALID_DESCRIPTION",
            CheckId::NoLinkTitle => "NO_LINK_TITLE",
            CheckId::LongLinkTitle => "LONG_LINK_TITLE",
            CheckId::NoWeight => "NO_WEIGHT",
            CheckId::NoOwner => "NO_OWNER",
            CheckId::InvalidOwner => "INVALID_OWNER",
            CheckId::NoLastReviewDate => "NO_LAST_REVIEW_DATE",
            CheckId::ReviewTooLongAgo => "REVIEW_TOO_LONG_AGO",
            CheckId::InvalidLastReviewDate => "INVALID_LAST_REVIEW_DATE",
            CheckId::NoUserQuestions => "NO_USER_QUESTIONS",
            CheckId::LongUserQuestion => "LONG_USER_QUESTION",
            CheckId::NoQuestionMark => "NO_QUESTION_MARK",
            CheckId::RunbookLayoutNotSet => "RUNBOOK_LAYOUT_NOT_SET",
            CheckId::InvalidRunbookVariables => "INVALID_RUNBOOK_VARIABLES",
            CheckId::RunbookVariableWithoutName => "RUNBOOK_VARIABLE_WITHOUT_NAME",
            CheckId::InvalidRunbookVariableName => "INVALID_RUNBOOK_VARIABLE_NAME",
            CheckId::InvalidRunbookVariable => "INVALID_RUNBOOK_VARIABLE",
            CheckId::InvalidRunbookDashboards => "INVALID_RUNBOOK_DASHBOARDS",
            CheckId::InvalidRunbookDashboard => "INVALID_RUNBOOK_DASHBOARD",
            CheckId::InvalidRunbookDashboardLink => "INVALID_RUNBOOK_DASHBOARD_LINK",
            CheckId::InvalidRunbookKnownIssues => "INVALID_RUNBOOK_KNOWN_ISSUES",
            CheckId::InvalidRunbookKnownIssue => "INVALID_RUNBOOK_KNOWN_ISSUE",
            CheckId::InvalidRunbookKnownIssueUrl => "INVALID_RUNBOOK_KNOWN_ISSUE_URL",
            CheckId::RunbookAppearsInMenu => "RUNBOOK_APPEARS_IN_MENU",
        }
    }

    /// Catalog entry for this check
    pub fn check(self) -> &'static Check {
        // CATALOG is declared in the same order as CheckId
        &CATALOG[self as usize]
    }

    pub fn severity(self) -> Severity {
        self.check().severity
    }

    /// Whether findings of this check are reported by the `last-reviewed` mode
    pub fn is_review_check(self) -> bool {
        matches!(
            self,
            CheckId::NoLastReviewDate | CheckId::ReviewTooLongAgo | CheckId::InvalidLastReviewDate
        )
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a catalog identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown check identifier: {0}")]
pub struct UnknownCheckId(pub String);

impl FromStr for CheckId {
    type Err = UnknownCheckId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownCheckId(s.to_string()))
    }
}

impl Serialize for CheckId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CheckId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Fail,
    Warn,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Fail => "FAIL",
            Severity::Warn => "WARN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub id: CheckId,
    pub description: &'static str,
    pub severity: Severity,
    /// Findings of this check carry the offending value
    pub has_value: bool,
}

const fn check(
    id: CheckId,
    description: &'static str,
    severity: Severity,
    has_value: bool,
) -> Check {
    Check {
        id,
        description,
        severity,
        has_value,
    }
}

static CATALOG: [Check; 34] = [
    // Prerequisites
    check(
        CheckId::NoFrontMatter,
        "No front matter found in the beginning of the page",
        Fail,
        false,
    ),
    check(
        CheckId::NoTrailingNewline,
        "There must be a newline character at the end of the page to ensure proper parsing",
        Fail,
        false,
    ),
    check(
        CheckId::UnknownAttribute,
        "There is an unknown front matter attribute in this page",
        Fail,
        true,
    ),
    // Standard attributes
    check(CheckId::NoTitle, "The page should have a title", Fail, false),
    check(
        CheckId::LongTitle,
        "The title should be less than 100 characters",
        Fail,
        true,
    ),
    check(
        CheckId::ShortTitle,
        "The title should be longer than 5 characters",
        Fail,
        true,
    ),
    check(
        CheckId::NoDescription,
        "Each page should have a description",
        Fail,
        false,
    ),
    check(
        CheckId::LongDescription,
        "The description should be less than 300 characters",
        Fail,
        true,
    ),
    check(
        CheckId::NoFullStopDescription,
        "The description should end with a full stop",
        Fail,
        true,
    ),
    check(
        CheckId::ShortDescription,
        "The description should be longer than 50 characters",
        Fail,
        true,
    ),
    check(
        CheckId::InvalidDescription,
        "Description must be a simple string without any markup or line breaks",
        Fail,
        false,
    ),
    check(
        CheckId::NoLinkTitle,
        "The page should have a linkTitle, which appears in menus and list pages. If not given, title will be used and should be no longer than 40 characters.",
        Warn,
        false,
    ),
    check(
        CheckId::LongLinkTitle,
        "The linkTitle (used in menu and list pages; title is used if linkTitle is not given) should be less than 40 characters",
        Fail,
        false,
    ),
    check(
        CheckId::NoWeight,
        "The page should have a weight attribute, to control the sort order",
        Warn,
        false,
    ),
    // Custom attributes
    check(CheckId::NoOwner, "The page should have an owner assigned", Fail, false),
    check(
        CheckId::InvalidOwner,
        "The owner field values must start with a Github teams URL",
        Fail,
        true,
    ),
    check(
        CheckId::NoLastReviewDate,
        "The page should have a last_review_date",
        Warn,
        false,
    ),
    check(
        CheckId::ReviewTooLongAgo,
        "The last review date is too long ago",
        Warn,
        true,
    ),
    check(
        CheckId::InvalidLastReviewDate,
        "The last_review_date should be in format YYYY-MM-DD and not in the future",
        Fail,
        true,
    ),
    check(
        CheckId::NoUserQuestions,
        "The page should have user_questions assigned",
        Fail,
        false,
    ),
    check(
        CheckId::LongUserQuestion,
        "Each user question should be no longer than 100 characters",
        Fail,
        true,
    ),
    check(
        CheckId::NoQuestionMark,
        "Questions should end with a question mark",
        Fail,
        true,
    ),
    // Runbook checks
    check(
        CheckId::RunbookLayoutNotSet,
        "Runbook pages must have layout: runbook",
        Fail,
        false,
    ),
    check(
        CheckId::InvalidRunbookVariables,
        "Runbook variables must be an array and not empty",
        Fail,
        false,
    ),
    check(
        CheckId::RunbookVariableWithoutName,
        "Each runbook variable must have a name specified",
        Fail,
        true,
    ),
    check(
        CheckId::InvalidRunbookVariableName,
        "Variable names must use only uppercase letters and underscores, and be unique",
        Fail,
        true,
    ),
    check(
        CheckId::InvalidRunbookVariable,
        "Each variable must be a valid object with name field and optional description and default fields",
        Fail,
        true,
    ),
    check(
        CheckId::InvalidRunbookDashboards,
        "Runbook dashboards must be an array and not empty",
        Fail,
        false,
    ),
    check(
        CheckId::InvalidRunbookDashboard,
        "Each runbook dashboard must have name and link specified and non-empty",
        Fail,
        true,
    ),
    check(
        CheckId::InvalidRunbookDashboardLink,
        "Dashboard link must be a valid URL with properly defined variables",
        Fail,
        true,
    ),
    check(
        CheckId::InvalidRunbookKnownIssues,
        "Runbook known issues must be an array and not empty",
        Fail,
        false,
    ),
    check(
        CheckId::InvalidRunbookKnownIssue,
        "Each known issue must have url defined and may have optional description field",
        Fail,
        true,
    ),
    check(
        CheckId::InvalidRunbookKnownIssueUrl,
        "Known issue URL must be a valid URL",
        Fail,
        true,
    ),
    check(
        CheckId::RunbookAppearsInMenu,
        "Runbook pages must have toc_hide: true to prevent appearing in menus",
        Fail,
        false,
    ),
];

/// All checks in logical order
pub fn catalog() -> &'static [Check] {
    &CATALOG
}

/// Look up a check by its string identifier
pub fn lookup(id: &str) -> Option<&'static Check> {
    id.parse::<CheckId>().ok().map(CheckId::check)
}

/// Front matter keys that are not reported as `UNKNOWN_ATTRIBUTE`
pub const RECOGNIZED_KEYS: &[&str] = &[
    "aliases",
    "changes_categories",
    "changes_entry",
    "classification",
    "crd",
    "date",
    "description",
    "expiration_in_days",
    "last_review_date",
    "layout",
    "linkTitle",
    "menu",
    "mermaid",
    "owner",
    "runbook",
    "search",
    "source_repository",
    "source_repository_ref",
    "technical_name",
    "title",
    "toc_hide",
    "user_questions",
    "weight",
];

pub fn is_recognized_key(key: &str) -> bool {
    RECOGNIZED_KEYS.contains(&key)
}
