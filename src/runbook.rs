//! Runbook checks
//!
//! Runbook pages describe operational variables, dashboards and known
//! issues. Dashboard links may reference variables as `$NAME`.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::checks::CheckId;
use crate::metadata::{Entry, FrontMatter, Runbook, Section};
use crate::validator::Findings;

/// Stand-in for declared variables when checking the URL scheme
const VARIABLE_PLACEHOLDER: &str = "test";

static VARIABLE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static VARIABLE_REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_variable_name_regex() -> &'static Regex {
    VARIABLE_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Z_]+$").expect("Failed to compile variable name regex")
    })
}

fn get_variable_reference_regex() -> &'static Regex {
    VARIABLE_REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"\$([A-Z_]+)").expect("Failed to compile variable reference regex")
    })
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub(crate) fn validate(fm: &FrontMatter, findings: &mut Findings<'_>) {
    if !fm.is_runbook_layout() {
        if fm.runbook.is_some() {
            findings.flag(CheckId::RunbookLayoutNotSet);
        }
        return;
    }

    if !fm.toc_hide {
        findings.flag(CheckId::RunbookAppearsInMenu);
    }

    let Some(runbook) = &fm.runbook else {
        return;
    };

    check_variables(runbook, findings);
    check_dashboards(runbook, findings);
    check_known_issues(runbook, findings);
}

/// Non-empty variable names declared by well-formed entries
fn declared_variables(runbook: &Runbook) -> HashSet<&str> {
    runbook
        .variables
        .valid()
        .filter_map(|variable| variable.name.as_deref())
        .filter(|name| !name.is_empty())
        .collect()
}

fn check_variables(runbook: &Runbook, findings: &mut Findings<'_>) {
    if runbook.variables == Section::NotAList {
        findings.flag(CheckId::InvalidRunbookVariables);
        return;
    }

    let mut seen = HashSet::new();
    for (index, entry) in runbook.variables.entries().iter().enumerate() {
        let variable = match entry {
            Entry::Valid(variable) => variable,
            Entry::Malformed(reason) => {
                findings.flag_value(
                    CheckId::InvalidRunbookVariable,
                    format!("Variable at index {}: {}", index, reason),
                );
                continue;
            }
        };

        let Some(name) = variable.name.as_deref().filter(|name| !name.is_empty()) else {
            findings.flag_value(
                CheckId::RunbookVariableWithoutName,
                format!("Variable at index {}", index),
            );
            continue;
        };

        if !get_variable_name_regex().is_match(name) {
            findings.flag_value(CheckId::InvalidRunbookVariableName, name);
        }
        if !seen.insert(name) {
            findings.flag_value(
                CheckId::InvalidRunbookVariableName,
                format!("Duplicate variable name: {}", name),
            );
        }
    }
}

fn check_dashboards(runbook: &Runbook, findings: &mut Findings<'_>) {
    if runbook.dashboards == Section::NotAList {
        findings.flag(CheckId::InvalidRunbookDashboards);
        return;
    }

    let variables = declared_variables(runbook);
    for (index, entry) in runbook.dashboards.entries().iter().enumerate() {
        let dashboard = match entry {
            Entry::Valid(dashboard) => dashboard,
            Entry::Malformed(reason) => {
                findings.flag_value(
                    CheckId::InvalidRunbookDashboard,
                    format!("Dashboard at index {}: {}", index, reason),
                );
                continue;
            }
        };

        let name = dashboard.name.as_deref().unwrap_or_default();
        let link = dashboard.link.as_deref().unwrap_or_default();
        if name.is_empty() || link.is_empty() {
            findings.flag_value(
                CheckId::InvalidRunbookDashboard,
                format!("Dashboard at index {} missing name or link", index),
            );
            continue;
        }

        check_dashboard_link(link, &variables, findings);
    }
}

fn check_dashboard_link(link: &str, variables: &HashSet<&str>, findings: &mut Findings<'_>) {
    let references = get_variable_reference_regex();

    for captures in references.captures_iter(link) {
        let name = &captures[1];
        if !variables.contains(name) {
            findings.flag_value(
                CheckId::InvalidRunbookDashboardLink,
                format!("Undefined variable ${} in link: {}", name, link),
            );
        }
    }

    let substituted = references.replace_all(link, |captures: &Captures<'_>| {
        if variables.contains(&captures[1]) {
            VARIABLE_PLACEHOLDER.to_string()
        } else {
            captures[0].to_string()
        }
    });
    if !is_http_url(&substituted) {
        findings.flag_value(
            CheckId::InvalidRunbookDashboardLink,
            format!("Invalid URL format: {}", link),
        );
    }
}

fn check_known_issues(runbook: &Runbook, findings: &mut Findings<'_>) {
    if runbook.known_issues == Section::NotAList {
        findings.flag(CheckId::InvalidRunbookKnownIssues);
        return;
    }

    for (index, entry) in runbook.known_issues.entries().iter().enumerate() {
        let issue = match entry {
            Entry::Valid(issue) => issue,
            Entry::Malformed(reason) => {
                findings.flag_value(
                    CheckId::InvalidRunbookKnownIssue,
                    format!("Known issue at index {}: {}", index, reason),
                );
                continue;
            }
        };

        match issue.url.as_deref() {
            None | Some("") => findings.flag_value(
                CheckId::InvalidRunbookKnownIssue,
                format!("Known issue at index {} missing URL", index),
            ),
            Some(url) if !is_http_url(url) => {
                findings.flag_value(CheckId::InvalidRunbookKnownIssueUrl, url)
            }
            Some(_) => {}
        }
    }
}
