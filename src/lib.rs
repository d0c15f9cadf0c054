//! # frontmatter-validator Library
//!
//! Validates the YAML front matter of Markdown documents against a
//! configurable rule set and reports findings with FAIL/WARN severities.

pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod exclude;
pub mod file_discovery;
pub mod frontmatter;
pub mod metadata;
pub mod output;
mod runbook;
pub mod validator;

pub use checks::{Check, CheckId, Severity, catalog, lookup};
pub use cli::{Cli, VerbosityLevel};
pub use config::{
    ActiveChecks, Config, ConfigManager, ConfigResolver, ConfigSource, DirectoryOverride,
    RuleSet, path_matches,
};
pub use error::{ConfigError, ValidationError};
pub use exclude::ExcludeRules;
pub use file_discovery::FileDiscovery;
pub use metadata::{FlexibleDate, FrontMatter};
pub use output::{Annotation, Issue, Output, OutputFormat};
pub use validator::{
    CheckResult, FindingValue, ValidationConfig, ValidationEngine, ValidationMode,
    ValidationResult,
};
