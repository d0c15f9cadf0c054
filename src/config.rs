//! Rule configuration
//!
//! A default rule set plus ordered directory overrides decide which checks
//! are reported for a given document path.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::checks::CheckId;
use crate::error::{ConfigError, ConfigResult as Result};

/// Configuration file used when none is given
pub const DEFAULT_CONFIG_PATH: &str = "./frontmatter-validator.yaml";

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "FRONTMATTER_VALIDATOR_CONFIG";

/// Default prefix every `owner` entry must start with
pub const DEFAULT_OWNER_URL_PREFIX: &str = "https://github.com/orgs/giantswarm/teams/";

/// Default base URL for documentation links in issue output
pub const DEFAULT_DOCS_HOST: &str = "https://github.com/giantswarm/docs/blob/main/";

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Rule configuration as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub default_rules: RuleSet,
    pub directory_overrides: Vec<DirectoryOverride>,
    /// Prefix required on every `owner` entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_url_prefix: Option<String>,
    /// Base URL used to link documents in issue output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_host: Option<String>,
}

/// Which checks are enabled or disabled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSet {
    pub enabled_checks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_checks: Vec<String>,
}

/// Rule changes for documents under a path pattern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DirectoryOverride {
    /// Pattern like `src/content/vintage/**`
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_checks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_checks: Vec<String>,
}

impl Config {
    /// Built-in rules: every catalog check enabled, no overrides
    pub fn builtin() -> Self {
        Self {
            default_rules: RuleSet {
                enabled_checks: CheckId::ALL.iter().map(|id| id.as_str().to_string()).collect(),
                disabled_checks: Vec::new(),
            },
            ..Self::default()
        }
    }

    pub fn owner_url_prefix(&self) -> &str {
        self.owner_url_prefix
            .as_deref()
            .unwrap_or(DEFAULT_OWNER_URL_PREFIX)
    }

    pub fn docs_host(&self) -> &str {
        self.docs_host.as_deref().unwrap_or(DEFAULT_DOCS_HOST)
    }

    /// Identifiers referenced anywhere in the rules that are not catalog checks
    pub fn unknown_check_ids(&self) -> BTreeSet<&str> {
        let rule_lists = [
            &self.default_rules.enabled_checks,
            &self.default_rules.disabled_checks,
        ]
        .into_iter()
        .chain(
            self.directory_overrides
                .iter()
                .flat_map(|o| [&o.enabled_checks, &o.disabled_checks]),
        );

        rule_lists
            .flatten()
            .map(String::as_str)
            .filter(|id| id.parse::<CheckId>().is_err())
            .collect()
    }
}

/// Where the active rules came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No configuration file was found
    BuiltIn,
    File(PathBuf),
}

/// Checks that are reported for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveChecks(BTreeSet<String>);

impl ActiveChecks {
    pub fn contains(&self, id: CheckId) -> bool {
        self.0.contains(id.as_str())
    }

    /// Identifiers in sorted order; may include ones unknown to the catalog
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<CheckId> for ActiveChecks {
    fn from_iter<I: IntoIterator<Item = CheckId>>(iter: I) -> Self {
        Self(iter.into_iter().map(|id| id.as_str().to_string()).collect())
    }
}

/// Resolves the active checks of a document path; read-only once built
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    source: ConfigSource,
    config: Config,
}

impl ConfigResolver {
    pub fn new(source: ConfigSource, config: Config) -> Self {
        Self { source, config }
    }

    /// Resolver over the built-in rules
    pub fn builtin() -> Self {
        Self::new(ConfigSource::BuiltIn, Config::builtin())
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compute the active checks for `path`.
    ///
    /// Default enabled minus default disabled, then every matching override
    /// in declaration order: its enabled checks are added, then its disabled
    /// checks removed. The last override to mention a check wins.
    pub fn resolve_active_checks(&self, path: &str) -> ActiveChecks {
        let rules = &self.config.default_rules;
        let mut active: BTreeSet<String> = rules.enabled_checks.iter().cloned().collect();
        for id in &rules.disabled_checks {
            active.remove(id);
        }

        for dir_override in &self.config.directory_overrides {
            if !path_matches(path, &dir_override.path) {
                continue;
            }
            active.extend(dir_override.enabled_checks.iter().cloned());
            for id in &dir_override.disabled_checks {
                active.remove(id);
            }
        }

        ActiveChecks(active)
    }

    pub fn is_active(&self, path: &str, id: CheckId) -> bool {
        self.resolve_active_checks(path).contains(id)
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Match a document path against an override pattern.
///
/// Supported forms: exact path, `prefix/**` (the prefix and anything below
/// it) and `prefix/*` (direct children of the prefix only).
pub fn path_matches(path: &str, pattern: &str) -> bool {
    let path = path.strip_prefix("./").unwrap_or(path);
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

    if let Some(prefix) = pattern.strip_suffix("/**") {
        return path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'));
    }

    if let Some(prefix) = pattern.strip_suffix("/*") {
        return path
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|child| !child.contains('/'));
    }

    path == pattern
}

/// Configuration manager for locating and loading rule files
pub struct ConfigManager;

impl ConfigManager {
    /// Pick the configuration path: explicit argument, then environment, then default
    pub fn config_path(explicit: Option<&Path>, env: &impl EnvProvider) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| env.get(CONFIG_ENV_VAR).filter(|p| !p.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load the resolver for `path`, falling back to built-in rules when the file is absent
    pub async fn load(path: &Path) -> Result<ConfigResolver> {
        match tokio::fs::metadata(path).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "No configuration file found, using built-in rules"
                );
                return Ok(ConfigResolver::builtin());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        let config = Self::load_from_file(path).await?;
        Self::validate_config(&config)?;

        for id in config.unknown_check_ids() {
            warn!(check = id, "Configuration references an unknown check; it has no effect");
        }
        debug!(
            path = %path.display(),
            overrides = config.directory_overrides.len(),
            "Loaded rule configuration"
        );

        Ok(ConfigResolver::new(
            ConfigSource::File(path.to_path_buf()),
            config,
        ))
    }

    /// Load configuration from a file (YAML, TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse(&content, path.extension().and_then(|ext| ext.to_str()))
    }

    /// Parse configuration text; the extension selects the format
    pub fn parse(content: &str, extension: Option<&str>) -> Result<Config> {
        let config = match extension {
            Some("yaml") | Some("yml") | None => parse_yaml(content)?,
            Some("toml") => toml::from_str(content)?,
            Some("json") => serde_json::from_str(content)?,
            Some(ext) => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        for (index, dir_override) in config.directory_overrides.iter().enumerate() {
            if dir_override.path.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "directory_overrides[{}]: path must not be empty",
                    index
                )));
            }
        }

        if config.owner_url_prefix.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Validation(
                "owner_url_prefix must not be empty".to_string(),
            ));
        }

        if config.docs_host.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Validation(
                "docs_host must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// An empty YAML document is an empty configuration
fn parse_yaml(content: &str) -> Result<Config> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    if value.is_null() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_value(value)?)
}
