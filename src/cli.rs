use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigManager, EnvProvider};
use crate::output::{DEFAULT_ANNOTATIONS_FILE, OutputFormat};
use crate::validator::ValidationMode;

/// Verbosity levels for diagnostics on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet,
    /// Show warnings
    #[default]
    Normal,
    /// Show progress information
    Verbose,
    /// Show debugging information
    Debug,
    /// Show everything
    Trace,
}

impl VerbosityLevel {
    /// Default tracing filter for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "frontmatter_validator=error",
            VerbosityLevel::Normal => "frontmatter_validator=warn",
            VerbosityLevel::Verbose => "frontmatter_validator=info",
            VerbosityLevel::Debug => "frontmatter_validator=debug",
            VerbosityLevel::Trace => "frontmatter_validator=trace",
        }
    }
}

/// Front matter validator for Markdown documentation
#[derive(Parser, Debug, Clone)]
#[command(name = "frontmatter-validator")]
#[command(about = "Validate front matter in Markdown files against a configurable rule set")]
#[command(
    long_about = "Validate front matter in Markdown files against a configurable rule set.\n\n\
The target path is scanned recursively for Markdown files. When paths are piped on stdin, \
only those files are checked. In GitHub Actions an annotations file is written as well."
)]
#[command(version)]
pub struct Cli {
    /// Target path to scan for Markdown files
    #[arg(short = 'p', long = "path", default_value = ".")]
    pub path: PathBuf,

    /// Path to the rule configuration file
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file [default: ./frontmatter-validator.yaml]"
    )]
    pub config: Option<PathBuf>,

    /// Which validation to run
    #[arg(long = "validation", value_enum, default_value_t = ValidationMode::All)]
    pub validation: ValidationMode,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Stdout)]
    pub output: OutputFormat,

    /// Skip checks for a path: PATH or PATH:CHECK,CHECK
    #[arg(short = 'x', long = "exclude", action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Include file patterns (glob syntax)
    #[arg(long = "include", action = clap::ArgAction::Append)]
    pub include_patterns: Vec<String>,

    /// Exclude file patterns (glob syntax)
    #[arg(long = "exclude-glob", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Where to write CI annotations
    #[arg(long = "annotations-file", default_value = DEFAULT_ANNOTATIONS_FILE)]
    pub annotations_file: PathBuf,

    /// Number of documents validated concurrently
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,

    /// Increase diagnostic output (repeatable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors on stderr
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Exit with status 1 when a FAIL finding is reported
    #[arg(long = "strict")]
    pub strict: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(threads) = self.threads
            && threads == 0
        {
            return Err("Number of threads must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn get_thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            return VerbosityLevel::Quiet;
        }
        match self.verbose {
            0 => VerbosityLevel::Normal,
            1 => VerbosityLevel::Verbose,
            2 => VerbosityLevel::Debug,
            _ => VerbosityLevel::Trace,
        }
    }

    /// Configuration file: `--config`, then the environment, then the default
    pub fn config_path(&self, env: &impl EnvProvider) -> PathBuf {
        ConfigManager::config_path(self.config.as_deref(), env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
    use clap::Parser;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvProvider for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["frontmatter-validator"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.validation, ValidationMode::All);
        assert_eq!(cli.output, OutputFormat::Stdout);
        assert_eq!(cli.annotations_file, PathBuf::from("annotations.json"));
        assert!(cli.exclude.is_empty());
        assert!(!cli.strict);
        assert_eq!(cli.verbosity(), VerbosityLevel::Normal);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_full_arguments() {
        let cli = Cli::try_parse_from([
            "frontmatter-validator",
            "--path",
            "src/content",
            "--config",
            "rules.toml",
            "--validation",
            "last-reviewed",
            "--output",
            "json",
            "--exclude",
            "src/content/vintage",
            "-x",
            "src/content/changes:NO_OWNER",
            "--include",
            "**/*.md",
            "--exclude-glob",
            "**/drafts/**",
            "--threads",
            "3",
            "-vv",
            "--strict",
        ])
        .unwrap();

        assert_eq!(cli.path, PathBuf::from("src/content"));
        assert_eq!(cli.config, Some(PathBuf::from("rules.toml")));
        assert_eq!(cli.validation, ValidationMode::LastReviewed);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.exclude.len(), 2);
        assert_eq!(cli.include_patterns, vec!["**/*.md"]);
        assert_eq!(cli.exclude_patterns, vec!["**/drafts/**"]);
        assert_eq!(cli.get_thread_count(), 3);
        assert_eq!(cli.verbosity(), VerbosityLevel::Debug);
        assert!(cli.strict);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Cli::try_parse_from(["frontmatter-validator", "--validation", "some"]).is_err());
        assert!(Cli::try_parse_from(["frontmatter-validator", "--output", "xml"]).is_err());
        assert!(Cli::try_parse_from(["frontmatter-validator", "-q", "-v"]).is_err());

        let cli = Cli::try_parse_from(["frontmatter-validator", "--threads", "0"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let level = |args: &[&str]| {
            let mut argv = vec!["frontmatter-validator"];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv).unwrap().verbosity()
        };
        assert_eq!(level(&["-q"]), VerbosityLevel::Quiet);
        assert_eq!(level(&["-v"]), VerbosityLevel::Verbose);
        assert_eq!(level(&["-vvvv"]), VerbosityLevel::Trace);
        assert_eq!(
            VerbosityLevel::Quiet.filter_directive(),
            "frontmatter_validator=error"
        );
    }

    #[test]
    fn test_config_path_sources() {
        let cli = Cli::try_parse_from(["frontmatter-validator"]).unwrap();
        let empty = MapEnv(HashMap::new());
        assert_eq!(cli.config_path(&empty), PathBuf::from(DEFAULT_CONFIG_PATH));

        let env = MapEnv(HashMap::from([(CONFIG_ENV_VAR, "/etc/fm.yaml")]));
        assert_eq!(cli.config_path(&env), PathBuf::from("/etc/fm.yaml"));

        let cli = Cli::try_parse_from(["frontmatter-validator", "-c", "local.yaml"]).unwrap();
        assert_eq!(cli.config_path(&env), PathBuf::from("local.yaml"));
    }
}
