use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{debug, info, warn};

use frontmatter_validator::cli::{Cli, VerbosityLevel};
use frontmatter_validator::config::{
    ConfigManager, ConfigSource, EnvProvider, SystemEnvProvider,
};
use frontmatter_validator::exclude::ExcludeRules;
use frontmatter_validator::file_discovery::{self, FileDiscovery};
use frontmatter_validator::output::{Output, OutputFormat};
use frontmatter_validator::validator::{ValidationConfig, ValidationEngine};

/// Set when running inside GitHub Actions
const GITHUB_ACTIONS_ENV_VAR: &str = "GITHUB_ACTIONS";

/// Disables colored output when set
const NO_COLOR_ENV_VAR: &str = "NO_COLOR";

fn init_tracing(verbosity: VerbosityLevel) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbosity());

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    cli.validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid arguments")?;

    let env = SystemEnvProvider;
    let config_path = cli.config_path(&env);
    let resolver = ConfigManager::load(&config_path)
        .await
        .context("Failed to load configuration")?;
    match resolver.source() {
        ConfigSource::BuiltIn => info!("Using built-in rules"),
        ConfigSource::File(path) => info!(path = %path.display(), "Using rules from file"),
    }

    let docs_host = resolver.config().docs_host().to_string();
    let engine = Arc::new(ValidationEngine::new(
        resolver,
        ExcludeRules::new(&cli.exclude),
        ValidationConfig {
            max_concurrent_validations: cli.get_thread_count(),
            mode: cli.validation,
        },
    ));

    let files = collect_files(&cli).await?;
    info!(count = files.len(), "Validating documents");

    let results = engine
        .validate_files(files)
        .await
        .context("Validation failed")?;

    let mut output = Output::new(docs_host);
    if env.get(NO_COLOR_ENV_VAR).is_some() {
        output = output.with_colors(false);
    }

    match cli.output {
        OutputFormat::Stdout => print!("{}", output.format_stdout(&results)),
        OutputFormat::Json => println!("{}", output.format_json(&results)?),
    }

    if env.get(GITHUB_ACTIONS_ENV_VAR).is_some_and(|v| !v.is_empty()) {
        match output.write_annotations(&cli.annotations_file, &results).await {
            Ok(()) => debug!(path = %cli.annotations_file.display(), "Wrote annotations"),
            Err(e) => warn!(error = %e, "Could not create annotations file"),
        }
    }

    let failed = results.values().any(|result| result.has_failures());
    Ok(if cli.strict && failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Paths piped on stdin take precedence over walking the target path
async fn collect_files(cli: &Cli) -> Result<Vec<PathBuf>> {
    if !atty::is(atty::Stream::Stdin) {
        let paths = file_discovery::read_path_list(BufReader::new(tokio::io::stdin()))
            .await
            .context("Failed to read file list from stdin")?;
        if !paths.is_empty() {
            return Ok(paths);
        }
        debug!("No Markdown paths on stdin, scanning target path");
    }

    let discovery = FileDiscovery::new()
        .with_include_patterns(cli.include_patterns.clone())?
        .with_exclude_patterns(cli.exclude_patterns.clone())?;

    discovery
        .discover_files(&cli.path)
        .await
        .with_context(|| format!("Failed to scan {}", cli.path.display()))
}
