//! dirsync - one-way directory mirror
//!
//! Copies every entry of a source tree that is missing or stale at the
//! destination and, on request, removes what the source no longer has.

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser};
use dirsync_config::{Config, ConfigError, ConfigLoader, LoggingConfig};
use dirsync_sync::{SyncEngine, SyncOptions, SyncRequest, TracingLogger};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

mod display;
mod json_output;

use json_output::SyncResultJson;

/// dirsync - one-way directory mirror
#[derive(Parser, Debug)]
#[command(
    name = "dirsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "One-way directory mirror",
    long_about = "dirsync copies every file and directory of SOURCE that is missing or\n\
                  out of date in DESTINATION. With --delete-missing it also removes\n\
                  destination entries that no longer exist in SOURCE."
)]
struct Cli {
    /// Source directory
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Destination directory
    #[arg(value_name = "DESTINATION")]
    destination: Option<PathBuf>,

    /// Source directory (takes precedence over the positional argument)
    #[arg(long = "src", value_name = "SOURCE")]
    src: Option<PathBuf>,

    /// Destination directory (takes precedence over the positional argument)
    #[arg(long = "dst", value_name = "DESTINATION")]
    dst: Option<PathBuf>,

    /// Delete destination entries that are not present in the source
    #[arg(long)]
    delete_missing: bool,

    /// Show what would be done without touching the destination
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - errors only, no summary
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn source(&self) -> Option<&PathBuf> {
        self.src.as_ref().or(self.source.as_ref())
    }

    fn destination(&self) -> Option<&PathBuf> {
        self.dst.as_ref().or(self.destination.as_ref())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            display::display_error(&format!("{:#}", error));
            if matches!(
                error.downcast_ref::<ConfigError>(),
                Some(ConfigError::MissingRequired { .. })
            ) {
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    init_logging(cli, &config.logging)?;
    config.validate()?;

    info!("dirsync v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("Effective configuration: {:?}", config);

    let source = config.sync.source()?;
    let destination = config.sync.destination()?;
    let options = SyncOptions {
        delete_missing: config.sync.delete_missing,
        dry_run: config.sync.dry_run,
    };

    if !cli.quiet && !cli.json {
        display::display_header(source, destination, options);
    }

    let engine = SyncEngine::new(TracingLogger::new());
    let request = SyncRequest::new(source, destination).with_options(options);
    let report = engine.sync(&request)?;

    if cli.json {
        let output = SyncResultJson::new(&report);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !cli.quiet {
        display::display_report(&report);
    }

    Ok(())
}

/// Merge defaults, config file, environment and command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let flag = |set: bool| set.then_some(true);
    let path = |path: Option<&PathBuf>| path.map(|p| p.to_string_lossy().into_owned());

    let config = ConfigLoader::builder(cli.config.as_deref())?
        .set_override_option("sync.source", path(cli.source()))
        .set_override_option("sync.destination", path(cli.destination()))
        .set_override_option("sync.delete_missing", flag(cli.delete_missing))
        .set_override_option("sync.dry_run", flag(cli.dry_run))
        .build_unvalidated()?;
    Ok(config)
}

fn init_logging(cli: &Cli, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if logging.json_format {
        builder.json().try_init().map_err(|e| anyhow!(e))
    } else {
        builder
            .with_ansi(logging.colored_output)
            .try_init()
            .map_err(|e| anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_take_precedence_over_positionals() {
        let cli = Cli::parse_from(["dirsync", "--src", "a", "--dst", "b", "c", "d"]);
        assert_eq!(cli.source(), Some(&PathBuf::from("a")));
        assert_eq!(cli.destination(), Some(&PathBuf::from("b")));

        let cli = Cli::parse_from(["dirsync", "--delete-missing", "c", "d"]);
        assert!(cli.delete_missing);
        assert_eq!(cli.source(), Some(&PathBuf::from("c")));
        assert_eq!(cli.destination(), Some(&PathBuf::from("d")));
    }

    #[test]
    fn test_missing_paths_are_not_a_parse_error() {
        let cli = Cli::parse_from(["dirsync"]);
        assert!(cli.source().is_none());
        assert!(!cli.delete_missing);
    }
}
