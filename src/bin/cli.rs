//! Fixture Crawler CLI
//!
//! Local execution entry point. Each run subcommand goes through the same
//! route dispatch an external trigger would use.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fixture_crawler::{
    error::Result,
    models::Config,
    pipeline::Orchestrator,
    trigger::{self, Route},
};

/// Fixture Crawler - football fixture and match mirror
#[derive(Parser, Debug)]
#[command(
    name = "fixture-crawler",
    version,
    about = "Mirrors fixture listings, match details, and images to disk"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the mirror root from the configuration
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the listing of every fixture in the configured range
    Resumes,

    /// Fetch the league classification table
    Classifications,

    /// Scrape match details and images from stored listings
    Details,

    /// Run full pipeline: Resumes → Details
    Pipeline,

    /// Validate the configuration file
    Validate,
}

impl Command {
    fn route(&self) -> Option<Route> {
        match self {
            Command::Resumes => Some(Route::Resumes),
            Command::Classifications => Some(Route::Classifications),
            Command::Details => Some(Route::DetailsMatches),
            Command::Pipeline => Some(Route::Pipeline),
            Command::Validate => None,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(root) = cli.root {
        config.paths.root = root;
    }
    log::info!("Mirror root: {}", config.paths.root.display());

    let Some(route) = cli.command.route() else {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(ExitCode::SUCCESS);
    };

    config.validate()?;
    let orchestrator = Orchestrator::from_config(config)?;
    let response = trigger::handle(&route, &orchestrator).await;

    if response.is_success() {
        log::info!("{}", response.message);
        Ok(ExitCode::SUCCESS)
    } else {
        log::error!("[{}] {}", response.status, response.message);
        Ok(ExitCode::FAILURE)
    }
}
