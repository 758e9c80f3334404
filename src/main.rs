//! Trakt TV CLI
//!
//! Refreshes Trakt data on demand or on an interval and writes sensor documents.

use clap::Parser;
use trakt_tv::cli::{
    args::{Cli, Commands, ConfigAction},
    commands::{config, refresh, watch},
};
use trakt_tv::models::config::{load_config, Configuration};
use trakt_tv::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let configuration = load_config(cli.config.as_deref())?;

    // Run the appropriate command
    match cli.command {
        Commands::Refresh { output } => {
            if !cli.skip_preflight {
                run_preflight_checks(&configuration).await?;
            }
            refresh::refresh(&configuration, output.as_deref()).await?;
        }

        Commands::Watch { output } => {
            if !cli.skip_preflight {
                run_preflight_checks(&configuration).await?;
            }
            watch::watch(configuration, cli.config.clone(), &output).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => config::show(&configuration)?,
            ConfigAction::Validate => config::validate(&configuration)?,
        },
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("trakt_tv=debug")
    } else {
        EnvFilter::new("trakt_tv=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(configuration: &Configuration) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(configuration).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
