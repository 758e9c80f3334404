//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trakt TV - Upcoming, recommended and listed media as sensors
#[derive(Parser, Debug)]
#[command(name = "trakt-tv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one refresh cycle and render every sensor
    Refresh {
        /// Write the sensor document to this file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Refresh on the configured interval, rewriting the sensor document
    Watch {
        /// Path of the sensor document
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration with secrets redacted
    Show,

    /// Validate the configuration
    Validate,
}
