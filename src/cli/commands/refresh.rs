//! Refresh command implementation.
//!
//! Runs a single refresh cycle, renders every configured sensor and
//! optionally writes the sensor document.

use super::print_sensor_summary;
use crate::core::refresh::TraktApi;
use crate::generators::render_snapshot;
use crate::models::config::Configuration;
use crate::utils::fs::write_json;
use crate::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Execute the refresh command.
pub async fn refresh(config: &Configuration, output: Option<&Path>) -> Result<()> {
    config.validate()?;
    let api = TraktApi::from_config(config)?;

    println!("{}", "🔄 Refreshing Trakt data...".bold().cyan());
    println!();

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Fetching calendars, lists and stats...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let snapshot = api.retrieve_data(config).await;
    pb.finish_and_clear();
    let snapshot = snapshot?;

    let document = render_snapshot(&snapshot, config);
    print_sensor_summary(&document);
    println!();

    if let Some(output) = output {
        write_json(&document, output)?;
        println!(
            "{} {}",
            "✅ Sensors saved to:".bold().green(),
            output.display()
        );
    }

    Ok(())
}
