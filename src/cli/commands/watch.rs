//! Watch command implementation.
//!
//! Refreshes on the configured interval. The configuration is re-read before
//! every cycle; a failed cycle keeps the last good sensor document in place.

use crate::core::refresh::TraktApi;
use crate::generators::{render_snapshot, SensorDocument};
use crate::models::config::{load_config, Configuration};
use crate::utils::fs::write_json;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the watch command until interrupted.
pub async fn watch(
    mut config: Configuration,
    config_path: Option<PathBuf>,
    output: &Path,
) -> Result<()> {
    config.validate()?;
    // Cached responses are reused across cycles.
    let api = TraktApi::from_config(&config)?;

    println!(
        "{} every {} minute(s), writing {}",
        "👀 Watching Trakt".bold().cyan(),
        config.update_interval().as_secs() / 60,
        output.display()
    );
    println!();

    let mut last_good: Option<SensorDocument> = None;

    loop {
        config = reload_config(config_path.as_deref(), config);

        match api.retrieve_data(&config).await {
            Ok(snapshot) => {
                let document = render_snapshot(&snapshot, &config);
                match write_json(&document, output) {
                    Ok(()) => tracing::info!("Wrote {} sensors to {:?}", document.len(), output),
                    Err(e) => tracing::error!("Failed to write sensors: {}", e),
                }
                last_good = Some(document);
            }
            Err(e) => {
                let kept = last_good.as_ref().map_or(0, SensorDocument::len);
                tracing::error!("Refresh failed: {}. Keeping {} previous sensors", e, kept);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.update_interval()) => {}
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Stopped.".bold());
                return Ok(());
            }
        }
    }
}

/// Re-read the configuration, keeping the previous one if the new file is unusable.
fn reload_config(path: Option<&Path>, previous: Configuration) -> Configuration {
    match load_config(path).and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Keeping previous configuration: {}", e);
            previous
        }
    }
}
