//! Config command implementation.

use crate::models::config::Configuration;
use crate::Result;
use colored::Colorize;

/// Print the effective configuration with secrets masked.
pub fn show(config: &Configuration) -> Result<()> {
    let rendered = toml::to_string_pretty(&config.redacted())?;
    println!("{}", rendered);
    Ok(())
}

/// Validate the configuration and report what it enables.
pub fn validate(config: &Configuration) -> Result<()> {
    config.validate()?;

    println!("{}", "✅ Configuration is valid".bold().green());
    for source in crate::core::refresh::Source::ALL {
        if config.source_exists(source.key()) {
            println!("  {} {}", "Enabled:".bold(), source.key());
        }
    }
    Ok(())
}
