//! CLI command implementations.

pub mod config;
pub mod refresh;
pub mod watch;

use crate::generators::SensorDocument;
use colored::Colorize;

/// Print one line per rendered sensor.
pub fn print_sensor_summary(document: &SensorDocument) {
    println!("{}", "📡 Sensors".bold().green());
    if document.is_empty() {
        println!("  {}", "No sensor configured".yellow());
        return;
    }

    for sensor in &document.sensors {
        let unit = sensor.unit.as_deref().unwrap_or("");
        println!(
            "  {} {} {}",
            format!("{}:", sensor.name).bold(),
            sensor.state.to_string().cyan(),
            unit.dimmed()
        );
    }
}
