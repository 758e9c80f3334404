//! Sensor generators.

pub mod sensor;
pub mod stats;

pub use sensor::{render_snapshot, SensorDocument, SensorState};
