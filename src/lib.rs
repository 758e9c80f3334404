//! Trakt TV Library
//!
//! Fetches upcoming, recommended, anticipated, next-to-watch and listed media
//! from Trakt, enriches them with TMDB metadata and renders them as sensors.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
