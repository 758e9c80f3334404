//! Core business logic modules.

pub mod cache;
pub mod calendar;
pub mod enrich;
pub mod lists;
pub mod refresh;
pub mod stats;
pub mod watched;
