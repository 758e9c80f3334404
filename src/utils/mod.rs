//! Utility functions.

pub mod dates;
pub mod fs;
pub mod json;
