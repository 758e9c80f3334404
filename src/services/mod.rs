//! External service integrations.

pub mod tmdb;
pub mod token;
pub mod trakt;
