//! Data models.

pub mod config;
pub mod ids;
pub mod kind;
pub mod media;
