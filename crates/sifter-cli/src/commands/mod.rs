//! CLI command implementations.

pub mod clean;
mod common;
pub mod profile;
