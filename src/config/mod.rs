//! Configuration module
//!
//! Handles:
//! - User configuration (`config.toml` in the platform config directory)
//! - Location of the session database and log file

mod settings;

pub use settings::*;
