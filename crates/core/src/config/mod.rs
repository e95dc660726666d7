//! Configuration loading.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `PASSFORGE_*` environment variables, later sources winning:
//!
//! ```toml
//! [encoder]
//! ffmpeg_path = "/usr/bin/ffmpeg"
//! threads = 4
//!
//! [workspace]
//! temp_dir = "/var/tmp/passforge"
//! ```

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_env, load_config_from_str};
pub use types::*;
pub use validate::validate_config;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
