//! JScriptor Configuration
//!
//! Loads `jscriptor.toml` project files and resolves the set of source files
//! a project type-checks.
//!
//! # Configuration Hierarchy
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults
//! 2. Project config (`jscriptor.toml`, found by walking up from the start directory)
//! 3. Environment variables (`JSCRIPTOR_*`)
//! 4. CLI flags (handled by the caller)
//!
//! # Example
//!
//! ```no_run
//! use jscriptor_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! let files = config.resolve_files().unwrap();
//! ```

pub mod loader;
pub mod project;
pub mod resolve;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParse {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid file pattern '{pattern}': {error}")]
    InvalidPattern {
        pattern: String,
        error: regex::Error,
    },

    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{apply_overrides, Config, ConfigLoader, CONFIG_FILE_NAME};
pub use project::{FormatConfig, ProjectConfig, TypeCheckConfig};
pub use resolve::{resolve_files, Pattern};
