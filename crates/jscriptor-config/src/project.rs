//! Project Configuration (jscriptor.toml)
//!
//! Every key is optional. A missing key takes its default, and a missing
//! section takes the defaults of all its keys.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from jscriptor.toml
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Files or glob patterns to type-check, relative to the project root
    pub include: Vec<String>,

    /// Glob patterns removed from the include set
    pub exclude: Vec<String>,

    /// Type checking options
    pub type_check: TypeCheckConfig,

    /// Formatter options
    pub format: FormatConfig,
}

/// `[type-check]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TypeCheckConfig {
    /// Unify arrow bodies with their declared return types
    pub check_return_types: bool,

    /// Unify arrow parameters with annotated parameter types
    pub check_parameter_types: bool,
}

/// `[format]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FormatConfig {
    pub indent_size: usize,
    pub use_spaces: bool,
    pub max_line_length: usize,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            include: vec!["src/**/*.js".to_string()],
            exclude: vec![
                "node_modules/**/*".to_string(),
                "dist/**/*".to_string(),
                "build/**/*".to_string(),
            ],
            type_check: TypeCheckConfig::default(),
            format: FormatConfig::default(),
        }
    }
}

impl Default for TypeCheckConfig {
    fn default() -> Self {
        Self {
            check_return_types: true,
            check_parameter_types: true,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            use_spaces: true,
            max_line_length: 80,
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io(e)
            }
        })?;

        Self::parse(&content, path)
    }

    /// Parse project configuration from TOML text. `path` is only used in errors.
    pub fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParse {
            file: path.to_path_buf(),
            error: e,
        })
    }
}
