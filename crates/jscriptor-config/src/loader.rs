//! Configuration Loader
//!
//! Finds the project configuration and applies environment overrides.

use crate::project::ProjectConfig;
use crate::resolve::resolve_files;
use crate::ConfigResult;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "jscriptor.toml";

const ENV_CHECK_RETURN_TYPES: &str = "JSCRIPTOR_CHECK_RETURN_TYPES";
const ENV_CHECK_PARAMETER_TYPES: &str = "JSCRIPTOR_CHECK_PARAMETER_TYPES";

/// Configuration loader
///
/// Precedence, lowest first:
/// 1. Defaults
/// 2. Project config (jscriptor.toml)
/// 3. Environment variables (JSCRIPTOR_*)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip environment overrides
    ignore_env: bool,
}

/// Loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Directory containing jscriptor.toml, if one was found
    pub project_root: Option<PathBuf>,

    /// Directory the search started from
    pub start_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Loader that never reads `JSCRIPTOR_*` variables
    pub fn without_env() -> Self {
        Self { ignore_env: true }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find jscriptor.toml. Without one, the
    /// defaults apply and the start directory acts as the project root for
    /// file resolution.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = self.find_project_config(start_dir)?;
        let project = self.apply_env_overrides(project);

        Ok(Config {
            project,
            project_root,
            start_dir: start_dir.to_path_buf(),
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(config_path)?;
        let project = self.apply_env_overrides(project);
        let project_root = config_path.parent().map(Path::to_path_buf);
        let start_dir = project_root.clone().unwrap_or_default();

        Ok(Config {
            project,
            project_root,
            start_dir,
        })
    }

    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                debug!(path = %config_path.display(), "found project config");
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => {
                    debug!(start = %start_dir.display(), "no {CONFIG_FILE_NAME} found, using defaults");
                    return Ok((None, ProjectConfig::default()));
                }
            }
        }
    }

    fn apply_env_overrides(&self, config: ProjectConfig) -> ProjectConfig {
        if self.ignore_env {
            return config;
        }
        apply_overrides(config, |key| env::var(key).ok())
    }
}

/// Apply `JSCRIPTOR_*` overrides read through `lookup`
pub fn apply_overrides<F>(mut config: ProjectConfig, lookup: F) -> ProjectConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_CHECK_RETURN_TYPES) {
        config.type_check.check_return_types = parse_flag(&value);
        debug!(value = config.type_check.check_return_types, "{ENV_CHECK_RETURN_TYPES} override");
    }

    if let Some(value) = lookup(ENV_CHECK_PARAMETER_TYPES) {
        config.type_check.check_parameter_types = parse_flag(&value);
        debug!(value = config.type_check.check_parameter_types, "{ENV_CHECK_PARAMETER_TYPES} override");
    }

    config
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Directory that include and exclude patterns are relative to
    pub fn root(&self) -> &Path {
        self.project_root.as_deref().unwrap_or(&self.start_dir)
    }

    /// Whether a jscriptor.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Source files selected by the include and exclude patterns
    pub fn resolve_files(&self) -> ConfigResult<Vec<PathBuf>> {
        resolve_files(self.root(), &self.project.include, &self.project.exclude)
    }
}
