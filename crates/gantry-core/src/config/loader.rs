//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, GantryError, Result};

use super::defaults::{config_file_names, ENV_OUTPUT_DIR, ENV_VERSION};
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), variants = config.variants.len(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks `<dir>/<name>` and then
/// `<dir>/.github/<name>`. The first match wins.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Project root that a configuration file belongs to
pub fn project_root_for(config_path: &Path) -> PathBuf {
    let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    if dir.file_name().is_some_and(|n| n == ".github") {
        dir.parent().unwrap_or(dir).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or use defaults when no file exists.
///
/// A file that exists but does not parse or validate is still an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match load_config_from_dir(dir) {
        Ok((config, path)) => Ok((config, Some(path))),
        Err(GantryError::Config(ConfigError::NotFound(_))) => {
            warn!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e),
    }
}

/// Apply `GANTRY_*` environment overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply `GANTRY_*` overrides from a lookup function
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(version) = lookup(ENV_VERSION).filter(|v| !v.is_empty()) {
        debug!(version = %version, "version overridden from environment");
        config.project.version = version;
    }

    if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
        debug!(output_dir = %dir, "output directory overridden from environment");
        config.build.output_dir = PathBuf::from(dir);
    }
}
