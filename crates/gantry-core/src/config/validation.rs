//! Configuration validation

use std::path::{Component, Path};

use chrono::format::{Item, StrftimeItems};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result, VariantError};

use super::types::Config;

const AMD64_LEVELS: [&str; 4] = ["v1", "v2", "v3", "v4"];
const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_project(config)?;
    validate_build(config)?;
    validate_config_gen(config)?;
    validate_package(config)?;
    validate_variants(config)?;
    debug!("configuration validation passed");
    Ok(())
}

/// Whether a strftime format string is free of invalid specifiers
pub fn is_valid_time_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

fn invalid(field: &str, message: impl Into<String>) -> crate::error::GantryError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
    .into()
}

fn validate_project(config: &Config) -> Result<()> {
    let project = &config.project;

    if project.name.trim().is_empty() {
        return Err(invalid("project.name", "name cannot be empty"));
    }

    if project.name.contains(['/', '\\']) {
        return Err(invalid("project.name", "name cannot contain path separators"));
    }

    if project.version.trim().is_empty() {
        return Err(invalid("project.version", "version cannot be empty"));
    }

    let bare = project.version.strip_prefix('v').unwrap_or(&project.version);
    if semver::Version::parse(bare).is_err() {
        warn!(version = %project.version, "project version is not a semantic version");
    }

    Ok(())
}

fn validate_build(config: &Config) -> Result<()> {
    let build = &config.build;

    if build.output_dir.as_os_str().is_empty() {
        return Err(invalid("build.output_dir", "output directory cannot be empty"));
    }

    if is_project_root(&build.output_dir) {
        return Err(invalid(
            "build.output_dir",
            "output directory must differ from the project root",
        ));
    }

    if build.compiler.trim().is_empty() {
        return Err(invalid("build.compiler", "compiler cannot be empty"));
    }

    if build.version_symbol.trim().is_empty() {
        return Err(invalid("build.version_symbol", "symbol cannot be empty"));
    }

    if build.build_time_symbol.trim().is_empty() {
        return Err(invalid("build.build_time_symbol", "symbol cannot be empty"));
    }

    if build.build_time_format.is_empty() || !is_valid_time_format(&build.build_time_format) {
        return Err(invalid(
            "build.build_time_format",
            format!("'{}' is not a valid strftime format", build.build_time_format),
        ));
    }

    if !AMD64_LEVELS.contains(&build.default_amd64_level.as_str()) {
        return Err(invalid(
            "build.default_amd64_level",
            format!("must be one of: {}", AMD64_LEVELS.join(", ")),
        ));
    }

    Ok(())
}

fn validate_config_gen(config: &Config) -> Result<()> {
    if config.config_gen.program.trim().is_empty() {
        return Err(invalid("config_gen.program", "program cannot be empty"));
    }

    let output = Path::new(&config.config_gen.output);
    if output.file_name().map(|n| n != output.as_os_str()).unwrap_or(true) {
        return Err(invalid(
            "config_gen.output",
            "output must be a plain file name inside the output directory",
        ));
    }

    Ok(())
}

fn validate_package(config: &Config) -> Result<()> {
    if config.package.compression_level > MAX_COMPRESSION_LEVEL {
        return Err(invalid(
            "package.compression_level",
            format!("must be between 0 and {}", MAX_COMPRESSION_LEVEL),
        ));
    }

    Ok(())
}

fn validate_variants(config: &Config) -> Result<()> {
    if config.variants.is_empty() {
        return Err(VariantError::EmptyCatalog.into());
    }
    debug!(count = config.variants.len(), "validating variants");
    Ok(())
}

fn is_project_root(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GantryError;
    use std::path::PathBuf;

    fn assert_invalid_field(result: Result<()>, expected: &str) {
        match result {
            Err(GantryError::Config(ConfigError::InvalidValue { field, .. })) => {
                assert_eq!(field, expected)
            }
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_name() {
        let mut config = Config::default();
        config.project.name = "  ".to_string();
        assert_invalid_field(validate_config(&config), "project.name");
    }

    #[test]
    fn test_compression_level_bounds() {
        let mut config = Config::default();
        config.package.compression_level = 9;
        assert!(validate_config(&config).is_ok());

        config.package.compression_level = 10;
        assert_invalid_field(validate_config(&config), "package.compression_level");
    }

    #[test]
    fn test_time_format() {
        assert!(is_valid_time_format("%y.%m.%d"));
        assert!(is_valid_time_format("%Y-%m-%dT%H:%M:%SZ"));
        assert!(!is_valid_time_format("%Q"));

        let mut config = Config::default();
        config.build.build_time_format = "%Q".to_string();
        assert_invalid_field(validate_config(&config), "build.build_time_format");
    }

    #[test]
    fn test_amd64_level() {
        let mut config = Config::default();
        config.build.default_amd64_level = "v5".to_string();
        assert_invalid_field(validate_config(&config), "build.default_amd64_level");
    }

    #[test]
    fn test_output_dir_cannot_be_root() {
        let mut config = Config::default();
        config.build.output_dir = PathBuf::from(".");
        assert_invalid_field(validate_config(&config), "build.output_dir");
    }

    #[test]
    fn test_generated_config_must_be_file_name() {
        let mut config = Config::default();
        config.config_gen.output = "../config.yaml".to_string();
        assert_invalid_field(validate_config(&config), "config_gen.output");
    }

    #[test]
    fn test_empty_variants() {
        let mut config = Config::default();
        config.variants.clear();
        assert!(matches!(
            validate_config(&config),
            Err(GantryError::Variant(VariantError::EmptyCatalog))
        ));
    }
}
