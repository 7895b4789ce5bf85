//! Default configuration values

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "gantry.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "gantry.yaml";

pub const PROJECT_NAME: &str = "mosdns";
pub const PROJECT_VERSION: &str = "4.6.0";
pub const OUTPUT_DIR: &str = "release";
pub const VERSION_SYMBOL: &str = "github.com/pmkol/mosdns-x/constant.Version";
pub const BUILD_TIME_SYMBOL: &str = "github.com/pmkol/mosdns-x/constant.BuildTime";
pub const BUILD_TIME_FORMAT: &str = "%y.%m.%d";
pub const COMPRESSION_LEVEL: u32 = 5;

/// Configuration template written by the config generator
pub const GENERATED_CONFIG: &str = "config.yaml";

/// Environment variable overriding `project.version`
pub const ENV_VERSION: &str = "GANTRY_VERSION";

/// Environment variable overriding `build.output_dir`
pub const ENV_OUTPUT_DIR: &str = "GANTRY_OUTPUT_DIR";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".gantry.toml",
        ".gantry.yaml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> Result<String> {
    let yaml = serde_yaml::to_string(&Config::default()).map_err(ConfigError::YamlError)?;
    Ok(yaml)
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Gantry release configuration

# Release matrix, built in this order. `gantry build -i N` builds entry N only.
variants = [
    ["GOOS=darwin", "GOARCH=amd64"],
    ["GOOS=darwin", "GOARCH=arm64"],
    ["GOOS=linux", "GOARCH=amd64"],
    ["GOOS=linux", "GOARCH=amd64", "GOAMD64=v3"],
    ["GOOS=linux", "GOARCH=amd64", "GOAMD64=v4"],
    ["GOOS=linux", "GOARCH=arm64"],
    ["GOOS=linux", "GOARCH=mipsle", "GOMIPS=softfloat"],
    ["GOOS=linux", "GOARCH=mips64le", "GOMIPS64=hardfloat"],
    ["GOOS=linux", "GOARCH=ppc64le"],
    ["GOOS=freebsd", "GOARCH=amd64"],
    ["GOOS=windows", "GOARCH=amd64"],
]

[project]
name = "mosdns"
version = "4.6.0"
source = "."
readme = "README.md"
license = "LICENSE"

[build]
output_dir = "release"
compiler = "go"
pgo_profile = "default.pgo"
trimpath = true
strip = true
version_symbol = "github.com/pmkol/mosdns-x/constant.Version"
build_time_symbol = "github.com/pmkol/mosdns-x/constant.BuildTime"
build_time_format = "%y.%m.%d"
# amd64 variants without GOAMD64 are built at this level
default_amd64_level = "v3"

[config_gen]
program = "go"
args = ["run", "{source}", "config", "gen", "config.yaml"]
output = "config.yaml"

[package]
compression_level = 5
"#;
