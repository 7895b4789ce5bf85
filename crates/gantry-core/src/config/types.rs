//! Configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::variant::{Catalog, VariantDescriptor, DEFAULT_AMD64_LEVEL};

use super::defaults;

/// Main configuration for Gantry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Release matrix, in build order
    pub variants: Vec<VariantDescriptor>,

    /// Project being released
    pub project: ProjectConfig,

    /// Compiler invocation settings
    pub build: BuildConfig,

    /// Default-config generation step
    pub config_gen: ConfigGenConfig,

    /// Archive settings
    pub package: PackageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variants: Catalog::builtin().iter().cloned().collect(),
            project: ProjectConfig::default(),
            build: BuildConfig::default(),
            config_gen: ConfigGenConfig::default(),
            package: PackageConfig::default(),
        }
    }
}

impl Config {
    /// Catalog of the configured variants
    pub fn catalog(&self) -> Result<Catalog, VariantError> {
        Catalog::new(self.variants.clone())
    }
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used for binary and archive names
    pub name: String,

    /// Version embedded into every binary
    pub version: String,

    /// Source root handed to the compiler, relative to the project root
    pub source: PathBuf,

    /// Readme bundled as `README.md`
    pub readme: PathBuf,

    /// License bundled as `LICENSE`
    pub license: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: defaults::PROJECT_NAME.to_string(),
            version: defaults::PROJECT_VERSION.to_string(),
            source: PathBuf::from("."),
            readme: PathBuf::from("README.md"),
            license: PathBuf::from("LICENSE"),
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Release output directory, relative to the project root
    pub output_dir: PathBuf,

    /// Compiler program
    pub compiler: String,

    /// Profile-guided optimization input, relative to the project root
    pub pgo_profile: Option<PathBuf>,

    /// Strip file system paths from the binary
    pub trimpath: bool,

    /// Strip symbol tables and debug information
    pub strip: bool,

    /// Symbol receiving the version string
    pub version_symbol: String,

    /// Symbol receiving the build timestamp
    pub build_time_symbol: String,

    /// strftime format of the build timestamp
    pub build_time_format: String,

    /// amd64 level used when a variant does not pick one
    pub default_amd64_level: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            compiler: "go".to_string(),
            pgo_profile: Some(PathBuf::from("default.pgo")),
            trimpath: true,
            strip: true,
            version_symbol: defaults::VERSION_SYMBOL.to_string(),
            build_time_symbol: defaults::BUILD_TIME_SYMBOL.to_string(),
            build_time_format: defaults::BUILD_TIME_FORMAT.to_string(),
            default_amd64_level: DEFAULT_AMD64_LEVEL.to_string(),
        }
    }
}

/// Config generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigGenConfig {
    /// Generator program
    pub program: String,

    /// Arguments; `{source}` expands to the source root seen from the output directory
    pub args: Vec<String>,

    /// File the generator writes into the output directory
    pub output: String,
}

impl Default for ConfigGenConfig {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            args: ["run", "{source}", "config", "gen", defaults::GENERATED_CONFIG]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output: defaults::GENERATED_CONFIG.to_string(),
        }
    }
}

/// Archive configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Deflate level, 0-9
    pub compression_level: u32,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            compression_level: defaults::COMPRESSION_LEVEL,
        }
    }
}
