//! Gantry Core - Core library for release builds
//!
//! This crate provides the configuration, error types, and the variant model
//! (catalog and normalizer) shared by the build engine and the CLI.

pub mod config;
pub mod error;
pub mod variant;

pub use config::Config;
pub use error::{ConfigError, GantryError, Result, VariantError};
pub use variant::{
    BuildEnvironment, BuildTarget, Catalog, EnvOverride, NormalizedVariant, Normalizer,
    VariantDescriptor,
};
