//! Gantry Build - compile, package and orchestrate release builds
//!
//! This crate runs the build matrix described by a [`gantry_core::Config`]:
//!
//! - [`compiler`]: invokes the toolchain once per variant
//! - [`configgen`]: produces the default config shipped in every archive
//! - [`packager`]: bundles a binary with its companion files into a zip
//! - [`orchestration`]: drives a whole run and reports per-variant outcomes
//! - [`output`]: renders run summaries as text or JSON

pub mod artifacts;
pub mod compiler;
pub mod configgen;
pub mod error;
pub mod layout;
pub mod orchestration;
pub mod output;
pub mod packager;
pub mod process;
pub mod stamp;

#[cfg(test)]
pub(crate) mod test_support;

pub use artifacts::{Artifact, ArtifactMetadata};
pub use compiler::{CompileRequest, Compiler, GoCompiler};
pub use configgen::{CommandConfigGenerator, ConfigGenerator};
pub use error::{BuildError, Result};
pub use layout::ReleaseLayout;
pub use orchestration::{
    OrchestratorConfig, PlannedVariant, ReleaseOrchestrator, RunHooks, RunSummary,
    VariantOutcome, VariantReport,
};
pub use output::{Output, OutputFormat};
pub use packager::Packager;
pub use stamp::BuildStamp;
