//! Per-variant reports and the run summary

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use gantry_core::NormalizedVariant;

use crate::artifacts::Artifact;

/// What happened to one variant
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VariantOutcome {
    /// Compiled and archived
    Packaged { artifact: Artifact },
    /// The compiler failed; no archive was produced
    CompileFailed { error: String },
    /// The binary was built but could not be archived
    PackageFailed { error: String },
    /// Dry run: the command that would have run
    Planned { command: String },
}

impl VariantOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::CompileFailed { .. } | Self::PackageFailed { .. })
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Packaged { artifact } => Some(artifact),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::CompileFailed { error } | Self::PackageFailed { error } => Some(error),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Packaged { .. } => "packaged",
            Self::CompileFailed { .. } => "compile failed",
            Self::PackageFailed { .. } => "package failed",
            Self::Planned { .. } => "planned",
        }
    }
}

/// Report for one processed variant
#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    /// Position in the full catalog
    pub index: usize,
    /// Variant label, e.g. `linux/amd64/v3`
    pub variant: String,
    pub archive_name: String,
    pub binary_name: String,
    pub outcome: VariantOutcome,
    pub duration_ms: u64,
}

impl VariantReport {
    pub fn new(
        index: usize,
        variant: &NormalizedVariant,
        outcome: VariantOutcome,
        elapsed: Duration,
    ) -> Self {
        Self {
            index,
            variant: variant.label.clone(),
            archive_name: variant.target.archive_name.clone(),
            binary_name: variant.target.binary_name.clone(),
            outcome,
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Result of a whole release run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub version: String,
    pub build_time: String,
    pub output_dir: PathBuf,
    pub reports: Vec<VariantReport>,
    pub duration_ms: u64,
    pub dry_run: bool,
}

impl RunSummary {
    /// Archives produced by the run, in catalog order
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.reports.iter().filter_map(|r| r.outcome.artifact())
    }

    /// Reports of the variants that failed
    pub fn failures(&self) -> impl Iterator<Item = &VariantReport> {
        self.reports.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn packaged_count(&self) -> usize {
        self.artifacts().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// No variant failed
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}
