//! Release run orchestration
//!
//! The orchestrator turns a configuration into archives: preflight checks,
//! output directory setup, one config generation, then a strictly sequential
//! compile-and-package loop whose per-variant failures are reported rather
//! than raised.

mod config;
mod release;
mod report;

pub use config::OrchestratorConfig;
pub use release::{PlannedVariant, ReleaseOrchestrator, RunHooks};
pub use report::{RunSummary, VariantOutcome, VariantReport};
