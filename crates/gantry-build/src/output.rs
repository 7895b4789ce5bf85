//! Structured output
//!
//! Run results rendered for people (text) or for CI pipelines (JSON).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::artifacts::Artifact;
use crate::orchestration::{RunSummary, VariantOutcome};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Structured output that can be rendered in multiple formats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    /// Whether the operation succeeded
    pub success: bool,

    /// Primary message
    pub message: String,

    /// Operation that was performed
    pub operation: String,

    /// Duration in milliseconds
    pub duration_ms: Option<u64>,

    /// Artifacts produced
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub artifacts: Vec<ArtifactOutput>,

    /// Commands a dry run would execute
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub planned: Vec<String>,

    /// Warnings
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,

    /// Errors
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,

    /// CI output variables
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub outputs: HashMap<String, String>,

    /// Additional metadata
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Output {
    /// Create a success output
    pub fn success(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(true, operation, message)
    }

    /// Create a failure output
    pub fn failure(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(false, operation, message)
    }

    fn with_status(success: bool, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            operation: operation.into(),
            duration_ms: None,
            artifacts: Vec::new(),
            planned: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            outputs: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Summarize a release run
    pub fn from_summary(summary: &RunSummary) -> Self {
        let total = summary.reports.len();

        let mut output = if summary.dry_run {
            Self::success("build", format!("Planned {} variant(s)", total))
                .with_warning("Dry run - no archives produced")
        } else if summary.is_success() {
            Self::success("build", format!("Packaged {} variant(s)", total))
        } else {
            Self::failure(
                "build",
                format!(
                    "Packaged {} of {} variant(s), {} failed",
                    summary.packaged_count(),
                    total,
                    summary.failed_count()
                ),
            )
        };

        output = output
            .with_duration(summary.duration_ms)
            .with_artifacts(summary.artifacts().cloned().collect())
            .with_output("version", &summary.version)
            .with_output("build_time", &summary.build_time)
            .with_output("output_dir", summary.output_dir.to_string_lossy());

        for report in &summary.reports {
            match &report.outcome {
                VariantOutcome::Planned { command } => {
                    output.planned.push(format!("[{}] {}", report.index, command));
                }
                VariantOutcome::CompileFailed { error } | VariantOutcome::PackageFailed { error } => {
                    output = output.with_error(format!(
                        "{} ({}): {}",
                        report.archive_name,
                        report.outcome.label(),
                        error
                    ));
                }
                VariantOutcome::Packaged { .. } => {}
            }
        }

        if let Ok(reports) = serde_json::to_value(&summary.reports) {
            output = output.with_metadata("variants", reports);
        }

        output
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts
            .extend(artifacts.into_iter().map(ArtifactOutput::from));
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Render output in the specified format
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => self.render_json(),
        }
    }

    /// Print output to stdout
    pub fn print(&self, format: OutputFormat) {
        print!("{}", self.render(format));
    }

    fn render_text(&self) -> String {
        let mut out = String::new();

        let status = if self.success { "✓" } else { "✗" };
        out.push_str(&format!("{} {}\n", status, self.message));

        if let Some(ms) = self.duration_ms {
            out.push_str(&format!("  Duration: {}ms\n", ms));
        }

        if !self.planned.is_empty() {
            out.push_str("\nPlanned:\n");
            for command in &self.planned {
                out.push_str(&format!("  {}\n", command));
            }
        }

        if !self.artifacts.is_empty() {
            out.push_str("\nArtifacts:\n");
            for artifact in &self.artifacts {
                out.push_str(&format!(
                    "  - {} ({})\n",
                    artifact.path,
                    format_size(artifact.size)
                ));
                if let Some(ref sha) = artifact.sha256 {
                    out.push_str(&format!("    sha256 {}\n", sha));
                }
            }
        }

        for warning in &self.warnings {
            out.push_str(&format!("⚠ {}\n", warning));
        }

        for error in &self.errors {
            out.push_str(&format!("✗ {}\n", error));
        }

        out
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Artifact output for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactOutput {
    pub path: String,
    pub variant: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl From<Artifact> for ArtifactOutput {
    fn from(a: Artifact) -> Self {
        Self {
            path: a.path.to_string_lossy().to_string(),
            variant: a.variant,
            size: a.size,
            sha256: a.sha256,
        }
    }
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::VariantReport;
    use std::path::PathBuf;

    fn report(index: usize, archive: &str, outcome: VariantOutcome) -> VariantReport {
        VariantReport {
            index,
            variant: "linux/arm64".to_string(),
            archive_name: archive.to_string(),
            binary_name: "mosdns".to_string(),
            outcome,
            duration_ms: 5,
        }
    }

    fn summary(reports: Vec<VariantReport>, dry_run: bool) -> RunSummary {
        RunSummary {
            version: "4.6.0".to_string(),
            build_time: "24.03.09".to_string(),
            output_dir: PathBuf::from("/work/mosdns/release"),
            reports,
            duration_ms: 1234,
            dry_run,
        }
    }

    #[test]
    fn test_summary_with_failure() {
        let mut artifact =
            Artifact::new("/work/mosdns/release/mosdns-linux-arm64.zip", "linux/arm64");
        artifact.size = 2048;
        artifact.sha256 = Some("abc123".to_string());

        let output = Output::from_summary(&summary(
            vec![
                report(5, "mosdns-linux-arm64.zip", VariantOutcome::Packaged { artifact }),
                report(
                    6,
                    "mosdns-linux-mipsle-softfloat.zip",
                    VariantOutcome::CompileFailed {
                        error: "exit code 2".to_string(),
                    },
                ),
            ],
            false,
        ));

        assert!(!output.success);
        assert_eq!(output.message, "Packaged 1 of 2 variant(s), 1 failed");
        assert_eq!(output.artifacts.len(), 1);
        assert_eq!(output.errors.len(), 1);
        assert!(output.errors[0].starts_with("mosdns-linux-mipsle-softfloat.zip (compile failed)"));
        assert_eq!(output.outputs.get("version"), Some(&"4.6.0".to_string()));

        let text = output.render(OutputFormat::Text);
        assert!(text.contains("✗ Packaged 1 of 2"));
        assert!(text.contains("mosdns-linux-arm64.zip (2.0 KB)"));
        assert!(text.contains("sha256 abc123"));
    }

    #[test]
    fn test_dry_run_summary() {
        let output = Output::from_summary(&summary(
            vec![report(
                3,
                "mosdns-linux-amd64-v3.zip",
                VariantOutcome::Planned {
                    command: "go build -buildmode=pie".to_string(),
                },
            )],
            true,
        ));

        assert!(output.success);
        assert_eq!(output.planned, vec!["[3] go build -buildmode=pie"]);
        assert!(output.render(OutputFormat::Text).contains("Planned:"));
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_render_json() {
        let output = Output::from_summary(&summary(Vec::new(), false));
        let json = output.render(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["operation"], "build");
        assert_eq!(value["outputs"]["build_time"], "24.03.09");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1500), "1.5 KB");
        assert_eq!(format_size(1_500_000), "1.4 MB");
    }
}
