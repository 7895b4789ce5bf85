//! Build command - compile and package the release matrix

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use gantry_build::{OrchestratorConfig, Output, ReleaseOrchestrator, RunHooks, RunSummary, VariantReport};

use crate::cli::{output, Cli, OutputFormat, Project};

/// Build every variant, or the one selected with `--index`
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Build only the variant at this catalog index (see `gantry list`)
    #[arg(short, long, value_name = "N")]
    pub index: Option<usize>,

    /// Version to embed instead of the configured one
    #[arg(long = "build-version", value_name = "VERSION")]
    pub build_version: Option<String>,

    /// Output directory for archives
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Validate and show the planned commands without building
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero when any variant fails
    #[arg(long)]
    pub strict: bool,

    /// Skip toolchain prerequisite checks
    #[arg(long)]
    pub skip_checks: bool,
}

/// Variants failed and `--strict` was given
#[derive(Debug, thiserror::Error)]
#[error("{failed} of {total} variant(s) failed")]
pub struct VariantsFailed {
    pub failed: usize,
    pub total: usize,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            index = ?self.index,
            dry_run = self.dry_run,
            strict = self.strict,
            "executing build command"
        );

        let project = self.project(cli)?;
        let options = OrchestratorConfig::new()
            .with_index(self.index)
            .with_dry_run(self.dry_run)
            .with_check_prerequisites(!self.skip_checks);

        if cli.show_text() {
            output::info(&format!(
                "Building {} {} into {}",
                output::header(&project.config.project.name),
                project.config.project.version,
                output::path_style().apply_to(project.root.join(&project.config.build.output_dir).display())
            ));
        }

        let progress = (cli.show_text() && !self.dry_run).then(progress_bar).transpose()?;

        let mut orchestrator =
            ReleaseOrchestrator::new(project.config, &project.root).with_options(options);
        if let Some(ref pb) = progress {
            orchestrator = orchestrator.with_hooks(progress_hooks(pb));
        }

        let result = orchestrator.run();
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        let summary = result?;

        self.report(cli, &summary)
    }

    fn project(&self, cli: &Cli) -> anyhow::Result<Project> {
        let mut project = cli.load_project()?;

        if let Some(ref version) = self.build_version {
            project.config.project.version = version.clone();
        }
        if let Some(ref dir) = self.output {
            project.config.build.output_dir = dir.clone();
        }

        Ok(project)
    }

    fn report(&self, cli: &Cli, summary: &RunSummary) -> anyhow::Result<()> {
        let rendered = Output::from_summary(summary);
        if cli.format == OutputFormat::Json || !cli.quiet {
            println!();
            rendered.print(cli.format.into());
        }

        if summary.is_success() {
            return Ok(());
        }

        let failed = VariantsFailed {
            failed: summary.failed_count(),
            total: summary.reports.len(),
        };

        if self.strict {
            return Err(failed.into());
        }

        if cli.show_text() {
            output::warning(&format!("{} (use --strict to fail the run)", failed));
        }
        Ok(())
    }
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg} ({elapsed})")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn progress_hooks(pb: &ProgressBar) -> RunHooks {
    let start_pb = pb.clone();
    let finish_pb = pb.clone();

    RunHooks::new()
        .on_variant_start(move |_, total, variant| {
            start_pb.set_length(total as u64);
            start_pb.set_message(format!("compiling {}", variant.label));
        })
        .on_variant_finish(move |report| {
            finish_pb.println(variant_line(report));
            finish_pb.inc(1);
        })
}

fn variant_line(report: &VariantReport) -> String {
    match report.outcome.error() {
        None => format!(
            "{} {} {}",
            style("✓").green().bold(),
            output::archive_style().apply_to(&report.archive_name),
            style(format!("{}ms", report.duration_ms)).dim()
        ),
        Some(_) => format!(
            "{} {} {}",
            style("✗").red().bold(),
            report.archive_name,
            style(report.outcome.label()).red()
        ),
    }
}
