//! Release orchestration
//!
//! Validate, prepare the output directory, generate the default config once,
//! then compile and package each selected variant in catalog order.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use gantry_core::config::validate_config;
use gantry_core::{Config, NormalizedVariant, Normalizer};

use crate::compiler::{CompileRequest, Compiler, GoCompiler};
use crate::configgen::{CommandConfigGenerator, ConfigGenerator};
use crate::error::{BuildError, Result};
use crate::layout::ReleaseLayout;
use crate::packager::Packager;
use crate::stamp::{BuildStamp, SOURCE_DATE_EPOCH};

use super::config::OrchestratorConfig;
use super::report::{RunSummary, VariantOutcome, VariantReport};

/// A selected variant that passed preflight normalization
#[derive(Debug, Clone)]
pub struct PlannedVariant {
    /// Position in the full catalog
    pub index: usize,
    pub variant: NormalizedVariant,
}

/// Drives one release run
pub struct ReleaseOrchestrator {
    config: Config,
    layout: ReleaseLayout,
    options: OrchestratorConfig,
    compiler: Box<dyn Compiler>,
    config_generator: Box<dyn ConfigGenerator>,
    hooks: RunHooks,
    ambient: Vec<(String, String)>,
    source_date_epoch: Option<String>,
}

impl ReleaseOrchestrator {
    /// Create an orchestrator for the project at `root`
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        let layout = ReleaseLayout::new(root, &config.build.output_dir);

        Self {
            compiler: Box::new(GoCompiler::from_config(&config)),
            config_generator: Box::new(CommandConfigGenerator::from_config(&config)),
            options: OrchestratorConfig::default(),
            hooks: RunHooks::default(),
            ambient: ambient_environment(),
            source_date_epoch: std::env::var(SOURCE_DATE_EPOCH).ok(),
            layout,
            config,
        }
    }

    /// Set run options
    pub fn with_options(mut self, options: OrchestratorConfig) -> Self {
        self.options = options;
        self
    }

    /// Replace the compiler
    pub fn with_compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// Replace the default-config generator
    pub fn with_config_generator(mut self, generator: impl ConfigGenerator + 'static) -> Self {
        self.config_generator = Box::new(generator);
        self
    }

    /// Set hooks
    pub fn with_hooks(mut self, hooks: RunHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the ambient environment variants are normalized against.
    ///
    /// The compiler still inherits the real process environment underneath.
    pub fn with_ambient_env<I, K, V>(mut self, ambient: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.ambient = ambient
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Pin (or unpin) the build timestamp
    pub fn with_source_date_epoch(mut self, epoch: Option<String>) -> Self {
        self.source_date_epoch = epoch;
        self
    }

    pub fn layout(&self) -> &ReleaseLayout {
        &self.layout
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate the configuration, select variants and normalize them.
    ///
    /// Touches neither the filesystem nor any subprocess.
    pub fn plan(&self) -> Result<Vec<PlannedVariant>> {
        validate_config(&self.config)?;

        let catalog = self.config.catalog()?.narrow(self.options.index)?;
        let normalizer = Normalizer::from_config(&self.config);

        catalog
            .entries()
            .map(|(index, descriptor)| {
                let variant = normalizer.normalize(descriptor, self.ambient.iter().cloned())?;
                Ok(PlannedVariant { index, variant })
            })
            .collect()
    }

    /// Run the release
    #[instrument(skip(self), fields(root = %self.layout.root().display(), index = ?self.options.index, dry_run = self.options.dry_run))]
    pub fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();

        let planned = self.plan()?;
        let stamp = BuildStamp::from_config(&self.config, self.source_date_epoch.as_deref())?;

        if self.options.check_prerequisites {
            self.compiler.check_prerequisites()?;
            self.config_generator.check_prerequisites()?;
        }

        info!(
            variants = planned.len(),
            version = %stamp.version,
            build_time = %stamp.build_time,
            "starting release run"
        );

        if self.options.dry_run {
            let reports = planned
                .iter()
                .map(|p| self.plan_variant(p, &stamp))
                .collect();
            return Ok(self.summary(stamp, reports, start, true));
        }

        prepare_output_dir(self.layout.output_dir())?;

        let generated = self.config_generator.generate(&self.layout)?;
        debug!(path = %generated.display(), "default config ready");

        let packager = Packager::from_config(&self.config, self.layout.clone());
        let total = planned.len();
        let mut reports = Vec::with_capacity(total);

        for (position, planned) in planned.into_iter().enumerate() {
            self.hooks.run_variant_start(position, total, &planned.variant);
            let report = self.build_variant(&planned, &stamp, &packager);
            self.hooks.run_variant_finish(&report);
            reports.push(report);
        }

        let summary = self.summary(stamp, reports, start, false);

        if summary.is_success() {
            info!(
                packaged = summary.packaged_count(),
                duration_ms = summary.duration_ms,
                "release run completed"
            );
        } else {
            warn!(
                packaged = summary.packaged_count(),
                failed = summary.failed_count(),
                duration_ms = summary.duration_ms,
                "release run completed with failures"
            );
        }

        Ok(summary)
    }

    fn plan_variant(&self, planned: &PlannedVariant, stamp: &BuildStamp) -> VariantReport {
        let command = self.compiler.command_line(&CompileRequest {
            variant: &planned.variant,
            stamp,
            layout: &self.layout,
        });
        VariantReport::new(
            planned.index,
            &planned.variant,
            VariantOutcome::Planned { command },
            Default::default(),
        )
    }

    /// Compile then package one variant; failures become the report's outcome
    fn build_variant(
        &self,
        planned: &PlannedVariant,
        stamp: &BuildStamp,
        packager: &Packager,
    ) -> VariantReport {
        let start = Instant::now();
        let variant = &planned.variant;
        let archive = &variant.target.archive_name;

        let outcome = match self.compile(variant, stamp) {
            Err(e) => {
                error!(archive = %archive, variant = %variant.label, error = %e, "compile failed");
                VariantOutcome::CompileFailed {
                    error: e.to_string(),
                }
            }
            Ok(_) => match packager.package(variant, stamp) {
                Ok(artifact) => VariantOutcome::Packaged { artifact },
                Err(e) => {
                    error!(archive = %archive, variant = %variant.label, error = %e, "packaging failed");
                    VariantOutcome::PackageFailed {
                        error: e.to_string(),
                    }
                }
            },
        };

        VariantReport::new(planned.index, variant, outcome, start.elapsed())
    }

    fn compile(&self, variant: &NormalizedVariant, stamp: &BuildStamp) -> Result<PathBuf> {
        remove_stale_binary(&self.layout.output_file(&variant.target.binary_name))?;
        self.compiler.compile(&CompileRequest {
            variant,
            stamp,
            layout: &self.layout,
        })
    }

    fn summary(
        &self,
        stamp: BuildStamp,
        reports: Vec<VariantReport>,
        start: Instant,
        dry_run: bool,
    ) -> RunSummary {
        RunSummary {
            version: stamp.version,
            build_time: stamp.build_time,
            output_dir: self.layout.output_dir().to_path_buf(),
            reports,
            duration_ms: start.elapsed().as_millis() as u64,
            dry_run,
        }
    }
}

impl std::fmt::Debug for ReleaseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseOrchestrator")
            .field("layout", &self.layout)
            .field("options", &self.options)
            .field("compiler", &self.compiler.id())
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Unicode view of the process environment used for normalization.
///
/// Variables that are not valid unicode are left out here and reach the
/// compiler through inheritance.
fn ambient_environment() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

fn prepare_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| BuildError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// A binary left by another variant must never end up in this variant's archive
fn remove_stale_binary(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale binary");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::Io(e)),
    }
}

type VariantStartHook = Box<dyn Fn(usize, usize, &NormalizedVariant) + Send + Sync>;
type VariantFinishHook = Box<dyn Fn(&VariantReport) + Send + Sync>;

/// Callbacks around each variant, used for progress reporting
#[derive(Default)]
pub struct RunHooks {
    variant_start: Option<VariantStartHook>,
    variant_finish: Option<VariantFinishHook>,
}

impl RunHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with (position, total, variant) before a variant is compiled
    pub fn on_variant_start<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize, &NormalizedVariant) + Send + Sync + 'static,
    {
        self.variant_start = Some(Box::new(f));
        self
    }

    /// Called once a variant is packaged or has failed
    pub fn on_variant_finish<F>(mut self, f: F) -> Self
    where
        F: Fn(&VariantReport) + Send + Sync + 'static,
    {
        self.variant_finish = Some(Box::new(f));
        self
    }

    fn run_variant_start(&self, position: usize, total: usize, variant: &NormalizedVariant) {
        if let Some(ref hook) = self.variant_start {
            hook(position, total, variant);
        }
    }

    fn run_variant_finish(&self, report: &VariantReport) {
        if let Some(ref hook) = self.variant_finish {
            hook(report);
        }
    }
}

impl std::fmt::Debug for RunHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHooks")
            .field("variant_start", &self.variant_start.is_some())
            .field("variant_finish", &self.variant_finish.is_some())
            .finish()
    }
}
