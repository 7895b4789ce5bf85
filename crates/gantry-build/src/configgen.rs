//! Default configuration generation
//!
//! The sample config shipped in every archive is produced once per run by the
//! project itself, inside the output directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use gantry_core::Config;

use crate::error::{BuildError, Result};
use crate::layout::ReleaseLayout;
use crate::process::{render_command_line, run_command};

/// Placeholder replaced by the project source path in generator arguments
pub const SOURCE_PLACEHOLDER: &str = "{source}";

/// Produces the default config file placed in every archive
pub trait ConfigGenerator {
    /// Check the generator program is available
    fn check_prerequisites(&self) -> Result<()> {
        Ok(())
    }

    /// File name the generator writes into the output directory
    fn output_name(&self) -> &str;

    /// Generate the config, returning its path
    fn generate(&self, layout: &ReleaseLayout) -> Result<PathBuf>;
}

/// Runs an external command, `go run <source> config gen config.yaml` by default
#[derive(Debug, Clone)]
pub struct CommandConfigGenerator {
    program: String,
    args: Vec<String>,
    output: String,
    source: PathBuf,
}

impl CommandConfigGenerator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.config_gen.program.clone(),
            args: config.config_gen.args.clone(),
            output: config.config_gen.output.clone(),
            source: config.project.source.clone(),
        }
    }

    /// Use a different generator program
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments with the source placeholder expanded
    pub fn args(&self, layout: &ReleaseLayout) -> Vec<String> {
        let source = layout.from_output_dir(&self.source);
        let source = source.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(SOURCE_PLACEHOLDER, &source))
            .collect()
    }

    pub fn command_line(&self, layout: &ReleaseLayout) -> String {
        render_command_line(&self.program, self.args(layout))
    }
}

impl ConfigGenerator for CommandConfigGenerator {
    fn check_prerequisites(&self) -> Result<()> {
        which::which(&self.program).map(|_| ()).map_err(|_| {
            BuildError::tool_not_found(
                &self.program,
                "Install it or change config_gen.program",
            )
        })
    }

    fn output_name(&self) -> &str {
        &self.output
    }

    fn generate(&self, layout: &ReleaseLayout) -> Result<PathBuf> {
        let target = layout.output_file(&self.output);
        remove_stale(&target)?;

        let command_line = self.command_line(layout);
        info!(command = %command_line, "generating default config");

        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(layout)).current_dir(layout.output_dir());

        run_command(&mut cmd, &command_line).map_err(|e| BuildError::ConfigGeneration {
            message: format!("`{}` failed", command_line),
            source: Some(Box::new(e)),
        })?;

        if !target.is_file() {
            return Err(BuildError::config_generation(format!(
                "`{}` did not produce {}",
                command_line,
                target.display()
            )));
        }

        Ok(target)
    }
}

/// A config left over from an earlier run must not mask a broken generator
fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::ConfigGeneration {
            message: format!("cannot remove stale {}", path.display()),
            source: Some(Box::new(BuildError::Io(e))),
        }),
    }
}
