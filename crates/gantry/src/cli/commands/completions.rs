//! Shell completions

use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory};
use clap_complete::{generate, generate_to, Shell};
use tracing::info;

use crate::cli::{output, Cli};

const BIN_NAME: &str = "gantry";

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for (defaults to the one in $SHELL)
    #[arg(value_enum)]
    pub shell: Option<Shell>,

    /// Write to this file, or into this directory under the shell's usual name
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let shell = self.resolve_shell()?;
        info!(%shell, output = ?self.output, "executing completions command");

        let Some(ref target) = self.output else {
            generate(shell, &mut Cli::command(), BIN_NAME, &mut io::stdout());
            return Ok(());
        };

        let written = write_completions(shell, target)?;
        if !cli.quiet {
            output::success(&format!(
                "{} completions written to {}",
                shell,
                output::path_style().apply_to(written.display())
            ));
        }

        Ok(())
    }

    fn resolve_shell(&self) -> anyhow::Result<Shell> {
        match self.shell {
            Some(shell) => Ok(shell),
            None => Shell::from_env().ok_or_else(|| {
                anyhow::anyhow!("Cannot detect the shell from $SHELL; pass one explicitly")
            }),
        }
    }
}

/// Write completions to `target` and return the file written
fn write_completions(shell: Shell, target: &Path) -> io::Result<PathBuf> {
    let mut cmd = Cli::command();

    if target.is_dir() {
        return generate_to(shell, &mut cmd, BIN_NAME, target);
    }

    let mut file = std::fs::File::create(target)?;
    generate(shell, &mut cmd, BIN_NAME, &mut file);
    Ok(target.to_path_buf())
}
