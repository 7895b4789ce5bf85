//! Init command

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::{style, Term};
use dialoguer::Confirm;
use tracing::info;

use gantry_core::config::defaults::{
    default_config_yaml, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML,
};

use crate::cli::{output, Cli};

/// Write a default Gantry configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Configuration file format
    #[arg(long, value_enum, default_value = "toml")]
    pub config_format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    fn file_name(self) -> &'static str {
        match self {
            Self::Toml => DEFAULT_CONFIG_TOML,
            Self::Yaml => DEFAULT_CONFIG_YAML,
        }
    }

    fn content(self) -> gantry_core::Result<String> {
        match self {
            Self::Toml => Ok(DEFAULT_CONFIG_TEMPLATE.to_string()),
            Self::Yaml => default_config_yaml(),
        }
    }
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, format = ?self.config_format, "executing init command");
        let config_path = self.config_path(&cli.working_dir()?);

        if config_path.exists() && !self.force {
            if cli.quiet || !Term::stdout().is_term() {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        std::fs::write(&config_path, self.config_format.content()?)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to set your project and release matrix", config_path.display());
            println!("  2. Run {} to check every variant", style("gantry validate").cyan());
            println!("  3. Run {} to build the archives", style("gantry build").cyan());
        }

        Ok(())
    }

    fn config_path(&self, dir: &Path) -> PathBuf {
        match self.output {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => dir.join(path),
            None => dir.join(self.config_format.file_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gantry_core::config::load_config;
    use gantry_core::Config;
    use tempfile::TempDir;

    fn run(dir: &Path, args: &[&str]) -> anyhow::Result<()> {
        let dir = dir.to_string_lossy().to_string();
        let mut argv = vec!["gantry", "-q", "-C", dir.as_str(), "init"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().execute()
    }

    #[test]
    fn test_init_writes_loadable_toml() {
        let temp = TempDir::new().unwrap();
        run(temp.path(), &[]).unwrap();

        let config = load_config(&temp.path().join("gantry.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_writes_loadable_yaml() {
        let temp = TempDir::new().unwrap();
        run(temp.path(), &["--config-format", "yaml"]).unwrap();

        let config = load_config(&temp.path().join("gantry.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_existing_config_needs_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gantry.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(run(temp.path(), &[]).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        run(temp.path(), &["--force"]).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[project]"));
    }

    #[test]
    fn test_custom_output_path() {
        let temp = TempDir::new().unwrap();
        run(temp.path(), &["-o", ".gantry.toml"]).unwrap();
        assert!(temp.path().join(".gantry.toml").exists());
    }
}
