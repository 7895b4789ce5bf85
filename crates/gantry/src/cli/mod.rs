//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use gantry_core::config::{apply_env_overrides, load_config, load_config_or_default, project_root_for};
use gantry_core::Config;

use commands::{BuildCommand, CompletionsCommand, InitCommand, ListCommand, ValidateCommand};

/// Gantry - build a Go release matrix into versioned archives
#[derive(Debug, Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (searched for when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for gantry_build::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the release matrix (or one variant) into archives
    Build(BuildCommand),

    /// List the variants of the release matrix
    List(ListCommand),

    /// Write a default configuration file
    Init(InitCommand),

    /// Validate configuration and variants
    Validate(ValidateCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// A loaded configuration and the project it belongs to
#[derive(Debug, Clone)]
pub struct Project {
    pub config: Config,
    /// Configuration file, `None` when running on built-in defaults
    pub config_path: Option<PathBuf>,
    /// Directory the build runs against
    pub root: PathBuf,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Build(ref cmd) => cmd.execute(&self),
            Commands::List(ref cmd) => cmd.execute(&self),
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Validate(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Directory given with `-C`, or the current directory
    pub fn working_dir(&self) -> anyhow::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match self.directory {
            Some(ref dir) => resolve(&cwd, dir),
            None => cwd,
        })
    }

    /// Load the configuration with `GANTRY_*` environment overrides applied
    pub fn load_project(&self) -> anyhow::Result<Project> {
        let dir = self.working_dir()?;

        let (mut config, config_path, root) = match self.config {
            Some(ref path) => {
                let path = resolve(&dir, path);
                let config = load_config(&path)?;
                (config, Some(path), dir)
            }
            None => {
                let (config, path) = load_config_or_default(&dir)?;
                let root = path
                    .as_deref()
                    .map(project_root_for)
                    .unwrap_or_else(|| dir.clone());
                (config, path, root)
            }
        };

        apply_env_overrides(&mut config);

        debug!(
            root = %root.display(),
            config = ?config_path,
            variants = config.variants.len(),
            "project loaded"
        );

        Ok(Project {
            config,
            config_path,
            root,
        })
    }

    /// Whether human-oriented text should be printed
    pub fn show_text(&self) -> bool {
        self.format == OutputFormat::Text && !self.quiet
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_with_index() {
        let cli = Cli::try_parse_from(["gantry", "build", "-i", "3", "--strict"]).unwrap();
        match cli.command {
            Commands::Build(ref cmd) => {
                assert_eq!(cmd.index, Some(3));
                assert!(cmd.strict);
                assert!(!cmd.dry_run);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gantry", "list", "--format", "json", "-C", "/tmp"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.directory, Some(PathBuf::from("/tmp")));
        assert!(!cli.show_text());
    }

    #[test]
    fn test_negative_index_rejected() {
        assert!(Cli::try_parse_from(["gantry", "build", "--index", "-1"]).is_err());
    }

    #[test]
    fn test_load_project_without_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["gantry", "-C", &dir, "list"]).unwrap();

        let project = cli.load_project().unwrap();
        assert!(project.config_path.is_none());
        assert_eq!(project.root, temp.path());
        assert_eq!(project.config.variants.len(), 11);
    }

    #[test]
    fn test_load_project_from_github_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".github")).unwrap();
        std::fs::write(
            temp.path().join(".github/gantry.toml"),
            "[project]\nname = \"demo\"\nversion = \"1.2.3\"\n",
        )
        .unwrap();
        let nested = temp.path().join("cmd");
        std::fs::create_dir_all(&nested).unwrap();

        let dir = nested.to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["gantry", "-C", &dir, "list"]).unwrap();
        let project = cli.load_project().unwrap();

        assert_eq!(project.config.project.name, "demo");
        assert_eq!(project.root, temp.path());
    }

    #[test]
    fn test_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("release.yaml"),
            "project:\n  name: demo\nvariants:\n  - [\"GOOS=linux\", \"GOARCH=arm64\"]\n",
        )
        .unwrap();

        let dir = temp.path().to_string_lossy().to_string();
        let cli =
            Cli::try_parse_from(["gantry", "-C", &dir, "-c", "release.yaml", "list"]).unwrap();
        let project = cli.load_project().unwrap();

        assert_eq!(project.config.variants.len(), 1);
        assert_eq!(project.config_path, Some(temp.path().join("release.yaml")));
    }
}
