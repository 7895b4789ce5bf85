//! Validate command

use clap::Args;
use console::style;
use tracing::info;

use gantry_core::Normalizer;

use crate::cli::{output, Cli, OutputFormat, Project};
use crate::exit_codes;

/// Validate configuration, variants and project files
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Problems found by validation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(strict = self.strict, "executing validate command");

        let (project, mut findings) = match cli.load_project() {
            Ok(project) => {
                let findings = check_project(&project);
                (Some(project), findings)
            }
            Err(e) => (
                None,
                Findings {
                    errors: vec![format!("Configuration: {:#}", e)],
                    warnings: Vec::new(),
                },
            ),
        };

        if self.strict {
            let mut warnings = std::mem::take(&mut findings.warnings);
            findings.errors.append(&mut warnings);
        }

        let passed = findings.errors.is_empty();
        let config_path = project.as_ref().and_then(|p| p.config_path.clone());

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "valid": passed,
                    "config_path": config_path.map(|p| p.to_string_lossy().to_string()),
                    "variants": project.as_ref().map(|p| p.config.variants.len()),
                    "errors": findings.errors,
                    "warnings": findings.warnings
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_text(project.as_ref(), &findings, passed);
                }
            }
        }

        if !passed {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }

        Ok(())
    }
}

fn print_text(project: Option<&Project>, findings: &Findings, passed: bool) {
    println!("{}", output::header("Validation Results"));
    println!();

    if let Some(project) = project {
        let config = match project.config_path {
            Some(ref path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        };
        println!("{}", output::key_value("Config", &config));
        println!(
            "{}",
            output::key_value("Root", &project.root.display().to_string())
        );
        println!(
            "{}",
            output::key_value("Variants", &project.config.variants.len().to_string())
        );
        println!();
    }

    if !findings.errors.is_empty() {
        println!("{}", style("Errors:").red().bold());
        for error in &findings.errors {
            println!("  {} {}", style("✗").red(), error);
        }
        println!();
    }

    if !findings.warnings.is_empty() {
        println!("{}", style("Warnings:").yellow().bold());
        for warning in &findings.warnings {
            println!("  {} {}", style("!").yellow(), warning);
        }
        println!();
    }

    if passed {
        if findings.warnings.is_empty() {
            output::success("All checks passed");
        } else {
            println!(
                "{} with {} warning(s)",
                style("✓ Validation passed").green().bold(),
                findings.warnings.len()
            );
        }
    } else {
        println!(
            "{} with {} error(s)",
            style("✗ Validation failed").red().bold(),
            findings.errors.len()
        );
    }
}

/// Check a loaded project: every variant normalizes, companion files exist,
/// tools are installed
pub fn check_project(project: &Project) -> Findings {
    let mut findings = Findings::default();
    let config = &project.config;

    match config.catalog() {
        Ok(catalog) => {
            let normalizer = Normalizer::from_config(config);
            for (index, descriptor) in catalog.entries() {
                if let Err(e) = normalizer.normalize(descriptor, Vec::<(String, String)>::new()) {
                    findings.errors.push(format!("Variant {}: {}", index, e));
                }
            }
        }
        Err(e) => findings.errors.push(format!("Variants: {}", e)),
    }

    for (what, path) in [
        ("Readme", &config.project.readme),
        ("License", &config.project.license),
    ] {
        let full = project.root.join(path);
        if !full.is_file() {
            findings
                .errors
                .push(format!("{} not found at {}", what, full.display()));
        }
    }

    if let Some(ref profile) = config.build.pgo_profile {
        let full = project.root.join(profile);
        if !full.is_file() {
            findings.warnings.push(format!(
                "PGO profile not found at {}; the compiler will reject -pgo",
                full.display()
            ));
        }
    }

    for program in [&config.build.compiler, &config.config_gen.program] {
        if which::which(program).is_err() {
            findings
                .warnings
                .push(format!("'{}' is not installed or not on PATH", program));
        }
    }
    findings.warnings.dedup();

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::{Config, VariantDescriptor};
    use std::path::Path;
    use tempfile::TempDir;

    fn project(root: &Path, config: Config) -> Project {
        Project {
            config,
            config_path: None,
            root: root.to_path_buf(),
        }
    }

    fn write_companions(root: &Path) {
        std::fs::write(root.join("README.md"), "# mosdns\n").unwrap();
        std::fs::write(root.join("LICENSE"), "GPL-3.0\n").unwrap();
        std::fs::write(root.join("default.pgo"), "pgo").unwrap();
    }

    #[test]
    fn test_complete_project_has_no_errors() {
        let temp = TempDir::new().unwrap();
        write_companions(temp.path());

        let findings = check_project(&project(temp.path(), Config::default()));
        assert!(findings.errors.is_empty(), "{:?}", findings.errors);
    }

    #[test]
    fn test_missing_companions_are_errors() {
        let temp = TempDir::new().unwrap();

        let findings = check_project(&project(temp.path(), Config::default()));
        assert_eq!(findings.errors.len(), 2);
        assert!(findings.errors[0].starts_with("Readme not found"));
        assert!(findings
            .warnings
            .iter()
            .any(|w| w.starts_with("PGO profile not found")));
    }

    #[test]
    fn test_variant_without_os_is_reported() {
        let temp = TempDir::new().unwrap();
        write_companions(temp.path());

        let mut config = Config::default();
        config.variants = vec![VariantDescriptor::new([("GOARCH", "arm64")]).unwrap()];

        let findings = check_project(&project(temp.path(), config));
        assert_eq!(findings.errors.len(), 1);
        assert!(findings.errors[0].starts_with("Variant 0:"));
    }

    #[test]
    fn test_missing_tool_is_a_warning() {
        let temp = TempDir::new().unwrap();
        write_companions(temp.path());

        let mut config = Config::default();
        config.build.compiler = "gantry-no-such-go".to_string();
        config.config_gen.program = "gantry-no-such-go".to_string();

        let findings = check_project(&project(temp.path(), config));
        assert!(findings.errors.is_empty());
        assert_eq!(
            findings
                .warnings
                .iter()
                .filter(|w| w.contains("gantry-no-such-go"))
                .count(),
            1
        );
    }
}
