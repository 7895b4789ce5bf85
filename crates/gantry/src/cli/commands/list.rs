//! List command - show the release matrix

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use gantry_core::{Config, Normalizer};

use crate::cli::{output, Cli, OutputFormat};

/// List the variants of the release matrix with their indexes
#[derive(Debug, Args)]
pub struct ListCommand {}

/// One row of the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRow {
    pub index: usize,
    pub variant: String,
    pub overrides: Vec<String>,
    pub archive: String,
    pub binary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_mode: Option<String>,
}

impl ListCommand {
    /// Execute the list command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing list command");
        let project = cli.load_project()?;
        let rows = variant_rows(&project.config)?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    for row in &rows {
                        println!("{}", row.archive);
                    }
                    return Ok(());
                }

                println!(
                    "{}",
                    output::header(&format!(
                        "{} {} - {} variant(s)",
                        project.config.project.name,
                        project.config.project.version,
                        rows.len()
                    ))
                );
                if let Some(ref path) = project.config_path {
                    println!("{}", output::key_value("config", &path.display().to_string()));
                }
                println!();

                for row in &rows {
                    println!(
                        "  {:>3}  {:<28} {}{}",
                        style(row.index).bold(),
                        row.variant,
                        output::archive_style().apply_to(&row.archive),
                        row.build_mode
                            .as_deref()
                            .map(|m| format!(" {}", style(m).dim()))
                            .unwrap_or_default()
                    );
                }
            }
        }

        Ok(())
    }
}

/// Rows for every configured variant, in catalog order.
///
/// Names are derived from the descriptor alone, so the listing does not depend
/// on the caller's `GOOS`/`GOARCH`.
pub fn variant_rows(config: &Config) -> anyhow::Result<Vec<VariantRow>> {
    let catalog = config.catalog()?;
    let normalizer = Normalizer::from_config(config);

    catalog
        .entries()
        .map(|(index, descriptor)| {
            let variant = normalizer.normalize(descriptor, Vec::<(String, String)>::new())?;
            Ok(VariantRow {
                index,
                variant: variant.label,
                overrides: descriptor.overrides().iter().map(|o| o.to_string()).collect(),
                archive: variant.target.archive_name,
                binary: variant.target.binary_name,
                build_mode: variant.target.build_mode,
            })
        })
        .collect()
}
