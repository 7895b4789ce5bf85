//! Release archive packaging
//!
//! Archives are written to a temporary file next to their destination and
//! renamed into place once complete, so a failure never leaves a partial zip.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use gantry_core::{Config, NormalizedVariant};

use crate::artifacts::{Artifact, ArtifactMetadata};
use crate::error::{BuildError, Result};
use crate::layout::ReleaseLayout;
use crate::stamp::BuildStamp;

/// Archive name of the readme
pub const README_ENTRY: &str = "README.md";
/// Archive name of the license
pub const LICENSE_ENTRY: &str = "LICENSE";

const BINARY_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// One file to add to an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Source file on disk
    pub source: PathBuf,
    /// Name inside the archive
    pub name: String,
    /// Unix permissions recorded in the archive
    pub mode: u32,
}

impl ArchiveEntry {
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>, mode: u32) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            mode,
        }
    }
}

/// Bundles binaries with the project's companion files
#[derive(Debug, Clone)]
pub struct Packager {
    layout: ReleaseLayout,
    readme: PathBuf,
    license: PathBuf,
    generated_config: String,
    compression_level: u32,
}

impl Packager {
    pub fn from_config(config: &Config, layout: ReleaseLayout) -> Self {
        Self {
            readme: layout.project_file(&config.project.readme),
            license: layout.project_file(&config.project.license),
            generated_config: config.config_gen.output.clone(),
            compression_level: config.package.compression_level,
            layout,
        }
    }

    /// Entries of a variant's archive, in archive order
    pub fn entries(&self, variant: &NormalizedVariant) -> Vec<ArchiveEntry> {
        let binary = &variant.target.binary_name;
        vec![
            ArchiveEntry::new(self.layout.output_file(binary), binary, BINARY_MODE),
            ArchiveEntry::new(&self.readme, README_ENTRY, FILE_MODE),
            ArchiveEntry::new(
                self.layout.output_file(&self.generated_config),
                &self.generated_config,
                FILE_MODE,
            ),
            ArchiveEntry::new(&self.license, LICENSE_ENTRY, FILE_MODE),
        ]
    }

    /// Package a compiled variant into `<output_dir>/<archive_name>`
    pub fn package(&self, variant: &NormalizedVariant, stamp: &BuildStamp) -> Result<Artifact> {
        let destination = self.layout.output_file(&variant.target.archive_name);
        let entries = self.entries(variant);

        write_archive(&destination, &entries, self.compression_level)?;

        let metadata = ArtifactMetadata::new()
            .with_version(&stamp.version)
            .with_build_time(&stamp.build_time)
            .with_target(&variant.target.os, variant.target.arch.clone())
            .with_entries(entries.into_iter().map(|e| e.name).collect());

        let artifact = Artifact::new(&destination, &variant.label)
            .with_sha256()
            .with_metadata(metadata);

        info!(
            archive = %variant.target.archive_name,
            size = artifact.size,
            "packaged"
        );

        Ok(artifact)
    }
}

/// Write a deflated zip at `destination`, replacing any existing file
pub fn write_archive(destination: &Path, entries: &[ArchiveEntry], level: u32) -> Result<()> {
    let dir = destination.parent().unwrap_or_else(|| Path::new("."));

    let temp = tempfile::Builder::new()
        .prefix(".gantry-")
        .suffix(".zip.tmp")
        .tempfile_in(dir)?;

    let mut zip = ZipWriter::new(temp);

    for entry in entries {
        let mut source = File::open(&entry.source).map_err(|source| BuildError::CompanionFile {
            path: entry.source.clone(),
            source,
        })?;

        debug!(entry = %entry.name, source = %entry.source.display(), "adding archive entry");
        zip.start_file(entry.name.as_str(), entry_options(level, entry.mode))?;
        io::copy(&mut source, &mut zip)?;
    }

    let temp = zip.finish()?;
    temp.persist(destination).map_err(|e| BuildError::Io(e.error))?;

    Ok(())
}

/// Deflate at `level`, pinned to the zip epoch
fn entry_options(level: u32, mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(i64::from(level)))
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}
