//! Release artifacts
//!
//! Every archive a run produces is described the same way, so the summary and
//! the CLI output do not need to know how it was made.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::Digest;

/// A produced release file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path to the artifact file
    pub path: PathBuf,

    /// Variant label, e.g. `linux/amd64/v3`
    pub variant: String,

    /// Size in bytes
    pub size: u64,

    /// SHA256 hash (hex encoded)
    pub sha256: Option<String>,

    /// Metadata about the artifact
    pub metadata: ArtifactMetadata,
}

impl Artifact {
    /// Create a new artifact
    pub fn new(path: impl Into<PathBuf>, variant: impl Into<String>) -> Self {
        let path = path.into();
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            path,
            variant: variant.into(),
            size,
            sha256: None,
            metadata: ArtifactMetadata::default(),
        }
    }

    /// Compute and set SHA256 hash
    pub fn with_sha256(mut self) -> Self {
        if let Ok(content) = std::fs::read(&self.path) {
            self.sha256 = Some(format!("{:x}", sha2::Sha256::digest(&content)));
        }
        self
    }

    /// Set metadata
    pub fn with_metadata(mut self, metadata: ArtifactMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Get filename
    pub fn filename(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Metadata about an artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Version string embedded in the binary
    pub version: Option<String>,

    /// Build timestamp embedded in the binary
    pub build_time: Option<String>,

    /// Target operating system
    pub os: Option<String>,

    /// Target architecture
    pub arch: Option<String>,

    /// Archive entry names, in archive order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<String>,
}

impl ArtifactMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_build_time(mut self, build_time: impl Into<String>) -> Self {
        self.build_time = Some(build_time.into());
        self
    }

    pub fn with_target(mut self, os: impl Into<String>, arch: Option<String>) -> Self {
        self.os = Some(os.into());
        self.arch = arch;
        self
    }

    pub fn with_entries(mut self, entries: Vec<String>) -> Self {
        self.entries = entries;
        self
    }
}
