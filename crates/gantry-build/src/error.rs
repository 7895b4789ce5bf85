//! Error types for the build engine

use std::path::PathBuf;
use thiserror::Error;

use gantry_core::{GantryError, VariantError};

/// Result type for build operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build engine errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Toolchain program not installed
    #[error("Required tool '{tool}' not found. {install_hint}")]
    ToolNotFound { tool: String, install_hint: String },

    /// Subprocess exited unsuccessfully
    #[error("Command failed ({}): {command}{}", describe_exit(.exit_code), stderr_tail(.stderr))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Default-config generation failed
    #[error("Config generation failed: {message}")]
    ConfigGeneration {
        message: String,
        #[source]
        source: Option<Box<BuildError>>,
    },

    /// Artifact not found after a successful command
    #[error("Expected artifact not found at {expected_path}")]
    ArtifactNotFound { expected_path: PathBuf },

    /// Output directory could not be prepared
    #[error("Cannot prepare output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Companion file could not be read
    #[error("Cannot read {path}: {source}")]
    CompanionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be written
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Invalid build timestamp input
    #[error("Invalid build timestamp: {0}")]
    Timestamp(String),

    /// Variant selection or normalization failed
    #[error(transparent)]
    Variant(#[from] VariantError),

    /// Configuration or other core error
    #[error(transparent)]
    Core(#[from] GantryError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(5);
    format!("\n{}", lines[start..].join("\n"))
}

impl BuildError {
    /// Create a config generation error
    pub fn config_generation(message: impl Into<String>) -> Self {
        Self::ConfigGeneration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a tool not found error with install hint
    pub fn tool_not_found(tool: impl Into<String>, install_hint: impl Into<String>) -> Self {
        Self::ToolNotFound {
            tool: tool.into(),
            install_hint: install_hint.into(),
        }
    }

    /// Whether this error aborts the whole run rather than one variant
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. }
                | Self::ConfigGeneration { .. }
                | Self::OutputDirectory { .. }
                | Self::Timestamp(_)
                | Self::Variant(_)
                | Self::Core(_)
        )
    }

    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(GantryError::Config(_)) => 2,
            Self::ToolNotFound { .. } => 3,
            Self::Variant(_) | Self::Core(GantryError::Variant(_)) => 5,
            Self::Timestamp(_) => 5,
            Self::ConfigGeneration { .. } => 10,
            Self::OutputDirectory { .. } => 7,
            Self::CommandFailed { exit_code, .. } => exit_code.unwrap_or(1),
            Self::ArtifactNotFound { .. } => 13,
            Self::CompanionFile { .. } | Self::Archive(_) => 14,
            Self::Io(_) | Self::Core(GantryError::Io(_)) => 7,
        }
    }
}
