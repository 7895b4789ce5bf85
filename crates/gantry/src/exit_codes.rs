//! Exit codes for the CLI

#![allow(dead_code)]

use gantry_build::BuildError;
use gantry_core::{GantryError, VariantError};

use crate::cli::commands::VariantsFailed;

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Required tool missing
pub const TOOL_NOT_FOUND: i32 = 3;

/// Validation error (bad index, malformed variant, invalid timestamp)
pub const VALIDATION_ERROR: i32 = 5;

/// Filesystem error
pub const IO_ERROR: i32 = 7;

/// Default config generation failed
pub const CONFIG_GENERATION_ERROR: i32 = 10;

/// At least one variant failed under `--strict`
pub const VARIANTS_FAILED: i32 = 11;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Exit code for an error reaching `main`
pub fn from_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<BuildError>() {
        return e.exit_code();
    }

    if let Some(e) = err.downcast_ref::<GantryError>() {
        return match e {
            GantryError::Config(_) => CONFIG_ERROR,
            GantryError::Variant(_) => VALIDATION_ERROR,
            GantryError::Io(_) => IO_ERROR,
        };
    }

    if err.downcast_ref::<VariantError>().is_some() {
        return VALIDATION_ERROR;
    }

    if err.downcast_ref::<VariantsFailed>().is_some() {
        return VARIANTS_FAILED;
    }

    if err.downcast_ref::<dialoguer::Error>().is_some() {
        return CANCELLED;
    }

    ERROR
}

/// Clamp to the range a process can report
pub fn process_code(code: i32) -> u8 {
    u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(ERROR as u8)
}
