//! Version and build-time stamp embedded into every binary of a run

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gantry_core::config::{is_valid_time_format, Config};

use crate::error::{BuildError, Result};

/// Reproducible-build timestamp override, in seconds since the epoch
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// Version and timestamp shared by all variants of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStamp {
    pub version: String,
    pub build_time: String,
}

impl BuildStamp {
    pub fn new(version: impl Into<String>, build_time: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build_time: build_time.into(),
        }
    }

    /// Stamp for a run; `source_date_epoch` pins the timestamp when set
    pub fn from_config(config: &Config, source_date_epoch: Option<&str>) -> Result<Self> {
        let build_time =
            format_build_time(&config.build.build_time_format, source_date_epoch, Local::now())?;
        debug!(version = %config.project.version, build_time = %build_time, "build stamp");
        Ok(Self::new(&config.project.version, build_time))
    }
}

/// Format the build time, preferring an explicit epoch over `now`
pub fn format_build_time(
    format: &str,
    source_date_epoch: Option<&str>,
    now: DateTime<Local>,
) -> Result<String> {
    if !is_valid_time_format(format) {
        return Err(BuildError::Timestamp(format!(
            "'{}' is not a valid strftime format",
            format
        )));
    }

    match source_date_epoch.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let secs: i64 = raw.parse().map_err(|_| {
                BuildError::Timestamp(format!("{}='{}' is not an integer", SOURCE_DATE_EPOCH, raw))
            })?;
            let instant = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                BuildError::Timestamp(format!("{}={} is out of range", SOURCE_DATE_EPOCH, secs))
            })?;
            Ok(instant.format(format).to_string())
        }
        None => Ok(now.format(format).to_string()),
    }
}
