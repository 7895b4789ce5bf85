//! Variant normalization
//!
//! Turns a descriptor into the environment the compiler runs with and the
//! names of everything the build produces. The rules:
//!
//! 1. start from a copy of the ambient environment
//! 2. apply the descriptor overrides in order (later entries win)
//! 3. force `CGO_ENABLED=0` so binaries are statically linked
//! 4. amd64 targets without an explicit `GOAMD64` get the default level
//! 5. windows binaries get an `.exe` suffix
//! 6. archives are named `{project}-{values joined by '-'}.zip`
//! 7. linux builds use `-buildmode=pie`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::VariantError;

use super::descriptor::VariantDescriptor;

/// Target operating system variable
pub const ENV_OS: &str = "GOOS";
/// Target architecture variable
pub const ENV_ARCH: &str = "GOARCH";
/// amd64 micro-architecture level variable
pub const ENV_AMD64_LEVEL: &str = "GOAMD64";
/// Native interop switch
pub const ENV_CGO_ENABLED: &str = "CGO_ENABLED";

/// Level injected for amd64 targets that do not pick one
pub const DEFAULT_AMD64_LEVEL: &str = "v3";
/// Executable suffix on windows
pub const WINDOWS_EXE_SUFFIX: &str = ".exe";
/// Build mode passed for linux targets
pub const PIE_BUILD_MODE: &str = "-buildmode=pie";
/// Archive file extension
pub const ARCHIVE_EXTENSION: &str = "zip";

const AMD64: &str = "amd64";
const WINDOWS: &str = "windows";
const LINUX: &str = "linux";

/// Environment a single variant is compiled with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironment(BTreeMap<String, String>);

impl BuildEnvironment {
    /// Copy of an ambient environment
    pub fn from_ambient<I, K, V>(ambient: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            ambient
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Names and flags derived from a variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Target operating system
    pub os: String,
    /// Target architecture, if any was resolved
    pub arch: Option<String>,
    /// Binary file name, e.g. `mosdns` or `mosdns.exe`
    pub binary_name: String,
    /// Archive file name, e.g. `mosdns-linux-amd64-v3.zip`
    pub archive_name: String,
    /// Platform-conditional build mode flag
    pub build_mode: Option<String>,
}

/// A variant ready to be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVariant {
    /// Human-readable label, e.g. `linux/amd64/v3`
    pub label: String,
    pub env: BuildEnvironment,
    pub target: BuildTarget,
}

/// Derives build environments and targets from descriptors
#[derive(Debug, Clone)]
pub struct Normalizer {
    project_name: String,
    default_amd64_level: String,
}

impl Normalizer {
    /// Create a normalizer for a project
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            default_amd64_level: DEFAULT_AMD64_LEVEL.to_string(),
        }
    }

    /// Create a normalizer from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.project.name).with_default_amd64_level(&config.build.default_amd64_level)
    }

    /// Override the injected amd64 level
    pub fn with_default_amd64_level(mut self, level: impl Into<String>) -> Self {
        self.default_amd64_level = level.into();
        self
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Normalize a descriptor against an ambient environment
    pub fn normalize<I, K, V>(
        &self,
        descriptor: &VariantDescriptor,
        ambient: I,
    ) -> Result<NormalizedVariant, VariantError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = self.environment(descriptor, ambient);
        let target = self.target(descriptor, &env)?;

        debug!(
            variant = %descriptor.label(),
            archive = %target.archive_name,
            binary = %target.binary_name,
            amd64_level = env.get(ENV_AMD64_LEVEL),
            "normalized variant"
        );

        Ok(NormalizedVariant {
            label: descriptor.label(),
            env,
            target,
        })
    }

    /// Effective build environment for a descriptor
    pub fn environment<I, K, V>(&self, descriptor: &VariantDescriptor, ambient: I) -> BuildEnvironment
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = BuildEnvironment::from_ambient(ambient);

        for o in descriptor.overrides() {
            env.set(o.key(), o.value());
        }

        env.set(ENV_CGO_ENABLED, "0");

        if env.get(ENV_ARCH) == Some(AMD64) && !descriptor.contains_key(ENV_AMD64_LEVEL) {
            env.set(ENV_AMD64_LEVEL, self.default_amd64_level.as_str());
        }

        env
    }

    /// Names and flags for a descriptor built with `env`
    pub fn target(
        &self,
        descriptor: &VariantDescriptor,
        env: &BuildEnvironment,
    ) -> Result<BuildTarget, VariantError> {
        let os = env
            .get(ENV_OS)
            .filter(|os| !os.is_empty())
            .ok_or_else(|| VariantError::MissingTargetOs {
                variant: descriptor.label(),
                key: ENV_OS,
            })?;

        let binary_name = if os == WINDOWS {
            format!("{}{}", self.project_name, WINDOWS_EXE_SUFFIX)
        } else {
            self.project_name.clone()
        };

        let build_mode = (os == LINUX).then(|| PIE_BUILD_MODE.to_string());

        Ok(BuildTarget {
            os: os.to_string(),
            arch: env.get(ENV_ARCH).map(str::to_string),
            binary_name,
            archive_name: self.archive_name(descriptor),
            build_mode,
        })
    }

    /// `{project}-{values joined by '-'}.zip`
    pub fn archive_name(&self, descriptor: &VariantDescriptor) -> String {
        let mut name = self.project_name.clone();
        for value in descriptor.values() {
            name.push('-');
            name.push_str(value);
        }
        format!("{}.{}", name, ARCHIVE_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Catalog;

    fn no_ambient() -> Vec<(String, String)> {
        Vec::new()
    }

    fn descriptor(pairs: &[(&str, &str)]) -> VariantDescriptor {
        VariantDescriptor::new(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_amd64_gets_default_level() {
        let n = Normalizer::new("mosdns");
        let v = n
            .normalize(&descriptor(&[("GOOS", "linux"), ("GOARCH", "amd64")]), no_ambient())
            .unwrap();
        assert_eq!(v.env.get(ENV_AMD64_LEVEL), Some("v3"));
    }

    #[test]
    fn test_explicit_level_is_kept() {
        let n = Normalizer::new("mosdns");
        for level in ["v1", "v2", "v3", "v4"] {
            let d = descriptor(&[("GOOS", "linux"), ("GOARCH", "amd64"), ("GOAMD64", level)]);
            let v = n.normalize(&d, no_ambient()).unwrap();
            assert_eq!(v.env.get(ENV_AMD64_LEVEL), Some(level));
        }
    }

    #[test]
    fn test_default_level_ignores_ambient_level() {
        let n = Normalizer::new("mosdns");
        let ambient = [("GOAMD64", "v1")];
        let v = n
            .normalize(&descriptor(&[("GOOS", "linux"), ("GOARCH", "amd64")]), ambient)
            .unwrap();
        assert_eq!(v.env.get(ENV_AMD64_LEVEL), Some("v3"));
    }

    #[test]
    fn test_non_amd64_has_no_level() {
        let n = Normalizer::new("mosdns");
        let v = n
            .normalize(&descriptor(&[("GOOS", "linux"), ("GOARCH", "arm64")]), no_ambient())
            .unwrap();
        assert_eq!(v.env.get(ENV_AMD64_LEVEL), None);
    }

    #[test]
    fn test_configured_default_level() {
        let n = Normalizer::new("mosdns").with_default_amd64_level("v2");
        let v = n
            .normalize(&descriptor(&[("GOOS", "freebsd"), ("GOARCH", "amd64")]), no_ambient())
            .unwrap();
        assert_eq!(v.env.get(ENV_AMD64_LEVEL), Some("v2"));
    }

    #[test]
    fn test_cgo_always_disabled() {
        let n = Normalizer::new("mosdns");
        let ambient = [("CGO_ENABLED", "1")];
        let d = descriptor(&[("GOOS", "linux"), ("GOARCH", "arm64"), ("CGO_ENABLED", "1")]);
        let v = n.normalize(&d, ambient).unwrap();
        assert_eq!(v.env.get(ENV_CGO_ENABLED), Some("0"));
    }

    #[test]
    fn test_ambient_passes_through() {
        let n = Normalizer::new("mosdns");
        let ambient = [("PATH", "/usr/bin"), ("GOOS", "plan9")];
        let v = n
            .normalize(&descriptor(&[("GOOS", "linux"), ("GOARCH", "arm64")]), ambient)
            .unwrap();
        assert_eq!(v.env.get("PATH"), Some("/usr/bin"));
        assert_eq!(v.env.get(ENV_OS), Some("linux"));
    }

    #[test]
    fn test_later_override_wins() {
        let n = Normalizer::new("mosdns");
        let d = descriptor(&[("GOOS", "darwin"), ("GOARCH", "arm64"), ("GOOS", "linux")]);
        let v = n.normalize(&d, no_ambient()).unwrap();
        assert_eq!(v.target.os, "linux");
        assert_eq!(v.target.archive_name, "mosdns-darwin-arm64-linux.zip");
    }

    #[test]
    fn test_archive_name_follows_values() {
        let n = Normalizer::new("mosdns");
        let d = descriptor(&[("GOOS", "linux"), ("GOARCH", "mipsle"), ("GOMIPS", "softfloat")]);
        assert_eq!(n.archive_name(&d), "mosdns-linux-mipsle-softfloat.zip");

        let swapped = descriptor(&[("GOARCH", "mipsle"), ("GOOS", "linux"), ("GOMIPS", "softfloat")]);
        assert_eq!(n.archive_name(&swapped), "mosdns-mipsle-linux-softfloat.zip");
    }

    #[test]
    fn test_exe_suffix_only_on_windows() {
        let n = Normalizer::new("mosdns");
        for d in Catalog::builtin().iter() {
            let v = n.normalize(d, no_ambient()).unwrap();
            if v.target.os == "windows" {
                assert_eq!(v.target.binary_name, "mosdns.exe");
            } else {
                assert_eq!(v.target.binary_name, "mosdns");
            }
        }
    }

    #[test]
    fn test_build_mode_only_on_linux() {
        let n = Normalizer::new("mosdns");
        for d in Catalog::builtin().iter() {
            let v = n.normalize(d, no_ambient()).unwrap();
            assert_eq!(v.target.build_mode.is_some(), v.target.os == "linux");
        }
    }

    #[test]
    fn test_linux_amd64_v3_target() {
        let n = Normalizer::new("mosdns");
        let d = Catalog::builtin().get(3).cloned().unwrap();
        let v = n.normalize(&d, no_ambient()).unwrap();

        assert_eq!(v.target.archive_name, "mosdns-linux-amd64-v3.zip");
        assert_eq!(v.target.binary_name, "mosdns");
        assert_eq!(v.target.build_mode.as_deref(), Some(PIE_BUILD_MODE));
    }

    #[test]
    fn test_windows_amd64_target() {
        let n = Normalizer::new("mosdns");
        let d = descriptor(&[("GOOS", "windows"), ("GOARCH", "amd64")]);
        let v = n.normalize(&d, no_ambient()).unwrap();

        assert_eq!(v.env.get(ENV_AMD64_LEVEL), Some("v3"));
        assert_eq!(v.target.binary_name, "mosdns.exe");
        assert_eq!(v.target.archive_name, "mosdns-windows-amd64.zip");
        assert_eq!(v.target.build_mode, None);
    }

    #[test]
    fn test_missing_os_fails() {
        let n = Normalizer::new("mosdns");
        let err = n
            .normalize(&descriptor(&[("GOARCH", "arm64")]), no_ambient())
            .unwrap_err();
        assert!(matches!(err, VariantError::MissingTargetOs { .. }));
    }

    #[test]
    fn test_ambient_os_counts() {
        let n = Normalizer::new("mosdns");
        let v = n
            .normalize(&descriptor(&[("GOARCH", "arm64")]), [("GOOS", "linux")])
            .unwrap();
        assert_eq!(v.target.os, "linux");
        assert_eq!(v.target.archive_name, "mosdns-arm64.zip");
    }
}
