//! Target-platform variants
//!
//! A variant is an ordered list of environment overrides (`GOOS=linux`,
//! `GOARCH=amd64`, ...) that steer the compiler toward one target. The catalog
//! holds the variants of a release; the normalizer turns one of them into the
//! concrete environment and file names used by a build.

mod catalog;
mod descriptor;
mod normalize;

pub use catalog::{Catalog, BUILTIN_VARIANTS};
pub use descriptor::{EnvOverride, VariantDescriptor};
pub use normalize::{
    BuildEnvironment, BuildTarget, NormalizedVariant, Normalizer, ARCHIVE_EXTENSION,
    DEFAULT_AMD64_LEVEL, ENV_AMD64_LEVEL, ENV_ARCH, ENV_CGO_ENABLED, ENV_OS, PIE_BUILD_MODE,
    WINDOWS_EXE_SUFFIX,
};
