//! Release directory layout
//!
//! Every subprocess runs inside the output directory. Paths handed to those
//! subprocesses are expressed relative to it (`../default.pgo`) when the output
//! directory lives under the project root, and absolute otherwise.

use std::path::{Component, Path, PathBuf};

/// Project root and release output directory of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLayout {
    root: PathBuf,
    output_dir: PathBuf,
    back_to_root: Option<PathBuf>,
}

impl ReleaseLayout {
    /// Create a layout; `output_dir` is resolved against `root` when relative
    pub fn new(root: impl Into<PathBuf>, output_dir: impl AsRef<Path>) -> Self {
        let root = root.into();
        let output_dir = output_dir.as_ref();

        Self {
            back_to_root: back_to_root(output_dir),
            output_dir: root.join(output_dir),
            root,
        }
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output directory; working directory of every subprocess
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of a file inside the output directory
    pub fn output_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Path of a project file, resolved against the root
    pub fn project_file(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// A project path as seen from the output directory
    pub fn from_output_dir(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            return path.to_path_buf();
        }

        match &self.back_to_root {
            Some(up) => join_clean(up, path),
            None => join_clean(&self.root, path),
        }
    }
}

/// `../..` for an output directory made only of plain components
fn back_to_root(output_dir: &Path) -> Option<PathBuf> {
    if output_dir.is_absolute() {
        return None;
    }

    let mut up = PathBuf::new();
    for component in output_dir.components() {
        match component {
            Component::Normal(_) => up.push(".."),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(up)
}

/// Join without leaving `.` components behind
fn join_clean(base: &Path, path: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in path.components() {
        if component != Component::CurDir {
            joined.push(component);
        }
    }
    if joined.as_os_str().is_empty() {
        joined.push(".");
    }
    joined
}
