//! Fixtures shared by the subprocess tests

use std::path::{Path, PathBuf};

/// Fake compiler: writes the variant's target triple into the `-o` file
pub const FAKE_GO: &str = r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
printf '%s %s %s %s %s' "$GOOS" "$GOARCH" "$GOAMD64" "$CGO_ENABLED" "$LEAK_CHECK" > "$out"
"#;

/// Write an executable `/bin/sh` script
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A mosdns-like project root with its companion files
pub fn write_project(root: &Path) {
    std::fs::write(root.join("README.md"), "# mosdns\n").unwrap();
    std::fs::write(root.join("LICENSE"), "GPL-3.0\n").unwrap();
    std::fs::write(root.join("default.pgo"), "pgo").unwrap();
}
