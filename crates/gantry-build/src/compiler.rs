//! Compiler invocation
//!
//! One call per variant. The child process inherits the caller's environment
//! with the variant's build environment applied on top, and runs inside the
//! output directory, where it leaves the binary.

use std::path::PathBuf;
use std::process::Command;

use tracing::{info, instrument};

use gantry_core::{Config, NormalizedVariant};

use crate::error::{BuildError, Result};
use crate::layout::ReleaseLayout;
use crate::process::{render_command_line, run_command};
use crate::stamp::BuildStamp;

/// Everything one compilation needs
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub variant: &'a NormalizedVariant,
    pub stamp: &'a BuildStamp,
    pub layout: &'a ReleaseLayout,
}

/// Compiles one variant into a binary
pub trait Compiler {
    /// Unique identifier, e.g. "go"
    fn id(&self) -> &str;

    /// Check the toolchain is available before anything runs
    fn check_prerequisites(&self) -> Result<()> {
        Ok(())
    }

    /// Command line that `compile` runs, for logs and dry runs
    fn command_line(&self, request: &CompileRequest<'_>) -> String;

    /// Compile the variant, returning the path of the produced binary
    fn compile(&self, request: &CompileRequest<'_>) -> Result<PathBuf>;
}

/// `go build` driven compiler
#[derive(Debug, Clone)]
pub struct GoCompiler {
    program: String,
    source: PathBuf,
    pgo_profile: Option<PathBuf>,
    trimpath: bool,
    strip: bool,
    version_symbol: String,
    build_time_symbol: String,
}

impl GoCompiler {
    /// Create a compiler from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.build.compiler.clone(),
            source: config.project.source.clone(),
            pgo_profile: config.build.pgo_profile.clone(),
            trimpath: config.build.trimpath,
            strip: config.build.strip,
            version_symbol: config.build.version_symbol.clone(),
            build_time_symbol: config.build.build_time_symbol.clone(),
        }
    }

    /// Use a different compiler program
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Linker flags embedding the version and build time
    pub fn ldflags(&self, stamp: &BuildStamp) -> String {
        let mut flags = Vec::new();
        if self.strip {
            flags.push("-s -w".to_string());
        }
        flags.push("-buildid=".to_string());
        flags.push(format!("-X {}={}", self.version_symbol, stamp.version));
        flags.push(format!("-X {}={}", self.build_time_symbol, stamp.build_time));
        flags.join(" ")
    }

    /// Arguments passed to the compiler program
    pub fn args(&self, request: &CompileRequest<'_>) -> Vec<String> {
        let target = &request.variant.target;
        let mut args = vec!["build".to_string()];

        if let Some(ref mode) = target.build_mode {
            args.push(mode.clone());
        }

        if let Some(ref profile) = self.pgo_profile {
            args.push(format!(
                "-pgo={}",
                request.layout.from_output_dir(profile).display()
            ));
        }

        if self.trimpath {
            args.push("-trimpath".to_string());
        }

        args.push("-ldflags".to_string());
        args.push(self.ldflags(request.stamp));
        args.push("-o".to_string());
        args.push(target.binary_name.clone());
        args.push(
            request
                .layout
                .from_output_dir(&self.source)
                .display()
                .to_string(),
        );

        args
    }
}

impl Compiler for GoCompiler {
    fn id(&self) -> &str {
        "go"
    }

    fn check_prerequisites(&self) -> Result<()> {
        which::which(&self.program).map(|_| ()).map_err(|_| {
            BuildError::tool_not_found(
                &self.program,
                "Install Go from https://go.dev/dl/ or point build.compiler at it",
            )
        })
    }

    fn command_line(&self, request: &CompileRequest<'_>) -> String {
        render_command_line(&self.program, self.args(request))
    }

    #[instrument(skip(self, request), fields(archive = %request.variant.target.archive_name))]
    fn compile(&self, request: &CompileRequest<'_>) -> Result<PathBuf> {
        let command_line = self.command_line(request);
        info!(variant = %request.variant.label, command = %command_line, "compiling");

        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(request))
            .current_dir(request.layout.output_dir())
            .envs(request.variant.env.iter());

        run_command(&mut cmd, &command_line)?;

        let binary = request
            .layout
            .output_file(&request.variant.target.binary_name);
        if !binary.is_file() {
            return Err(BuildError::ArtifactNotFound {
                expected_path: binary,
            });
        }

        Ok(binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::{Catalog, Normalizer, VariantDescriptor};

    fn normalized(descriptor: &VariantDescriptor) -> NormalizedVariant {
        Normalizer::new("mosdns")
            .normalize(descriptor, Vec::<(String, String)>::new())
            .unwrap()
    }

    fn stamp() -> BuildStamp {
        BuildStamp::new("4.6.0", "24.03.09")
    }

    #[test]
    fn test_linux_v3_args() {
        let config = Config::default();
        let compiler = GoCompiler::from_config(&config);
        let variant = normalized(Catalog::builtin().get(3).unwrap());
        let layout = ReleaseLayout::new("/work/mosdns", "release");
        let stamp = stamp();
        let request = CompileRequest {
            variant: &variant,
            stamp: &stamp,
            layout: &layout,
        };

        assert_eq!(
            compiler.args(&request),
            vec![
                "build",
                "-buildmode=pie",
                "-pgo=../default.pgo",
                "-trimpath",
                "-ldflags",
                "-s -w -buildid= -X github.com/pmkol/mosdns-x/constant.Version=4.6.0 -X github.com/pmkol/mosdns-x/constant.BuildTime=24.03.09",
                "-o",
                "mosdns",
                "..",
            ]
        );
    }

    #[test]
    fn test_windows_args_have_no_build_mode() {
        let config = Config::default();
        let compiler = GoCompiler::from_config(&config);
        let variant = normalized(&VariantDescriptor::new([("GOOS", "windows"), ("GOARCH", "amd64")]).unwrap());
        let layout = ReleaseLayout::new("/work/mosdns", "release");
        let stamp = stamp();
        let request = CompileRequest {
            variant: &variant,
            stamp: &stamp,
            layout: &layout,
        };

        let args = compiler.args(&request);
        assert!(!args.iter().any(|a| a.starts_with("-buildmode")));
        assert_eq!(args[1], "-pgo=../default.pgo");
        assert!(args.windows(2).any(|w| w[0] == "-o" && w[1] == "mosdns.exe"));
    }

    #[test]
    fn test_optional_flags() {
        let mut config = Config::default();
        config.build.pgo_profile = None;
        config.build.trimpath = false;
        config.build.strip = false;
        let compiler = GoCompiler::from_config(&config);

        assert_eq!(
            compiler.ldflags(&stamp()),
            "-buildid= -X github.com/pmkol/mosdns-x/constant.Version=4.6.0 -X github.com/pmkol/mosdns-x/constant.BuildTime=24.03.09"
        );

        let variant = normalized(Catalog::builtin().get(0).unwrap());
        let layout = ReleaseLayout::new("/work/mosdns", "release");
        let stamp = stamp();
        let request = CompileRequest {
            variant: &variant,
            stamp: &stamp,
            layout: &layout,
        };
        let args = compiler.args(&request);
        assert!(!args.iter().any(|a| a.starts_with("-pgo") || a == "-trimpath"));
    }

    #[test]
    fn test_missing_compiler_fails_prerequisites() {
        let compiler =
            GoCompiler::from_config(&Config::default()).with_program("gantry-no-such-compiler");
        assert!(matches!(
            compiler.check_prerequisites(),
            Err(BuildError::ToolNotFound { .. })
        ));
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use crate::test_support::{write_script, FAKE_GO};
        use tempfile::TempDir;

        #[test]
        fn test_compile_uses_variant_environment() {
            let temp = TempDir::new().unwrap();
            let script = write_script(temp.path(), "fake-go", FAKE_GO);
            let layout = ReleaseLayout::new(temp.path(), "release");
            std::fs::create_dir_all(layout.output_dir()).unwrap();

            let compiler = GoCompiler::from_config(&Config::default())
                .with_program(script.to_string_lossy());
            let variant = Normalizer::new("mosdns")
                .normalize(
                    &VariantDescriptor::new([("GOOS", "windows"), ("GOARCH", "amd64")]).unwrap(),
                    [("LEAK_CHECK", "ambient")],
                )
                .unwrap();
            let stamp = stamp();

            let binary = compiler
                .compile(&CompileRequest {
                    variant: &variant,
                    stamp: &stamp,
                    layout: &layout,
                })
                .unwrap();

            assert_eq!(binary, layout.output_file("mosdns.exe"));
            let content = std::fs::read_to_string(&binary).unwrap();
            assert_eq!(content, "windows amd64 v3 0 ambient");
        }

        #[test]
        fn test_compile_failure_reports_stderr() {
            let temp = TempDir::new().unwrap();
            let script = write_script(temp.path(), "broken-go", "echo 'undefined: foo' >&2\nexit 2\n");
            let layout = ReleaseLayout::new(temp.path(), "release");
            std::fs::create_dir_all(layout.output_dir()).unwrap();

            let compiler = GoCompiler::from_config(&Config::default())
                .with_program(script.to_string_lossy());
            let variant = normalized(Catalog::builtin().get(5).unwrap());
            let stamp = stamp();

            let err = compiler
                .compile(&CompileRequest {
                    variant: &variant,
                    stamp: &stamp,
                    layout: &layout,
                })
                .unwrap_err();

            assert!(err.to_string().contains("undefined: foo"));
            assert!(!layout.output_file("mosdns").exists());
        }

        #[test]
        fn test_compile_without_binary_is_artifact_not_found() {
            let temp = TempDir::new().unwrap();
            let script = write_script(temp.path(), "silent-go", "exit 0\n");
            let layout = ReleaseLayout::new(temp.path(), "release");
            std::fs::create_dir_all(layout.output_dir()).unwrap();

            let compiler = GoCompiler::from_config(&Config::default())
                .with_program(script.to_string_lossy());
            let variant = normalized(Catalog::builtin().get(5).unwrap());
            let stamp = stamp();

            let err = compiler
                .compile(&CompileRequest {
                    variant: &variant,
                    stamp: &stamp,
                    layout: &layout,
                })
                .unwrap_err();
            assert!(matches!(err, BuildError::ArtifactNotFound { .. }));
        }
    }
}
