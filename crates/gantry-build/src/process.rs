//! Subprocess helpers shared by the compiler and the config generator

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::{BuildError, Result};

/// Render a program and its arguments as a copy-pasteable command line
pub fn render_command_line<I, S>(program: &str, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut line = quote(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote(&arg.as_ref().to_string_lossy()));
    }
    line
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Run a command to completion, capturing its output.
///
/// A missing program maps to [`BuildError::ToolNotFound`], a non-zero exit to
/// [`BuildError::CommandFailed`].
pub fn run_command(cmd: &mut Command, command_line: &str) -> Result<Output> {
    debug!(command = %command_line, "spawning");

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => BuildError::tool_not_found(
                cmd.get_program().to_string_lossy(),
                format!("Could not start `{}`: {}", command_line, e),
            ),
            _ => BuildError::Io(e),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !stdout.trim().is_empty() {
        debug!(command = %command_line, stdout = %stdout.trim_end(), "command stdout");
    }
    if !stderr.trim().is_empty() {
        debug!(command = %command_line, stderr = %stderr.trim_end(), "command stderr");
    }

    if !output.status.success() {
        return Err(BuildError::CommandFailed {
            command: command_line.to_string(),
            exit_code: output.status.code(),
            stdout,
            stderr,
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command_line_quotes_spaces() {
        let line = render_command_line("go", ["build", "-ldflags", "-s -w", "-o", "mosdns"]);
        assert_eq!(line, "go build -ldflags \"-s -w\" -o mosdns");
    }

    #[test]
    fn test_missing_program_is_tool_not_found() {
        let mut cmd = Command::new("gantry-definitely-missing-tool");
        let err = run_command(&mut cmd, "gantry-definitely-missing-tool").unwrap_err();
        assert!(matches!(err, BuildError::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command_returns_output() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo built; echo note >&2"]);
        let output = run_command(&mut cmd, "sh -c \"echo built\"").unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "built\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_captures_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo broken >&2; exit 3"]);
        match run_command(&mut cmd, "sh -c ...").unwrap_err() {
            BuildError::CommandFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert!(stderr.contains("broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
