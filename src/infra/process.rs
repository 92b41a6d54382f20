//! Build command execution
//!
//! Runs shell commands in an explicit working directory and forwards their
//! merged stdout/stderr line by line.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::config::defaults;
use crate::error::BuildError;

/// Result of a finished shell command
#[derive(Debug)]
pub struct ShellOutcome {
    /// Exit status of the shell
    pub status: ExitStatus,
    /// Number of output lines forwarded
    pub lines: usize,
    /// Wall-clock duration
    pub duration: Duration,
}

impl ShellOutcome {
    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Locate the shell used for build commands
pub fn find_shell() -> Result<PathBuf, BuildError> {
    which::which(defaults::BUILD_SHELL).map_err(|_| BuildError::ShellNotFound {
        shell: defaults::BUILD_SHELL.to_string(),
    })
}

/// Run `command` through the build shell inside `cwd`
///
/// Each line of stdout and stderr is passed to `on_line` as soon as it is
/// read. The caller's working directory is left untouched.
pub async fn run_shell(
    command: &str,
    cwd: &Path,
    on_line: &mut dyn FnMut(&str),
) -> Result<ShellOutcome, BuildError> {
    let shell = find_shell()?;
    let start = Instant::now();

    tracing::debug!("Running `{command}` in {}", cwd.display());

    let mut child = Command::new(&shell)
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| BuildError::Spawn {
            command: command.to_string(),
            dir: cwd.to_path_buf(),
            error: e.to_string(),
        })?;

    let read_error = |e: std::io::Error| BuildError::Output {
        command: command.to_string(),
        error: e.to_string(),
    };

    let mut lines = 0;
    if let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) {
        let mut stdout = BufReader::new(stdout);
        let mut stderr = BufReader::new(stderr);
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        let mut stdout_open = true;
        let mut stderr_open = true;

        // Build output is not guaranteed to be UTF-8, lines are decoded lossily
        while stdout_open || stderr_open {
            tokio::select! {
                read = stdout.read_until(b'\n', &mut stdout_buf), if stdout_open => {
                    if read.map_err(read_error)? == 0 {
                        stdout_open = false;
                    } else {
                        on_line(&decode_line(&stdout_buf));
                        stdout_buf.clear();
                        lines += 1;
                    }
                },
                read = stderr.read_until(b'\n', &mut stderr_buf), if stderr_open => {
                    if read.map_err(read_error)? == 0 {
                        stderr_open = false;
                    } else {
                        on_line(&decode_line(&stderr_buf));
                        stderr_buf.clear();
                        lines += 1;
                    }
                },
            }
        }
    }

    let status = child.wait().await.map_err(read_error)?;

    Ok(ShellOutcome {
        status,
        lines,
        duration: start.elapsed(),
    })
}

/// Strip the line terminator and replace invalid UTF-8
fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_shell_streams_both_streams() {
        let temp = TempDir::new().unwrap();
        let mut seen = Vec::new();

        let outcome = run_shell("echo out; echo err 1>&2; echo done", temp.path(), &mut |l: &str| {
            seen.push(l.to_string());
        })
        .await
        .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.lines, 3);
        assert!(seen.contains(&"out".to_string()));
        assert!(seen.contains(&"err".to_string()));
        assert!(seen.contains(&"done".to_string()));
    }

    #[tokio::test]
    async fn test_run_shell_uses_given_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "here").unwrap();
        let before = std::env::current_dir().unwrap();
        let mut seen = Vec::new();

        run_shell("cat marker.txt", temp.path(), &mut |l: &str| seen.push(l.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["here".to_string()]);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[tokio::test]
    async fn test_run_shell_reports_exit_status() {
        let temp = TempDir::new().unwrap();
        let outcome = run_shell("exit 3", temp.path(), &mut |_: &str| {})
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_run_shell_tolerates_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let mut seen = Vec::new();

        let outcome = run_shell(
            "printf 'caf\\xe9\\n'; printf 'ok\\xff' 1>&2; exit 0",
            temp.path(),
            &mut |l: &str| seen.push(l.to_string()),
        )
        .await
        .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.lines, 2);
        assert!(seen.contains(&"caf\u{FFFD}".to_string()));
        assert!(seen.contains(&"ok\u{FFFD}".to_string()));
    }

    #[test]
    fn test_decode_line_strips_terminators() {
        assert_eq!(decode_line(b"built\r\n"), "built");
        assert_eq!(decode_line(b"last"), "last");
        assert_eq!(decode_line(b"\xe9t\xe9\n"), "\u{FFFD}t\u{FFFD}");
    }

    #[tokio::test]
    async fn test_run_shell_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = run_shell("true", &temp.path().join("missing"), &mut |_: &str| {}).await;
        assert!(matches!(result, Err(BuildError::Spawn { .. })));
    }
}
