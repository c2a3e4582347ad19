//! Child-process execution primitives.
//!
//! External commands are the pipeline's only moving parts, so their
//! outcome is modeled explicitly: every invocation yields a
//! [`CommandOutcome`] (exit code plus captured streams) that callers
//! inspect with ordinary predicates instead of exception control flow.
//! Captured output is appended to a per-stage log file so a failed run
//! can be diagnosed without re-running it.

use std::ffi::{OsStr, OsString};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

/// Result of one external command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutcome {
    /// Whether the command exited zero. Artifact post-conditions are
    /// checked separately by the orchestrator.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<std::process::Output> for CommandOutcome {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Scoped execution context for commands that need the installed
/// toolchain on their search paths.
///
/// The ambient process environment is never mutated; the augmented
/// `PATH`/`PYTHONPATH` values are applied per-command, so concurrent or
/// future runs cannot observe each other's toolchains.
#[derive(Debug, Clone)]
pub struct ExecContext {
    /// Executable directory of the installed toolchain (`<tool>/bin`).
    bin_dir: PathBuf,
    /// `PATH` with the toolchain's bin directory prepended.
    search_path: OsString,
    /// `PYTHONPATH` with the toolchain install root prepended.
    python_path: OsString,
}

impl ExecContext {
    /// Build a context for a toolchain installed under `install_dir`,
    /// layering on top of the current process environment.
    pub fn for_install_dir(install_dir: &Path) -> Self {
        Self::with_base(
            install_dir,
            std::env::var_os("PATH"),
            std::env::var_os("PYTHONPATH"),
        )
    }

    /// Build a context over explicit base paths (test seam).
    pub fn with_base(
        install_dir: &Path,
        base_path: Option<OsString>,
        base_python_path: Option<OsString>,
    ) -> Self {
        let bin_dir = install_dir.join("bin");
        Self {
            search_path: prepend_path(bin_dir.as_os_str(), base_path.as_deref()),
            python_path: prepend_path(install_dir.as_os_str(), base_python_path.as_deref()),
            bin_dir,
        }
    }

    /// Executable directory of the installed toolchain.
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// The augmented executable search path.
    pub fn search_path(&self) -> &OsStr {
        &self.search_path
    }

    /// Apply the augmented paths to a child command.
    pub fn apply(&self, command: &mut Command) {
        command
            .env("PATH", &self.search_path)
            .env("PYTHONPATH", &self.python_path);
    }
}

fn prepend_path(head: &OsStr, base: Option<&OsStr>) -> OsString {
    let mut joined = OsString::from(head);
    if let Some(base) = base.filter(|b| !b.is_empty()) {
        joined.push(":");
        joined.push(base);
    }
    joined
}

/// Run a command to completion, capturing both streams, and append the
/// capture to `log_file`.
///
/// # Errors
///
/// Returns an error when the command cannot be spawned or the log file
/// cannot be written; a non-zero exit is NOT an error here — it is
/// reported through the returned [`CommandOutcome`].
pub async fn run_logged(command: &mut Command, log_file: &Path) -> io::Result<CommandOutcome> {
    debug!(command = ?command.as_std(), log = %log_file.display(), "Running external command");

    let outcome = CommandOutcome::from(command.output().await?);
    append_capture(log_file, &outcome)?;
    Ok(outcome)
}

/// Append a command's captured output to its stage log. Failures log the
/// exit code ahead of both streams so the log alone tells the story.
fn append_capture(log_file: &Path, outcome: &CommandOutcome) -> io::Result<()> {
    let mut log = OpenOptions::new().create(true).append(true).open(log_file)?;

    if outcome.success() {
        writeln!(log, "{}", outcome.stdout)?;
    } else {
        writeln!(
            log,
            "Command failed with error code {}",
            outcome
                .exit_code
                .map_or_else(|| "<signal>".to_string(), |c| c.to_string())
        )?;
        writeln!(log, "{}", outcome.stdout)?;
        writeln!(log, "{}", outcome.stderr)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[tokio::test]
    async fn test_captures_streams_and_exit_code() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("cmd.log");

        let outcome = run_logged(&mut sh("echo out; echo err >&2; exit 3"), &log)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, Some(3));
        assert!(!outcome.success());
        assert_eq!(outcome.stdout.trim(), "out");
        assert_eq!(outcome.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_failure_log_contains_code_and_both_streams() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("cmd.log");

        run_logged(&mut sh("echo out; echo err >&2; exit 3"), &log)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains("Command failed with error code 3"));
        assert!(contents.contains("out"));
        assert!(contents.contains("err"));
    }

    #[tokio::test]
    async fn test_success_log_keeps_stdout_only() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("cmd.log");

        run_logged(&mut sh("echo fine"), &log).await.unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains("fine"));
        assert!(!contents.contains("Command failed"));
    }

    #[tokio::test]
    async fn test_log_appends_across_invocations() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("cmd.log");

        run_logged(&mut sh("echo first"), &log).await.unwrap();
        run_logged(&mut sh("echo second"), &log).await.unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains("first"));
        assert!(contents.contains("second"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("cmd.log");

        let mut missing = Command::new(temp.path().join("no-such-binary"));
        assert!(run_logged(&mut missing, &log).await.is_err());
    }

    #[test]
    fn test_exec_context_prepends_paths() {
        let ctx = ExecContext::with_base(
            Path::new("/work/certbot"),
            Some(OsString::from("/usr/bin:/bin")),
            None,
        );

        assert_eq!(ctx.bin_dir(), Path::new("/work/certbot/bin"));
        assert_eq!(ctx.search_path(), "/work/certbot/bin:/usr/bin:/bin");
    }

    #[test]
    fn test_exec_context_without_base_paths() {
        let ctx = ExecContext::with_base(Path::new("/work/certbot"), None, None);
        assert_eq!(ctx.search_path(), "/work/certbot/bin");
    }
}
