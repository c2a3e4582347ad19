//! Toolchain installation into the run workspace.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{error, info};

use crate::error::RenewalError;
use crate::exec::{run_logged, ExecContext};
use crate::workspace::Workspace;

/// Packages installed before issuance: the ACME client, its DNS
/// validation plugin, and the cloud CLI.
pub const TOOL_PACKAGES: [&str; 3] = ["certbot", "certbot-dns-route53", "awscli"];

/// Installs the external toolchain into a workspace-scoped target
/// directory so nothing leaks outside the run.
#[derive(Debug, Clone)]
pub struct ToolchainInstaller {
    program: PathBuf,
}

impl Default for ToolchainInstaller {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pip"),
        }
    }
}

impl ToolchainInstaller {
    /// Installer using the `pip` found on the ambient search path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installer using an explicit program (stub executables in tests).
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Install the toolchain into the workspace's tool directory.
    ///
    /// Output is captured to the install log. On success, returns the
    /// [`ExecContext`] that exposes the installed tools to subsequent
    /// commands. Installation failure is terminal for the run; there is
    /// no retry.
    pub async fn install(&self, workspace: &Workspace) -> Result<ExecContext, RenewalError> {
        info!(
            packages = ?TOOL_PACKAGES,
            target = %workspace.tool_dir().display(),
            "Installing dependencies"
        );

        let mut command = Command::new(&self.program);
        command
            .arg("install")
            .args(TOOL_PACKAGES)
            .arg("-t")
            .arg(workspace.tool_dir());

        let outcome = run_logged(&mut command, &workspace.install_log())
            .await
            .map_err(|e| {
                error!(program = %self.program.display(), error = %e, "Failed to run installer");
                RenewalError::DependencyInstall { exit_code: None }
            })?;

        if !outcome.success() {
            error!(
                exit_code = ?outcome.exit_code,
                stderr = %outcome.stderr,
                log = %workspace.install_log().display(),
                "Dependency installation failed"
            );
            return Err(RenewalError::DependencyInstall {
                exit_code: outcome.exit_code,
            });
        }

        Ok(ExecContext::for_install_dir(workspace.tool_dir()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_passes_packages_and_target() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::create(temp.path().join("run")).unwrap();

        let args_file = temp.path().join("args.txt");
        let stub = write_stub(
            temp.path(),
            "pip",
            &format!("printf '%s\\n' \"$@\" > {}", args_file.display()),
        );

        ToolchainInstaller::with_program(&stub)
            .install(&ws)
            .await
            .unwrap();

        let recorded = fs::read_to_string(&args_file).unwrap();
        let args: Vec<&str> = recorded.lines().collect();
        assert_eq!(
            args,
            vec![
                "install",
                "certbot",
                "certbot-dns-route53",
                "awscli",
                "-t",
                &*ws.tool_dir().to_string_lossy(),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_success_yields_context_over_tool_dir() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::create(temp.path().join("run")).unwrap();
        let stub = write_stub(temp.path(), "pip", "exit 0");

        let ctx = ToolchainInstaller::with_program(&stub)
            .install(&ws)
            .await
            .unwrap();

        assert_eq!(ctx.bin_dir(), ws.tool_dir().join("bin"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_failure_is_terminal_and_logged() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::create(temp.path().join("run")).unwrap();
        let stub = write_stub(temp.path(), "pip", "echo 'no network' >&2; exit 7");

        let err = ToolchainInstaller::with_program(&stub)
            .install(&ws)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RenewalError::DependencyInstall { exit_code: Some(7) }
        ));

        let log = fs::read_to_string(ws.install_log()).unwrap();
        assert!(log.contains("Command failed with error code 7"));
        assert!(log.contains("no network"));
    }

    #[tokio::test]
    async fn test_missing_installer_program_is_install_failure() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::create(temp.path().join("run")).unwrap();

        let err = ToolchainInstaller::with_program(temp.path().join("absent-pip"))
            .install(&ws)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RenewalError::DependencyInstall { exit_code: None }
        ));
    }
}
