//! Issuance command composition and execution.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use certvault_config::RenewalConfig;
use tokio::process::Command;
use tracing::{error, info};

use crate::error::RenewalError;
use crate::exec::{run_logged, ExecContext};
use crate::workspace::Workspace;

/// Runs the external ACME client against the requested domain set.
///
/// Success has two conditions, checked in order: the command exits zero,
/// AND the primary domain's live output directory exists afterwards. The
/// second check defends against a tool that exits 0 without producing
/// artifacts.
#[derive(Debug, Clone)]
pub struct AcmeOrchestrator {
    program: PathBuf,
}

impl Default for AcmeOrchestrator {
    fn default() -> Self {
        Self {
            program: PathBuf::from("certbot"),
        }
    }
}

impl AcmeOrchestrator {
    /// Orchestrator invoking the `certbot` exposed by the install step's
    /// execution context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Orchestrator invoking an explicit program (stub executables in
    /// tests).
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The full `certonly` argument vector for this run.
    ///
    /// Domain selection is one `-d <domain>` pair per domain, primary
    /// first, additional domains in configured order — the order affects
    /// nothing functionally but stays deterministic for logging and
    /// testability. `--staging` is appended only when requested. The
    /// trailing directory arguments confine all of certbot's state to
    /// the workspace.
    pub fn issuance_args(&self, config: &RenewalConfig, workspace: &Workspace) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "certonly",
            "--non-interactive",
            "--agree-tos",
            "--email",
            config.email.as_str(),
            "--dns-route53",
        ]
        .iter()
        .map(OsString::from)
        .collect();

        for domain in config.all_domains() {
            args.push("-d".into());
            args.push(domain.into());
        }

        if config.staging {
            args.push("--staging".into());
        }

        args.push("--work-dir".into());
        args.push(workspace.tool_dir().into());
        args.push("--logs-dir".into());
        args.push(workspace.logs_dir().into());
        args.push("--config-dir".into());
        args.push(workspace.cert_dir().into());

        args
    }

    /// Run the issuance command and enforce its post-condition.
    pub async fn obtain(
        &self,
        config: &RenewalConfig,
        workspace: &Workspace,
        context: &ExecContext,
    ) -> Result<(), RenewalError> {
        info!(domain = %config.domain, "Running certbot with the Route 53 plugin");
        if config.staging {
            info!("Running in staging mode");
        }

        let mut command = Command::new(&self.program);
        command.args(self.issuance_args(config, workspace));
        context.apply(&mut command);

        let outcome = run_logged(&mut command, &workspace.issuance_log())
            .await
            .map_err(|e| {
                error!(program = %self.program.display(), error = %e, "Failed to run ACME client");
                RenewalError::IssuanceFailed { exit_code: None }
            })?;

        if !outcome.success() {
            error!(
                exit_code = ?outcome.exit_code,
                stderr = %outcome.stderr,
                "Certificate issuance command failed"
            );
            self.emit_tool_log(workspace);
            return Err(RenewalError::IssuanceFailed {
                exit_code: outcome.exit_code,
            });
        }

        // Exit code 0 alone is not trusted; the artifacts must be there.
        let live_dir = workspace.live_dir(&config.domain);
        if !live_dir.is_dir() {
            error!(
                expected = %live_dir.display(),
                "ACME client exited 0 but produced no output directory"
            );
            self.emit_tool_log(workspace);
            return Err(RenewalError::OutputMissing { expected: live_dir });
        }

        info!(domain = %config.domain, "Certificate issuance succeeded");
        Ok(())
    }

    /// Echo the full captured tool log to the log stream so a failure can
    /// be diagnosed from run output alone.
    fn emit_tool_log(&self, workspace: &Workspace) {
        match fs::read_to_string(workspace.issuance_log()) {
            Ok(contents) if !contents.is_empty() => {
                error!(log = %contents, "Captured ACME client log");
            }
            _ => {}
        }
    }
}
