//! The single-pass renewal pipeline and its invocation boundary.
//!
//! [`handle`] is the entry point the invoking environment calls with an
//! opaque trigger payload. It loads configuration, acquires the
//! workspace, and drives the stages strictly in order: toolchain install
//! → issuance → artifact read → secret publication. Cleanup runs on
//! every exit path, and the outermost boundary converts any fault —
//! including panics — into a well-formed [`Response`], so a run never
//! terminates without producing the structured result contract.

use std::path::Path;

use anyhow::Context;
use certvault_config::RenewalConfig;
use futures::FutureExt;
use serde_json::Value;
use tracing::{error, info};

use crate::acme::{AcmeOrchestrator, ToolchainInstaller};
use crate::artifacts::CertificateBundle;
use crate::error::RenewalError;
use crate::response::Response;
use crate::secrets::{self, aws::AwsSecretStore, SecretStore};
use crate::workspace::Workspace;

/// What a successful run produced, for the success body.
#[derive(Debug, Clone)]
pub struct RenewalOutcome {
    /// Primary certificate domain.
    pub domain: String,
    /// Secret-store record identifier the material was published under.
    pub secret_name: String,
    /// Issuance timestamp carried in the secret payload.
    pub timestamp: String,
}

/// Entry point for one run.
///
/// The trigger payload and its content are ignored — they are only the
/// activation signal. Always returns a [`Response`]; never panics out.
pub async fn handle(_event: Value) -> Response {
    match std::panic::AssertUnwindSafe(run()).catch_unwind().await {
        Ok(Ok(outcome)) => {
            info!(
                domain = %outcome.domain,
                secret = %outcome.secret_name,
                "Certificate processing completed successfully"
            );
            Response::success(&outcome.domain, &outcome.secret_name, &outcome.timestamp)
        }
        Ok(Err(err)) => {
            error!(error = %err, "Renewal run failed");
            Response::failure(&err)
        }
        Err(panic) => {
            let err = RenewalError::Unexpected(anyhow::anyhow!(
                "panic: {}",
                panic_message(panic.as_ref())
            ));
            error!(error = %err, "Renewal run panicked");
            Response::failure(&err)
        }
    }
}

/// Production wiring: config from the environment, workspace under the
/// system temp directory, real installer/orchestrator, AWS-backed store.
async fn run() -> Result<RenewalOutcome, RenewalError> {
    let config = RenewalConfig::from_env()?;
    info!(domain = %config.domain, "Starting certificate issuance/renewal");

    let store = AwsSecretStore::from_region(&config.region).await;

    run_pipeline(
        &config,
        &std::env::temp_dir().join("certvault"),
        &ToolchainInstaller::new(),
        &AcmeOrchestrator::new(),
        &store,
    )
    .await
}

/// Drive the pipeline inside a freshly-acquired workspace.
///
/// The workspace is removed (best-effort) after the stages resolve,
/// whatever the outcome. Components are passed in explicitly so tests
/// can substitute stub executables and a fake store.
pub async fn run_pipeline(
    config: &RenewalConfig,
    workspace_root: &Path,
    installer: &ToolchainInstaller,
    orchestrator: &AcmeOrchestrator,
    store: &dyn SecretStore,
) -> Result<RenewalOutcome, RenewalError> {
    let workspace = Workspace::create(workspace_root)
        .context("failed to create run workspace")
        .map_err(RenewalError::Unexpected)?;

    let result = execute(config, &workspace, installer, orchestrator, store).await;
    workspace.cleanup();
    result
}

/// The ordered stages: install precedes issuance, issuance precedes
/// artifact reading, artifact reading precedes publication.
async fn execute(
    config: &RenewalConfig,
    workspace: &Workspace,
    installer: &ToolchainInstaller,
    orchestrator: &AcmeOrchestrator,
    store: &dyn SecretStore,
) -> Result<RenewalOutcome, RenewalError> {
    let context = installer.install(workspace).await?;

    orchestrator.obtain(config, workspace, &context).await?;

    let bundle = CertificateBundle::load(&workspace.live_dir(&config.domain), &config.domain)?;

    secrets::publish(store, &config.secret_name, &bundle).await?;
    info!(secret = %config.secret_name, "Certificates stored in the secret store");

    Ok(RenewalOutcome {
        domain: config.domain.clone(),
        secret_name: config.secret_name.clone(),
        timestamp: bundle.updated_at,
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
