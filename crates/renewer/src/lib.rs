//! Certvault Renewer Library
//!
//! A one-shot pipeline that obtains a public TLS certificate through an
//! ACME CA with DNS-based validation and publishes the material into AWS
//! Secrets Manager. Designed for ephemeral, stateless invocations (a
//! scheduled serverless function): no state survives a run except the
//! secret record itself.
//!
//! The stages, in order:
//!
//! - **Config**: six environment variables, validated up front
//!   ([`certvault_config::RenewalConfig`])
//! - **Workspace**: ephemeral tool/output/log directories with a cleanup
//!   guarantee ([`workspace::Workspace`])
//! - **ACME orchestration**: toolchain install plus the certbot run,
//!   post-condition checked ([`acme`])
//! - **Artifacts**: the four PEM files as an immutable bundle
//!   ([`artifacts::CertificateBundle`])
//! - **Publication**: describe/update-or-create upsert into the secret
//!   store ([`secrets`])
//! - **Result**: one `{statusCode, body}` envelope per run
//!   ([`response::Response`])

// ============================================================================
// Module Declarations
// ============================================================================

pub mod acme;
pub mod artifacts;
pub mod error;
pub mod exec;
pub mod handler;
pub mod response;
pub mod secrets;
pub mod workspace;

// ============================================================================
// Public API Re-exports
// ============================================================================

// Entry point
pub use handler::{handle, run_pipeline, RenewalOutcome};

// Orchestration
pub use acme::{AcmeOrchestrator, ToolchainInstaller};

// Execution primitives
pub use exec::{CommandOutcome, ExecContext};

// Artifacts and publication
pub use artifacts::CertificateBundle;
pub use secrets::{publish, SecretStore, SecretStoreError};

// Errors and results
pub use error::RenewalError;
pub use response::Response;

// Workspace
pub use workspace::Workspace;
