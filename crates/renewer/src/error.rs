//! Error taxonomy for a renewal run.
//!
//! Every stage of the pipeline fails with its own variant so the terminal
//! result can classify the outcome (client configuration problem vs
//! server-side operational problem) without re-parsing messages. Display
//! strings are the operator-facing diagnostics that end up in the failure
//! body verbatim.

use std::path::PathBuf;

use thiserror::Error;

use crate::secrets::SecretStoreError;

/// Errors that can terminate a renewal run.
#[derive(Debug, Error)]
pub enum RenewalError {
    /// A mandatory configuration parameter is absent.
    #[error(transparent)]
    Configuration(#[from] certvault_config::ConfigError),

    /// Installing the external toolchain (certbot, DNS plugin, CLI) failed.
    ///
    /// The detail is logged at the point of detection; the message stays
    /// generic and points the operator at the install log.
    #[error("Failed to install dependencies. Check the logs for details.")]
    DependencyInstall {
        /// Exit code of the installer, if it ran at all.
        exit_code: Option<i32>,
    },

    /// The issuance command exited non-zero (or could not be spawned).
    #[error("Certificate issuance failed. Check the logs for details.")]
    IssuanceFailed {
        /// Exit code of the ACME client, if it ran at all.
        exit_code: Option<i32>,
    },

    /// The issuance command exited zero but produced no output directory.
    #[error("Certificate issuance failed. Certificate files not found.")]
    OutputMissing {
        /// The live directory that was expected to exist.
        expected: PathBuf,
    },

    /// The tool reported success but a named artifact file is absent.
    #[error("Certificate artifact missing: {path}")]
    ArtifactMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The secret store rejected a describe/create/update call.
    #[error("Secret store operation failed: {0}")]
    SecretStore(#[from] SecretStoreError),

    /// Anything the named categories did not anticipate.
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl RenewalError {
    /// Status classification for the invocation contract: configuration
    /// problems are the caller's fault (400), everything else is an
    /// operational failure (500).
    pub fn status_code(&self) -> u16 {
        match self {
            RenewalError::Configuration(_) => 400,
            _ => 500,
        }
    }
}
