//! Certificate artifact loading.
//!
//! After a successful issuance the ACME client leaves four PEM files in
//! the domain's live directory. They are read as opaque text — nothing
//! here parses X.509 — and bundled with the domain and an issuance
//! timestamp for publication.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::RenewalError;

/// Timestamp layout used in the secret payload and the success body.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The four PEM blobs plus issuance metadata, serialized wholesale as the
/// secret payload.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateBundle {
    /// Leaf certificate (`cert.pem`).
    pub certificate: String,
    /// CA chain (`chain.pem`).
    pub chain: String,
    /// Leaf plus chain (`fullchain.pem`).
    pub fullchain: String,
    /// Private key (`privkey.pem`).
    pub privkey: String,
    /// Primary domain the certificate was issued for.
    pub domain: String,
    /// Issuance timestamp, UTC, `YYYY-MM-DDTHH:MM:SSZ`.
    pub updated_at: String,
}

impl CertificateBundle {
    /// Load the bundle from a domain's live directory, stamping it with
    /// the current UTC time.
    ///
    /// # Errors
    ///
    /// Returns [`RenewalError::ArtifactMissing`] naming the first file
    /// that cannot be read. This is distinct from an orchestration
    /// failure: the tool claimed success, so a missing file here means
    /// the filesystem contract was violated.
    pub fn load(live_dir: &Path, domain: &str) -> Result<Self, RenewalError> {
        let bundle = Self {
            certificate: read_artifact(live_dir, "cert.pem")?,
            chain: read_artifact(live_dir, "chain.pem")?,
            fullchain: read_artifact(live_dir, "fullchain.pem")?,
            privkey: read_artifact(live_dir, "privkey.pem")?,
            domain: domain.to_string(),
            updated_at: now_timestamp(),
        };

        debug!(
            domain = %domain,
            updated_at = %bundle.updated_at,
            "Loaded certificate artifacts"
        );
        Ok(bundle)
    }
}

/// Current UTC time in the payload's timestamp layout.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

fn read_artifact(live_dir: &Path, name: &str) -> Result<String, RenewalError> {
    let path = live_dir.join(name);
    fs::read_to_string(&path).map_err(|source| {
        error!(path = %path.display(), error = %source, "Certificate artifact unreadable");
        RenewalError::ArtifactMissing { path, source }
    })
}
