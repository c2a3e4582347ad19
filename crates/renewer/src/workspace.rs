//! Ephemeral workspace for one renewal run.
//!
//! All intermediate state (installed tools, certbot's config/work trees,
//! captured logs) lives under a single root that is created at run start
//! and removed at run end, whatever the outcome.
//!
//! # Directory Structure
//!
//! ```text
//! <root>/
//! ├── certbot/          # toolchain install target (pip -t)
//! ├── letsencrypt/      # certbot --config-dir; output under live/<domain>/
//! └── logs/             # pip_install.log, certbot.log
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Well-known log file for the toolchain install step.
const INSTALL_LOG: &str = "pip_install.log";

/// Well-known log file for the issuance step.
const ISSUANCE_LOG: &str = "certbot.log";

/// The three working directories owned by a single run.
///
/// Creation is idempotent: pre-existing directories (e.g. leftovers from
/// a prior run that was killed before cleanup) are tolerated, not
/// recreated. Their contents are not assumed clean.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    tool_dir: PathBuf,
    cert_dir: PathBuf,
    logs_dir: PathBuf,
}

impl Workspace {
    /// Create the workspace rooted at `root`, ensuring all three
    /// subdirectories exist.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let workspace = Self {
            tool_dir: root.join("certbot"),
            cert_dir: root.join("letsencrypt"),
            logs_dir: root.join("logs"),
            root,
        };

        for dir in [
            &workspace.tool_dir,
            &workspace.cert_dir,
            &workspace.logs_dir,
        ] {
            fs::create_dir_all(dir)?;
        }

        debug!(root = %workspace.root.display(), "Created run workspace");
        Ok(workspace)
    }

    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Toolchain install target (`pip install -t`).
    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    /// Certificate output root (certbot `--config-dir`).
    pub fn cert_dir(&self) -> &Path {
        &self.cert_dir
    }

    /// Captured-log directory (certbot `--logs-dir`).
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Log file for the toolchain install step.
    pub fn install_log(&self) -> PathBuf {
        self.logs_dir.join(INSTALL_LOG)
    }

    /// Log file for the issuance step.
    pub fn issuance_log(&self) -> PathBuf {
        self.logs_dir.join(ISSUANCE_LOG)
    }

    /// The directory certbot populates for a domain on success.
    pub fn live_dir(&self, domain: &str) -> PathBuf {
        self.cert_dir.join("live").join(domain)
    }

    /// Recursively remove the workspace, best-effort.
    ///
    /// Cleanup is advisory: the environment is itself ephemeral, so a
    /// failed removal is logged and swallowed rather than turned into a
    /// run failure.
    pub fn cleanup(&self) {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => debug!(root = %self.root.display(), "Removed run workspace"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                root = %self.root.display(),
                error = %e,
                "Failed to remove run workspace"
            ),
        }
    }
}
