//! Secret publication.
//!
//! The certificate bundle's only durable destination is the secret
//! store. The store sits behind the [`SecretStore`] trait so the
//! publisher's upsert logic is testable against a recording fake, with
//! AWS Secrets Manager as the production implementation ([`aws`]).

pub mod aws;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::artifacts::CertificateBundle;
use crate::error::RenewalError;

/// Errors surfaced by a secret store implementation.
///
/// A not-found condition on lookup is NOT an error — it selects the
/// create branch of the upsert and is reported as `Ok(false)` from
/// [`SecretStore::exists`].
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// The store rejected a call: permission denial, throttling, a
    /// transient network fault, or any other service-side condition.
    #[error("{0}")]
    Api(String),
}

/// A durable, named secret store supporting describe/create/update.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Whether a secret with this identifier exists. A store-reported
    /// not-found condition yields `Ok(false)`; anything else that goes
    /// wrong is an `Err`.
    async fn exists(&self, name: &str) -> Result<bool, SecretStoreError>;

    /// Create the secret with an initial payload.
    async fn create(
        &self,
        name: &str,
        description: &str,
        payload: &str,
    ) -> Result<(), SecretStoreError>;

    /// Replace the secret's payload in place (full overwrite, not merge).
    async fn update(&self, name: &str, payload: &str) -> Result<(), SecretStoreError>;
}

/// Upsert the certificate bundle under the configured secret name.
///
/// Exactly one branch is taken: an existing secret is updated in place,
/// an absent one is created with a description referencing the domain.
/// The existence check and the write are not atomic against concurrent
/// writers; the single-invocation model accepts that race. Store errors
/// propagate — there is no local fallback persistence, so material that
/// is not durably stored is discarded with the workspace.
pub async fn publish(
    store: &dyn SecretStore,
    secret_name: &str,
    bundle: &CertificateBundle,
) -> Result<(), RenewalError> {
    let payload = serde_json::to_string(bundle)
        .map_err(|e| RenewalError::Unexpected(anyhow::Error::new(e)))?;

    if store.exists(secret_name).await? {
        info!(secret = %secret_name, "Updating existing secret");
        store.update(secret_name, &payload).await?;
    } else {
        info!(secret = %secret_name, "Creating new secret");
        store
            .create(
                secret_name,
                &format!("SSL certificate for {}", bundle.domain),
                &payload,
            )
            .await?;
    }

    Ok(())
}
