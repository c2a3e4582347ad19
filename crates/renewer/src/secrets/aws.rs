//! AWS Secrets Manager implementation of [`SecretStore`].

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tracing::debug;

use super::{SecretStore, SecretStoreError};

/// Secrets Manager client bound to the configured region.
#[derive(Debug, Clone)]
pub struct AwsSecretStore {
    client: Client,
}

impl AwsSecretStore {
    /// Build a store for the given region, resolving credentials from
    /// the execution environment the usual SDK way.
    pub async fn from_region(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        debug!(region = %region, "Initialized Secrets Manager client");
        Self {
            client: Client::new(&config),
        }
    }

    /// Wrap an already-built client (custom endpoints, test harnesses).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn exists(&self, name: &str) -> Result<bool, SecretStoreError> {
        match self.client.describe_secret().secret_id(name).send().await {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_resource_not_found_exception())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(err) => Err(SecretStoreError::Api(
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn create(
        &self,
        name: &str,
        description: &str,
        payload: &str,
    ) -> Result<(), SecretStoreError> {
        self.client
            .create_secret()
            .name(name)
            .description(description)
            .secret_string(payload)
            .send()
            .await
            .map_err(|err| SecretStoreError::Api(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }

    async fn update(&self, name: &str, payload: &str) -> Result<(), SecretStoreError> {
        self.client
            .update_secret()
            .secret_id(name)
            .secret_string(payload)
            .send()
            .await
            .map_err(|err| SecretStoreError::Api(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }
}
